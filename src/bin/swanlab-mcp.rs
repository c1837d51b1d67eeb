// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! MCP tool server for SwanLab (swanlab-mcp)

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand, ValueEnum};
#[cfg(feature = "cli")]
use colored::Colorize;
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "swanlab-mcp")]
#[command(
    about = "Model Context Protocol server exposing read-only SwanLab tools",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Export tool manifests for agent runtimes
    Manifest {
        /// Output format: openai, anthropic, mcp, or json
        #[arg(short, long, default_value = "mcp")]
        format: String,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    env_logger::init();

    let result = match &cli.command {
        Some(Commands::Manifest { format, output }) => handle_manifest(format, output.as_ref()),
        None => handle_server(cli.transport),
    };
    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Handle MCP server command
#[cfg(feature = "cli")]
fn handle_server(transport: Transport) -> Result<(), Box<dyn std::error::Error>> {
    use swanlib::mcp::{McpServer, MCP_PROTOCOL_VERSION};
    use swanlib::{HttpApi, SwanConfig};

    let config = SwanConfig::load()?;
    let api = HttpApi::new(&config)?;

    ctrlc::set_handler(|| {
        eprintln!("{} MCP server interrupted, shutting down", "[*]".cyan());
        std::process::exit(0);
    })?;

    match transport {
        Transport::Stdio => {
            eprintln!("{} Starting MCP server on stdio...", "[*]".cyan());
            eprintln!("{} Protocol version: {}", "[*]".cyan(), MCP_PROTOCOL_VERSION);
            eprintln!("{} API host: {}", "[*]".cyan(), config.api_host);
            McpServer::new(&api).run_stdio()?;
        }
    }
    Ok(())
}

/// Handle manifest export command
#[cfg(feature = "cli")]
fn handle_manifest(
    format: &str,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    use swanlib::mcp::{AgentManifest, ExportFormat};

    let export_format: ExportFormat = format.parse()?;
    let exported = AgentManifest::new().export(export_format);
    let json_output = serde_json::to_string_pretty(&exported)?;

    if let Some(path) = output {
        std::fs::write(path, &json_output)?;
        eprintln!("{} Manifest written to: {}", "[+]".green(), path.display());
    } else {
        println!("{}", json_output);
    }

    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
