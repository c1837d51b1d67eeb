// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Command-line client for SwanLab (swanlab)

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use colored::Colorize;
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "swanlab")]
#[command(about = "Query SwanLab workspaces, projects, runs and metrics", long_about = None)]
#[command(version)]
#[command(after_help = "Paths accept shorthand: `project` expands to `<you>/project` and \
`project/run` to `<you>/project/run`, using your personal workspace.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Workspace operations
    Workspaces {
        #[command(subcommand)]
        action: WorkspaceSubcommand,
    },
    /// Project operations
    Projects {
        #[command(subcommand)]
        action: ProjectSubcommand,
    },
    /// Run (experiment) operations
    Runs {
        #[command(subcommand)]
        action: RunSubcommand,
    },
    /// Print a sample configuration file
    Config,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum WorkspaceSubcommand {
    /// List workspaces
    List {
        /// Only workspaces of this user
        #[arg(long)]
        username: Option<String>,
    },
    /// Show one workspace (default: personal)
    Get { username: Option<String> },
    /// List the projects of a workspace (default: personal)
    Projects { username: Option<String> },
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum ProjectSubcommand {
    /// List projects of a workspace (default: personal)
    List {
        username: Option<String>,
        /// created_at or updated_at
        #[arg(long)]
        sort: Option<String>,
        /// Fuzzy match on project names
        #[arg(long)]
        search: Option<String>,
        /// Skip descriptions, labels and counts
        #[arg(long)]
        no_detail: bool,
    },
    /// Show one project (username/project_name or project_name)
    Get { path: String },
    /// List runs of a project
    Runs {
        path: String,
        /// Filter as key=value, e.g. state=FINISHED or config.lr=0.01
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum RunSubcommand {
    /// List runs of a project
    List {
        path: String,
        /// Filter as key=value, e.g. state=FINISHED or config.lr=0.01
        #[arg(long = "filter")]
        filters: Vec<String>,
    },
    /// Show one run (username/project_name/experiment_id or project_name/experiment_id)
    Get { path: String },
    /// Show the config of a run
    Config { path: String },
    /// Show the environment metadata of a run
    Metadata { path: String },
    /// Show the Python requirements of a run
    Requirements { path: String },
    /// List the metric keys of a run
    MetricKeys { path: String },
    /// Export metric series to chunked JSON files
    Metrics {
        path: String,
        /// Comma-separated metric keys, e.g. loss,accuracy
        keys: String,
        #[arg(long, default_value = "step")]
        x_axis: String,
        /// Maximum number of rows
        #[arg(long)]
        sample: Option<i64>,
        /// Points per file
        #[arg(long, default_value_t = swanlib::metrics::DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,
        /// Output directory (default: the cache directory); the run id is appended
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    env_logger::init();

    if let Err(e) = run(&cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    use swanlib::commands::Session;
    use swanlib::{HttpApi, SwanConfig};

    let output = match &cli.command {
        Commands::Config => sample_config(),
        command => {
            let config = SwanConfig::load()?;
            let api = HttpApi::new(&config)?;
            let session = Session::new(&api, config.cache_dir.clone());
            dispatch(&session, command)?
        }
    };

    println!("{}", output.render(cli.compact)?);
    Ok(())
}

#[cfg(feature = "cli")]
fn dispatch(
    session: &swanlib::commands::Session,
    command: &Commands,
) -> swanlib::Result<swanlib::commands::Output> {
    match command {
        Commands::Workspaces { action } => handle_workspace_command(session, action),
        Commands::Projects { action } => handle_project_command(session, action),
        Commands::Runs { action } => handle_run_command(session, action),
        Commands::Config => Ok(sample_config()),
    }
}

#[cfg(feature = "cli")]
fn sample_config() -> swanlib::commands::Output {
    let sample = swanlib::SwanConfig::sample_toml();
    swanlib::commands::Output::Message(sample.trim_end().to_string())
}

#[cfg(feature = "cli")]
fn handle_workspace_command(
    session: &swanlib::commands::Session,
    action: &WorkspaceSubcommand,
) -> swanlib::Result<swanlib::commands::Output> {
    match action {
        WorkspaceSubcommand::List { username } => session.workspaces_list(username.as_deref()),
        WorkspaceSubcommand::Get { username } => session.workspaces_get(username.as_deref()),
        WorkspaceSubcommand::Projects { username } => {
            session.workspaces_projects(username.as_deref())
        }
    }
}

#[cfg(feature = "cli")]
fn handle_project_command(
    session: &swanlib::commands::Session,
    action: &ProjectSubcommand,
) -> swanlib::Result<swanlib::commands::Output> {
    match action {
        ProjectSubcommand::List {
            username,
            sort,
            search,
            no_detail,
        } => session.projects_list(
            username.as_deref(),
            sort.as_deref(),
            search.as_deref(),
            !no_detail,
        ),
        ProjectSubcommand::Get { path } => session.projects_get(path),
        ProjectSubcommand::Runs { path, filters } => session.projects_runs(path, filters),
    }
}

#[cfg(feature = "cli")]
fn handle_run_command(
    session: &swanlib::commands::Session,
    action: &RunSubcommand,
) -> swanlib::Result<swanlib::commands::Output> {
    use swanlib::commands::ExportOptions;

    match action {
        RunSubcommand::List { path, filters } => session.runs_list(path, filters),
        RunSubcommand::Get { path } => session.runs_get(path),
        RunSubcommand::Config { path } => session.runs_config(path),
        RunSubcommand::Metadata { path } => session.runs_metadata(path),
        RunSubcommand::Requirements { path } => session.runs_requirements(path),
        RunSubcommand::MetricKeys { path } => session.runs_metric_keys(path),
        RunSubcommand::Metrics {
            path,
            keys,
            x_axis,
            sample,
            chunk_size,
            output,
        } => session.runs_metrics(
            path,
            &ExportOptions {
                keys: keys.clone(),
                x_axis: x_axis.clone(),
                sample: *sample,
                chunk_size: *chunk_size,
                output: output.clone(),
            },
        ),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI features not enabled. Please compile with --features cli");
    std::process::exit(1);
}
