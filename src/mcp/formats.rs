// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Tool manifest exporters
//!
//! Export the tool definitions in formats understood by agent runtimes.

use super::server::MCP_PROTOCOL_VERSION;
use super::tools::get_all_tool_definitions;
use super::ToolDefinition;
use crate::error::SwanError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;

/// Export format for different agent systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// OpenAI-style function tools (also used by OpenAI-compatible providers)
    OpenAI,
    /// Anthropic tool use
    Anthropic,
    /// Model Context Protocol server manifest
    Mcp,
    /// Plain serialization of the manifest
    SimpleJson,
}

impl ExportFormat {
    pub const SUPPORTED: &'static str = "openai, anthropic, mcp, json";
}

impl FromStr for ExportFormat {
    type Err = SwanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ExportFormat::OpenAI),
            "anthropic" | "claude" => Ok(ExportFormat::Anthropic),
            "mcp" => Ok(ExportFormat::Mcp),
            "json" | "simple" => Ok(ExportFormat::SimpleJson),
            other => Err(SwanError::InvalidArgument(format!(
                "Unknown format '{}'. Supported: {}",
                other,
                Self::SUPPORTED
            ))),
        }
    }
}

/// Complete agent manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentManifest {
    pub version: String,
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub tools: Vec<ToolDefinition>,
}

impl AgentManifest {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: "swanlab-mcp".to_string(),
            description: "Read-only access to SwanLab workspaces, projects, runs and metrics."
                .to_string(),
            capabilities: vec![
                "workspace_query".to_string(),
                "project_query".to_string(),
                "run_query".to_string(),
                "metric_query".to_string(),
            ],
            tools: get_all_tool_definitions(),
        }
    }

    pub fn export(&self, format: ExportFormat) -> Value {
        match format {
            ExportFormat::OpenAI => self.to_openai(),
            ExportFormat::Anthropic => self.to_anthropic(),
            ExportFormat::Mcp => self.to_mcp(),
            ExportFormat::SimpleJson => serde_json::to_value(self).unwrap_or(json!({})),
        }
    }

    fn to_openai(&self) -> Value {
        let functions: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters,
                    }
                })
            })
            .collect();
        json!({ "tools": functions, "tool_choice": "auto" })
    }

    fn to_anthropic(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "input_schema": tool.parameters,
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    fn to_mcp(&self) -> Value {
        let tools: Vec<Value> = self.tools.iter().map(mcp_tool).collect();
        json!({
            "name": self.name,
            "version": self.version,
            "description": self.description,
            "protocol_version": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": { "listChanged": false } },
            "tools": tools
        })
    }
}

impl Default for AgentManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// One tool as listed by `tools/list`
pub fn mcp_tool(tool: &ToolDefinition) -> Value {
    json!({
        "name": tool.name,
        "description": tool.description,
        "inputSchema": tool.parameters,
        "annotations": tool.annotations(),
    })
}
