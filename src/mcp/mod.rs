// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! SwanLab tools for AI agents
//!
//! Exposes the resource adapters as named tools with JSON Schema parameters.
//! [`SwanLabTools`] dispatches calls, [`McpServer`] serves them over the
//! Model Context Protocol and [`AgentManifest`] exports the definitions for
//! other agent runtimes.
//!
//! # Example
//!
//! ```no_run
//! use swanlib::api::HttpApi;
//! use swanlib::config::SwanConfig;
//! use swanlib::mcp::SwanLabTools;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let api = HttpApi::new(&SwanConfig::load()?)?;
//! let tools = SwanLabTools::new(&api);
//!
//! let result = tools.call_tool("swanlab_list_workspaces", serde_json::json!({}))?;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod formats;
pub mod server;
pub mod tools;

pub use formats::{AgentManifest, ExportFormat};
pub use server::{McpServer, MCP_PROTOCOL_VERSION};
pub use tools::get_all_tool_definitions;

use crate::api::SwanLabApi;
use crate::error::{Result, SwanError};
use crate::resolve::PathResolver;
use crate::resources::{
    MetricQuery, MetricResource, ProjectResource, RunResource, WorkspaceResource,
};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Instant;

/// Tool definition for AI systems
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (identifier)
    pub name: String,
    /// Short human-readable title
    pub title: String,
    pub description: String,
    /// Parameter schema (JSON Schema format)
    pub parameters: Value,
    pub category: ToolCategory,
    /// Tool never modifies remote state
    pub read_only: bool,
    /// Example usage
    pub example: Option<String>,
}

impl ToolDefinition {
    /// MCP `annotations` object
    pub fn annotations(&self) -> Value {
        serde_json::json!({ "title": self.title, "readOnlyHint": self.read_only })
    }
}

/// Tool categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    Workspace,
    Project,
    Run,
    Metric,
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCategory::Workspace => write!(f, "Workspace"),
            ToolCategory::Project => write!(f, "Project"),
            ToolCategory::Run => write!(f, "Run"),
            ToolCategory::Metric => write!(f, "Metric"),
        }
    }
}

/// Result from a tool call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    /// Result data (if successful)
    pub data: Option<Value>,
    /// Error message (if failed)
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub tool_name: String,
}

impl ToolResult {
    pub fn success(tool_name: &str, data: Value, exec_time_ms: u64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            execution_time_ms: exec_time_ms,
            tool_name: tool_name.to_string(),
        }
    }

    pub fn error(tool_name: &str, error: impl ToString, exec_time_ms: u64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            execution_time_ms: exec_time_ms,
            tool_name: tool_name.to_string(),
        }
    }
}

/// Tool dispatcher over a SwanLab API
pub struct SwanLabTools<'a> {
    api: &'a dyn SwanLabApi,
}

impl<'a> SwanLabTools<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self { api }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tools::get_all_tool_definitions()
    }

    /// Get a tool definition by name
    pub fn get_tool(&self, name: &str) -> Option<ToolDefinition> {
        self.list_tools().into_iter().find(|t| t.name == name)
    }

    /// Call a tool by name with parameters
    ///
    /// Tool failures are reported inside the [`ToolResult`]; the outer
    /// `Result` is reserved for the dispatcher itself.
    pub fn call_tool(&self, name: &str, params: Value) -> Result<ToolResult> {
        let start = Instant::now();
        debug!("tool call {} {}", name, params);

        let result = match name {
            // Workspace tools
            "swanlab_list_workspaces" => self.tool_list_workspaces(&params),
            "swanlab_get_workspace" => self.tool_get_workspace(&params),
            "swanlab_list_workspace_projects" => self.tool_list_workspace_projects(&params),

            // Project tools
            "swanlab_list_projects" => self.tool_list_projects(&params),
            "swanlab_get_project" => self.tool_get_project(&params),
            "swanlab_list_project_runs" | "swanlab_list_runs" => self.tool_list_runs(&params),

            // Run tools
            "swanlab_get_run" => self.tool_get_run(&params),
            "swanlab_get_run_config" => self.tool_get_run_config(&params),
            "swanlab_get_run_metadata" => self.tool_get_run_metadata(&params),
            "swanlab_get_run_requirements" => self.tool_get_run_requirements(&params),

            // Metric tools
            "swanlab_list_run_metric_keys" => self.tool_list_run_metric_keys(&params),
            "swanlab_get_run_metrics" => self.tool_get_run_metrics(&params),

            _ => Err(SwanError::InvalidArgument(format!("Unknown tool: {}", name))),
        };

        // parameter errors carry no resource context yet
        let result = result.map_err(|e| match e {
            e @ SwanError::Tool { .. } => e,
            other => other.context(format!("Failed to call tool '{}'", name)),
        });
        let exec_time = start.elapsed().as_millis() as u64;

        match result {
            Ok(data) => Ok(ToolResult::success(name, data, exec_time)),
            Err(e) => Ok(ToolResult::error(name, e, exec_time)),
        }
    }

    // ========================================================================
    // Workspace tools
    // ========================================================================

    fn tool_list_workspaces(&self, params: &Value) -> Result<Value> {
        let resolver = PathResolver::new(self.api);
        let list = WorkspaceResource::new(self.api, &resolver).list(opt_str(params, "username")?)?;
        Ok(serde_json::to_value(list)?)
    }

    fn tool_get_workspace(&self, params: &Value) -> Result<Value> {
        let resolver = PathResolver::new(self.api);
        let ws = WorkspaceResource::new(self.api, &resolver).get(opt_str(params, "username")?)?;
        Ok(serde_json::to_value(ws)?)
    }

    fn tool_list_workspace_projects(&self, params: &Value) -> Result<Value> {
        let resolver = PathResolver::new(self.api);
        let username = opt_str(params, "username")?;
        let projects = WorkspaceResource::new(self.api, &resolver).projects(username)?;
        Ok(serde_json::to_value(projects)?)
    }

    // ========================================================================
    // Project tools
    // ========================================================================

    fn tool_list_projects(&self, params: &Value) -> Result<Value> {
        let projects = ProjectResource::new(self.api).list(
            opt_str(params, "path")?,
            opt_str(params, "sort")?,
            opt_str(params, "search")?,
            opt_bool(params, "detail")?.unwrap_or(true),
        )?;
        Ok(serde_json::to_value(projects)?)
    }

    fn tool_get_project(&self, params: &Value) -> Result<Value> {
        let project = ProjectResource::new(self.api).get(req_str(params, "path")?)?;
        Ok(serde_json::to_value(project)?)
    }

    fn tool_list_runs(&self, params: &Value) -> Result<Value> {
        let path = req_str(params, "path")?;
        let runs = RunResource::new(self.api).list(path, opt_map(params, "filters")?)?;
        Ok(serde_json::to_value(runs)?)
    }

    // ========================================================================
    // Run tools
    // ========================================================================

    fn tool_get_run(&self, params: &Value) -> Result<Value> {
        let run = RunResource::new(self.api).get(req_str(params, "path")?)?;
        Ok(serde_json::to_value(run)?)
    }

    fn tool_get_run_config(&self, params: &Value) -> Result<Value> {
        let config = RunResource::new(self.api).config(req_str(params, "path")?)?;
        Ok(Value::Object(config))
    }

    fn tool_get_run_metadata(&self, params: &Value) -> Result<Value> {
        let metadata = RunResource::new(self.api).metadata(req_str(params, "path")?)?;
        Ok(Value::Object(metadata))
    }

    fn tool_get_run_requirements(&self, params: &Value) -> Result<Value> {
        let requirements = RunResource::new(self.api).requirements(req_str(params, "path")?)?;
        Ok(serde_json::to_value(requirements)?)
    }

    // ========================================================================
    // Metric tools
    // ========================================================================

    fn tool_list_run_metric_keys(&self, params: &Value) -> Result<Value> {
        let keys = MetricResource::new(self.api).list_keys(req_str(params, "path")?)?;
        Ok(serde_json::to_value(keys)?)
    }

    fn tool_get_run_metrics(&self, params: &Value) -> Result<Value> {
        let mut query = MetricQuery::new(opt_str_list(params, "keys")?);
        if let Some(x_axis) = opt_str(params, "x_axis")? {
            query.x_axis = x_axis.to_string();
        }
        query.sample = opt_i64(params, "sample")?;
        let path = req_str(params, "path")?;
        let table = MetricResource::new(self.api).get_run_metrics(path, &query)?;
        Ok(serde_json::to_value(table)?)
    }
}

// Parameter extraction. Explicit nulls count as absent.

fn present<'v>(params: &'v Value, key: &str) -> Option<&'v Value> {
    params.get(key).filter(|v| !v.is_null())
}

fn req_str<'v>(params: &'v Value, key: &str) -> Result<&'v str> {
    present(params, key)
        .ok_or_else(|| SwanError::InvalidArgument(format!("Missing '{}' parameter", key)))?
        .as_str()
        .ok_or_else(|| SwanError::InvalidArgument(format!("'{}' must be a string", key)))
}

fn opt_str<'v>(params: &'v Value, key: &str) -> Result<Option<&'v str>> {
    match present(params, key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| SwanError::InvalidArgument(format!("'{}' must be a string", key))),
    }
}

fn opt_bool(params: &Value, key: &str) -> Result<Option<bool>> {
    match present(params, key) {
        None => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| SwanError::InvalidArgument(format!("'{}' must be a boolean", key))),
    }
}

fn opt_i64(params: &Value, key: &str) -> Result<Option<i64>> {
    match present(params, key) {
        None => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| SwanError::InvalidArgument(format!("'{}' must be an integer", key))),
    }
}

fn opt_map<'v>(params: &'v Value, key: &str) -> Result<Option<&'v Map<String, Value>>> {
    match present(params, key) {
        None => Ok(None),
        Some(v) => v
            .as_object()
            .map(Some)
            .ok_or_else(|| SwanError::InvalidFilter(format!("`{}` must be an object", key))),
    }
}

fn opt_str_list(params: &Value, key: &str) -> Result<Vec<String>> {
    let invalid = || SwanError::InvalidArgument(format!("'{}' must be a list of strings", key));
    match present(params, key) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| v.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}
