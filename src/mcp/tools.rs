// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Tool definitions
//!
//! Every tool is read-only. Paths must be full paths; the tool server does
//! not complete shorthand.

use super::{ToolCategory, ToolDefinition};
use crate::validate::{PROJECT_SORTS, RUN_STATES};
use serde_json::{json, Value};

fn path_param(format: &str) -> Value {
    json!({
        "type": "string",
        "description": format!("Resource path in the form {}", format)
    })
}

fn run_path_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "path": path_param("username/project_name/experiment_id") },
        "required": ["path"]
    })
}

fn filters_param() -> Value {
    json!({
        "type": "object",
        "description": format!(
            "Run filters, e.g. {{\"state\": \"FINISHED\", \"config.batch_size\": \"64\"}}. \
             Supported keys: `state` ({}) and `config.<name>`.",
            RUN_STATES.join(", ")
        ),
        "additionalProperties": true
    })
}

fn tool(
    name: &str,
    title: &str,
    description: &str,
    parameters: Value,
    category: ToolCategory,
    example: &str,
) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        parameters,
        category,
        read_only: true,
        example: Some(example.to_string()),
    }
}

/// Get all tool definitions
pub fn get_all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        // Workspace tools
        tool(
            "swanlab_list_workspaces",
            "List Workspaces",
            "List all workspaces accessible to the current user. A workspace is a collection of \
                projects owned by a person or a team.",
            json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Only list workspaces of this user"
                    }
                },
                "required": []
            }),
            ToolCategory::Workspace,
            "swanlab_list_workspaces()",
        ),
        tool(
            "swanlab_get_workspace",
            "Get Workspace",
            "Get detailed information about a specific workspace. Defaults to the current user's \
                personal workspace.",
            json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Workspace username (unique id)"
                    }
                },
                "required": []
            }),
            ToolCategory::Workspace,
            "swanlab_get_workspace(username=\"alice\")",
        ),
        tool(
            "swanlab_list_workspace_projects",
            "List Workspace Projects",
            "List all projects owned by one workspace. Defaults to the current user's personal \
                workspace.",
            json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Workspace username (unique id)"
                    }
                },
                "required": []
            }),
            ToolCategory::Workspace,
            "swanlab_list_workspace_projects(username=\"alice\")",
        ),
        // Project tools
        tool(
            "swanlab_list_projects",
            "List Projects",
            "List all projects with optional filtering by workspace, sort, and search.",
            json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Workspace username; lists only the projects of that \
                            workspace"
                    },
                    "sort": {
                        "type": "string",
                        "enum": PROJECT_SORTS,
                        "description": "Sort order"
                    },
                    "search": {
                        "type": "string",
                        "description": "Keyword, fuzzy-matched against project names"
                    },
                    "detail": {
                        "type": "boolean",
                        "default": true,
                        "description": "Include descriptions, labels and counts"
                    }
                },
                "required": []
            }),
            ToolCategory::Project,
            "swanlab_list_projects(path=\"alice\", sort=\"updated_at\")",
        ),
        tool(
            "swanlab_get_project",
            "Get Project",
            "Get detailed information about a specific project.",
            json!({
                "type": "object",
                "properties": { "path": path_param("username/project_name") },
                "required": ["path"]
            }),
            ToolCategory::Project,
            "swanlab_get_project(path=\"alice/mnist\")",
        ),
        tool(
            "swanlab_list_project_runs",
            "List Project Runs",
            "List all runs (experiments) of a project with optional filtering.",
            json!({
                "type": "object",
                "properties": {
                    "path": path_param("username/project_name"),
                    "filters": filters_param()
                },
                "required": ["path"]
            }),
            ToolCategory::Project,
            "swanlab_list_project_runs(path=\"alice/mnist\")",
        ),
        // Run tools
        tool(
            "swanlab_list_runs",
            "List Runs",
            "List all runs (experiments) in a project with optional filtering by state or config \
                values.",
            json!({
                "type": "object",
                "properties": {
                    "path": path_param("username/project_name"),
                    "filters": filters_param()
                },
                "required": ["path"]
            }),
            ToolCategory::Run,
            "swanlab_list_runs(path=\"alice/mnist\", filters={\"state\": \"FINISHED\"})",
        ),
        tool(
            "swanlab_get_run",
            "Get Run",
            "Get detailed information about a specific run (experiment), including its profile.",
            run_path_schema(),
            ToolCategory::Run,
            "swanlab_get_run(path=\"alice/mnist/abc123\")",
        ),
        tool(
            "swanlab_get_run_config",
            "Get Run Config",
            "Get the configuration (hyperparameters) of a specific run (experiment).",
            run_path_schema(),
            ToolCategory::Run,
            "swanlab_get_run_config(path=\"alice/mnist/abc123\")",
        ),
        tool(
            "swanlab_get_run_metadata",
            "Get Run Metadata",
            "Get the environment metadata of a specific run (experiment): python version, \
                hardware, system info.",
            run_path_schema(),
            ToolCategory::Run,
            "swanlab_get_run_metadata(path=\"alice/mnist/abc123\")",
        ),
        tool(
            "swanlab_get_run_requirements",
            "Get Run Requirements",
            "Get the Python requirements of a specific run (experiment).",
            run_path_schema(),
            ToolCategory::Run,
            "swanlab_get_run_requirements(path=\"alice/mnist/abc123\")",
        ),
        // Metric tools
        tool(
            "swanlab_list_run_metric_keys",
            "List Run Metric Keys",
            "List all available metric keys for a run (experiment). Use this to discover metric \
                names before calling swanlab_get_run_metrics.",
            run_path_schema(),
            ToolCategory::Metric,
            "swanlab_list_run_metric_keys(path=\"alice/mnist/abc123\")",
        ),
        tool(
            "swanlab_get_run_metrics",
            "Get Run Metrics",
            "Get metric data for a run (experiment). Returns a table of metric rows with its \
                columns and query metadata. Without `sample` at most 1000 rows are returned.",
            json!({
                "type": "object",
                "properties": {
                    "path": path_param("username/project_name/experiment_id"),
                    "keys": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Metric names, e.g. [\"loss\", \"acc\"]; an empty list \
                            returns an empty table"
                    },
                    "x_axis": {
                        "type": "string",
                        "default": "step",
                        "description": "X axis: `step` or a metric name"
                    },
                    "sample": {
                        "type": "integer",
                        "minimum": 1,
                        "description": "Maximum number of rows"
                    }
                },
                "required": ["path"]
            }),
            ToolCategory::Metric,
            "swanlab_get_run_metrics(path=\"alice/mnist/abc123\", keys=[\"loss\"])",
        ),
    ]
}
