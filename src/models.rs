// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Resource models
//!
//! Read-only projections of remote state. Each model is built from a
//! normalized [`Record`] with lenient field coercion: missing optional fields
//! never fail, lists default to empty and maps to `{}`.

use crate::normalize::{
    coerce_bool, coerce_map, coerce_opt_map, coerce_opt_str, coerce_str, coerce_str_list, field,
    Record,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Workspace: a collection of projects owned by a person or a team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique workspace id
    pub username: String,
    pub name: String,
    /// `OWNER` or `MEMBER`
    pub role: String,
    /// `PERSON` or `TEAM`
    #[serde(rename = "type", alias = "workspace_type")]
    pub workspace_type: String,
    /// Bio, url, institution, email
    pub profile: Record,
}

impl Workspace {
    pub const PERSON: &'static str = "PERSON";

    pub fn from_record(r: &Record) -> Self {
        Self {
            username: coerce_str(r.get("username")),
            name: coerce_str(r.get("name")),
            role: coerce_str(r.get("role")),
            workspace_type: coerce_str(field(r, &["type", "workspace_type"])),
            profile: coerce_map(r.get("profile")),
        }
    }

    pub fn is_personal(&self) -> bool {
        self.workspace_type == Self::PERSON
    }
}

/// Project: a collection of runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// `username/project_name`
    pub path: String,
    pub description: String,
    pub labels: Vec<String>,
    /// `PUBLIC` or `PRIVATE`
    pub visibility: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub url: String,
    /// Run count, collaborator count, ...
    pub count: Record,
}

impl Project {
    pub fn from_record(r: &Record) -> Self {
        Self {
            name: coerce_str(r.get("name")),
            path: coerce_str(r.get("path")),
            description: coerce_str(r.get("description")),
            labels: coerce_str_list(r.get("labels")),
            visibility: coerce_str(r.get("visibility")),
            created_at: coerce_opt_str(r.get("created_at")),
            updated_at: coerce_opt_str(r.get("updated_at")),
            url: coerce_str(r.get("url")),
            count: coerce_map(r.get("count")),
        }
    }
}

/// Owner of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunUser {
    pub username: Option<String>,
    pub is_self: Option<bool>,
}

impl RunUser {
    pub fn from_record(r: &Record) -> Self {
        Self {
            username: coerce_opt_str(r.get("username")),
            is_self: r.get("is_self").and_then(Value::as_bool),
        }
    }
}

/// Per-run environment bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProfile {
    pub conda: Record,
    pub config: Record,
    /// Python version, hardware, ...
    pub metadata: Record,
    pub requirements: Vec<String>,
}

impl RunProfile {
    pub fn from_record(r: &Record) -> Self {
        Self {
            conda: coerce_map(r.get("conda")),
            config: coerce_map(r.get("config")),
            metadata: coerce_map(r.get("metadata")),
            requirements: coerce_str_list(r.get("requirements")),
        }
    }
}

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Finished,
    Running,
    Crashed,
    Aborted,
}

impl RunState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "FINISHED" => Some(RunState::Finished),
            "RUNNING" => Some(RunState::Running),
            "CRASHED" => Some(RunState::Crashed),
            "ABORTED" => Some(RunState::Aborted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunState::Finished => "FINISHED",
            RunState::Running => "RUNNING",
            RunState::Crashed => "CRASHED",
            RunState::Aborted => "ABORTED",
        }
    }
}

/// Run (experiment): one tracked execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub name: String,
    /// `username/project_name/experiment_id`
    pub path: String,
    pub description: String,
    pub state: String,
    pub group: Vec<String>,
    pub labels: Vec<String>,
    pub created_at: Option<String>,
    /// Absent while the run is still running
    pub finished_at: Option<String>,
    pub url: String,
    pub job_type: String,
    /// Shown in chart comparison views
    pub show: bool,
    pub user: Option<RunUser>,
    pub profile: Option<RunProfile>,
}

impl Default for Run {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            path: String::new(),
            description: String::new(),
            state: String::new(),
            group: Vec::new(),
            labels: Vec::new(),
            created_at: None,
            finished_at: None,
            url: String::new(),
            job_type: String::new(),
            show: true,
            user: None,
            profile: None,
        }
    }
}

impl Run {
    pub fn from_record(r: &Record) -> Self {
        let state = coerce_str(r.get("state"));
        let finished_at = match RunState::parse(&state) {
            Some(RunState::Running) => None,
            _ => coerce_opt_str(r.get("finished_at")),
        };
        Self {
            id: coerce_str(field(r, &["id", "experiment_id"])),
            name: coerce_str(r.get("name")),
            path: coerce_str(r.get("path")),
            description: coerce_str(r.get("description")),
            state,
            group: coerce_str_list(r.get("group")),
            labels: coerce_str_list(r.get("labels")),
            created_at: coerce_opt_str(r.get("created_at")),
            finished_at,
            url: coerce_str(r.get("url")),
            job_type: coerce_str(r.get("job_type")),
            show: coerce_bool(r.get("show"), true),
            user: coerce_opt_map(r.get("user")).map(RunUser::from_record),
            profile: coerce_opt_map(r.get("profile")).map(RunProfile::from_record),
        }
    }

    pub fn state(&self) -> Option<RunState> {
        RunState::parse(&self.state)
    }
}

/// One metric column available on a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricKey {
    pub key: String,
    /// Data type, e.g. `SCALAR`
    #[serde(rename = "type")]
    pub key_type: String,
    /// Classification, e.g. `STABLE` or `SYSTEM`
    pub class: String,
    pub error: Option<Value>,
}

impl MetricKey {
    pub fn from_record(r: &Record) -> Self {
        Self {
            key: coerce_str(r.get("key")),
            key_type: coerce_str(r.get("type")),
            class: coerce_str(r.get("class")),
            error: r.get("error").filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Metric keys of a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricKeyList {
    pub path: String,
    pub keys: Vec<MetricKey>,
    pub total: usize,
}

/// Result of a metrics query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    pub path: String,
    pub keys: Vec<String>,
    pub x_axis: String,
    pub sample: Option<u64>,
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
    pub total: usize,
}

impl MetricTable {
    pub const DEFAULT_X_AXIS: &'static str = "step";

    /// Empty result for a query that asked for no keys
    pub fn empty(path: String, x_axis: String, sample: Option<u64>) -> Self {
        Self {
            path,
            keys: Vec::new(),
            x_axis,
            sample,
            columns: Vec::new(),
            rows: Vec::new(),
            total: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_workspace_type_aliases() {
        let ws = Workspace::from_record(&record(json!({
            "username": "alice", "name": "Alice", "role": "OWNER", "workspace_type": "PERSON"
        })));
        assert!(ws.is_personal());
        let out = serde_json::to_value(&ws).unwrap();
        assert_eq!(out["type"], json!("PERSON"));
        assert!(out.get("workspace_type").is_none());
        assert_eq!(out["profile"], json!({}));
    }

    #[test]
    fn test_project_defaults() {
        let p = Project::from_record(&record(json!({
            "name": "mnist", "path": "alice/mnist", "labels": null
        })));
        assert!(p.labels.is_empty());
        assert!(p.count.is_empty());
        assert_eq!(p.created_at, None);
        assert_eq!(p.description, "");
    }

    #[test]
    fn test_run_id_alias_and_nested() {
        let r = Run::from_record(&record(json!({
            "experiment_id": "abc",
            "state": "FINISHED",
            "finished_at": "2025-01-01T00:00:00Z",
            "group": "baseline",
            "user": {"username": "alice", "is_self": true},
            "profile": {"config": {"lr": 0.1}, "requirements": ["torch==2.1"]}
        })));
        assert_eq!(r.id, "abc");
        assert_eq!(r.group, vec!["baseline".to_string()]);
        assert!(r.show);
        assert_eq!(r.user.as_ref().unwrap().is_self, Some(true));
        let profile = r.profile.unwrap();
        assert_eq!(profile.config.get("lr"), Some(&json!(0.1)));
        assert!(profile.metadata.is_empty());
        assert_eq!(r.finished_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    }

    #[test]
    fn test_running_run_has_no_finished_at() {
        let r = Run::from_record(&record(json!({
            "id": "x", "state": "RUNNING", "finished_at": "2025"
        })));
        assert_eq!(r.state(), Some(RunState::Running));
        assert_eq!(r.finished_at, None);
    }

    #[test]
    fn test_run_non_mapping_nested_is_absent() {
        let r = Run::from_record(&record(json!({"user": "", "profile": [1, 2], "show": false})));
        assert!(r.user.is_none());
        assert!(r.profile.is_none());
        assert!(!r.show);
    }

    #[test]
    fn test_metric_key_serializes_reserved_names() {
        let k = MetricKey::from_record(&record(json!({
            "key": "loss", "type": "SCALAR", "class": "STABLE"
        })));
        let out = serde_json::to_value(&k).unwrap();
        assert_eq!(out, json!({"key": "loss", "type": "SCALAR", "class": "STABLE", "error": null}));
    }

    #[test]
    fn test_run_state_roundtrip_names() {
        for s in crate::validate::RUN_STATES {
            assert_eq!(RunState::parse(s).unwrap().as_str(), s);
        }
        assert!(RunState::parse("finished").is_none());
    }
}
