// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! In-memory API used by the adapter, command and tool-server tests

use super::{ProjectQuery, SwanLabApi};
use crate::error::{Result, SwanError};
use crate::normalize::{ObjectFamily, RemoteObject};
use serde_json::{json, Map, Value};
use std::cell::RefCell;

/// Canned SwanLab data with a call log
pub struct FixtureApi {
    pub family: ObjectFamily,
    pub workspaces: Vec<Value>,
    pub projects: Vec<Value>,
    pub runs: Vec<Value>,
    pub columns: Vec<Value>,
    pub metrics: Value,
    calls: RefCell<Vec<String>>,
}

impl FixtureApi {
    /// Account `alice` with a team workspace listed first, one project and two runs
    pub fn sample() -> Self {
        Self {
            family: ObjectFamily::Plain,
            workspaces: vec![
                json!({"username": "lab", "name": "Lab", "role": "MEMBER", "type": "TEAM"}),
                json!({"username": "alice", "name": "Alice", "role": "OWNER", "type": "PERSON",
                       "profile": {"institution": "Uni"}}),
            ],
            projects: vec![json!({
                "name": "mnist", "path": "alice/mnist", "description": "digits",
                "labels": ["cv"], "visibility": "PRIVATE",
                "created_at": "2025-01-01T00:00:00Z", "url": "https://swanlab.cn/@alice/mnist",
                "count": {"experiments": 2}
            })],
            runs: vec![
                json!({
                    "id": "r1", "name": "baseline", "path": "alice/mnist/r1", "state": "FINISHED",
                    "finished_at": "2025-01-02T00:00:00Z",
                    "user": {"username": "alice", "is_self": true},
                    "profile": {
                        "config": {"lr": 0.01, "batch_size": 64},
                        "metadata": {"python": "3.11"},
                        "requirements": "torch==2.1"
                    }
                }),
                json!({
                    "experiment_id": "r2", "name": "wide", "path": "alice/mnist/r2",
                    "state": "RUNNING", "finished_at": "2025-01-03T00:00:00Z"
                }),
            ],
            columns: vec![
                json!({"key": "loss", "type": "SCALAR", "class": "STABLE"}),
                json!({"key": "train/acc", "type": "SCALAR", "class": "STABLE", "error": null}),
            ],
            metrics: json!({
                "columns": ["step", "loss", "loss_timestamp"],
                "rows": [
                    {"step": 0, "loss": 1.0, "loss_timestamp": 100},
                    {"step": 1, "loss": "NaN", "loss_timestamp": 101},
                    {"step": 2, "loss": 0.5, "loss_timestamp": 102}
                ]
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Log of remote calls, e.g. `run alice/mnist/r1`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.split(' ').next() == Some(method))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn not_found(what: &str) -> SwanError {
        SwanError::Remote {
            status: 404,
            message: format!("{} not found", what),
        }
    }

    fn find<'a>(items: &'a [Value], field: &str, value: &str) -> Option<&'a Value> {
        items.iter().find(|v| v.get(field).and_then(Value::as_str) == Some(value))
    }
}

impl SwanLabApi for FixtureApi {
    fn workspaces(&self, username: Option<&str>) -> Result<Vec<RemoteObject>> {
        self.record(format!("workspaces {}", username.unwrap_or("-")));
        Ok(self.family.adapt_all(self.workspaces.clone()))
    }

    fn workspace(&self, username: &str) -> Result<RemoteObject> {
        self.record(format!("workspace {}", username));
        Self::find(&self.workspaces, "username", username)
            .map(|v| self.family.adapt(v.clone()))
            .ok_or_else(|| Self::not_found("workspace"))
    }

    fn projects(&self, query: &ProjectQuery) -> Result<Vec<RemoteObject>> {
        self.record(format!("projects {}", query.path.as_deref().unwrap_or("-")));
        let items = self
            .projects
            .iter()
            .filter(|p| match &query.path {
                Some(u) => p["path"]
                    .as_str()
                    .map_or(false, |path| path.starts_with(&format!("{}/", u))),
                None => true,
            })
            .cloned()
            .collect();
        Ok(self.family.adapt_all(items))
    }

    fn project(&self, path: &str) -> Result<RemoteObject> {
        self.record(format!("project {}", path));
        Self::find(&self.projects, "path", path)
            .map(|v| self.family.adapt(v.clone()))
            .ok_or_else(|| Self::not_found("project"))
    }

    fn runs(
        &self,
        project_path: &str,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<RemoteObject>> {
        self.record(format!("runs {}", project_path));
        let prefix = format!("{}/", project_path);
        let state = filters.and_then(|f| f.get("state")).and_then(Value::as_str);
        let items = self
            .runs
            .iter()
            .filter(|r| r["path"].as_str().map_or(false, |p| p.starts_with(&prefix)))
            .filter(|r| state.map_or(true, |s| r["state"].as_str() == Some(s)))
            .cloned()
            .collect();
        Ok(self.family.adapt_all(items))
    }

    fn run(&self, path: &str) -> Result<RemoteObject> {
        self.record(format!("run {}", path));
        Self::find(&self.runs, "path", path)
            .map(|v| self.family.adapt(v.clone()))
            .ok_or_else(|| Self::not_found("experiment"))
    }

    fn metric_columns(&self, run_path: &str) -> Result<Vec<RemoteObject>> {
        self.record(format!("metric_columns {}", run_path));
        Ok(self.family.adapt_all(self.columns.clone()))
    }

    fn metrics(
        &self,
        run_path: &str,
        keys: &[String],
        x_axis: &str,
        sample: Option<u64>,
    ) -> Result<Value> {
        self.record(format!(
            "metrics {} keys={} x_axis={} sample={}",
            run_path,
            keys.join(","),
            x_axis,
            sample.map(|n| n.to_string()).unwrap_or_else(|| "-".into())
        ));
        Ok(self.metrics.clone())
    }
}
