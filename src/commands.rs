// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Command handlers behind the `swanlab` binary
//!
//! A [`Session`] serves one invocation: it owns the shorthand resolver, so
//! the personal workspace is fetched at most once, and turns each command
//! into an [`Output`] for the binary to print.

use crate::api::SwanLabApi;
use crate::error::{Result, SwanError};
use crate::metrics::{export_series, reshape, DEFAULT_CHUNK_SIZE};
use crate::resolve::PathResolver;
use crate::resources::{
    MetricQuery, MetricResource, ProjectResource, RunResource, WorkspaceResource,
};
use crate::validate::parse_filter_pairs;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Document printed as JSON
    Json(Value),
    /// Files written by an export
    Saved(Vec<PathBuf>),
    /// Plain status line
    Message(String),
}

impl Output {
    fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Output::Json(serde_json::to_value(value)?))
    }

    /// Lines for standard output
    pub fn render(&self, compact: bool) -> Result<String> {
        match self {
            Output::Json(value) if compact => Ok(serde_json::to_string(value)?),
            Output::Json(value) => Ok(serde_json::to_string_pretty(value)?),
            Output::Saved(paths) => Ok(paths
                .iter()
                .map(|p| format!("Saved to: {}", p.display()))
                .collect::<Vec<_>>()
                .join("\n")),
            Output::Message(text) => Ok(text.clone()),
        }
    }
}

/// Options of `runs metrics`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    /// Comma-separated metric keys
    pub keys: String,
    pub x_axis: String,
    pub sample: Option<i64>,
    pub chunk_size: usize,
    /// Base directory; the run id is appended
    pub output: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            keys: String::new(),
            x_axis: "step".into(),
            sample: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            output: None,
        }
    }
}

/// One CLI invocation
pub struct Session<'a> {
    api: &'a dyn SwanLabApi,
    resolver: PathResolver<'a>,
    cache_dir: PathBuf,
}

impl<'a> Session<'a> {
    pub fn new(api: &'a dyn SwanLabApi, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            api,
            resolver: PathResolver::new(api),
            cache_dir: cache_dir.into(),
        }
    }

    // workspaces

    pub fn workspaces_list(&self, username: Option<&str>) -> Result<Output> {
        let list = WorkspaceResource::new(self.api, &self.resolver).list(username)?;
        Output::json(&list)
    }

    pub fn workspaces_get(&self, username: Option<&str>) -> Result<Output> {
        let ws = WorkspaceResource::new(self.api, &self.resolver).get(username)?;
        Output::json(&ws)
    }

    pub fn workspaces_projects(&self, username: Option<&str>) -> Result<Output> {
        let projects = WorkspaceResource::new(self.api, &self.resolver).projects(username)?;
        Output::json(&projects)
    }

    // projects

    /// Projects of `username`, defaulting to the personal workspace
    pub fn projects_list(
        &self,
        username: Option<&str>,
        sort: Option<&str>,
        search: Option<&str>,
        detail: bool,
    ) -> Result<Output> {
        let username = match username.map(str::trim).filter(|u| !u.is_empty()) {
            Some(u) => u.to_string(),
            None => self.resolver.personal_workspace()?.to_string(),
        };
        let projects = ProjectResource::new(self.api).list(Some(&username), sort, search, detail)?;
        Output::json(&projects)
    }

    pub fn projects_get(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_project(path)?;
        Output::json(&ProjectResource::new(self.api).get(&path)?)
    }

    /// Runs of a project; `filters` are `key=value` pairs
    pub fn projects_runs(&self, path: &str, filters: &[String]) -> Result<Output> {
        let filters = parse_filter_pairs(filters)?;
        let path = self.resolver.resolve_project(path)?;
        Output::json(&ProjectResource::new(self.api).list_runs(&path, filters.as_ref())?)
    }

    // runs

    pub fn runs_list(&self, path: &str, filters: &[String]) -> Result<Output> {
        self.projects_runs(path, filters)
    }

    pub fn runs_get(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_run(path)?;
        Output::json(&RunResource::new(self.api).get(&path)?)
    }

    pub fn runs_config(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_run(path)?;
        Output::json(&RunResource::new(self.api).config(&path)?)
    }

    pub fn runs_metadata(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_run(path)?;
        Output::json(&RunResource::new(self.api).metadata(&path)?)
    }

    pub fn runs_requirements(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_run(path)?;
        Output::json(&RunResource::new(self.api).requirements(&path)?)
    }

    pub fn runs_metric_keys(&self, path: &str) -> Result<Output> {
        let path = self.resolver.resolve_run(path)?;
        Output::json(&MetricResource::new(self.api).list_keys(&path)?)
    }

    /// Export metric series of a run as chunked JSON files
    ///
    /// Files land in `<output or cache dir>/<run id>`.
    pub fn runs_metrics(&self, path: &str, options: &ExportOptions) -> Result<Output> {
        if options.chunk_size == 0 {
            return Err(SwanError::InvalidArgument("`chunk_size` must be greater than 0.".into()));
        }
        let path = self.resolver.resolve_run(path)?;
        let query = MetricQuery {
            keys: options.keys.split(',').map(str::to_string).collect(),
            x_axis: options.x_axis.clone(),
            sample: options.sample,
        };
        let frame = MetricResource::new(self.api).frame(&path, &query)?;
        if frame.is_empty() {
            return Ok(Output::Message("No metrics data found.".into()));
        }

        let series = reshape(&frame);
        if series.is_empty() {
            return Ok(Output::Message("No metric keys found in data.".into()));
        }

        let dir = self.export_dir(&path, options.output.as_deref());
        let saved = export_series(&series, &dir, options.chunk_size)?;
        info!("exported {} file(s) for {}", saved.len(), path);
        Ok(Output::Saved(saved))
    }

    fn export_dir(&self, run_path: &str, output: Option<&Path>) -> PathBuf {
        let run_id = run_path.rsplit('/').next().unwrap_or(run_path);
        output.unwrap_or(&self.cache_dir).join(run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture::FixtureApi;
    use serde_json::json;

    #[test]
    fn test_render_modes() {
        let out = Output::Json(json!({"a": [1, 2]}));
        assert_eq!(out.render(true).unwrap(), r#"{"a":[1,2]}"#);
        assert!(out.render(false).unwrap().contains("\n"));
        let saved = Output::Saved(vec![
            PathBuf::from("x/loss-0.json"),
            PathBuf::from("x/loss-1.json"),
        ]);
        assert_eq!(
            saved.render(false).unwrap(),
            "Saved to: x/loss-0.json\nSaved to: x/loss-1.json"
        );
    }

    #[test]
    fn test_shorthand_run_get() {
        let api = FixtureApi::sample();
        let session = Session::new(&api, ".cache");
        let Output::Json(run) = session.runs_get("mnist/r1").unwrap() else {
            panic!("expected json");
        };
        assert_eq!(run["id"], json!("r1"));
        assert_eq!(run["group"], json!([]));
        assert_eq!(api.calls(), vec!["workspaces -", "run alice/mnist/r1"]);
    }

    #[test]
    fn test_single_segment_run_is_rejected() {
        let api = FixtureApi::sample();
        let err = Session::new(&api, ".cache").runs_get("r1").unwrap_err();
        assert!(matches!(err, SwanError::InvalidPath(_)));
    }

    #[test]
    fn test_filter_pairs() {
        let api = FixtureApi::sample();
        let session = Session::new(&api, ".cache");
        let Output::Json(runs) = session
            .projects_runs("alice/mnist", &["state=FINISHED".to_string()])
            .unwrap()
        else {
            panic!("expected json");
        };
        assert_eq!(runs.as_array().map(Vec::len), Some(1));
        let err = session.projects_runs("alice/mnist", &["state".to_string()]).unwrap_err();
        assert!(matches!(err, SwanError::InvalidFilter(_)));
    }

    #[test]
    fn test_projects_list_defaults_to_personal() {
        let api = FixtureApi::sample();
        let session = Session::new(&api, ".cache");
        let Output::Json(list) = session.projects_list(None, None, None, true).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(list[0]["path"], json!("alice/mnist"));
        assert_eq!(api.calls(), vec!["workspaces -", "projects alice"]);
    }

    #[test]
    fn test_metrics_export() {
        let api = FixtureApi::sample();
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(&api, dir.path().join("unused"));
        let options = ExportOptions {
            keys: "loss, ".into(),
            output: Some(dir.path().to_path_buf()),
            ..ExportOptions::default()
        };
        let Output::Saved(files) = session.runs_metrics("alice/mnist/r1", &options).unwrap() else {
            panic!("expected saved files");
        };
        assert_eq!(files, vec![dir.path().join("r1").join("loss-0.json")]);

        let text = std::fs::read_to_string(&files[0]).unwrap();
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            body,
            json!({"metrics": [
                {"index": 0, "data": 1.0, "timestamp": 100},
                {"index": 2, "data": 0.5, "timestamp": 102}
            ]})
        );
    }

    #[test]
    fn test_metrics_export_uses_cache_dir() {
        let api = FixtureApi::sample();
        let dir = tempfile::tempdir().unwrap();
        let session = Session::new(&api, dir.path());
        let options = ExportOptions {
            keys: "loss".into(),
            chunk_size: 1,
            ..ExportOptions::default()
        };
        let Output::Saved(files) = session.runs_metrics("mnist/r1", &options).unwrap() else {
            panic!("expected saved files");
        };
        assert_eq!(files.len(), 2);
        assert!(files[1].ends_with("r1/loss-1.json"));
    }

    #[test]
    fn test_metrics_without_keys_writes_nothing() {
        let api = FixtureApi::sample();
        let dir = tempfile::tempdir().unwrap();
        let out = Session::new(&api, dir.path())
            .runs_metrics("alice/mnist/r1", &ExportOptions::default())
            .unwrap();
        assert_eq!(out, Output::Message("No metrics data found.".into()));
        assert_eq!(api.count("metrics"), 0);
    }

    #[test]
    fn test_zero_chunk_size() {
        let api = FixtureApi::sample();
        let options = ExportOptions {
            keys: "loss".into(),
            chunk_size: 0,
            ..ExportOptions::default()
        };
        let err = Session::new(&api, ".cache")
            .runs_metrics("alice/mnist/r1", &options)
            .unwrap_err();
        assert!(matches!(err, SwanError::InvalidArgument(_)));
    }
}
