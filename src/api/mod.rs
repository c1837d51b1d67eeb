// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Remote SwanLab API
//!
//! [`SwanLabApi`] is the seam between the resource adapters and the service.
//! [`HttpApi`] talks to the REST API with a blocking `reqwest` client. Every
//! object it returns is tagged as a [`RemoteObject`] of the client's
//! [`ObjectFamily`](crate::normalize::ObjectFamily).

pub mod http;

#[cfg(test)]
pub(crate) mod fixture;

pub use http::HttpApi;

use crate::error::Result;
use crate::normalize::RemoteObject;
use serde_json::{Map, Value};

/// Query options for listing projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectQuery {
    /// Workspace username; `None` lists across the caller's workspaces
    pub path: Option<String>,
    pub sort: Option<String>,
    pub search: Option<String>,
    /// Include run counts and other detail fields
    pub detail: bool,
}

impl Default for ProjectQuery {
    fn default() -> Self {
        Self {
            path: None,
            sort: None,
            search: None,
            detail: true,
        }
    }
}

/// Read access to the SwanLab service
///
/// Paths handed to implementations are already validated and canonical.
pub trait SwanLabApi {
    /// Workspaces visible to the caller, or those of `username`
    fn workspaces(&self, username: Option<&str>) -> Result<Vec<RemoteObject>>;

    fn workspace(&self, username: &str) -> Result<RemoteObject>;

    fn projects(&self, query: &ProjectQuery) -> Result<Vec<RemoteObject>>;

    /// `username/project_name`
    fn project(&self, path: &str) -> Result<RemoteObject>;

    /// Runs of a project, optionally filtered
    fn runs(
        &self,
        project_path: &str,
        filters: Option<&Map<String, Value>>,
    ) -> Result<Vec<RemoteObject>>;

    /// `username/project_name/experiment_id`
    fn run(&self, path: &str) -> Result<RemoteObject>;

    /// Metric columns recorded by a run
    fn metric_columns(&self, run_path: &str) -> Result<Vec<RemoteObject>>;

    /// Metric table payload for the given keys
    fn metrics(
        &self,
        run_path: &str,
        keys: &[String],
        x_axis: &str,
        sample: Option<u64>,
    ) -> Result<Value>;
}
