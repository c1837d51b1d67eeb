// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Run (experiment) operations
//!
//! `config`, `metadata` and `requirements` are sections of the run profile.
//! A run without a profile, or a profile without the section, yields an empty
//! value rather than an error.

use crate::api::SwanLabApi;
use crate::error::{Result, ResultExt};
use crate::models::{Run, RunProfile};
use crate::normalize::{to_record, to_record_list, Record};
use crate::validate::{ensure_project_path, ensure_run_filters, ensure_run_path};
use serde_json::{Map, Value};

pub struct RunResource<'a> {
    api: &'a dyn SwanLabApi,
}

impl<'a> RunResource<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self { api }
    }

    /// Runs of the project at `path`, filtered by `state` and `config.<name>`
    pub fn list(&self, path: &str, filters: Option<&Map<String, Value>>) -> Result<Vec<Run>> {
        self.fetch_list(path, filters)
            .with_context(|| format!("Failed to list runs for project '{}'", path))
    }

    pub fn get(&self, path: &str) -> Result<Run> {
        self.fetch(path)
            .with_context(|| format!("Failed to get run '{}'", path))
    }

    /// Hyperparameters of a run
    pub fn config(&self, path: &str) -> Result<Record> {
        self.profile(path)
            .map(|p| p.config)
            .with_context(|| format!("Failed to get config for run '{}'", path))
    }

    /// Environment metadata (python version, hardware, ...)
    pub fn metadata(&self, path: &str) -> Result<Record> {
        self.profile(path)
            .map(|p| p.metadata)
            .with_context(|| format!("Failed to get metadata for run '{}'", path))
    }

    /// Python requirements, one entry per line of the requirements file
    pub fn requirements(&self, path: &str) -> Result<Vec<String>> {
        self.profile(path)
            .map(|p| p.requirements)
            .with_context(|| format!("Failed to get requirements for run '{}'", path))
    }

    fn fetch_list(&self, path: &str, filters: Option<&Map<String, Value>>) -> Result<Vec<Run>> {
        let path = ensure_project_path(path)?;
        let filters = ensure_run_filters(filters)?;
        let items = to_record_list(self.api.runs(&path, filters.as_ref())?)?;
        Ok(items.iter().map(Run::from_record).collect())
    }

    fn fetch(&self, path: &str) -> Result<Run> {
        let path = ensure_run_path(path)?;
        Ok(Run::from_record(&to_record(self.api.run(&path)?)?))
    }

    fn profile(&self, path: &str) -> Result<RunProfile> {
        Ok(self.fetch(path)?.profile.unwrap_or_default())
    }
}
