// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Project operations

use super::RunResource;
use crate::api::{ProjectQuery, SwanLabApi};
use crate::error::{Result, ResultExt};
use crate::models::{Project, Run};
use crate::normalize::{to_record, to_record_list};
use crate::validate::{ensure_optional_username, ensure_project_path, ensure_project_sort};
use serde_json::{Map, Value};

pub struct ProjectResource<'a> {
    api: &'a dyn SwanLabApi,
}

impl<'a> ProjectResource<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self { api }
    }

    /// List projects, optionally limited to one workspace
    ///
    /// `sort` is `created_at` or `updated_at`; `search` fuzzy-matches names.
    pub fn list(
        &self,
        path: Option<&str>,
        sort: Option<&str>,
        search: Option<&str>,
        detail: bool,
    ) -> Result<Vec<Project>> {
        self.fetch_list(path, sort, search, detail)
            .with_context(|| "Failed to list projects")
    }

    /// One project by `username/project_name`
    pub fn get(&self, path: &str) -> Result<Project> {
        self.fetch(path)
            .with_context(|| format!("Failed to get project '{}'", path))
    }

    /// Runs of one project
    pub fn list_runs(&self, path: &str, filters: Option<&Map<String, Value>>) -> Result<Vec<Run>> {
        RunResource::new(self.api).list(path, filters)
    }

    fn fetch_list(
        &self,
        path: Option<&str>,
        sort: Option<&str>,
        search: Option<&str>,
        detail: bool,
    ) -> Result<Vec<Project>> {
        let query = ProjectQuery {
            path: ensure_optional_username(path)?,
            sort: ensure_project_sort(sort)?,
            search: search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            detail,
        };
        let items = to_record_list(self.api.projects(&query)?)?;
        Ok(items.iter().map(Project::from_record).collect())
    }

    fn fetch(&self, path: &str) -> Result<Project> {
        let path = ensure_project_path(path)?;
        Ok(Project::from_record(&to_record(self.api.project(&path)?)?))
    }
}
