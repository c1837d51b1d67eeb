// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Workspace operations

use crate::api::{ProjectQuery, SwanLabApi};
use crate::error::{Result, ResultExt};
use crate::models::{Project, Workspace};
use crate::normalize::{to_record, to_record_list};
use crate::resolve::PathResolver;
use crate::validate::ensure_optional_username;

pub struct WorkspaceResource<'a> {
    api: &'a dyn SwanLabApi,
    resolver: &'a PathResolver<'a>,
}

impl<'a> WorkspaceResource<'a> {
    pub fn new(api: &'a dyn SwanLabApi, resolver: &'a PathResolver<'a>) -> Self {
        Self { api, resolver }
    }

    /// Workspaces of the caller, or of `username`
    pub fn list(&self, username: Option<&str>) -> Result<Vec<Workspace>> {
        self.fetch_list(username)
            .with_context(|| "Failed to list workspaces")
    }

    /// One workspace; the caller's personal workspace when `username` is absent
    pub fn get(&self, username: Option<&str>) -> Result<Workspace> {
        self.fetch(username)
            .with_context(|| format!("Failed to get workspace '{}'", display_name(username)))
    }

    /// Projects owned by one workspace
    pub fn projects(&self, username: Option<&str>) -> Result<Vec<Project>> {
        self.fetch_projects(username)
            .with_context(|| {
                format!("Failed to list projects of workspace '{}'", display_name(username))
            })
    }

    fn fetch_list(&self, username: Option<&str>) -> Result<Vec<Workspace>> {
        let username = ensure_optional_username(username)?;
        let items = to_record_list(self.api.workspaces(username.as_deref())?)?;
        Ok(items.iter().map(Workspace::from_record).collect())
    }

    fn fetch(&self, username: Option<&str>) -> Result<Workspace> {
        let username = self.username_or_personal(username)?;
        Ok(Workspace::from_record(&to_record(self.api.workspace(&username)?)?))
    }

    fn fetch_projects(&self, username: Option<&str>) -> Result<Vec<Project>> {
        let query = ProjectQuery {
            path: Some(self.username_or_personal(username)?),
            ..ProjectQuery::default()
        };
        let items = to_record_list(self.api.projects(&query)?)?;
        Ok(items.iter().map(Project::from_record).collect())
    }

    fn username_or_personal(&self, username: Option<&str>) -> Result<String> {
        match ensure_optional_username(username)? {
            Some(u) => Ok(u),
            None => Ok(self.resolver.personal_workspace()?.to_string()),
        }
    }
}

fn display_name(username: Option<&str>) -> &str {
    match username.map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => "<current-user>",
    }
}
