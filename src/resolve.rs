// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Shorthand path completion
//!
//! The command line accepts `project` for `username/project` and
//! `project/run` for `username/project/run`, filling in the caller's personal
//! workspace. The workspace is looked up at most once per resolver.

use crate::api::SwanLabApi;
use crate::error::{Result, SwanError};
use crate::models::Workspace;
use crate::normalize::to_record_list;
use crate::validate::{ensure_project_path, ensure_run_path};
use log::debug;
use std::cell::OnceCell;

/// Completes shorthand paths against the caller's personal workspace
pub struct PathResolver<'a> {
    api: &'a dyn SwanLabApi,
    personal: OnceCell<String>,
}

impl<'a> PathResolver<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self {
            api,
            personal: OnceCell::new(),
        }
    }

    /// Username of the personal workspace
    ///
    /// First workspace of type `PERSON`, else the first workspace listed.
    pub fn personal_workspace(&self) -> Result<&str> {
        if let Some(name) = self.personal.get() {
            return Ok(name.as_str());
        }
        let workspaces: Vec<Workspace> = to_record_list(self.api.workspaces(None)?)?
            .iter()
            .map(Workspace::from_record)
            .collect();
        let chosen = workspaces
            .iter()
            .find(|w| w.is_personal())
            .or_else(|| workspaces.first())
            .ok_or(SwanError::NoWorkspaceFound)?;
        debug!("personal workspace resolved to '{}'", chosen.username);
        Ok(self.personal.get_or_init(|| chosen.username.clone()).as_str())
    }

    /// `project` becomes `<personal>/project`; full paths pass through
    pub fn resolve_project(&self, path: &str) -> Result<String> {
        let trimmed = path.trim();
        if trimmed.is_empty() || trimmed.contains('/') {
            return ensure_project_path(trimmed);
        }
        ensure_project_path(&format!("{}/{}", self.personal_workspace()?, trimmed))
    }

    /// `project/run` becomes `<personal>/project/run`; full paths pass through
    pub fn resolve_run(&self, path: &str) -> Result<String> {
        let trimmed = path.trim();
        if trimmed.matches('/').count() != 1 {
            return ensure_run_path(trimmed);
        }
        ensure_run_path(&format!("{}/{}", self.personal_workspace()?, trimmed))
    }
}
