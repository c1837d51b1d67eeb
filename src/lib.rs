// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! # swanlib
//!
//! Access layers for the SwanLab experiment-tracking service: a command-line
//! client and a Model Context Protocol tool server over one shared library.
//!
//! ## Layout
//!
//! - [`validate`], [`resolve`]: resource path and filter checks, shorthand completion
//! - [`normalize`], [`models`]: remote objects to stable records and models
//! - [`api`]: the [`SwanLabApi`] seam and its HTTP implementation
//! - [`resources`]: workspace, project, run and metric operations
//! - [`metrics`]: metric table reshaping and chunked export
//! - [`commands`]: handlers behind the `swanlab` binary
//! - [`mcp`]: tool registry, manifests and the stdio server behind `swanlab-mcp`
//! - [`config`], [`netrc`]: configuration and credentials
//!
//! ## Example
//!
//! ```no_run
//! use swanlib::{HttpApi, RunResource, SwanConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SwanConfig::load()?;
//! let api = HttpApi::new(&config)?;
//! let run = RunResource::new(&api).get("alice/mnist/abc123")?;
//! println!("{} is {}", run.name, run.state);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;
pub mod metrics;
pub mod models;
pub mod netrc;
pub mod normalize;
pub mod resolve;
pub mod resources;
pub mod validate;

pub use api::{HttpApi, ProjectQuery, SwanLabApi};
pub use config::SwanConfig;
pub use error::{Result, SwanError};
pub use models::{
    MetricKey, MetricKeyList, MetricTable, Project, Run, RunProfile, RunState, Workspace,
};
pub use resolve::PathResolver;
pub use resources::{MetricQuery, MetricResource, ProjectResource, RunResource, WorkspaceResource};
