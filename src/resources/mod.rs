// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Resource adapters
//!
//! One adapter per resource family. Each operation validates its input, calls
//! the remote API, normalizes the answer into the [`models`](crate::models)
//! schema and wraps any failure with the operation and path it concerned.

pub mod metric;
pub mod project;
pub mod run;
pub mod workspace;

pub use metric::{MetricQuery, MetricResource, DEFAULT_SAMPLE_CAP};
pub use project::ProjectResource;
pub use run::RunResource;
pub use workspace::WorkspaceResource;
