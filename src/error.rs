// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Error types for the SwanLab access layers

use std::io;
use thiserror::Error;

/// Result type alias for SwanLab operations
pub type Result<T> = std::result::Result<T, SwanError>;

/// Main error type for the SwanLab client, CLI and tool server
#[derive(Error, Debug)]
pub enum SwanError {
    /// Missing or malformed configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource path does not match its canonical format
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Run filter key or value rejected
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Invalid argument (sort option, sample size, x axis, chunk size)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The account has no workspace to default to
    #[error("No workspace found for the current account")]
    NoWorkspaceFound,

    /// Remote object could not be turned into a record
    #[error("Unsupported shape: {0}")]
    UnsupportedShape(String),

    /// Remote service answered with a non-success status
    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure of a resource operation, with the operation and path it concerned
    #[error("{context}: {source}")]
    Tool {
        context: String,
        #[source]
        source: Box<SwanError>,
    },
}

impl SwanError {
    /// Wrap an error with a description of the failed operation
    pub fn context(self, context: impl Into<String>) -> Self {
        SwanError::Tool {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping any `Tool` wrappers
    pub fn root_cause(&self) -> &SwanError {
        match self {
            SwanError::Tool { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Attach operation context to a fallible result
pub trait ResultExt<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}
