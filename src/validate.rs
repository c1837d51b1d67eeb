// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Input validation for resource paths, run filters and query options
//!
//! Paths are slash-delimited: `username`, `username/project` or
//! `username/project/run`. Every segment must be non-empty and free of
//! whitespace. Validation trims surrounding whitespace and otherwise returns
//! the input unchanged.

use crate::error::{Result, SwanError};
use serde_json::{Map, Value};

/// Supported run states
pub const RUN_STATES: [&str; 4] = ["ABORTED", "CRASHED", "FINISHED", "RUNNING"];

/// Supported project sort keys
pub const PROJECT_SORTS: [&str; 2] = ["created_at", "updated_at"];

/// Prefix for config-based run filters
pub const CONFIG_FILTER_PREFIX: &str = "config.";

/// Resource kind addressed by a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Workspace,
    Project,
    Run,
}

impl PathKind {
    /// Number of segments in the canonical form
    pub fn segments(self) -> usize {
        match self {
            PathKind::Workspace => 1,
            PathKind::Project => 2,
            PathKind::Run => 3,
        }
    }

    fn format_hint(self) -> &'static str {
        match self {
            PathKind::Workspace => "username",
            PathKind::Project => "username/project_name",
            PathKind::Run => "username/project_name/experiment_id",
        }
    }
}

fn is_segment(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

fn matches_segments(path: &str, count: usize) -> bool {
    let parts: Vec<&str> = path.split('/').collect();
    parts.len() == count && parts.iter().all(|p| is_segment(p))
}

/// Validate a path of the given kind, returning its canonical form
pub fn validate_path(path: &str, kind: PathKind) -> Result<String> {
    match kind {
        PathKind::Workspace => ensure_username(path),
        PathKind::Project => ensure_project_path(path),
        PathKind::Run => ensure_run_path(path),
    }
}

/// Validate a workspace username
pub fn ensure_username(username: &str) -> Result<String> {
    let normalized = username.trim();
    if normalized.is_empty() {
        return Err(SwanError::InvalidPath("`username` cannot be empty.".into()));
    }
    if normalized.contains('/') {
        return Err(SwanError::InvalidPath("`username` must not contain '/'.".into()));
    }
    Ok(normalized.to_string())
}

/// Validate an optional username; blank input means "no username"
pub fn ensure_optional_username(username: Option<&str>) -> Result<Option<String>> {
    match username {
        Some(u) if !u.trim().is_empty() => ensure_username(u).map(Some),
        _ => Ok(None),
    }
}

/// Validate a project path: `username/project_name`
pub fn ensure_project_path(path: &str) -> Result<String> {
    let normalized = path.trim();
    if !matches_segments(normalized, PathKind::Project.segments()) {
        return Err(SwanError::InvalidPath(format!(
            "`path` must follow '{}'.",
            PathKind::Project.format_hint()
        )));
    }
    Ok(normalized.to_string())
}

/// Validate a run path: `username/project_name/experiment_id`
pub fn ensure_run_path(path: &str) -> Result<String> {
    let normalized = path.trim();
    if !matches_segments(normalized, PathKind::Run.segments()) {
        return Err(SwanError::InvalidPath(format!(
            "`path` must follow '{}'.",
            PathKind::Run.format_hint()
        )));
    }
    Ok(normalized.to_string())
}

/// Validate a project sort option
pub fn ensure_project_sort(sort: Option<&str>) -> Result<Option<String>> {
    let Some(sort) = sort else {
        return Ok(None);
    };
    let normalized = sort.trim();
    if !PROJECT_SORTS.contains(&normalized) {
        return Err(SwanError::InvalidArgument(format!(
            "`sort` must be one of: {}.",
            PROJECT_SORTS.join(", ")
        )));
    }
    Ok(Some(normalized.to_string()))
}

/// Validate run filters
///
/// Accepts `state` (one of [`RUN_STATES`]) and `config.<name>` keys. The
/// result is all-or-nothing: one unsupported key rejects the whole mapping.
pub fn ensure_run_filters(
    filters: Option<&Map<String, Value>>,
) -> Result<Option<Map<String, Value>>> {
    let Some(filters) = filters else {
        return Ok(None);
    };

    let mut validated = Map::new();
    for (key, value) in filters {
        if key == "state" {
            let ok = value.as_str().map(|s| RUN_STATES.contains(&s)).unwrap_or(false);
            if !ok {
                return Err(SwanError::InvalidFilter(format!(
                    "`filters.state` must be one of: {}.",
                    RUN_STATES.join(", ")
                )));
            }
            validated.insert(key.clone(), value.clone());
            continue;
        }
        if key.len() > CONFIG_FILTER_PREFIX.len() && key.starts_with(CONFIG_FILTER_PREFIX) {
            validated.insert(key.clone(), value.clone());
            continue;
        }
        return Err(SwanError::InvalidFilter(
            "`filters` only supports `state` and `config.<name>` keys.".into(),
        ));
    }
    Ok(Some(validated))
}

/// Parse `key=value` pairs from the command line into a filter mapping
///
/// Returns `None` when no pairs were given. Values are kept as strings.
pub fn parse_filter_pairs(pairs: &[String]) -> Result<Option<Map<String, Value>>> {
    if pairs.is_empty() {
        return Ok(None);
    }
    let mut map = Map::new();
    for pair in pairs {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            SwanError::InvalidFilter(format!("`{}` is not a key=value pair.", pair))
        })?;
        map.insert(key.trim().to_string(), Value::String(value.to_string()));
    }
    Ok(Some(map))
}

/// Validate the x-axis of a metrics query
pub fn ensure_x_axis(x_axis: &str) -> Result<String> {
    let normalized = x_axis.trim();
    if normalized.is_empty() {
        return Err(SwanError::InvalidArgument("`x_axis` cannot be empty.".into()));
    }
    Ok(normalized.to_string())
}

/// Validate an optional sample size
pub fn ensure_sample(sample: Option<i64>) -> Result<Option<u64>> {
    match sample {
        None => Ok(None),
        Some(n) if n > 0 => Ok(Some(n as u64)),
        Some(_) => Err(SwanError::InvalidArgument("`sample` must be greater than 0.".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_project_path_accepts_and_trims() {
        assert_eq!(ensure_project_path("alice/mnist").unwrap(), "alice/mnist");
        assert_eq!(ensure_project_path("  alice/mnist \n").unwrap(), "alice/mnist");
    }

    #[test]
    fn test_project_path_rejects_malformed() {
        for bad in ["alice", "alice/", "/mnist", "alice/mn ist", "a/b/c", "", "  ", "a//b"] {
            assert!(ensure_project_path(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_run_path_segments() {
        assert_eq!(ensure_run_path("alice/mnist/abc123").unwrap(), "alice/mnist/abc123");
        for bad in ["alice/mnist", "a/b/c/d", "a/b/", "a/ b/c", "a/b/c\td"] {
            assert!(ensure_run_path(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_validate_path_dispatch() {
        assert_eq!(validate_path(" bob ", PathKind::Workspace).unwrap(), "bob");
        assert!(validate_path("bob/x", PathKind::Workspace).is_err());
        assert!(validate_path("bob/x", PathKind::Project).is_ok());
        assert!(validate_path("bob/x", PathKind::Run).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert!(matches!(ensure_username("   "), Err(SwanError::InvalidPath(_))));
        assert!(ensure_username("a/b").is_err());
        assert_eq!(ensure_optional_username(None).unwrap(), None);
        assert_eq!(ensure_optional_username(Some("  ")).unwrap(), None);
        assert_eq!(ensure_optional_username(Some(" team ")).unwrap(), Some("team".into()));
    }

    #[test]
    fn test_filters_all_or_nothing() {
        let ok = obj(json!({"state": "FINISHED", "config.lr": "0.1"}));
        assert_eq!(ensure_run_filters(Some(&ok)).unwrap(), Some(ok.clone()));

        let bad_state = obj(json!({"state": "BOGUS"}));
        assert!(matches!(ensure_run_filters(Some(&bad_state)), Err(SwanError::InvalidFilter(_))));

        let unsupported = obj(json!({"state": "RUNNING", "unsupported": "x"}));
        assert!(ensure_run_filters(Some(&unsupported)).is_err());

        let empty_config = obj(json!({"config.": "x"}));
        assert!(ensure_run_filters(Some(&empty_config)).is_err());

        assert_eq!(ensure_run_filters(None).unwrap(), None);
    }

    #[test]
    fn test_state_filter_must_be_string() {
        let f = obj(json!({"state": 1}));
        assert!(ensure_run_filters(Some(&f)).is_err());
    }

    #[test]
    fn test_parse_filter_pairs() {
        assert_eq!(parse_filter_pairs(&[]).unwrap(), None);
        let parsed = parse_filter_pairs(&["state=FINISHED".into(), "config.lr=a=b".into()])
            .unwrap()
            .unwrap();
        assert_eq!(parsed.get("state"), Some(&json!("FINISHED")));
        assert_eq!(parsed.get("config.lr"), Some(&json!("a=b")));
        assert!(parse_filter_pairs(&["state".into()]).is_err());
    }

    #[test]
    fn test_sort_and_sample() {
        assert_eq!(ensure_project_sort(Some(" created_at ")).unwrap(), Some("created_at".into()));
        assert!(ensure_project_sort(Some("name")).is_err());
        assert_eq!(ensure_project_sort(None).unwrap(), None);

        assert_eq!(ensure_sample(Some(5)).unwrap(), Some(5));
        assert_eq!(ensure_sample(None).unwrap(), None);
        assert!(ensure_sample(Some(0)).is_err());
        assert!(ensure_sample(Some(-3)).is_err());
    }

    #[test]
    fn test_x_axis() {
        assert_eq!(ensure_x_axis(" step ").unwrap(), "step");
        assert!(ensure_x_axis("  ").is_err());
    }
}
