// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Metric operations

use crate::api::SwanLabApi;
use crate::error::{Result, ResultExt};
use crate::metrics::MetricFrame;
use crate::models::{MetricKey, MetricKeyList, MetricTable};
use crate::normalize::to_record_list;
use crate::validate::{ensure_run_path, ensure_sample, ensure_x_axis};
use log::debug;

/// Row cap sent to the service when a table query gives no `sample`
pub const DEFAULT_SAMPLE_CAP: u64 = 1000;

/// Options of a metrics query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricQuery {
    /// Metric names, e.g. `["loss", "acc"]`
    pub keys: Vec<String>,
    /// `step` or a metric name
    pub x_axis: String,
    /// Row limit; must be positive when given
    pub sample: Option<i64>,
}

impl Default for MetricQuery {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            x_axis: MetricTable::DEFAULT_X_AXIS.into(),
            sample: None,
        }
    }
}

impl MetricQuery {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Trimmed, non-empty keys
    fn clean_keys(&self) -> Vec<String> {
        self.keys
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub struct MetricResource<'a> {
    api: &'a dyn SwanLabApi,
}

impl<'a> MetricResource<'a> {
    pub fn new(api: &'a dyn SwanLabApi) -> Self {
        Self { api }
    }

    /// Metric keys recorded by a run, with their type and class
    pub fn list_keys(&self, path: &str) -> Result<MetricKeyList> {
        self.fetch_keys(path)
            .with_context(|| format!("Failed to list metric keys for run '{}'", path))
    }

    /// Metric rows of a run
    ///
    /// Without keys the result is an empty table and the service is not
    /// called. Without `sample` the query is capped at [`DEFAULT_SAMPLE_CAP`]
    /// rows and the table reports `sample: null`.
    pub fn get_run_metrics(&self, path: &str, query: &MetricQuery) -> Result<MetricTable> {
        self.fetch_table(path, query)
            .with_context(|| format!("Failed to get metrics for run '{}'", path))
    }

    /// Uncapped metric frame for export
    pub fn frame(&self, path: &str, query: &MetricQuery) -> Result<MetricFrame> {
        self.fetch_frame(path, query, None)
            .with_context(|| format!("Failed to get metrics for run '{}'", path))
    }

    fn fetch_keys(&self, path: &str) -> Result<MetricKeyList> {
        let path = ensure_run_path(path)?;
        let keys: Vec<MetricKey> = to_record_list(self.api.metric_columns(&path)?)?
            .iter()
            .map(MetricKey::from_record)
            .collect();
        Ok(MetricKeyList {
            total: keys.len(),
            path,
            keys,
        })
    }

    fn fetch_table(&self, path: &str, query: &MetricQuery) -> Result<MetricTable> {
        let normalized = ensure_run_path(path)?;
        let x_axis = ensure_x_axis(&query.x_axis)?;
        let sample = ensure_sample(query.sample)?;
        let keys = query.clean_keys();
        if keys.is_empty() {
            return Ok(MetricTable::empty(normalized, x_axis, sample));
        }

        let frame = self.fetch_frame(&normalized, query, Some(DEFAULT_SAMPLE_CAP))?;
        Ok(MetricTable {
            path: normalized,
            keys,
            x_axis,
            sample,
            total: frame.rows.len(),
            columns: frame.columns,
            rows: frame.rows,
        })
    }

    fn fetch_frame(
        &self,
        path: &str,
        query: &MetricQuery,
        cap: Option<u64>,
    ) -> Result<MetricFrame> {
        let path = ensure_run_path(path)?;
        let x_axis = ensure_x_axis(&query.x_axis)?;
        let sample = ensure_sample(query.sample)?.or(cap);
        let keys = query.clean_keys();
        if keys.is_empty() {
            return Ok(MetricFrame::default());
        }
        debug!("querying {} metric key(s) of {} by {}", keys.len(), path, x_axis);
        let payload = self.api.metrics(&path, &keys, &x_axis, sample)?;
        MetricFrame::from_value(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture::FixtureApi;
    use crate::error::SwanError;
    use serde_json::json;

    #[test]
    fn test_list_keys() {
        let api = FixtureApi::sample();
        let list = MetricResource::new(&api).list_keys("alice/mnist/r1").unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.keys[1].key, "train/acc");
        assert_eq!(list.keys[1].error, None);
        assert_eq!(list.path, "alice/mnist/r1");
    }

    #[test]
    fn test_empty_keys_skip_remote() {
        let api = FixtureApi::sample();
        let table = MetricResource::new(&api)
            .get_run_metrics("alice/mnist/r1", &MetricQuery::new([" "]))
            .unwrap();
        assert_eq!(table.total, 0);
        assert!(table.keys.is_empty());
        assert_eq!(table.x_axis, "step");
        assert_eq!(api.count("metrics"), 0);
    }

    #[test]
    fn test_default_sample_cap() {
        let api = FixtureApi::sample();
        let table = MetricResource::new(&api)
            .get_run_metrics("alice/mnist/r1", &MetricQuery::new(["loss"]))
            .unwrap();
        assert_eq!(table.sample, None);
        assert_eq!(table.total, 3);
        assert_eq!(table.columns, vec!["step", "loss", "loss_timestamp"]);
        assert_eq!(table.rows[2].get("loss"), Some(&json!(0.5)));
        assert_eq!(api.calls(), vec!["metrics alice/mnist/r1 keys=loss x_axis=step sample=1000"]);
    }

    #[test]
    fn test_explicit_sample_and_x_axis() {
        let api = FixtureApi::sample();
        let query = MetricQuery {
            x_axis: " loss ".into(),
            sample: Some(10),
            ..MetricQuery::new(["acc"])
        };
        let table = MetricResource::new(&api).get_run_metrics("alice/mnist/r1", &query).unwrap();
        assert_eq!(table.sample, Some(10));
        assert_eq!(table.x_axis, "loss");
        assert_eq!(api.calls(), vec!["metrics alice/mnist/r1 keys=acc x_axis=loss sample=10"]);
    }

    #[test]
    fn test_invalid_query_options() {
        let api = FixtureApi::sample();
        let metrics = MetricResource::new(&api);
        let bad_sample = MetricQuery {
            sample: Some(0),
            ..MetricQuery::new(["loss"])
        };
        let err = metrics.get_run_metrics("alice/mnist/r1", &bad_sample).unwrap_err();
        assert!(matches!(err.root_cause(), SwanError::InvalidArgument(_)));

        let bad_axis = MetricQuery {
            x_axis: "  ".into(),
            ..MetricQuery::new(["loss"])
        };
        assert!(metrics.get_run_metrics("alice/mnist/r1", &bad_axis).is_err());
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_frame_is_uncapped() {
        let api = FixtureApi::sample();
        let frame = MetricResource::new(&api)
            .frame("alice/mnist/r1", &MetricQuery::new(["loss"]))
            .unwrap();
        assert_eq!(frame.rows.len(), 3);
        assert_eq!(api.calls(), vec!["metrics alice/mnist/r1 keys=loss x_axis=step sample=-"]);
    }
}
