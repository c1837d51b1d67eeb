// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Metrics reshaping and export
//!
//! The metrics endpoint answers with a table: one row per step, one column per
//! requested key, plus an index column and optional `<key>_timestamp`
//! companions. Export pivots that table into one ordered series per key and
//! writes each series in fixed-size pages:
//!
//! ```text
//! <dir>/<sanitized-key>-<chunk>.json   {"metrics": [{"index", "data", "timestamp"}, ...]}
//! ```
//!
//! # Examples
//!
//! ```
//! use swanlib::metrics::{reshape, MetricFrame};
//! use serde_json::json;
//!
//! let frame = MetricFrame::from_value(&json!({
//!     "columns": ["step", "loss"],
//!     "rows": [{"step": 0, "loss": 0.5}, {"step": 1, "loss": 0.25}]
//! })).unwrap();
//! let series = reshape(&frame);
//! assert_eq!(series[0].key, "loss");
//! assert_eq!(series[0].points.len(), 2);
//! ```

use crate::error::{Result, SwanError};
use crate::normalize::Record;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Default number of points per exported file
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Candidate index columns, in priority order
pub const INDEX_COLUMNS: [&str; 3] = ["step", "index", "_step"];

/// Suffix of timestamp companion columns
pub const TIMESTAMP_SUFFIX: &str = "_timestamp";

/// Tabular metrics response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl MetricFrame {
    /// Build a frame from a remote payload
    ///
    /// Accepts record orientation (`{"columns", "rows": [{..}]}`), split
    /// orientation (`{"columns", "data": [[..]]}`) and a bare list of records.
    /// When `columns` is missing it is derived from the first appearance of
    /// each key across the rows.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Array(rows) => Self::from_records(None, rows),
            Value::Object(obj) => {
                let columns = match obj.get("columns") {
                    Some(Value::Array(cols)) => Some(
                        cols.iter()
                            .map(|c| match c {
                                Value::String(s) => s.clone(),
                                other => other.to_string(),
                            })
                            .collect::<Vec<_>>(),
                    ),
                    Some(Value::Null) | None => None,
                    Some(_) => {
                        return Err(SwanError::UnsupportedShape(
                            "metric `columns` must be a list".into(),
                        ))
                    }
                };
                match (obj.get("rows"), obj.get("data"), columns) {
                    (Some(Value::Array(rows)), _, cols) => Self::from_records(cols, rows),
                    (_, Some(Value::Array(data)), Some(cols)) => Self::from_split(cols, data),
                    (None, None, cols) => Ok(Self {
                        columns: cols.unwrap_or_default(),
                        rows: Vec::new(),
                    }),
                    _ => Err(SwanError::UnsupportedShape(
                        "metric payload must hold `rows` or `columns` + `data`".into(),
                    )),
                }
            }
            Value::Null => Ok(Self::default()),
            _ => Err(SwanError::UnsupportedShape(
                "metric payload must be a table".into(),
            )),
        }
    }

    fn from_records(columns: Option<Vec<String>>, rows: &[Value]) -> Result<Self> {
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                Value::Object(map) => records.push(map.clone()),
                _ => {
                    return Err(SwanError::UnsupportedShape(
                        "metric rows must be records".into(),
                    ))
                }
            }
        }
        let columns = columns.unwrap_or_else(|| {
            let mut cols: Vec<String> = Vec::new();
            for r in &records {
                for k in r.keys() {
                    if !cols.contains(k) {
                        cols.push(k.clone());
                    }
                }
            }
            cols
        });
        Ok(Self { columns, rows: records })
    }

    fn from_split(columns: Vec<String>, data: &[Value]) -> Result<Self> {
        let mut rows = Vec::with_capacity(data.len());
        for line in data {
            let Value::Array(cells) = line else {
                return Err(SwanError::UnsupportedShape(
                    "split metric data must be a list of lists".into(),
                ));
            };
            let row: Record = columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect();
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One exported observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub index: i64,
    pub data: Value,
    pub timestamp: Option<Value>,
}

/// Ordered observations of one metric key
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub key: String,
    pub points: Vec<MetricPoint>,
}

/// Column roles of a frame
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnLayout {
    pub index: Option<String>,
    /// `(metric key, timestamp column)`
    pub timestamps: Vec<(String, String)>,
    pub keys: Vec<String>,
}

impl ColumnLayout {
    pub fn of(columns: &[String]) -> Self {
        let index = INDEX_COLUMNS
            .iter()
            .find(|c| columns.iter().any(|col| col.as_str() == **c))
            .map(|c| c.to_string());

        let mut timestamps = Vec::new();
        let mut keys = Vec::new();
        for col in columns {
            if INDEX_COLUMNS.contains(&col.as_str()) {
                continue;
            }
            if let Some(base) = col.strip_suffix(TIMESTAMP_SUFFIX) {
                if columns.iter().any(|c| c == base) {
                    timestamps.push((base.to_string(), col.clone()));
                }
                continue;
            }
            keys.push(col.clone());
        }
        Self { index, timestamps, keys }
    }

    fn timestamp_for(&self, key: &str) -> Option<&str> {
        self.timestamps
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, col)| col.as_str())
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("nan"),
        Some(Value::Number(n)) => n.as_f64().map(f64::is_nan).unwrap_or(false),
        _ => false,
    }
}

fn coerce_data(value: &Value) -> Value {
    match value {
        Value::Number(n) => n.as_f64().map(|f| json!(f)).unwrap_or_else(|| value.clone()),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => json!(f),
            _ => value.clone(),
        },
        other => other.clone(),
    }
}

fn coerce_index(value: Option<&Value>, position: usize) -> i64 {
    if is_missing(value) {
        return position as i64;
    }
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(position as i64),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .unwrap_or(position as i64),
        _ => position as i64,
    }
}

/// Pivot a frame into one series per metric key, in column order
///
/// Rows with missing data are skipped; keys left without points are dropped.
pub fn reshape(frame: &MetricFrame) -> Vec<MetricSeries> {
    let layout = ColumnLayout::of(&frame.columns);
    let mut out = Vec::new();

    for key in &layout.keys {
        let ts_col = layout.timestamp_for(key);
        let mut points = Vec::new();
        for (position, row) in frame.rows.iter().enumerate() {
            let data = match row.get(key.as_str()) {
                Some(v) if !is_missing(Some(v)) => v,
                _ => continue,
            };
            let index = coerce_index(layout.index.as_deref().and_then(|c| row.get(c)), position);
            let timestamp = ts_col
                .and_then(|c| row.get(c))
                .filter(|v| !is_missing(Some(v)))
                .cloned();
            points.push(MetricPoint {
                index,
                data: coerce_data(data),
                timestamp,
            });
        }
        if points.is_empty() {
            debug!("metric '{}' has no data, skipping", key);
            continue;
        }
        out.push(MetricSeries {
            key: key.clone(),
            points,
        });
    }
    out
}

/// Split a series into pages of at most `chunk_size` points
pub fn chunk_points(points: &[MetricPoint], chunk_size: usize) -> Result<Vec<&[MetricPoint]>> {
    if chunk_size == 0 {
        return Err(SwanError::InvalidArgument(
            "`chunk_size` must be greater than 0.".into(),
        ));
    }
    Ok(points.chunks(chunk_size).collect())
}

/// Replace path separators so the key is usable as a file name
pub fn sanitize_key(key: &str) -> String {
    key.replace(['/', '\\'], "_")
}

/// File name of one chunk
pub fn chunk_file_name(key: &str, chunk: usize) -> String {
    format!("{}-{}.json", sanitize_key(key), chunk)
}

#[derive(Serialize)]
struct ChunkBody<'a> {
    metrics: &'a [MetricPoint],
}

/// Write every series into `dir`, returning the written paths in order
///
/// Files are written one by one; a failure part-way leaves the files already
/// written in place.
pub fn export_series(
    series: &[MetricSeries],
    dir: &Path,
    chunk_size: usize,
) -> Result<Vec<PathBuf>> {
    if chunk_size == 0 {
        return Err(SwanError::InvalidArgument(
            "`chunk_size` must be greater than 0.".into(),
        ));
    }
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for s in series {
        for (n, chunk) in chunk_points(&s.points, chunk_size)?.into_iter().enumerate() {
            let path = dir.join(chunk_file_name(&s.key, n));
            let body = serde_json::to_string_pretty(&ChunkBody { metrics: chunk })?;
            std::fs::write(&path, body)?;
            info!("saved {} points of '{}' to {}", chunk.len(), s.key, path.display());
            written.push(path);
        }
    }
    Ok(written)
}
