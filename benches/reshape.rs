// SPDX-License-Identifier: AGPL-3.0-or-later
//! Benchmark for metric table reshaping.
//!
//! Measures parsing a large metrics payload, pivoting it into per-key series
//! and paging the series at the default chunk size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use swanlib::metrics::{chunk_points, reshape, MetricFrame, DEFAULT_CHUNK_SIZE};

const ROWS: usize = 50_000;

fn payload() -> Value {
    let rows: Vec<Value> = (0..ROWS)
        .map(|i| {
            let loss = if i % 97 == 0 { json!("NaN") } else { json!(1.0 / (i as f64 + 1.0)) };
            json!({
                "step": i,
                "loss": loss,
                "loss_timestamp": 1_700_000_000 + i,
                "train/acc": (i % 100) as f64 / 100.0,
            })
        })
        .collect();
    json!({ "columns": ["step", "loss", "loss_timestamp", "train/acc"], "rows": rows })
}

fn bench_parse_frame(c: &mut Criterion) {
    let value = payload();
    c.bench_function("metric_frame_from_value", |b| {
        b.iter(|| {
            let _ = MetricFrame::from_value(black_box(&value));
        });
    });
}

fn bench_reshape(c: &mut Criterion) {
    let Ok(frame) = MetricFrame::from_value(&payload()) else {
        return;
    };
    c.bench_function("reshape", |b| {
        b.iter(|| {
            let series = reshape(black_box(&frame));
            for s in &series {
                let _ = chunk_points(&s.points, DEFAULT_CHUNK_SIZE);
            }
        });
    });
}

criterion_group!(benches, bench_parse_frame, bench_reshape);
criterion_main!(benches);
