// ABOUTME: Criterion benchmarks for the forecast engine
// ABOUTME: Measures full runs and speed-sample extraction on synthetic events
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Criterion benchmarks for the forecast pipeline.
//!
//! Synthetic events are hourly cumulative series with a slowly accelerating
//! speed; candidates are derived from the same generator.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use cutline_core::config::ForecastConfig;
use cutline_core::models::{EventMeta, HistoricalCandidate, ScorePoint, SeasonalityProfile};
use cutline_intelligence::calendar::WeekendRule;
use cutline_intelligence::speed::speed_samples;
use cutline_intelligence::{ForecastEngine, ForecastInput};

const HOUR_MS: i64 = 3_600_000;
/// Monday 2024-05-06 07:00 UTC
const START_TS: i64 = 1_714_978_800_000;
const EVENT_HOURS: i64 = 190;

fn series(start_ts: i64, hours: i64, per_minute: f64) -> Vec<ScorePoint> {
    (0..=hours)
        .map(|h| {
            let hf = h as f64;
            ScorePoint {
                time_ms: start_ts + h * HOUR_MS,
                score: per_minute * (1.0 + 60.0 * hf * (1.0 + hf / 400.0)),
            }
        })
        .collect()
}

fn candidate(event_id: u32, weeks_back: i64) -> HistoricalCandidate {
    let start_ts = START_TS - weeks_back * 7 * 24 * HOUR_MS;
    let points = series(start_ts, EVENT_HOURS, 80.0 + f64::from(event_id % 7) * 5.0);
    HistoricalCandidate::new(
        event_id,
        1000.0,
        speed_samples(&points, start_ts, 1000.0),
        EVENT_HOURS as f64,
        start_ts,
    )
}

fn input(observed_hours: i64, candidates: usize) -> ForecastInput {
    ForecastInput {
        tier: 1000,
        target: EventMeta {
            event_id: 250,
            start_ts: START_TS,
            end_ts: START_TS + EVENT_HOURS * HOUR_MS,
            event_type: "story".into(),
        },
        observed: series(START_TS, observed_hours, 100.0),
        withheld: Vec::new(),
        target_scale: 1100.0,
        candidates: (0..candidates)
            .map(|i| candidate(249 - i as u32, 2 * (i as i64 + 1)))
            .collect(),
        tz_offset_hours: None,
    }
}

fn engine() -> ForecastEngine {
    ForecastEngine::new(
        ForecastConfig::default(),
        &SeasonalityProfile::empty(),
        Arc::new(WeekendRule),
    )
}

fn bench_engine_run(c: &mut Criterion) {
    let engine = engine();
    let mut group = c.benchmark_group("engine_run");

    for candidates in [0_usize, 3, 5, 8] {
        let input = input(72, candidates);
        group.bench_with_input(
            BenchmarkId::new("candidates", candidates),
            &input,
            |b, input| b.iter(|| engine.run(black_box(input))),
        );
    }
    for observed in [24_i64, 96, 168] {
        let input = input(observed, 5);
        group.bench_with_input(
            BenchmarkId::new("observed_hours", observed),
            &input,
            |b, input| b.iter(|| engine.run(black_box(input))),
        );
    }
    group.finish();
}

fn bench_speed_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("speed_samples");
    for hours in [48_i64, 190, 1000] {
        let points = series(START_TS, hours, 100.0);
        group.throughput(Throughput::Elements(points.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(hours), &points, |b, points| {
            b.iter(|| speed_samples(black_box(points), START_TS, 1000.0));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine_run, bench_speed_samples);
criterion_main!(benches);
