// ABOUTME: Output formatting helpers for cutline-cli
// ABOUTME: Human-readable forecast summary with diagnostics and warnings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use chrono::{DateTime, FixedOffset};
use cutline::ForecastOutcome;
use cutline_core::models::ForecastReport;

fn local_time(ts_ms: i64, offset_hours: i32) -> String {
    let offset = FixedOffset::east_opt(offset_hours * 3600);
    match (DateTime::from_timestamp_millis(ts_ms), offset) {
        (Some(utc), Some(offset)) => utc
            .with_timezone(&offset)
            .format("%Y-%m-%d %H:%M (UTC%:z)")
            .to_string(),
        _ => ts_ms.to_string(),
    }
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"))
}

/// Display a forecast summary
pub fn display_forecast(outcome: &ForecastOutcome) {
    let report: &ForecastReport = &outcome.report;
    let tz = report.tz_offset_hours;

    println!("\nForecast for event {} (T{})", report.event_id, report.tier);
    println!("{}", "=".repeat(60));
    println!(
        "   Start:          {}",
        local_time(report.corrected_start_ts, tz)
    );
    println!(
        "   Progress:       {:.1}h of {:.1}h",
        report.now_hours, report.total_hours
    );
    println!("   Peak speed:     {:.0} EP/min", report.target_scale);
    println!(
        "   Candidates:     {}",
        if report.candidate_ids.is_empty() {
            "none".to_owned()
        } else {
            report
                .candidate_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
    );

    println!("\nRatio");
    println!("   skeleton:       {}", optional(report.ratio.skeleton_ratio));
    println!("   norm:           {}", optional(report.ratio.norm_ratio));
    println!("   w_norm:         {:.4}", report.ratio.w_norm);
    println!(
        "   applied:        {:.4} (raw {:.4})",
        report.ratio.ratio, report.ratio.raw
    );

    println!("\nCalibration");
    println!(
        "   scale:          {:.4} (raw {:.4})",
        report.calibration.scale, report.calibration.raw_scale
    );
    println!(
        "   24h correction: {} (raw {})",
        optional(report.calibration.correction),
        optional(report.calibration.raw_correction)
    );
    println!("   applied:        {:.4}", report.calibration.applied_scale);

    println!("\n{}", "=".repeat(60));
    println!("   PREDICTED FINAL: {:.0}", report.predicted_final);
    if let Some(backtest) = &report.backtest {
        println!(
            "   Actual final:    {:.0} ({:+.2}%)",
            backtest.actual_final,
            backtest.relative_error * 100.0
        );
    }
    println!("{}", "=".repeat(60));

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("   - {warning}");
        }
    }
}
