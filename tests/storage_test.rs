// ABOUTME: Integration tests for profile, calendar and artifact files
// ABOUTME: Uses temporary directories for every read and write
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::fs;

use chrono::NaiveDate;
use cutline::storage::{
    artifact_file_name, load_calendar, load_profile, save_profile, write_artifact, StorageError,
};
use cutline_core::models::{ArtifactPoint, CutoffArtifact, DayType, HourlyStats, SeasonalityProfile};
use cutline_intelligence::calendar::WorkdayCalendar;
use serde_json::Value;
use tempfile::TempDir;

fn stats(mean: f64) -> HourlyStats {
    HourlyStats {
        mean,
        median: mean,
        std: 0.01,
        count: 12,
    }
}

#[tokio::test]
async fn test_missing_profile_degrades_to_empty() {
    let dir = TempDir::new().unwrap();
    let profile = load_profile(&dir.path().join("absent.json")).await.unwrap();
    assert!(profile.is_empty());
}

#[tokio::test]
async fn test_profile_round_trip_creates_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/data/seasonality_profile.json");

    let mut profile = SeasonalityProfile::empty();
    profile.set_bucket(DayType::Weekday, 20, Some(stats(0.42)));
    profile.set_bucket(DayType::Weekend, 3, Some(stats(0.05)));
    save_profile(&path, &profile).await.unwrap();

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!((raw["weekday"]["20"]["mean"].as_f64().unwrap() - 0.42).abs() < f64::EPSILON);
    assert!(raw["weekday"]["21"].is_null());

    let loaded = load_profile(&path).await.unwrap();
    assert_eq!(loaded, profile);
    assert_eq!(loaded.bucket(DayType::Weekend, 3), Some(&stats(0.05)));
}

#[tokio::test]
async fn test_corrupt_profile_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("profile.json");
    fs::write(&path, "{not json").unwrap();

    let err = load_profile(&path).await.unwrap_err();
    assert!(matches!(err, StorageError::Json { .. }));
    assert!(err.to_string().contains("profile.json"));
}

#[tokio::test]
async fn test_calendar_loads_holidays_and_workdays() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calendar.json");
    fs::write(
        &path,
        r#"{"holidays": ["2024-10-01", "2024-10-02"], "workdays": ["2024-10-12"]}"#,
    )
    .unwrap();

    let calendar = load_calendar(&path).await.unwrap();
    assert_eq!(calendar.len(), 3);
    // Tuesday holiday, Saturday make-up day
    assert_eq!(
        calendar.is_workday(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()),
        Some(false)
    );
    assert_eq!(
        calendar.is_workday(NaiveDate::from_ymd_opt(2024, 10, 12).unwrap()),
        Some(true)
    );
    assert_eq!(
        calendar.is_workday(NaiveDate::from_ymd_opt(2024, 10, 13).unwrap()),
        None
    );
}

#[tokio::test]
async fn test_missing_calendar_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = load_calendar(&dir.path().join("none.json")).await.unwrap_err();
    assert!(matches!(err, StorageError::Io { .. }));
}

#[tokio::test]
async fn test_artifact_written_in_tracker_format() {
    let dir = TempDir::new().unwrap();
    let artifact = CutoffArtifact {
        result: true,
        cutoffs: vec![
            ArtifactPoint {
                time: 1_714_978_800_000,
                ep: 0,
            },
            ArtifactPoint {
                time: 1_714_982_400_000,
                ep: 6_120,
            },
        ],
    };

    let path = write_artifact(&dir.path().join("out"), 231, 1000, &artifact)
        .await
        .unwrap();
    assert_eq!(path.file_name().unwrap(), "forecast_231_t1000.json");

    let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["result"], true);
    assert_eq!(raw["cutoffs"][1]["time"], 1_714_982_400_000_i64);
    assert_eq!(raw["cutoffs"][1]["ep"], 6_120);
}

#[test]
fn test_artifact_file_name() {
    assert_eq!(artifact_file_name(7, 2000), "forecast_7_t2000.json");
}
