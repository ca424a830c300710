// ABOUTME: HTTP event source tests against a mock tracker API
// ABOUTME: Covers endpoint paths, query parameters, 404 handling and transient-failure retries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use cutline_core::errors::ProviderError;
use cutline_providers::{
    EventSource, EventWindow, HttpClientConfig, HttpEventSource, PeakSpeedWindow, TrackerClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SERVER: usize = 3;

fn fast_config(max_retries: u32) -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        pool_max_idle_per_host: 2,
        max_retries,
        retry_base_delay: Duration::from_millis(1),
    }
}

fn source(server: &MockServer, max_retries: u32) -> HttpEventSource {
    // no trailing slash on purpose
    let client = TrackerClient::new(format!("{}/api", server.uri()), fast_config(max_retries)).unwrap();
    HttpEventSource::new(Arc::new(client), SERVER)
}

#[tokio::test]
async fn test_event_meta_reads_server_column() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/231.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eventType": "story",
            "startAt": ["1", null, "2", "1714978800000"],
            "endAt": ["5", null, "6", 1_715_662_800_000_i64]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let meta = source(&server, 0).event_meta(231).await.unwrap().unwrap();
    assert_eq!(meta.event_id, 231);
    assert_eq!(meta.start_ts, 1_714_978_800_000);
    assert_eq!(meta.end_ts, 1_715_662_800_000);
    assert_eq!(meta.event_type, "story");
}

#[tokio::test]
async fn test_unknown_event_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/999.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(source(&server, 2).event_meta(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_score_series_sends_server_event_and_tier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracker/data"))
        .and(query_param("server", "3"))
        .and(query_param("event", "231"))
        .and(query_param("tier", "2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": true,
            "cutoffs": [
                {"time": 1_714_982_400_000_i64, "ep": 6000},
                {"time": 1_714_978_800_000_i64, "ep": 0}
            ]
        })))
        .mount(&server)
        .await;

    let points = source(&server, 0).score_series(231, 2000).await.unwrap().unwrap();
    assert_eq!(points.len(), 2);
    assert!(points[0].time_ms < points[1].time_ms);
    assert!((points[1].score - 6000.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_tracker_without_result_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracker/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": false})))
        .mount(&server)
        .await;

    assert!(source(&server, 0).score_series(231, 1000).await.unwrap().is_none());
}

#[tokio::test]
async fn test_peak_speed_from_top_points() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/eventtop/data"))
        .and(query_param("server", "3"))
        .and(query_param("event", "231"))
        .and(query_param("mid", "0"))
        .and(query_param("interval", "3600000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "points": [
                {"time": 0, "uid": 1, "value": 0},
                {"time": 3_600_000, "uid": 1, "value": 60_000},
                {"time": 7_200_000, "uid": 1, "value": 180_000},
                {"time": 0, "uid": 2, "value": 0},
                {"time": 3_600_000, "uid": 2, "value": 30_000}
            ]
        })))
        .mount(&server)
        .await;

    let scale = source(&server, 0)
        .peak_speed(231, PeakSpeedWindow::default())
        .await
        .unwrap()
        .unwrap();
    // fastest speeds: 2000, 1000, 500 points per minute
    assert!((scale - 3500.0 / 3.0).abs() < 1e-9);

    let frozen = source(&server, 0)
        .peak_speed(231, PeakSpeedWindow::target(Some(3_600_000)))
        .await
        .unwrap()
        .unwrap();
    assert!((frozen - 750.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/231.json"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/events/231.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "eventType": "versus",
            "startAt": [null, null, null, 100],
            "endAt": [null, null, null, 200]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let meta = source(&server, 2).event_meta(231).await.unwrap().unwrap();
    assert_eq!(meta.event_type, "versus");
}

#[tokio::test]
async fn test_retries_exhausted_surface_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/231.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(2)
        .mount(&server)
        .await;

    let err = source(&server, 1).event_meta(231).await.unwrap_err();
    assert!(matches!(err, ProviderError::ApiError { status_code: 500, .. }));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/231.json"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    assert!(source(&server, 3).event_meta(231).await.is_err());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tracker/data"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = source(&server, 0).score_series(231, 1000).await.unwrap_err();
    assert!(matches!(err, ProviderError::ParseError { .. }));
}

#[tokio::test]
async fn test_catalog_and_recent_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/events/all.3.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "229": {"eventType": "story"},
            "230": {"eventType": "challenge"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/news/dynamic/recent.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": {
                "231": {"startAt": [null, null, null, "100"], "endAt": [null, null, null, "200"]}
            }
        })))
        .mount(&server)
        .await;

    let source = source(&server, 0);
    let catalog = source.catalog().await.unwrap().unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog[0].event_id, 229);
    assert_eq!(catalog[1].event_type.as_deref(), Some("challenge"));

    let recent = source.recent_events().await.unwrap().unwrap();
    assert_eq!(
        recent,
        vec![EventWindow {
            event_id: 231,
            start_ts: Some(100),
            end_ts: Some(200),
        }]
    );
}
