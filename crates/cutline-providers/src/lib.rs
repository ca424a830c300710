// ABOUTME: Event data sources for the Cutline forecaster
// ABOUTME: EventSource trait, pooled HTTP client with retry, tracker API adapter and peak-speed estimation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Remote event-data access.
//!
//! The forecasting pipeline only sees the [`EventSource`] trait. The HTTP
//! implementation talks to a Bestdori-compatible API through one shared
//! [`TrackerClient`] that owns timeouts, pooling and the retry policy.

/// Pooled HTTP client with bounded retry
pub mod http_client;
/// Peak-speed scale estimation
pub mod peak_speed;
/// Current-event selection
pub mod recent;
/// Source trait and its value types
pub mod source;
/// HTTP tracker source
pub mod tracker;
/// API payload formats
pub mod wire;

pub use cutline_core::errors::ProviderError;
pub use http_client::{HttpClientConfig, TrackerClient};
pub use recent::select_current_event;
pub use source::{CatalogEntry, EventSource, EventWindow, PeakSpeedWindow, SourceResult};
pub use tracker::HttpEventSource;
