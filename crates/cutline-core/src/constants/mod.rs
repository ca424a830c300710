// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Remote API endpoints, model constants, and default runtime values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

//! Constants grouped by domain.

/// Remote tracker API
pub mod api {
    /// Default API base URL (Bestdori-compatible)
    pub const DEFAULT_BASE_URL: &str = "https://bestdori.com/api/";
    /// Default server index into per-server `startAt`/`endAt` arrays (3 = CN)
    pub const DEFAULT_SERVER_INDEX: usize = 3;
    /// Default tier tracked by the forecaster
    pub const DEFAULT_TIER: u32 = 1000;
    /// Sampling interval requested from the top-ranking endpoint (1 hour)
    pub const TOP_POINTS_INTERVAL_MS: i64 = 3_600_000;
    /// Number of top-ranking points considered when estimating a candidate's peak speed
    pub const CANDIDATE_TOP_POINTS_LIMIT: usize = 500;
    /// Recent-news feed path
    pub const RECENT_FEED_PATH: &str = "news/dynamic/recent.json";
}

/// HTTP client defaults
pub mod http {
    /// Request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
    /// Connect timeout in seconds
    pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
    /// Idle connections kept per host
    pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 20;
    /// Retry attempts after the first request
    pub const DEFAULT_MAX_RETRIES: u32 = 3;
    /// Base backoff delay in milliseconds (doubled per attempt)
    pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 250;
}

/// Speed derivation
pub mod speed {
    /// Raw speeds at or above this (EP/min) are treated as corrupt
    pub const MAX_PLAUSIBLE_SPEED: f64 = 1_000_000.0;
    /// Number of fastest per-participant deltas averaged into the peak-speed scale
    pub const PEAK_SPEED_TOP_N: usize = 3;
    /// Milliseconds per hour
    pub const MS_PER_HOUR: f64 = 3_600_000.0;
    /// Milliseconds per minute
    pub const MS_PER_MINUTE: f64 = 60_000.0;
}

/// Seasonality model
pub mod seasonality {
    /// Weekday weight in the weighted global mean
    pub const WEEKDAY_WEIGHT: f64 = 5.0;
    /// Weekend weight in the weighted global mean
    pub const WEEKEND_WEIGHT: f64 = 2.0;
    /// Samples earlier than this (hours since start) never get a factor below 1.0
    pub const EARLY_SUPPRESSION_HOURS: f64 = 12.0;
    /// Friday hour from which the weekend pattern applies
    pub const FRIDAY_WEEKEND_START_HOUR: u32 = 17;
    /// Sunday hour from which the weekday pattern applies again
    pub const SUNDAY_WEEKDAY_START_HOUR: u32 = 23;
    /// Local evening hour used as the first-day cutoff
    pub const EVENING_CUTOFF_HOUR: u32 = 18;
    /// Fallback timezone offset when none of the known offsets matches
    pub const FALLBACK_TZ_OFFSET_HOURS: i32 = 8;
}

/// Shape model and solver
pub mod shape {
    /// Initial guess `(Base, A, B, B_end, T_panic)`
    pub const INITIAL_GUESS: [f64; 5] = [0.05, 0.001, 0.000_01, 0.5, 24.0];
    /// Lower bounds for `(Base, A, B, B_end, T_panic)`
    pub const LOWER_BOUNDS: [f64; 5] = [0.0, -0.01, -0.001, 0.0, 6.0];
    /// Upper bounds for `(Base, A, B, B_end)`; `T_panic` upper bound is event dependent
    pub const UPPER_BOUNDS: [f64; 4] = [1.0, 0.01, 0.001, 10.0];
    /// Absolute cap on the panic window length (hours)
    pub const MAX_PANIC_HOURS: f64 = 72.0;
    /// Exponent applied to the sine rise
    pub const RISE_POWER: f64 = 2.5;
    /// Exponent of the back-half focus envelope
    pub const FOCUS_POWER: f64 = 3.0;
    /// Hours before the panic window where the rise starts blending in
    pub const BLEND_LEAD_HOURS: f64 = 4.0;
    /// Minimum finite samples required to fit a candidate
    pub const MIN_FIT_SAMPLES: usize = 5;
    /// Exponent applied to the ratio when rescaling `B_end`
    pub const PANIC_RATIO_EXPONENT: f64 = 1.1;
}

/// Forecast grid and calibration
pub mod forecast {
    /// Number of points in the uniform forecast grid
    pub const GRID_POINTS: usize = 1000;
    /// Backtest correction only runs once this many hours are observed
    pub const BACKTEST_MIN_OBSERVED_HOURS: f64 = 50.0;
    /// Length of the trailing backtest window (hours)
    pub const BACKTEST_WINDOW_HOURS: f64 = 24.0;
    /// Sigma multiplier used by the window-intensity clip
    pub const SIGMA_CLIP: f64 = 2.0;
    /// Standard deviation below which no clipping happens
    pub const SIGMA_CLIP_MIN_STD: f64 = 0.001;
    /// Maintenance-delay corrections must be shorter than this (hours)
    pub const MAX_START_CORRECTION_HOURS: i64 = 24;
    /// Mild smoothing stage coefficient
    pub const SMOOTH_ALPHA: f64 = 3.0;
    /// Strong smoothing stage coefficient
    pub const SMOOTH_BETA: f64 = 22.0;
}

/// Candidate discovery
pub mod candidates {
    /// Number of preceding ids scanned when the catalog is unavailable
    pub const FALLBACK_SCAN_DEPTH: u32 = 50;
    /// Default number of concurrent candidate loads
    pub const DEFAULT_CONCURRENCY: usize = 5;
    /// Upper limit on concurrent candidate loads
    pub const MAX_CONCURRENCY: usize = 8;
}

/// Seasonality profile builder
pub mod profile {
    /// Leading hours of each event excluded from the profile
    pub const SKIP_LEADING_HOURS: i64 = 24;
    /// Trailing hours of each event excluded from the profile
    pub const SKIP_TRAILING_HOURS: i64 = 48;
    /// Events with a smaller peak speed are considered broken
    pub const MIN_SCALE: f64 = 100.0;
    /// Upper bound of accepted normalized speeds
    pub const MAX_NORMALIZED_SPEED: f64 = 1.2;
    /// Fixed local offset used when bucketing (hours)
    pub const LOCAL_OFFSET_HOURS: i32 = 8;
}

/// Local files used by the application crate
pub mod paths {
    /// Seasonality profile location
    pub const DEFAULT_PROFILE_PATH: &str = "data/seasonality_profile.json";
    /// Directory receiving forecast artifacts
    pub const DEFAULT_OUTPUT_DIR: &str = "output";
}

/// Environment variable names read by the application crate
pub mod env_vars {
    /// API base URL
    pub const BASE_URL: &str = "CUTLINE_API_BASE_URL";
    /// Server index into per-server arrays
    pub const SERVER_INDEX: &str = "CUTLINE_SERVER";
    /// Tier to forecast
    pub const TIER: &str = "CUTLINE_TIER";
    /// Request timeout in seconds
    pub const HTTP_TIMEOUT_SECS: &str = "CUTLINE_HTTP_TIMEOUT_SECS";
    /// Connect timeout in seconds
    pub const HTTP_CONNECT_TIMEOUT_SECS: &str = "CUTLINE_HTTP_CONNECT_TIMEOUT_SECS";
    /// Retry attempts after the first request
    pub const HTTP_MAX_RETRIES: &str = "CUTLINE_HTTP_MAX_RETRIES";
    /// Base backoff delay in milliseconds
    pub const HTTP_RETRY_DELAY_MS: &str = "CUTLINE_HTTP_RETRY_DELAY_MS";
    /// Idle connections kept per host
    pub const HTTP_POOL_SIZE: &str = "CUTLINE_HTTP_POOL_SIZE";
    /// Concurrent candidate loads
    pub const CONCURRENCY: &str = "CUTLINE_CONCURRENCY";
    /// Seasonality profile path
    pub const PROFILE_PATH: &str = "CUTLINE_PROFILE_PATH";
    /// Holiday calendar path
    pub const CALENDAR_PATH: &str = "CUTLINE_CALENDAR_PATH";
    /// Artifact output directory
    pub const OUTPUT_DIR: &str = "CUTLINE_OUTPUT_DIR";
    /// Local timezone offset override (hours)
    pub const TZ_OFFSET: &str = "CUTLINE_TZ_OFFSET";
    /// Reject unknown forecast override keys when set to a true value
    pub const STRICT_OVERRIDES: &str = "CUTLINE_STRICT_OVERRIDES";
}
