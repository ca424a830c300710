// ABOUTME: File storage for the seasonality profile, holiday calendar and forecast artifacts
// ABOUTME: A missing profile degrades to an empty one (factor 1.0 everywhere) with a warning
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Cutline Forecasting

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use cutline_core::models::{CutoffArtifact, SeasonalityProfile};
use cutline_intelligence::calendar::{CalendarError, HolidayCalendar};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

/// Local storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// File could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// File content is not valid JSON of the expected shape
    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        /// File involved
        path: PathBuf,
        /// Decoder error
        #[source]
        source: serde_json::Error,
    },

    /// Holiday calendar rejected
    #[error("Invalid holiday calendar {}: {source}", path.display())]
    Calendar {
        /// File involved
        path: PathBuf,
        /// Calendar error
        #[source]
        source: CalendarError,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load the seasonality profile; an absent file yields an empty profile.
///
/// # Errors
///
/// Returns [`StorageError`] when the file exists but cannot be read or parsed.
pub async fn load_profile(path: &Path) -> Result<SeasonalityProfile, StorageError> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!(
                path = %path.display(),
                "Seasonality profile not found, seasonal factors default to 1.0"
            );
            return Ok(SeasonalityProfile::empty());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };
    let profile: SeasonalityProfile =
        serde_json::from_str(&raw).map_err(|e| StorageError::json(path, e))?;
    info!(path = %path.display(), empty = profile.is_empty(), "Seasonality profile loaded");
    Ok(profile)
}

/// Write a profile as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`StorageError`] when serialization or writing fails.
pub async fn save_profile(path: &Path, profile: &SeasonalityProfile) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(profile).map_err(|e| StorageError::json(path, e))?;
    write_creating_dirs(path, json.as_bytes()).await?;
    info!(path = %path.display(), "Seasonality profile saved");
    Ok(())
}

/// Load a holiday calendar.
///
/// # Errors
///
/// Returns [`StorageError`] when the file cannot be read or is malformed.
pub async fn load_calendar(path: &Path) -> Result<HolidayCalendar, StorageError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    let calendar = HolidayCalendar::from_json_str(&raw).map_err(|source| StorageError::Calendar {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), dates = calendar.len(), "Holiday calendar loaded");
    Ok(calendar)
}

/// Artifact file name for an event and tier
#[must_use]
pub fn artifact_file_name(event_id: u32, tier: u32) -> String {
    format!("forecast_{event_id}_t{tier}.json")
}

/// Write the forecast artifact into `output_dir`, returning its path.
///
/// # Errors
///
/// Returns [`StorageError`] when serialization or writing fails.
pub async fn write_artifact(
    output_dir: &Path,
    event_id: u32,
    tier: u32,
    artifact: &CutoffArtifact,
) -> Result<PathBuf, StorageError> {
    let path = output_dir.join(artifact_file_name(event_id, tier));
    let json = serde_json::to_string(artifact).map_err(|e| StorageError::json(&path, e))?;
    write_creating_dirs(&path, json.as_bytes()).await?;
    info!(path = %path.display(), points = artifact.cutoffs.len(), "Forecast artifact written");
    Ok(path)
}

async fn write_creating_dirs(path: &Path, contents: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }
    fs::write(path, contents)
        .await
        .map_err(|e| StorageError::io(path, e))
}
