// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The sync runs from cron/CI, so everything is environment-sourced and
//! validated up front: a missing credential must fail the run before any
//! network call is made.

use std::env;
use std::str::FromStr;

/// Default number of recent activities fetched per run.
const DEFAULT_FETCH_WINDOW: usize = 20;

/// Bounds on the fetch window; values outside are clamped.
const FETCH_WINDOW_MIN: usize = 5;
const FETCH_WINDOW_MAX: usize = 100;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Garmin Connect account email
    pub garmin_email: String,
    /// Garmin Connect account password
    pub garmin_password: String,
    /// Google service-account credentials (raw JSON blob)
    pub google_credentials: String,
    /// Target spreadsheet ID
    pub sheet_id: String,
    /// How many recent activities to fetch per run
    pub fetch_window: usize,
    /// Row granularity: one row per activity, or one row per lap
    pub mode: SyncMode,
}

/// Operating mode of the sync engine.
///
/// Activity mode appends one row per new activity and is incremental.
/// Lap mode rewrites the whole sheet with one row per lap; it is a
/// destructive full resync, so no dedup applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Activity,
    Lap,
}

impl FromStr for SyncMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "activity" => Ok(SyncMode::Activity),
            "lap" => Ok(SyncMode::Lap),
            _ => Err(ConfigError::Invalid("SYNC_MODE", "expected 'activity' or 'lap'")),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present (local development).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let fetch_window = match env::var("FETCH_WINDOW") {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::Invalid("FETCH_WINDOW", "expected an integer"))?
                .clamp(FETCH_WINDOW_MIN, FETCH_WINDOW_MAX),
            Err(_) => DEFAULT_FETCH_WINDOW,
        };

        let mode = match env::var("SYNC_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => SyncMode::Activity,
        };

        Ok(Self {
            garmin_email: env::var("GARMIN_EMAIL")
                .map_err(|_| ConfigError::Missing("GARMIN_EMAIL"))?,
            garmin_password: env::var("GARMIN_PASSWORD")
                .map_err(|_| ConfigError::Missing("GARMIN_PASSWORD"))?,
            google_credentials: env::var("GOOGLE_CREDENTIALS")
                .map_err(|_| ConfigError::Missing("GOOGLE_CREDENTIALS"))?,
            sheet_id: env::var("SHEET_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SHEET_ID"))?,
            fetch_window,
            mode,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
