// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.
//!
//! Three severities exist in practice:
//! - fatal (config, login, sink connection): the run aborts before
//!   anything is written
//! - recoverable per activity (splits fetch, single row append): logged,
//!   the batch continues
//! - silent defaults for missing telemetry fields (handled at the
//!   provider boundary, never surfaced as an error)

use crate::config::ConfigError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Garmin authentication failed: {0}")]
    Auth(String),

    #[error("Garmin API error: {0}")]
    GarminApi(String),

    #[error("Google Sheets error: {0}")]
    SheetsApi(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for fallible operations.
pub type Result<T> = std::result::Result<T, AppError>;
