// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runsheet sync runner.
//!
//! One-shot process, meant to run from cron/CI: log in to Garmin,
//! connect to the sheet, run a single sync pass, report the summary.

use runsheet::config::Config;
use runsheet::services::{GarminClient, GarminSource, SheetsClient, SyncEngine, SyncOptions};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Missing configuration must fail before any network call
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        window = config.fetch_window,
        mode = ?config.mode,
        "Starting runsheet sync"
    );

    let garmin = GarminClient::new();
    let session = garmin
        .login(&config.garmin_email, &config.garmin_password)
        .await
        .expect("Garmin login failed");
    let source = GarminSource::new(garmin, session);

    let sheets = SheetsClient::connect(&config.google_credentials, &config.sheet_id)
        .await
        .expect("Failed to connect to Google Sheets");

    let engine = SyncEngine::new(&source, &sheets, SyncOptions::from_config(&config));
    let summary = engine.run().await?;

    tracing::info!(
        rows_written = summary.rows_written,
        activities = summary.written(),
        degraded = summary.degraded(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        "Sync complete"
    );

    Ok(())
}

/// Initialize structured logging with env-filter overrides.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("runsheet=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
