// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - provider/sink clients and the sync engine.

pub mod garmin;
pub mod sheets;
pub mod sync;

pub use garmin::{GarminClient, GarminSession, GarminSource};
pub use sheets::SheetsClient;
pub use sync::{
    activity_row, lap_header, lap_rows, ActivitySource, RowSink, RunSummary, SyncEngine,
    SyncOptions, SyncOutcome,
};
