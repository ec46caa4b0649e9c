// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Runsheet: sync Garmin Connect runs into a Google Sheets training log.
//!
//! This crate fetches recent running activities from Garmin Connect,
//! derives pace and telemetry metrics per activity and per lap, and
//! appends rows to a spreadsheet whose existing rows double as the
//! record of what has already been synced.

pub mod config;
pub mod error;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod services;
pub mod splits;
