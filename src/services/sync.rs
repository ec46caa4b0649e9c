// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sync engine: the per-run control loop.
//!
//! Handles the core workflow:
//! 1. Snapshot the dedup ledger from existing sheet rows
//! 2. Fetch a bounded window of recent activities
//! 3. Filter to the running family
//! 4. Per activity: dedup check, lap fetch, metric derivation, append
//! 5. Aggregate per-activity outcomes into a run summary
//!
//! Failures are isolated per activity: a splits fetch error degrades
//! that one row to the placeholder, and a failed append skips that one
//! row. Neither aborts the rest of the batch.

use crate::config::{Config, SyncMode};
use crate::error::Result;
use crate::ledger::{date_key, Ledger};
use crate::metrics;
use crate::models::{Activity, Lap};
use crate::splits::{splits_summary, valid_laps, DEFAULT_LAP_DISTANCE_THRESHOLD_M};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// Provider capability the engine consumes.
#[async_trait]
pub trait ActivitySource {
    /// The most recent `window` activities, newest first.
    async fn recent_activities(&self, window: usize) -> Result<Vec<Activity>>;

    /// Lap splits for one activity; may legitimately be empty.
    async fn activity_laps(&self, activity_id: u64) -> Result<Vec<Lap>>;
}

/// Sink capability the engine consumes.
#[async_trait]
pub trait RowSink {
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>>;
    async fn append_row(&self, row: &[String]) -> Result<()>;
    async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// Tunables for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// How many recent activities to fetch
    pub window: usize,
    /// Row granularity (see [`SyncMode`])
    pub mode: SyncMode,
    /// Minimum lap distance for a lap to count as a real split
    pub lap_threshold_m: f64,
    /// Politeness pause between per-activity lap fetches (lap mode)
    pub fetch_pause: Duration,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window: config.fetch_window,
            mode: config.mode,
            lap_threshold_m: DEFAULT_LAP_DISTANCE_THRESHOLD_M,
            fetch_pause: Duration::from_secs(1),
        }
    }
}

/// What happened to one activity during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Row(s) written. `degraded` marks a splits fetch that failed and
    /// fell back to the placeholder.
    Written { date: NaiveDate, degraded: bool },
    /// Dedup hit; no side effect.
    AlreadySynced { date: NaiveDate },
    /// Sink append failed; the row was skipped and the batch continued.
    WriteFailed { date: NaiveDate, error: String },
}

/// Aggregated result of one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Data rows appended to the sheet (excludes the lap-mode header).
    pub rows_written: usize,
    /// Per-activity outcomes in processing order.
    pub outcomes: Vec<SyncOutcome>,
}

impl RunSummary {
    pub fn written(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Written { .. }))
            .count()
    }

    pub fn degraded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::Written { degraded: true, .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::AlreadySynced { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SyncOutcome::WriteFailed { .. }))
            .count()
    }
}

/// The sync engine, generic over its provider and sink capabilities.
pub struct SyncEngine<'a, S, K> {
    source: &'a S,
    sink: &'a K,
    options: SyncOptions,
}

impl<'a, S: ActivitySource, K: RowSink> SyncEngine<'a, S, K> {
    pub fn new(source: &'a S, sink: &'a K, options: SyncOptions) -> Self {
        Self {
            source,
            sink,
            options,
        }
    }

    /// Run one sync pass and report what happened.
    ///
    /// Only login/connect-level failures (fetching the window, reading
    /// the sheet, the lap-mode reset) abort the run; everything past
    /// that point is isolated per activity.
    pub async fn run(&self) -> Result<RunSummary> {
        match self.options.mode {
            SyncMode::Activity => self.run_activity_mode().await,
            SyncMode::Lap => self.run_lap_mode().await,
        }
    }

    /// Incremental append-only sync: one row per new activity.
    async fn run_activity_mode(&self) -> Result<RunSummary> {
        let existing = self.sink.read_all_rows().await?;
        let mut ledger = Ledger::from_rows(&existing);
        tracing::info!(known_dates = ledger.len(), "Ledger snapshot taken");

        let runs = self.fetch_runs().await?;

        let mut summary = RunSummary::default();
        for activity in &runs {
            if !ledger.is_new(activity.date) {
                tracing::debug!(
                    activity_id = activity.id,
                    date = %date_key(activity.date),
                    "Already synced, skipping"
                );
                summary.outcomes.push(SyncOutcome::AlreadySynced {
                    date: activity.date,
                });
                continue;
            }

            let (laps, degraded) = self.fetch_laps(activity).await;
            let splits = splits_summary(&laps, self.options.lap_threshold_m);
            let row = activity_row(activity, &splits);

            match self.sink.append_row(&row).await {
                Ok(()) => {
                    // Mark immediately so a second same-day activity
                    // later in this window is skipped.
                    ledger.mark_synced(activity.date);
                    summary.rows_written += 1;
                    summary.outcomes.push(SyncOutcome::Written {
                        date: activity.date,
                        degraded,
                    });
                    tracing::info!(
                        activity_id = activity.id,
                        date = %date_key(activity.date),
                        degraded,
                        "Row appended"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        activity_id = activity.id,
                        error = %e,
                        "Append failed, continuing with next activity"
                    );
                    summary.outcomes.push(SyncOutcome::WriteFailed {
                        date: activity.date,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            rows_written = summary.rows_written,
            skipped = summary.skipped(),
            failed = summary.failed(),
            "Activity sync complete"
        );
        Ok(summary)
    }

    /// Destructive full resync: clear the sheet, then one row per lap.
    ///
    /// Dedup by date makes no sense here since every run rewrites the
    /// whole table, so no ledger is taken.
    async fn run_lap_mode(&self) -> Result<RunSummary> {
        let runs = self.fetch_runs().await?;

        self.sink.clear().await?;
        self.sink.append_row(&lap_header()).await?;
        tracing::info!("Sheet cleared, lap header written");

        let mut summary = RunSummary::default();
        for (position, activity) in runs.iter().enumerate() {
            if position > 0 {
                // Courtesy pause between lap fetches, not a retry delay.
                tokio::time::sleep(self.options.fetch_pause).await;
            }

            let (laps, degraded) = self.fetch_laps(activity).await;
            let rows = lap_rows(activity, &laps, self.options.lap_threshold_m);

            if rows.is_empty() {
                tracing::debug!(activity_id = activity.id, "No valid laps, nothing to write");
                summary.outcomes.push(SyncOutcome::Written {
                    date: activity.date,
                    degraded,
                });
                continue;
            }

            match self.sink.append_rows(&rows).await {
                Ok(()) => {
                    summary.rows_written += rows.len();
                    summary.outcomes.push(SyncOutcome::Written {
                        date: activity.date,
                        degraded,
                    });
                    tracing::info!(
                        activity_id = activity.id,
                        laps = rows.len(),
                        "Lap rows appended"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        activity_id = activity.id,
                        error = %e,
                        "Append failed, continuing with next activity"
                    );
                    summary.outcomes.push(SyncOutcome::WriteFailed {
                        date: activity.date,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            rows_written = summary.rows_written,
            failed = summary.failed(),
            "Lap sync complete"
        );
        Ok(summary)
    }

    /// Fetch the activity window and keep the running family, in fetch
    /// order.
    async fn fetch_runs(&self) -> Result<Vec<Activity>> {
        let activities = self.source.recent_activities(self.options.window).await?;
        let fetched = activities.len();
        let runs: Vec<Activity> = activities.into_iter().filter(Activity::is_running).collect();
        tracing::info!(fetched, runs = runs.len(), "Fetched activity window");
        Ok(runs)
    }

    /// Fetch laps for one activity, downgrading failure to an empty
    /// list so the caller substitutes the placeholder.
    async fn fetch_laps(&self, activity: &Activity) -> (Vec<Lap>, bool) {
        match self.source.activity_laps(activity.id).await {
            Ok(laps) => (laps, false),
            Err(e) => {
                tracing::warn!(
                    activity_id = activity.id,
                    error = %e,
                    "Splits unavailable, using placeholder"
                );
                (Vec::new(), true)
            }
        }
    }
}

/// Column headers for lap mode.
pub fn lap_header() -> Vec<String> {
    [
        "Date",
        "Name",
        "Lap",
        "Distance (km)",
        "Time (min)",
        "Pace",
        "Avg HR",
        "Max HR",
        "Avg Power (W)",
        "Cadence",
        "Stride (m)",
        "Elev Gain (m)",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Project one activity (plus its splits summary) into a sheet row.
pub fn activity_row(activity: &Activity, splits: &str) -> Vec<String> {
    vec![
        date_key(activity.date),
        activity.name.clone(),
        metrics::km(activity.distance_meters).to_string(),
        metrics::minutes(activity.duration_seconds).to_string(),
        metrics::round_to(activity.average_hr, 0).to_string(),
        metrics::round_to(activity.max_hr, 0).to_string(),
        metrics::round_to(activity.average_power_watts, 0).to_string(),
        activity.vo2_max.to_string(),
        activity.aerobic_effect.to_string(),
        activity.anaerobic_effect.to_string(),
        metrics::stride_meters(activity.stride_length_cm).to_string(),
        metrics::round_to(activity.cadence_spm, 0).to_string(),
        metrics::round_to(activity.elevation_gain_m, 1).to_string(),
        metrics::round_to(activity.calories, 0).to_string(),
        splits.to_string(),
    ]
}

/// Project an activity's valid laps into sheet rows, one per lap.
///
/// Zero-speed laps are kept (their pace column shows the `"0:00"`
/// sentinel); only the distance filter applies here.
pub fn lap_rows(activity: &Activity, laps: &[Lap], threshold_m: f64) -> Vec<Vec<String>> {
    valid_laps(laps, threshold_m)
        .map(|lap| {
            vec![
                date_key(activity.date),
                activity.name.clone(),
                lap.index.to_string(),
                metrics::km(lap.distance_meters).to_string(),
                metrics::minutes(lap.duration_seconds).to_string(),
                metrics::pace_from_speed(lap.average_speed_mps),
                metrics::round_to(lap.average_hr, 0).to_string(),
                metrics::round_to(lap.max_hr, 0).to_string(),
                metrics::round_to(lap.average_power_watts, 0).to_string(),
                metrics::round_to(lap.cadence_spm, 0).to_string(),
                metrics::stride_meters(lap.stride_length_cm).to_string(),
                metrics::round_to(lap.elevation_gain_m, 1).to_string(),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity() -> Activity {
        Activity {
            id: 1,
            name: "Long Run".to_string(),
            activity_type: "running".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            distance_meters: 10234.0,
            duration_seconds: 3600.0,
            average_hr: 149.6,
            max_hr: 171.2,
            average_power_watts: 305.4,
            cadence_spm: 181.7,
            stride_length_cm: 123.456,
            elevation_gain_m: 84.25,
            calories: 712.8,
            vo2_max: 52.0,
            aerobic_effect: 3.4,
            anaerobic_effect: 0.8,
        }
    }

    #[test]
    fn test_activity_row_layout() {
        let row = activity_row(&activity(), "5:30 | 5:28");

        assert_eq!(row[0], "2026-03-14");
        assert_eq!(row[1], "Long Run");
        assert_eq!(row[2], "10.23"); // km, 2 decimals
        assert_eq!(row[3], "60"); // minutes
        assert_eq!(row[4], "150"); // avg HR rounded
        assert_eq!(row[6], "305"); // watts rounded
        assert_eq!(row[10], "1.23"); // stride m
        assert_eq!(row[12], "84.2"); // elevation, 1 decimal (ties to even)
        assert_eq!(row[14], "5:30 | 5:28");
        assert_eq!(row.len(), 15);
    }

    #[test]
    fn test_lap_rows_filter_and_layout() {
        let laps = vec![
            Lap {
                index: 1,
                distance_meters: 1000.0,
                duration_seconds: 500.0,
                average_speed_mps: 2.0,
                average_hr: 148.0,
                max_hr: 160.0,
                average_power_watts: 290.0,
                cadence_spm: 180.0,
                stride_length_cm: 110.0,
                elevation_gain_m: 5.0,
            },
            Lap {
                index: 2,
                distance_meters: 120.0, // watch-stop tail, filtered
                duration_seconds: 60.0,
                average_speed_mps: 2.0,
                average_hr: 0.0,
                max_hr: 0.0,
                average_power_watts: 0.0,
                cadence_spm: 0.0,
                stride_length_cm: 0.0,
                elevation_gain_m: 0.0,
            },
        ];

        let rows = lap_rows(&activity(), &laps, 400.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "2026-03-14");
        assert_eq!(rows[0][2], "1"); // lap index
        assert_eq!(rows[0][5], "8:20"); // 2 m/s pace
        assert_eq!(rows[0].len(), lap_header().len());
    }

    #[test]
    fn test_zero_speed_lap_kept_in_rows() {
        let laps = vec![Lap {
            index: 1,
            distance_meters: 1000.0,
            duration_seconds: 500.0,
            average_speed_mps: 0.0,
            average_hr: 0.0,
            max_hr: 0.0,
            average_power_watts: 0.0,
            cadence_spm: 0.0,
            stride_length_cm: 0.0,
            elevation_gain_m: 0.0,
        }];

        let rows = lap_rows(&activity(), &laps, 400.0);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][5], "0:00");
    }
}
