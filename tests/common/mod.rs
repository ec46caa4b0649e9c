// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fake provider/sink capabilities for engine tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use runsheet::error::{AppError, Result};
use runsheet::models::{Activity, Lap};
use runsheet::services::{ActivitySource, RowSink};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory activity source with scriptable lap failures.
#[derive(Default)]
pub struct FakeSource {
    activities: Vec<Activity>,
    laps: HashMap<u64, Vec<Lap>>,
    fail_laps_for: HashSet<u64>,
}

impl FakeSource {
    #[allow(dead_code)]
    pub fn new(activities: Vec<Activity>) -> Self {
        Self {
            activities,
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn with_laps(mut self, activity_id: u64, laps: Vec<Lap>) -> Self {
        self.laps.insert(activity_id, laps);
        self
    }

    /// Make the splits fetch for this activity fail.
    #[allow(dead_code)]
    pub fn failing_laps_for(mut self, activity_id: u64) -> Self {
        self.fail_laps_for.insert(activity_id);
        self
    }
}

#[async_trait]
impl ActivitySource for FakeSource {
    async fn recent_activities(&self, window: usize) -> Result<Vec<Activity>> {
        Ok(self.activities.iter().take(window).cloned().collect())
    }

    async fn activity_laps(&self, activity_id: u64) -> Result<Vec<Lap>> {
        if self.fail_laps_for.contains(&activity_id) {
            return Err(AppError::GarminApi(
                "splits endpoint returned 500".to_string(),
            ));
        }
        Ok(self.laps.get(&activity_id).cloned().unwrap_or_default())
    }
}

/// In-memory row sink with scriptable append failures.
#[derive(Default)]
pub struct FakeSink {
    rows: Mutex<Vec<Vec<String>>>,
    fail_first_cells: HashSet<String>,
}

impl FakeSink {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing rows already in the sheet.
    #[allow(dead_code)]
    pub fn seeded(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Fail any append whose row starts with this cell value.
    #[allow(dead_code)]
    pub fn failing_for(mut self, first_cell: &str) -> Self {
        self.fail_first_cells.insert(first_cell.to_string());
        self
    }

    /// Snapshot of the sheet contents.
    #[allow(dead_code)]
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowSink for FakeSink {
    async fn read_all_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows())
    }

    async fn append_row(&self, row: &[String]) -> Result<()> {
        self.append_rows(&[row.to_vec()]).await
    }

    async fn append_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        for row in rows {
            if row
                .first()
                .is_some_and(|cell| self.fail_first_cells.contains(cell))
            {
                return Err(AppError::SheetsApi("append failed: quota exceeded".to_string()));
            }
        }
        self.rows.lock().unwrap().extend(rows.iter().cloned());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}

/// A running activity on the given date with typical telemetry.
#[allow(dead_code)]
pub fn run_on(id: u64, date: &str) -> Activity {
    activity_of(id, date, "running")
}

#[allow(dead_code)]
pub fn activity_of(id: u64, date: &str, activity_type: &str) -> Activity {
    Activity {
        id,
        name: format!("Workout {}", id),
        activity_type: activity_type.to_string(),
        date: date.parse::<NaiveDate>().expect("test date"),
        distance_meters: 10_000.0,
        duration_seconds: 3000.0,
        average_hr: 150.0,
        max_hr: 172.0,
        average_power_watts: 300.0,
        cadence_spm: 180.0,
        stride_length_cm: 110.0,
        elevation_gain_m: 40.0,
        calories: 640.0,
        vo2_max: 52.0,
        aerobic_effect: 3.2,
        anaerobic_effect: 0.6,
    }
}

#[allow(dead_code)]
pub fn lap(index: u32, distance_meters: f64, average_speed_mps: f64) -> Lap {
    Lap {
        index,
        distance_meters,
        duration_seconds: 300.0,
        average_speed_mps,
        average_hr: 148.0,
        max_hr: 162.0,
        average_power_watts: 295.0,
        cadence_spm: 179.0,
        stride_length_cm: 108.0,
        elevation_gain_m: 4.0,
    }
}
