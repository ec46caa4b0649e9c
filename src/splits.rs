// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lap filtering and the per-activity splits summary.
//!
//! Garmin reports every lap the watch recorded, including the short
//! tail produced by stopping the watch late or an auto-pause blip. Laps
//! under the distance threshold are noise and are dropped both from lap
//! rows and from the pace summary.

use crate::metrics::pace_from_speed;
use crate::models::Lap;

/// Minimum lap distance in meters for a lap to count as a real split.
pub const DEFAULT_LAP_DISTANCE_THRESHOLD_M: f64 = 400.0;

/// Shown in the splits column when an activity has no usable laps, so
/// the column is never empty and a missing-splits activity is visible.
pub const SPLITS_PLACEHOLDER: &str = "N/A";

/// Separator between per-lap paces in the summary string.
const SPLIT_SEPARATOR: &str = " | ";

/// Laps above the distance threshold, lazily, in source order.
pub fn valid_laps(laps: &[Lap], threshold_m: f64) -> impl Iterator<Item = &Lap> {
    laps.iter().filter(move |lap| lap.distance_meters > threshold_m)
}

/// Per-km pace summary over the valid laps, e.g. `"5:30 | 5:28 | 5:31"`.
///
/// Laps without a positive average speed are skipped here (they still
/// appear in lap-mode rows). Yields [`SPLITS_PLACEHOLDER`] when nothing
/// qualifies.
pub fn splits_summary(laps: &[Lap], threshold_m: f64) -> String {
    let paces: Vec<String> = valid_laps(laps, threshold_m)
        .filter(|lap| lap.average_speed_mps > 0.0)
        .map(|lap| pace_from_speed(lap.average_speed_mps))
        .collect();

    if paces.is_empty() {
        SPLITS_PLACEHOLDER.to_string()
    } else {
        paces.join(SPLIT_SEPARATOR)
    }
}
