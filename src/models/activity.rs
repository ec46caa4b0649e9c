// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalized activity and lap records.
//!
//! These are constructed once at the Garmin client boundary from the raw
//! JSON payloads. Every optional telemetry field defaults to zero there,
//! so the rest of the crate works with plain numbers and never repeats
//! "get with default" logic.

use chrono::NaiveDate;

/// Sport types treated as runs. Everything else is ignored by the sync.
const RUNNING_TYPES: [&str; 3] = ["running", "treadmill_running", "trail_running"];

/// One recorded workout, normalized from the provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    /// Provider-assigned activity ID
    pub id: u64,
    /// Activity name/title (defaults to "Run")
    pub name: String,
    /// Provider sport type key (e.g. "running", "cycling")
    pub activity_type: String,
    /// Local start time truncated to a calendar day; the dedup key
    pub date: NaiveDate,
    /// Distance in meters
    pub distance_meters: f64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Average heart rate (bpm)
    pub average_hr: f64,
    /// Max heart rate (bpm)
    pub max_hr: f64,
    /// Average running power (watts)
    pub average_power_watts: f64,
    /// Running cadence (steps per minute)
    pub cadence_spm: f64,
    /// Average stride length (centimeters, as reported by the provider)
    pub stride_length_cm: f64,
    /// Total elevation gain (meters)
    pub elevation_gain_m: f64,
    /// Calories burned
    pub calories: f64,
    /// VO2 max estimate
    pub vo2_max: f64,
    /// Aerobic training effect (0-5)
    pub aerobic_effect: f64,
    /// Anaerobic training effect (0-5)
    pub anaerobic_effect: f64,
}

impl Activity {
    /// Whether this activity belongs to the running family.
    ///
    /// Exact allow-list match (case-insensitive) rather than a looser
    /// substring check, so e.g. a hypothetical "running_drills" type
    /// stays excluded until added deliberately.
    pub fn is_running(&self) -> bool {
        let key = self.activity_type.to_ascii_lowercase();
        RUNNING_TYPES.contains(&key.as_str())
    }
}

/// One provider-reported lap within an activity, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Lap {
    /// 1-based position within the activity
    pub index: u32,
    /// Distance in meters
    pub distance_meters: f64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// Average speed in m/s; zero when the provider omits it
    pub average_speed_mps: f64,
    /// Average heart rate (bpm)
    pub average_hr: f64,
    /// Max heart rate (bpm)
    pub max_hr: f64,
    /// Average power (watts)
    pub average_power_watts: f64,
    /// Cadence (steps per minute)
    pub cadence_spm: f64,
    /// Average stride length (centimeters)
    pub stride_length_cm: f64,
    /// Elevation gain over the lap (meters)
    pub elevation_gain_m: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity_of_type(activity_type: &str) -> Activity {
        Activity {
            id: 1,
            name: "Morning Run".to_string(),
            activity_type: activity_type.to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            distance_meters: 10_000.0,
            duration_seconds: 3000.0,
            average_hr: 150.0,
            max_hr: 172.0,
            average_power_watts: 0.0,
            cadence_spm: 180.0,
            stride_length_cm: 110.0,
            elevation_gain_m: 42.0,
            calories: 600.0,
            vo2_max: 52.0,
            aerobic_effect: 3.1,
            anaerobic_effect: 0.4,
        }
    }

    #[test]
    fn test_running_family_matches() {
        assert!(activity_of_type("running").is_running());
        assert!(activity_of_type("treadmill_running").is_running());
        assert!(activity_of_type("trail_running").is_running());
        assert!(activity_of_type("Running").is_running());
    }

    #[test]
    fn test_non_running_excluded() {
        assert!(!activity_of_type("cycling").is_running());
        assert!(!activity_of_type("lap_swimming").is_running());
        assert!(!activity_of_type("").is_running());
    }
}
