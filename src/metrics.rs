// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pure metric derivation from raw activity/lap telemetry.
//!
//! All functions here are total: missing or non-positive inputs produce
//! zero values or the `"0:00"` pace sentinel so sheet columns stay
//! numeric/uniform instead of going blank.

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// Duration in minutes, 2 decimal places. Zero for non-positive input.
pub fn minutes(duration_seconds: f64) -> f64 {
    if duration_seconds <= 0.0 {
        return 0.0;
    }
    round_to(duration_seconds / 60.0, 2)
}

/// Distance in kilometers, 2 decimal places. Zero for non-positive input.
pub fn km(distance_meters: f64) -> f64 {
    if distance_meters <= 0.0 {
        return 0.0;
    }
    round_to(distance_meters / 1000.0, 2)
}

/// Stride length in meters from provider centimeters, 2 decimal places.
pub fn stride_meters(stride_cm: f64) -> f64 {
    if stride_cm <= 0.0 {
        return 0.0;
    }
    round_to(stride_cm / 100.0, 2)
}

/// Pace over a distance as a `min:sec` per-km string.
///
/// Both components truncate (floor/mod), matching how watches display
/// pace: 330 s/km is `"5:30"`, 299.9 s/km is `"4:59"`.
pub fn pace_string(distance_meters: f64, duration_seconds: f64) -> String {
    if distance_meters <= 0.0 || duration_seconds <= 0.0 {
        return "0:00".to_string();
    }
    let seconds_per_km = duration_seconds / (distance_meters / 1000.0);
    format_pace(seconds_per_km)
}

/// Pace from an average speed in m/s, `"0:00"` for non-positive speed.
pub fn pace_from_speed(meters_per_second: f64) -> String {
    if meters_per_second <= 0.0 {
        return "0:00".to_string();
    }
    format_pace(1000.0 / meters_per_second)
}

fn format_pace(seconds_per_km: f64) -> String {
    let mins = (seconds_per_km / 60.0).floor() as u64;
    let secs = (seconds_per_km % 60.0).floor() as u64;
    format!("{}:{:02}", mins, secs)
}
