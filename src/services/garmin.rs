// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect API client.
//!
//! Handles:
//! - SSO credential login and ticket exchange for an OAuth bearer token
//! - Listing recent activities (newest first, as Garmin returns them)
//! - Fetching per-activity lap splits
//! - Normalizing raw payloads into [`Activity`]/[`Lap`] records at the
//!   boundary, applying the zero-defaulting rules exactly once

use crate::error::AppError;
use crate::models::{Activity, Lap};
use chrono::NaiveDate;
use serde::Deserialize;

/// Garmin API client.
#[derive(Clone)]
pub struct GarminClient {
    http: reqwest::Client,
    sso_url: String,
    api_url: String,
}

/// An authenticated Garmin session.
///
/// Opaque to callers; holds the bearer token obtained at login.
#[derive(Clone)]
pub struct GarminSession {
    access_token: String,
}

impl GarminClient {
    /// Create a new client against the production Garmin endpoints.
    pub fn new() -> Self {
        Self::with_urls(
            "https://sso.garmin.com/sso".to_string(),
            "https://connectapi.garmin.com".to_string(),
        )
    }

    /// Create a client against custom endpoints (tests, proxies).
    pub fn with_urls(sso_url: String, api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            sso_url,
            api_url,
        }
    }

    /// Log in with account credentials and return a session.
    ///
    /// Garmin's SSO flow: post the credentials, pull the service ticket
    /// out of the response page, then exchange the ticket for an OAuth
    /// bearer token on the API host. Every failure along the way is an
    /// authentication error; the sync aborts rather than running with
    /// no provider.
    pub async fn login(&self, email: &str, password: &str) -> Result<GarminSession, AppError> {
        let response = self
            .http
            .post(format!("{}/signin", self.sso_url))
            .query(&[
                ("service", "https://connect.garmin.com/modern"),
                ("gauthHost", self.sso_url.as_str()),
            ])
            .form(&[("username", email), ("password", password), ("embed", "false")])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("SSO request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Auth(format!(
                "SSO signin failed with status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Auth(format!("SSO response unreadable: {}", e)))?;

        let ticket = extract_ticket(&body).ok_or_else(|| {
            AppError::Auth("no service ticket in SSO response (wrong credentials?)".to_string())
        })?;

        let token: TokenExchangeResponse = {
            let response = self
                .http
                .post(format!(
                    "{}/oauth-service/oauth/exchange/user/2.0",
                    self.api_url
                ))
                .form(&[("ticket", ticket.as_str())])
                .send()
                .await
                .map_err(|e| AppError::Auth(format!("Ticket exchange failed: {}", e)))?;

            if !response.status().is_success() {
                return Err(AppError::Auth(format!(
                    "Ticket exchange failed with status {}",
                    response.status()
                )));
            }

            response
                .json()
                .await
                .map_err(|e| AppError::Auth(format!("Token response parse error: {}", e)))?
        };

        tracing::info!("Garmin login successful");

        Ok(GarminSession {
            access_token: token.access_token,
        })
    }

    /// List recent activities starting at `start`, newest first.
    ///
    /// Entries whose start time is missing or unparseable have no dedup
    /// key and are dropped with a warning.
    pub async fn list_activities(
        &self,
        session: &GarminSession,
        start: usize,
        limit: usize,
    ) -> Result<Vec<Activity>, AppError> {
        let url = format!(
            "{}/activitylist-service/activities/search/activities",
            self.api_url
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(&[("start", start.to_string()), ("limit", limit.to_string())])
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        let raw: Vec<GarminActivity> = self.check_response_json(response).await?;

        let activities = raw
            .into_iter()
            .filter_map(|entry| {
                let id = entry.activity_id;
                match entry.normalize() {
                    Some(activity) => Some(activity),
                    None => {
                        tracing::warn!(activity_id = id, "Activity has no usable start time, skipping");
                        None
                    }
                }
            })
            .collect();

        Ok(activities)
    }

    /// Fetch the lap splits for one activity.
    ///
    /// An activity without laps legitimately returns an empty list.
    pub async fn get_splits(
        &self,
        session: &GarminSession,
        activity_id: u64,
    ) -> Result<Vec<Lap>, AppError> {
        let url = format!(
            "{}/activity-service/activity/{}/splits",
            self.api_url, activity_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .send()
            .await
            .map_err(|e| AppError::GarminApi(e.to_string()))?;

        let raw: GarminSplits = self.check_response_json(response).await?;

        let laps = raw
            .lap_summaries
            .into_iter()
            .enumerate()
            .map(|(position, lap)| lap.normalize(position as u32 + 1))
            .collect();

        Ok(laps)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Garmin rate limit hit (429)");
                return Err(AppError::GarminApi("Rate limit exceeded".to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::Auth("Session rejected (401)".to_string()));
            }

            return Err(AppError::GarminApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GarminApi(format!("JSON parse error: {}", e)))
    }
}

impl Default for GarminClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Client + session bundle exposing the provider capability the sync
/// engine consumes.
pub struct GarminSource {
    client: GarminClient,
    session: GarminSession,
}

impl GarminSource {
    pub fn new(client: GarminClient, session: GarminSession) -> Self {
        Self { client, session }
    }
}

#[async_trait::async_trait]
impl crate::services::sync::ActivitySource for GarminSource {
    async fn recent_activities(&self, window: usize) -> Result<Vec<Activity>, AppError> {
        self.client.list_activities(&self.session, 0, window).await
    }

    async fn activity_laps(&self, activity_id: u64) -> Result<Vec<Lap>, AppError> {
        self.client.get_splits(&self.session, activity_id).await
    }
}

/// Pull the CAS service ticket out of the SSO response page.
fn extract_ticket(body: &str) -> Option<String> {
    let rest = body.split("ticket=").nth(1)?;
    let ticket: String = rest
        .chars()
        .take_while(|c| !matches!(c, '"' | '\'' | '&' | ')'))
        .collect();
    if ticket.is_empty() {
        None
    } else {
        Some(ticket)
    }
}

/// Token exchange response from the Garmin OAuth service.
#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

/// Raw activity entry from the activity search endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminActivity {
    activity_id: u64,
    activity_name: Option<String>,
    start_time_local: Option<String>,
    activity_type: Option<GarminActivityType>,
    distance: Option<f64>,
    duration: Option<f64>,
    #[serde(rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(rename = "maxHR")]
    max_hr: Option<f64>,
    avg_power: Option<f64>,
    #[serde(rename = "vO2MaxValue")]
    vo2_max_value: Option<f64>,
    aerobic_training_effect: Option<f64>,
    anaerobic_training_effect: Option<f64>,
    average_running_cadence_in_steps_per_minute: Option<f64>,
    average_stride_length: Option<f64>,
    elevation_gain: Option<f64>,
    calories: Option<f64>,
}

/// Sport type wrapper (`{"typeKey": "running"}`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminActivityType {
    type_key: String,
}

impl GarminActivity {
    /// Normalize into the crate's [`Activity`] record.
    ///
    /// Returns `None` when the local start time cannot be reduced to a
    /// calendar day, since such an activity cannot be dedup-keyed.
    fn normalize(self) -> Option<Activity> {
        let date = parse_local_date(self.start_time_local.as_deref()?)?;

        Some(Activity {
            id: self.activity_id,
            name: self
                .activity_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Run".to_string()),
            activity_type: self
                .activity_type
                .map(|t| t.type_key)
                .unwrap_or_default(),
            date,
            distance_meters: self.distance.unwrap_or_default(),
            duration_seconds: self.duration.unwrap_or_default(),
            average_hr: self.average_hr.unwrap_or_default(),
            max_hr: self.max_hr.unwrap_or_default(),
            average_power_watts: self.avg_power.unwrap_or_default(),
            cadence_spm: self
                .average_running_cadence_in_steps_per_minute
                .unwrap_or_default(),
            stride_length_cm: self.average_stride_length.unwrap_or_default(),
            elevation_gain_m: self.elevation_gain.unwrap_or_default(),
            calories: self.calories.unwrap_or_default(),
            vo2_max: self.vo2_max_value.unwrap_or_default(),
            aerobic_effect: self.aerobic_training_effect.unwrap_or_default(),
            anaerobic_effect: self.anaerobic_training_effect.unwrap_or_default(),
        })
    }
}

/// Truncate a `"YYYY-MM-DD HH:MM:SS"` local timestamp to its day.
fn parse_local_date(start_time_local: &str) -> Option<NaiveDate> {
    let day = start_time_local.get(..10)?;
    day.parse().ok()
}

/// Splits payload envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminSplits {
    #[serde(default)]
    lap_summaries: Vec<GarminLap>,
}

/// Raw lap entry from the splits endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GarminLap {
    distance: Option<f64>,
    duration: Option<f64>,
    average_speed: Option<f64>,
    #[serde(rename = "averageHR")]
    average_hr: Option<f64>,
    #[serde(rename = "maxHR")]
    max_hr: Option<f64>,
    average_power: Option<f64>,
    average_run_cadence: Option<f64>,
    stride_length: Option<f64>,
    elevation_gain: Option<f64>,
}

impl GarminLap {
    fn normalize(self, index: u32) -> Lap {
        Lap {
            index,
            distance_meters: self.distance.unwrap_or_default(),
            duration_seconds: self.duration.unwrap_or_default(),
            average_speed_mps: self.average_speed.unwrap_or_default(),
            average_hr: self.average_hr.unwrap_or_default(),
            max_hr: self.max_hr.unwrap_or_default(),
            average_power_watts: self.average_power.unwrap_or_default(),
            cadence_spm: self.average_run_cadence.unwrap_or_default(),
            stride_length_cm: self.stride_length.unwrap_or_default(),
            elevation_gain_m: self.elevation_gain.unwrap_or_default(),
        }
    }
}
