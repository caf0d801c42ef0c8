//! The seam between the fetch pipeline and the remote services that supply live data.

use crate::geo::LatLon;
use crate::live::error::LiveSourceError;
use crate::types::snapshot::LiveWeatherSnapshot;
use crate::types::weather_condition::WeatherCondition;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Timelike, Utc};
use chrono_tz::Atlantic::Canary;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// What a source is asked to observe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchTarget<'a> {
    /// Station code, when the request is for a catalogued station.
    pub station_id: Option<&'a str>,
    /// Position used by coordinate-based sources.
    pub location: LatLon,
}

/// One remote provider of current conditions.
///
/// The pipeline tries its sources in order and stops at the first `Ok`; any `Err` moves it
/// on to the next source, so implementations report every failure as a value.
#[async_trait]
pub trait LiveSource: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &'static str;

    async fn fetch(&self, target: FetchTarget<'_>) -> Result<LiveWeatherSnapshot, LiveSourceError>;
}

/// Local hour at which the night variants start.
pub const NIGHT_START_HOUR: u32 = 20;
/// Local hour at which the day variants resume.
pub const DAY_START_HOUR: u32 = 7;

/// Whether `at` falls in the archipelago's night window (local hour ≥ 20 or < 7).
pub fn is_night(at: DateTime<Utc>) -> bool {
    let hour = at.with_timezone(&Canary).hour();
    !(DAY_START_HOUR..NIGHT_START_HOUR).contains(&hour)
}

/// Applies the day/night switch to a daytime condition and its label key.
pub fn with_time_of_day(
    condition: WeatherCondition,
    label: &'static str,
    observed_at: DateTime<Utc>,
) -> (WeatherCondition, &'static str) {
    if !is_night(observed_at) {
        return (condition, label);
    }
    match condition.at_night() {
        WeatherCondition::ClearNight => (WeatherCondition::ClearNight, "clear_night"),
        WeatherCondition::PartlyCloudyNight => {
            (WeatherCondition::PartlyCloudyNight, "partly_cloudy_night")
        }
        other => (other, label),
    }
}

/// Parses the timestamp formats used by the services: RFC 3339, or a naive ISO date-time
/// (with or without seconds) interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, LiveSourceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| LiveSourceError::InvalidTimestamp(raw.to_string()))
}

/// Sends a GET request and decodes a JSON body, mapping each failure to its error variant.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, LiveSourceError> {
    let response = request
        .send()
        .await
        .map_err(|e| LiveSourceError::NetworkRequest(url.to_string(), e))?;

    let response = match response.error_for_status() {
        Ok(resp) => resp,
        Err(e) => {
            return Err(if let Some(status) = e.status() {
                LiveSourceError::HttpStatus {
                    url: url.to_string(),
                    status,
                    source: e,
                }
            } else {
                LiveSourceError::NetworkRequest(url.to_string(), e)
            });
        }
    };

    let body = response
        .text()
        .await
        .map_err(|e| LiveSourceError::NetworkRequest(url.to_string(), e))?;
    serde_json::from_str(&body).map_err(|e| LiveSourceError::JsonParse(url.to_string(), e))
}

/// Convenience for a plain GET with `client`.
pub(crate) async fn get_json_from<T: DeserializeOwned>(
    client: &Client,
    url: &str,
) -> Result<T, LiveSourceError> {
    get_json(client.get(url), url).await
}
