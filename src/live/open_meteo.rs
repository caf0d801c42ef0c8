//! Fallback live source: a global forecast API queried by raw coordinates.

use crate::live::error::LiveSourceError;
use crate::live::source::{get_json_from, parse_timestamp, with_time_of_day, FetchTarget, LiveSource};
use crate::types::snapshot::LiveWeatherSnapshot;
use crate::types::weather_condition::WeatherCondition;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const SOURCE_NAME: &str = "open-meteo";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub time: String,
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub weather_code: i64,
    pub wind_speed_10m: f64,
}

/// Maps the `current` block to a snapshot, applying the WMO table and the day/night switch.
pub fn map_current(current: &CurrentConditions) -> Result<LiveWeatherSnapshot, LiveSourceError> {
    let observed_at = parse_timestamp(&current.time)?;
    let (condition, label) = WeatherCondition::from_wmo_code(current.weather_code);
    let (condition, label) = with_time_of_day(condition, label, observed_at);

    Ok(LiveWeatherSnapshot {
        temperature_c: current.temperature_2m.round() as i32,
        humidity_pct: current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
        wind_speed_kmh: current.wind_speed_10m.round().max(0.0) as u32,
        condition,
        label: label.to_string(),
        observed_at,
    })
}

pub struct OpenMeteoSource {
    client: Client,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn forecast_url(&self, target: &FetchTarget<'_>) -> String {
        format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m&timezone=GMT",
            self.base_url,
            target.location.latitude(),
            target.location.longitude()
        )
    }
}

#[async_trait]
impl LiveSource for OpenMeteoSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, target: FetchTarget<'_>) -> Result<LiveWeatherSnapshot, LiveSourceError> {
        let url = self.forecast_url(&target);
        let response: ForecastResponse = get_json_from(&self.client, &url).await?;
        map_current(&response.current)
    }
}
