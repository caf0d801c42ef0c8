//! Primary live source: the national weather service's conventional-observation endpoint.
//!
//! The service answers in two steps. The first call, authenticated with an API key,
//! returns a short-lived URL; the second call fetches the observation array from it.

use crate::live::error::LiveSourceError;
use crate::live::source::{
    get_json, get_json_from, parse_timestamp, with_time_of_day, FetchTarget, LiveSource,
};
use crate::types::snapshot::LiveWeatherSnapshot;
use crate::types::weather_condition::WeatherCondition;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

const SOURCE_NAME: &str = "aemet";

/// Envelope returned by the first call.
#[derive(Debug, Deserialize)]
struct DataPointer {
    datos: Option<String>,
    #[serde(default)]
    descripcion: Option<String>,
}

/// One row of the observation array. Only the fields used for mapping are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AemetObservation {
    /// Air temperature, °C.
    pub ta: Option<f64>,
    /// Relative humidity, %.
    pub hr: Option<f64>,
    /// Mean wind speed, km/h.
    pub vv: Option<f64>,
    /// Precipitation, mm.
    pub prec: Option<f64>,
    /// Visibility, km.
    pub vis: Option<f64>,
    /// End of the observation interval.
    pub fint: Option<String>,
}

/// Threshold rules for the observation-derived condition, before the day/night switch.
fn classify(obs: &AemetObservation, humidity: f64) -> (WeatherCondition, &'static str) {
    if obs.prec.is_some_and(|p| p > 0.0) {
        (WeatherCondition::Rainy, "rain")
    } else if obs.vis.is_some_and(|v| v < 1.0) {
        (WeatherCondition::Foggy, "fog")
    } else if humidity > 90.0 {
        (WeatherCondition::Cloudy, "overcast")
    } else if humidity > 70.0 {
        (WeatherCondition::PartlySunny, "partly_cloudy")
    } else {
        (WeatherCondition::Sunny, "clear")
    }
}

/// Maps the most recent observation row to a snapshot.
///
/// Temperature, humidity and timestamp are required; missing wind counts as calm.
pub fn map_observation(obs: &AemetObservation) -> Result<LiveWeatherSnapshot, LiveSourceError> {
    let missing = |field| LiveSourceError::MissingField {
        source_name: SOURCE_NAME,
        field,
    };
    let temperature = obs.ta.ok_or_else(|| missing("ta"))?;
    let humidity = obs.hr.ok_or_else(|| missing("hr"))?;
    let observed_at = parse_timestamp(obs.fint.as_deref().ok_or_else(|| missing("fint"))?)?;

    let (condition, label) = classify(obs, humidity);
    let (condition, label) = with_time_of_day(condition, label, observed_at);

    Ok(LiveWeatherSnapshot {
        temperature_c: temperature.round() as i32,
        humidity_pct: humidity.round().clamp(0.0, 100.0) as u8,
        wind_speed_kmh: obs.vv.unwrap_or(0.0).round().max(0.0) as u32,
        condition,
        label: label.to_string(),
        observed_at,
    })
}

pub struct AemetSource {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl AemetSource {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    fn observation_url(&self, station_id: &str) -> String {
        format!(
            "{}/observacion/convencional/datos/estacion/{}",
            self.base_url, station_id
        )
    }
}

#[async_trait]
impl LiveSource for AemetSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch(&self, target: FetchTarget<'_>) -> Result<LiveWeatherSnapshot, LiveSourceError> {
        let station_id = target
            .station_id
            .ok_or(LiveSourceError::MissingStationId(SOURCE_NAME))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LiveSourceError::NotConfigured(SOURCE_NAME))?;

        let url = self.observation_url(station_id);
        let pointer: DataPointer =
            get_json(self.client.get(&url).header("api_key", api_key), &url).await?;
        let data_url = pointer.datos.ok_or_else(|| {
            debug!(
                "AEMET returned no data URL for {}: {}",
                station_id,
                pointer.descripcion.as_deref().unwrap_or("no description")
            );
            LiveSourceError::MissingField {
                source_name: SOURCE_NAME,
                field: "datos",
            }
        })?;

        let observations: Vec<AemetObservation> = get_json_from(&self.client, &data_url).await?;
        let latest = observations
            .last()
            .ok_or_else(|| LiveSourceError::EmptyObservations(station_id.to_string()))?;
        map_observation(latest)
    }
}
