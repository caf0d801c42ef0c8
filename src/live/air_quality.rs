//! Saharan dust ("calima") status from the air-quality API's current PM10 reading.

use crate::geo::LatLon;
use crate::live::error::LiveSourceError;
use crate::live::source::{get_json_from, parse_timestamp};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// PM10 concentration (µg/m³) at which a dust alert is raised.
pub const CALIMA_ALERT_PM10: f64 = 50.0;
/// PM10 concentration (µg/m³) at which the alert is marked severe.
pub const CALIMA_SEVERE_PM10: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalimaLevel {
    None,
    Alert,
    Severe,
}

impl CalimaLevel {
    pub fn from_pm10(pm10: f64) -> Self {
        if pm10 >= CALIMA_SEVERE_PM10 {
            CalimaLevel::Severe
        } else if pm10 >= CALIMA_ALERT_PM10 {
            CalimaLevel::Alert
        } else {
            CalimaLevel::None
        }
    }

    pub fn is_alert(self) -> bool {
        self != CalimaLevel::None
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalimaStatus {
    pub pm10: f64,
    pub level: CalimaLevel,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: CurrentAirQuality,
}

#[derive(Debug, Deserialize)]
struct CurrentAirQuality {
    time: String,
    pm10: Option<f64>,
}

pub struct AirQualityClient {
    client: Client,
    base_url: String,
}

impl AirQualityClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, point: LatLon) -> String {
        format!(
            "{}/air-quality?latitude={}&longitude={}&current=pm10&timezone=GMT",
            self.base_url,
            point.latitude(),
            point.longitude()
        )
    }

    /// Fetches the current dust status at `point`.
    pub async fn calima_status(&self, point: LatLon) -> Result<CalimaStatus, LiveSourceError> {
        let url = self.url(point);
        let response: AirQualityResponse = get_json_from(&self.client, &url).await?;
        parse_current(response.current)
    }
}

fn parse_current(current: CurrentAirQuality) -> Result<CalimaStatus, LiveSourceError> {
    let pm10 = current.pm10.ok_or(LiveSourceError::MissingField {
        source_name: "air-quality",
        field: "pm10",
    })?;
    Ok(CalimaStatus {
        pm10,
        level: CalimaLevel::from_pm10(pm10),
        observed_at: parse_timestamp(&current.time)?,
    })
}
