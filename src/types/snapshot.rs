use crate::types::weather_condition::WeatherCondition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current conditions at one station, or a blend of up to three stations.
///
/// Snapshots are always replaced wholesale; no code path updates individual fields of a
/// snapshot that has already been produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveWeatherSnapshot {
    /// Air temperature in °C, rounded to the nearest integer.
    pub temperature_c: i32,
    /// Relative humidity in percent (0-100).
    pub humidity_pct: u8,
    /// Mean wind speed in km/h, rounded.
    pub wind_speed_kmh: u32,
    pub condition: WeatherCondition,
    /// Opaque display-label key (e.g. `"partly_cloudy"`), translated by the UI layer.
    pub label: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub observed_at: DateTime<Utc>,
}

impl LiveWeatherSnapshot {
    /// Field-level sanity check applied before trusting a snapshot read back from disk.
    pub fn is_plausible(&self) -> bool {
        self.humidity_pct <= 100
            && (-60..=70).contains(&self.temperature_c)
            && self.wind_speed_kmh < 500
            && !self.label.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> LiveWeatherSnapshot {
        LiveWeatherSnapshot {
            temperature_c: 23,
            humidity_pct: 64,
            wind_speed_kmh: 18,
            condition: WeatherCondition::Sunny,
            label: "clear".to_string(),
            observed_at: Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn plausible_snapshot_passes() {
        assert!(snapshot().is_plausible());
    }

    #[test]
    fn implausible_fields_are_rejected() {
        let mut s = snapshot();
        s.humidity_pct = 140;
        assert!(!s.is_plausible());

        let mut s = snapshot();
        s.label = "  ".to_string();
        assert!(!s.is_plausible());

        let mut s = snapshot();
        s.temperature_c = 99;
        assert!(!s.is_plausible());
    }
}
