//! Defines the closed `WeatherCondition` enumeration shown to users, and the fixed mapping
//! from WMO weather codes (as reported by the Open-Meteo fallback source) to it.

use serde::{Deserialize, Serialize};

/// The weather condition tag attached to a [`LiveWeatherSnapshot`](crate::LiveWeatherSnapshot).
///
/// The set is closed: every source maps its raw data onto one of these nine variants. The
/// two night variants replace [`Sunny`](WeatherCondition::Sunny) and
/// [`PartlySunny`](WeatherCondition::PartlySunny) outside daylight hours.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    Sunny,
    PartlySunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
    Foggy,
    ClearNight,
    PartlyCloudyNight,
}

/// Label key used when a WMO code is not present in the mapping table.
pub const UNKNOWN_LABEL: &str = "unknown";

impl WeatherCondition {
    /// Returns the night variant of a daytime condition.
    ///
    /// Only `Sunny` and `PartlySunny` have night variants; every other condition is
    /// returned unchanged.
    pub fn at_night(self) -> Self {
        match self {
            WeatherCondition::Sunny => WeatherCondition::ClearNight,
            WeatherCondition::PartlySunny => WeatherCondition::PartlyCloudyNight,
            other => other,
        }
    }

    /// Maps a WMO weather interpretation code to a condition and its display-label key.
    ///
    /// Codes outside the table default to `(Cloudy, "unknown")`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use islas_weather::WeatherCondition;
    ///
    /// assert_eq!(
    ///     WeatherCondition::from_wmo_code(61),
    ///     (WeatherCondition::Rainy, "rain_slight")
    /// );
    /// assert_eq!(
    ///     WeatherCondition::from_wmo_code(42),
    ///     (WeatherCondition::Cloudy, "unknown")
    /// );
    /// ```
    pub fn from_wmo_code(code: i64) -> (Self, &'static str) {
        match code {
            0 => (WeatherCondition::Sunny, "clear"),
            1 => (WeatherCondition::Sunny, "mainly_clear"),
            2 => (WeatherCondition::PartlySunny, "partly_cloudy"),
            3 => (WeatherCondition::Cloudy, "overcast"),
            45 => (WeatherCondition::Foggy, "fog"),
            48 => (WeatherCondition::Foggy, "rime_fog"),
            51 => (WeatherCondition::Rainy, "drizzle_light"),
            53 => (WeatherCondition::Rainy, "drizzle_moderate"),
            55 => (WeatherCondition::Rainy, "drizzle_dense"),
            56 | 57 => (WeatherCondition::Rainy, "freezing_drizzle"),
            61 => (WeatherCondition::Rainy, "rain_slight"),
            63 => (WeatherCondition::Rainy, "rain_moderate"),
            65 => (WeatherCondition::Rainy, "rain_heavy"),
            66 | 67 => (WeatherCondition::Rainy, "freezing_rain"),
            71 => (WeatherCondition::Snowy, "snow_slight"),
            73 => (WeatherCondition::Snowy, "snow_moderate"),
            75 => (WeatherCondition::Snowy, "snow_heavy"),
            77 => (WeatherCondition::Snowy, "snow_grains"),
            80 => (WeatherCondition::Rainy, "showers_slight"),
            81 => (WeatherCondition::Rainy, "showers_moderate"),
            82 => (WeatherCondition::Rainy, "showers_violent"),
            85 | 86 => (WeatherCondition::Snowy, "snow_showers"),
            95 => (WeatherCondition::Stormy, "thunderstorm"),
            96 | 99 => (WeatherCondition::Stormy, "thunderstorm_hail"),
            _ => (WeatherCondition::Cloudy, UNKNOWN_LABEL),
        }
    }
}
