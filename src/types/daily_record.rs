use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day of historical observations for one station.
///
/// `(station_id, date)` is unique within a store. Every measurement is nullable because the
/// national service routinely omits fields; `temp_avg_interpolated` marks a mean temperature
/// that was synthesized by [`fill_mean_temperature_gaps`](crate::fill_mean_temperature_gaps)
/// rather than observed.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DailyWeatherRecord {
    pub station_id: String,
    pub date: NaiveDate,
    #[serde(rename = "tmax", default)]
    pub temp_max: Option<f64>, // °C
    #[serde(rename = "tmin", default)]
    pub temp_min: Option<f64>, // °C
    #[serde(rename = "tavg", default)]
    pub temp_avg: Option<f64>, // °C
    #[serde(rename = "precip", default)]
    pub precipitation: Option<f64>, // mm
    #[serde(rename = "sol", default)]
    pub sun_hours: Option<f64>, // hours
    #[serde(rename = "wind_avg", default)]
    pub wind_speed_avg: Option<f64>, // km/h
    #[serde(rename = "tavg_interpolated", default)]
    pub temp_avg_interpolated: bool,
}

impl DailyWeatherRecord {
    /// An empty record for `station_id` on `date`, every measurement absent.
    pub fn empty(station_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            station_id: station_id.into(),
            date,
            temp_max: None,
            temp_min: None,
            temp_avg: None,
            precipitation: None,
            sun_hours: None,
            wind_speed_avg: None,
            temp_avg_interpolated: false,
        }
    }

    /// A day is dry when precipitation is absent or not positive.
    pub fn is_dry(&self) -> bool {
        self.precipitation.map_or(true, |p| p <= 0.0)
    }
}
