//! Inverse-distance blending of per-station results into a single point estimate.
//!
//! Numeric fields are blended by weight. Categorical fields (condition, label, confidence)
//! are never blended: they come from the nearest contributing station.

use crate::interpolation::math::{idw_weights, weighted_mean};
use crate::types::attribution::{Attribution, AttributionMode, Contribution};
use crate::types::snapshot::LiveWeatherSnapshot;
use crate::types::sun_chance::SunChance;
use ordered_float::OrderedFloat;

/// One station's result and its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct StationObservation<T> {
    pub station_id: String,
    pub distance_km: f64,
    pub value: T,
}

impl<T> StationObservation<T> {
    pub fn new(station_id: impl Into<String>, distance_km: f64, value: T) -> Self {
        Self {
            station_id: station_id.into(),
            distance_km,
            value,
        }
    }
}

/// Sorts observations nearest-first and computes their weights and attribution.
///
/// A single observation is reported in single-station mode with weight 1.
fn attribute<T>(
    mut observations: Vec<StationObservation<T>>,
) -> Option<(Vec<StationObservation<T>>, Vec<f64>, Attribution)> {
    if observations.is_empty() {
        return None;
    }
    observations.sort_by_key(|o| OrderedFloat(o.distance_km));

    if observations.len() == 1 {
        let attribution =
            Attribution::single(observations[0].station_id.clone(), observations[0].distance_km);
        return Some((observations, vec![1.0], attribution));
    }

    let distances: Vec<f64> = observations.iter().map(|o| o.distance_km).collect();
    let weights = idw_weights(&distances);
    let contributions = observations
        .iter()
        .zip(&weights)
        .map(|(o, &weight)| Contribution {
            station_id: o.station_id.clone(),
            distance_km: o.distance_km,
            weight,
        })
        .collect();

    Some((
        observations,
        weights,
        Attribution {
            mode: AttributionMode::Interpolated,
            contributions,
        },
    ))
}

/// Blends live snapshots.
///
/// Temperature, humidity and wind speed are weighted means (rounded); condition, label and
/// observation time are the nearest station's. Returns `None` when no station produced data.
pub fn blend_live(
    observations: Vec<StationObservation<LiveWeatherSnapshot>>,
) -> Option<(LiveWeatherSnapshot, Attribution)> {
    let (observations, weights, attribution) = attribute(observations)?;

    let field = |f: fn(&LiveWeatherSnapshot) -> f64| -> f64 {
        let values: Vec<f64> = observations.iter().map(|o| f(&o.value)).collect();
        weighted_mean(&values, &weights)
    };
    let temperature = field(|s| f64::from(s.temperature_c));
    let humidity = field(|s| f64::from(s.humidity_pct));
    let wind = field(|s| f64::from(s.wind_speed_kmh));

    let nearest = &observations[0].value;
    let blended = LiveWeatherSnapshot {
        temperature_c: temperature.round() as i32,
        humidity_pct: humidity.round().clamp(0.0, 100.0) as u8,
        wind_speed_kmh: wind.round().max(0.0) as u32,
        condition: nearest.condition,
        label: nearest.label.clone(),
        observed_at: nearest.observed_at,
    };
    Some((blended, attribution))
}

/// Blends sun-chance results.
///
/// The percentage is the weighted mean. Sunny-day and total-day counts are plain unweighted
/// means across contributors, for display; they are not a merged sample and will generally
/// not reproduce the percentage. Confidence comes from the nearest station.
pub fn blend_sun_chance(
    observations: Vec<StationObservation<SunChance>>,
) -> Option<(SunChance, Attribution)> {
    let (observations, weights, attribution) = attribute(observations)?;

    let percentages: Vec<f64> = observations
        .iter()
        .map(|o| f64::from(o.value.percentage))
        .collect();
    let percentage = weighted_mean(&percentages, &weights);

    let n = observations.len() as f64;
    let mean_sunny = observations
        .iter()
        .map(|o| f64::from(o.value.sunny_days))
        .sum::<f64>()
        / n;
    let mean_total = observations
        .iter()
        .map(|o| f64::from(o.value.total_days))
        .sum::<f64>()
        / n;

    let nearest = &observations[0].value;
    let blended = SunChance {
        sunny_days: mean_sunny.round() as u32,
        total_days: mean_total.round() as u32,
        percentage: percentage.round().clamp(0.0, 100.0) as u8,
        confidence: nearest.confidence,
        from_sun_hours: nearest.from_sun_hours,
    };
    Some((blended, attribution))
}
