//! Temporal gap filling for the daily mean temperature.

use crate::interpolation::math::lerp;
use crate::types::daily_record::DailyWeatherRecord;
use log::debug;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fills missing mean temperatures in place and returns how many were synthesized.
///
/// Records are sorted by station and date first. For each gap the nearest observed means
/// before and after it on the same station are used: both present gives a linear
/// interpolation by calendar day, one present is copied. With neither, the midpoint of that
/// day's max and min is used when both exist. Only observed values serve as neighbours, so
/// results do not depend on fill order. Synthesized values are rounded to 0.1 °C and flagged.
pub fn fill_mean_temperature_gaps(records: &mut [DailyWeatherRecord]) -> usize {
    records.sort_by(|a, b| a.station_id.cmp(&b.station_id).then(a.date.cmp(&b.date)));

    let observed: Vec<Option<f64>> = records
        .iter()
        .map(|r| r.temp_avg.filter(|_| !r.temp_avg_interpolated))
        .collect();

    let mut filled = 0;
    let mut start = 0;
    while start < records.len() {
        let station = records[start].station_id.clone();
        let end = records[start..]
            .iter()
            .position(|r| r.station_id != station)
            .map_or(records.len(), |offset| start + offset);

        for i in start..end {
            if records[i].temp_avg.is_some() {
                continue;
            }
            let before = (start..i).rev().find_map(|j| observed[j].map(|v| (j, v)));
            let after = (i + 1..end).find_map(|j| observed[j].map(|v| (j, v)));

            let value = match (before, after) {
                (Some((j, a)), Some((k, b))) => {
                    let span = (records[k].date - records[j].date).num_days() as f64;
                    let offset = (records[i].date - records[j].date).num_days() as f64;
                    Some(lerp(a, b, offset / span))
                }
                (Some((_, v)), None) | (None, Some((_, v))) => Some(v),
                (None, None) => match (records[i].temp_max, records[i].temp_min) {
                    (Some(max), Some(min)) => Some((max + min) / 2.0),
                    _ => None,
                },
            };

            if let Some(value) = value {
                records[i].temp_avg = Some(round_tenth(value));
                records[i].temp_avg_interpolated = true;
                filled += 1;
            }
        }
        start = end;
    }

    if filled > 0 {
        debug!("Synthesized {} mean temperatures", filled);
    }
    filled
}
