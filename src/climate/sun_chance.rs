//! The sunny-day statistic for one station and one calendar window.

use crate::types::daily_record::DailyWeatherRecord;
use crate::types::sun_chance::{Confidence, SunChance};
use chrono::{Datelike, NaiveDate};

/// A day is sunny when it recorded strictly more sun hours than this, and no rain.
pub const SUNNY_DAY_MIN_SUN_HOURS: f64 = 6.0;
/// Multiplier applied to the precipitation-proxy count at northern-exposure stations.
pub const NORTHERN_PROXY_DAMPING: f64 = 0.85;
pub const HIGH_CONFIDENCE_MIN_DAYS: u32 = 50;
pub const MEDIUM_CONFIDENCE_MIN_DAYS: u32 = 20;

/// The calendar slice a climatology query covers, matched against every year of history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayWindow {
    /// Days `first_day..=last_day` of `month`.
    Month {
        month: u32,
        first_day: u32,
        last_day: u32,
    },
    /// Ordinal days `first..=last` of the year (1-based).
    Ordinal { first: u32, last: u32 },
}

impl DayWindow {
    /// A whole month. `None` if `month` is not 1-12.
    pub fn month(month: u32) -> Option<Self> {
        Self::month_days(month, 1, 31)
    }

    /// Part of a month. `None` unless `1 <= first_day <= last_day <= 31` and `month` is 1-12.
    pub fn month_days(month: u32, first_day: u32, last_day: u32) -> Option<Self> {
        ((1..=12).contains(&month) && 1 <= first_day && first_day <= last_day && last_day <= 31)
            .then_some(DayWindow::Month {
                month,
                first_day,
                last_day,
            })
    }

    /// A range of ordinal days. `None` unless `1 <= first <= last <= 366`.
    pub fn ordinal(first: u32, last: u32) -> Option<Self> {
        (1 <= first && first <= last && last <= 366).then_some(DayWindow::Ordinal { first, last })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DayWindow::Month {
                month,
                first_day,
                last_day,
            } => date.month() == month && (first_day..=last_day).contains(&date.day()),
            DayWindow::Ordinal { first, last } => (first..=last).contains(&date.ordinal()),
        }
    }
}

fn is_sunny_by_sun_hours(record: &DailyWeatherRecord) -> bool {
    record
        .sun_hours
        .is_some_and(|hours| hours > SUNNY_DAY_MIN_SUN_HOURS)
        && record.is_dry()
}

/// Computes the sun chance over the records that fall inside `window`.
///
/// Records from every year count. When any selected record carries sun hours, the sun-hours
/// rule decides; otherwise dry days are counted as a proxy, damped for northern-exposure
/// stations. No matching records yields [`SunChance::empty`].
///
/// ```
/// use chrono::NaiveDate;
/// use islas_weather::{compute_sun_chance, Confidence, DailyWeatherRecord, DayWindow};
///
/// let day = |d| NaiveDate::from_ymd_opt(2024, 7, d).unwrap();
/// let records = vec![
///     DailyWeatherRecord { sun_hours: Some(6.1), precipitation: Some(0.0), ..DailyWeatherRecord::empty("C649I", day(1)) },
///     DailyWeatherRecord { sun_hours: Some(6.0), precipitation: Some(0.0), ..DailyWeatherRecord::empty("C649I", day(2)) },
/// ];
/// let chance = compute_sun_chance(&records, DayWindow::month(7).unwrap(), false);
/// assert_eq!((chance.sunny_days, chance.total_days, chance.percentage), (1, 2, 50));
/// assert_eq!(chance.confidence, Confidence::Low);
/// ```
pub fn compute_sun_chance(
    records: &[DailyWeatherRecord],
    window: DayWindow,
    northern_exposure: bool,
) -> SunChance {
    let selected: Vec<&DailyWeatherRecord> =
        records.iter().filter(|r| window.contains(r.date)).collect();
    let total_days = selected.len() as u32;
    if total_days == 0 {
        return SunChance::empty();
    }

    let from_sun_hours = selected.iter().any(|r| r.sun_hours.is_some());
    let sunny_days = if from_sun_hours {
        selected.iter().filter(|r| is_sunny_by_sun_hours(r)).count() as u32
    } else {
        let dry = selected.iter().filter(|r| r.is_dry()).count() as u32;
        if northern_exposure {
            (f64::from(dry) * NORTHERN_PROXY_DAMPING).round() as u32
        } else {
            dry
        }
    };

    let confidence = if total_days >= HIGH_CONFIDENCE_MIN_DAYS && from_sun_hours {
        Confidence::High
    } else if total_days >= MEDIUM_CONFIDENCE_MIN_DAYS {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    SunChance {
        sunny_days,
        total_days,
        percentage: (f64::from(sunny_days) / f64::from(total_days) * 100.0).round() as u8,
        confidence,
        from_sun_hours,
    }
}
