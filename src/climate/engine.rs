//! Climatology queries over the historical store.
//!
//! Every query here is best-effort enrichment: a store failure is logged and degrades to
//! the zero-data result instead of propagating.

use crate::climate::store::HistoricalStore;
use crate::climate::sun_chance::{compute_sun_chance, DayWindow};
use crate::geo::LatLon;
use crate::interpolation::blend::{blend_sun_chance, StationObservation};
use crate::stations::resolver::StationResolver;
use crate::types::attribution::PointResult;
use crate::types::daily_record::DailyWeatherRecord;
use crate::types::sun_chance::SunChance;
use crate::utils::{Clock, SystemClock};
use chrono::{Months, NaiveDate};
use chrono_tz::Atlantic::Canary;
use futures_util::future::join_all;
use log::warn;
use ordered_float::OrderedFloat;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::Arc;

/// How far back sun-chance queries reach.
pub const HISTORY_MONTHS: u32 = 120;
/// Length of a best-weeks window and the stride between window starts.
pub const WEEK_LENGTH_DAYS: u32 = 7;
/// Start day of the last window; it runs to the end of the year.
pub const LAST_WEEK_START: u32 = 358;
pub const BEST_WEEKS_COUNT: usize = 3;
pub const SUN_CHANCE_SCORE_FACTOR: f64 = 1.5;

/// Temperature term of the best-weeks score, from the window's mean daily maximum.
pub fn temperature_bonus(mean_max_c: Option<f64>) -> f64 {
    match mean_max_c {
        Some(t) if (24.0..=27.0).contains(&t) => 20.0,
        Some(t) if (22.0..=29.0).contains(&t) => 10.0,
        Some(t) if t < 20.0 || t > 32.0 => -15.0,
        _ => 0.0,
    }
}

/// One ranked seven-day window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekScore {
    /// First ordinal day of the year (1-based).
    pub first_day: u32,
    /// Last ordinal day, inclusive.
    pub last_day: u32,
    pub sun_chance: SunChance,
    pub mean_max_temp_c: Option<f64>,
    pub score: f64,
}

/// The calendar windows ranked by [`ClimateEngine::best_weeks`]: days 1-7, 8-14, …, 351-357
/// and a final window from day 358 to the end of the year.
pub fn week_windows() -> Vec<(u32, u32)> {
    (1..=LAST_WEEK_START)
        .step_by(WEEK_LENGTH_DAYS as usize)
        .map(|first| {
            let last = if first == LAST_WEEK_START {
                366
            } else {
                first + WEEK_LENGTH_DAYS - 1
            };
            (first, last)
        })
        .collect()
}

/// Scores every window over `records` and returns the best three, stable on ties.
pub fn rank_weeks(records: &[DailyWeatherRecord], northern_exposure: bool) -> Vec<WeekScore> {
    let mut scores: Vec<WeekScore> = week_windows()
        .into_iter()
        .filter_map(|(first, last)| {
            let window = DayWindow::ordinal(first, last)?;
            let sun_chance = compute_sun_chance(records, window, northern_exposure);
            if !sun_chance.has_data() {
                return None;
            }
            let maxima: Vec<f64> = records
                .iter()
                .filter(|r| window.contains(r.date))
                .filter_map(|r| r.temp_max)
                .collect();
            let mean_max_temp_c =
                (!maxima.is_empty()).then(|| maxima.iter().sum::<f64>() / maxima.len() as f64);
            let score = f64::from(sun_chance.percentage) * SUN_CHANCE_SCORE_FACTOR
                + temperature_bonus(mean_max_temp_c);
            Some(WeekScore {
                first_day: first,
                last_day: last,
                sun_chance,
                mean_max_temp_c,
                score,
            })
        })
        .collect();

    scores.sort_by_key(|w| Reverse(OrderedFloat(w.score)));
    scores.truncate(BEST_WEEKS_COUNT);
    scores
}

pub struct ClimateEngine {
    store: Arc<dyn HistoricalStore>,
    resolver: StationResolver,
    clock: Arc<dyn Clock>,
}

impl ClimateEngine {
    pub fn new(store: Arc<dyn HistoricalStore>, resolver: StationResolver) -> Self {
        Self::with_clock(store, resolver, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn HistoricalStore>,
        resolver: StationResolver,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            resolver,
            clock,
        }
    }

    fn history_start(&self) -> NaiveDate {
        let today = self.clock.now().with_timezone(&Canary).date_naive();
        today
            .checked_sub_months(Months::new(HISTORY_MONTHS))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Ten years of the station's records, or nothing if the store fails.
    async fn history(&self, station_id: &str) -> Vec<DailyWeatherRecord> {
        match self
            .store
            .daily_records(station_id, self.history_start())
            .await
        {
            Ok(mut records) => {
                records.retain(|r| r.station_id == station_id);
                records
            }
            Err(e) => {
                warn!("Historical store failed for {}: {}", station_id, e);
                Vec::new()
            }
        }
    }

    fn is_northern(&self, station_id: &str) -> bool {
        self.resolver
            .catalog()
            .get(station_id)
            .is_some_and(|s| s.northern_exposure)
    }

    /// Sun chance for one station over `window`. Zero days (including a failed store query)
    /// yields 0 % with low confidence.
    pub async fn sun_chance(&self, station_id: &str, window: DayWindow) -> SunChance {
        let records = self.history(station_id).await;
        compute_sun_chance(&records, window, self.is_northern(station_id))
    }

    /// Sun chance at an arbitrary point: single station within 5 km, otherwise an
    /// inverse-distance blend of the stations that have data.
    pub async fn sun_chance_at(&self, point: LatLon, window: DayWindow) -> PointResult<SunChance> {
        let Some(plan) = self.resolver.plan(point) else {
            return PointResult::Unavailable;
        };

        let queries = plan.stations().iter().map(|nearest| async move {
            let chance = self.sun_chance(&nearest.station.id, window).await;
            (nearest, chance)
        });
        let observations = join_all(queries)
            .await
            .into_iter()
            .filter(|(_, chance)| chance.has_data())
            .map(|(nearest, chance)| {
                StationObservation::new(nearest.station.id.clone(), nearest.distance_km, chance)
            })
            .collect();

        match blend_sun_chance(observations) {
            Some((value, attribution)) => PointResult::Available { value, attribution },
            None => PointResult::Unavailable,
        }
    }

    /// The three highest-scoring weeks of the year for a station. Empty when there is no
    /// history.
    pub async fn best_weeks(&self, station_id: &str) -> Vec<WeekScore> {
        let records = self.history(station_id).await;
        rank_weeks(&records, self.is_northern(station_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::error::StoreError;
    use crate::climate::store::InMemoryStore;
    use crate::stations::resolver::tests::{km_north, resolver, station};
    use crate::types::attribution::AttributionMode;
    use crate::types::sun_chance::Confidence;
    use crate::utils::tests::ManualClock;
    use async_trait::async_trait;
    use chrono::{Datelike, Days, TimeZone, Utc};

    struct FailingStore;

    #[async_trait]
    impl HistoricalStore for FailingStore {
        async fn daily_records(
            &self,
            _station_id: &str,
            _since: NaiveDate,
        ) -> Result<Vec<DailyWeatherRecord>, StoreError> {
            Err(StoreError::Unreachable("connection refused".to_string()))
        }
    }

    /// Answers from an in-memory store after a fixed delay per query.
    struct DelayedStore {
        inner: InMemoryStore,
        delay: std::time::Duration,
    }

    #[async_trait]
    impl HistoricalStore for DelayedStore {
        async fn daily_records(
            &self,
            station_id: &str,
            since: NaiveDate,
        ) -> Result<Vec<DailyWeatherRecord>, StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.daily_records(station_id, since).await
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn stations() -> StationResolver {
        resolver(vec![
            station("A", 28.0, -16.0, false),
            station("B", 28.0 + km_north(20.0), -16.0, false),
            station("C", 28.0 + km_north(40.0), -16.0, false),
        ])
    }

    /// Every day of `years` for `station`, sunny when `sunny(date)` holds.
    fn history(
        station_id: &str,
        years: std::ops::RangeInclusive<i32>,
        sunny: impl Fn(NaiveDate) -> bool,
        tmax: impl Fn(NaiveDate) -> f64,
    ) -> Vec<DailyWeatherRecord> {
        let mut out = Vec::new();
        for year in years {
            let mut date = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
            while date.year() == year {
                out.push(DailyWeatherRecord {
                    sun_hours: Some(if sunny(date) { 9.0 } else { 2.0 }),
                    precipitation: Some(0.0),
                    temp_max: Some(tmax(date)),
                    ..DailyWeatherRecord::empty(station_id, date)
                });
                date = date + Days::new(1);
            }
        }
        out
    }

    fn engine(store: InMemoryStore) -> ClimateEngine {
        ClimateEngine::with_clock(Arc::new(store), stations(), clock())
    }

    #[test]
    fn fifty_two_windows_ending_at_year_end() {
        let windows = week_windows();
        assert_eq!(windows.len(), 52);
        assert_eq!(windows[0], (1, 7));
        assert_eq!(windows[1], (8, 14));
        assert_eq!(windows[51], (358, 366));
    }

    #[test]
    fn temperature_bonus_bands() {
        assert_eq!(temperature_bonus(Some(25.0)), 20.0);
        assert_eq!(temperature_bonus(Some(22.5)), 10.0);
        assert_eq!(temperature_bonus(Some(28.5)), 10.0);
        assert_eq!(temperature_bonus(Some(21.0)), 0.0);
        assert_eq!(temperature_bonus(Some(30.0)), 0.0);
        assert_eq!(temperature_bonus(Some(19.5)), -15.0);
        assert_eq!(temperature_bonus(Some(33.0)), -15.0);
        assert_eq!(temperature_bonus(None), 0.0);
    }

    #[tokio::test]
    async fn sun_chance_uses_only_last_ten_years() {
        let store = InMemoryStore::new();
        // 2010-2014 all cloudy, 2016-2024 all sunny. The 10-year window starts 2015-09-01.
        store.insert(history("A", 2010..=2014, |_| false, |_| 22.0));
        store.insert(history("A", 2016..=2024, |_| true, |_| 22.0));
        let chance = engine(store)
            .sun_chance("A", DayWindow::month(7).unwrap())
            .await;
        assert_eq!(chance.total_days, 9 * 31);
        assert_eq!(chance.percentage, 100);
        assert_eq!(chance.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn store_failure_degrades_to_zero() {
        let engine = ClimateEngine::with_clock(Arc::new(FailingStore), stations(), clock());
        let chance = engine.sun_chance("A", DayWindow::month(7).unwrap()).await;
        assert_eq!(chance, SunChance::empty());
        assert!(engine.best_weeks("A").await.is_empty());
    }

    #[tokio::test]
    async fn sun_chance_at_blends_stations_with_data() {
        let store = InMemoryStore::new();
        store.insert(history("A", 2020..=2024, |_| true, |_| 24.0));
        store.insert(history("C", 2020..=2024, |d| d.day() <= 15, |_| 24.0));
        let point = LatLon(28.0 + km_north(10.0), -16.0);

        let result = engine(store)
            .sun_chance_at(point, DayWindow::month(6).unwrap())
            .await;
        let attribution = result.attribution().unwrap();
        assert_eq!(attribution.mode, AttributionMode::Interpolated);
        // B has no history and does not contribute.
        assert_eq!(attribution.contributions.len(), 2);
        let pct = result.value().unwrap().percentage;
        assert!(pct > 50 && pct < 100, "blended {pct}");
    }

    #[tokio::test(start_paused = true)]
    async fn sun_chance_at_queries_stations_concurrently() {
        let inner = InMemoryStore::new();
        for id in ["A", "B", "C"] {
            inner.insert(history(id, 2022..=2024, |_| true, |_| 24.0));
        }
        let delay = std::time::Duration::from_millis(150);
        let engine = ClimateEngine::with_clock(
            Arc::new(DelayedStore { inner, delay }),
            stations(),
            clock(),
        );

        let started = tokio::time::Instant::now();
        let result = engine
            .sun_chance_at(LatLon(28.0 + km_north(10.0), -16.0), DayWindow::month(6).unwrap())
            .await;
        let elapsed = started.elapsed();

        assert_eq!(result.attribution().unwrap().contributions.len(), 3);
        assert_eq!(result.value().unwrap().percentage, 100);
        assert!(elapsed >= delay);
        assert!(elapsed < delay * 2, "took {elapsed:?}");
    }

    #[tokio::test]
    async fn sun_chance_at_without_any_history_is_unavailable() {
        let result = engine(InMemoryStore::new())
            .sun_chance_at(LatLon(28.0, -16.0), DayWindow::month(6).unwrap())
            .await;
        assert_eq!(result, PointResult::Unavailable);
    }

    #[tokio::test]
    async fn best_weeks_prefer_sunny_warm_summer() {
        let store = InMemoryStore::new();
        // Sunny from mid-June to mid-September, warmest in August.
        store.insert(history(
            "A",
            2018..=2024,
            |d| (166..=258).contains(&d.ordinal()),
            |d| match d.month() {
                8 => 25.5,
                6 | 7 | 9 => 23.0,
                _ => 19.0,
            },
        ));
        let weeks = engine(store).best_weeks("A").await;
        assert_eq!(weeks.len(), 3);
        for week in &weeks {
            assert_eq!(week.sun_chance.percentage, 100);
            assert_eq!(week.score, 170.0, "week {week:?}");
        }
        // Five August weeks tie on score; calendar order decides.
        let starts: Vec<u32> = weeks.iter().map(|w| w.first_day).collect();
        assert_eq!(starts, vec![211, 218, 225]);
    }
}
