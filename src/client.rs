//! This module provides the main entry point of the crate: the [`IslasWeather`] client.
//!
//! It ties the station catalog, the live weather pipeline, the climatology engine and the
//! air-quality client together behind one value, so UI code can ask for "the weather at this
//! point" or "the sun chance in July near this beach" without knowing which stations, sources
//! or caches are involved.

use crate::climate::engine::{ClimateEngine, WeekScore};
use crate::climate::store::{ArtifactStore, HistoricalStore};
use crate::climate::sun_chance::DayWindow;
use crate::config::WeatherConfig;
use crate::error::IslasError;
use crate::geo::LatLon;
use crate::history::import::HistoryImporter;
use crate::live::aemet::AemetSource;
use crate::live::air_quality::{AirQualityClient, CalimaStatus};
use crate::live::cache::PersistentCache;
use crate::live::error::LiveSourceError;
use crate::live::open_meteo::OpenMeteoSource;
use crate::live::pipeline::{FetchRequest, LiveOutcome, LiveReading, LiveWeatherService};
use crate::live::source::LiveSource;
use crate::stations::catalog::StationCatalog;
use crate::stations::resolver::{AltitudeMode, NearestStation, StationResolver, BLEND_STATION_COUNT};
use crate::types::attribution::PointResult;
use crate::types::station::Station;
use crate::types::sun_chance::SunChance;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir, Clock};
use bon::bon;
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const LIVE_CACHE_SUBDIR: &str = "live";
const HISTORY_SUBDIR: &str = "history";

/// The main client for Canary Islands weather.
///
/// It answers four kinds of questions:
///
/// * **Which station?** [`find_station`](Self::find_station),
///   [`nearest_stations`](Self::nearest_stations) and
///   [`station_by_alias`](Self::station_by_alias) query the bundled station catalog.
/// * **What is the weather now?** [`live_weather`](Self::live_weather) runs one station or
///   point through the cache and source ladder; [`weather_at`](Self::weather_at) blends the
///   nearest stations for an arbitrary point.
/// * **How sunny is it usually?** [`sun_chance`](Self::sun_chance),
///   [`sun_chance_at`](Self::sun_chance_at) and [`best_weeks`](Self::best_weeks) read ten years
///   of daily history.
/// * **Is there calima?** [`calima_status`](Self::calima_status) reports the current PM10
///   dust level.
///
/// Live and climatology calls never fail: sources that are down, slow or misconfigured
/// degrade to cached data and finally to an explicit "unavailable" value. Only construction
/// can fail, when the cache directory is unusable or the HTTP client cannot be built.
///
/// Create an instance with [`IslasWeather::new`] from a [`WeatherConfig`], or assemble one
/// from your own sources and store with [`IslasWeather::with_parts`].
///
/// # Examples
///
/// ```rust
/// # use islas_weather::{IslasWeather, IslasError, WeatherConfig};
/// # async fn run() -> Result<(), IslasError> {
/// let client = IslasWeather::new(WeatherConfig::from_env()).await?;
/// // Now you can use the client to query stations, live weather and climatology
/// # Ok(())
/// # }
/// ```
pub struct IslasWeather {
    resolver: StationResolver,
    live: LiveWeatherService,
    climate: ClimateEngine,
    air_quality: Option<AirQualityClient>,
    importer: Option<HistoryImporter>,
    history_dir: Option<PathBuf>,
}

#[bon]
impl IslasWeather {
    /// Creates a client from configuration, using the bundled station catalog.
    ///
    /// The live sources are the national service (only when
    /// [`WeatherConfig::aemet_api_key`] is set) followed by Open-Meteo. Tier-2 cache files go
    /// to `<cache_dir>/live` and history artifacts are read from `<cache_dir>/history`.
    ///
    /// # Arguments
    ///
    /// * `config` - The [`WeatherConfig`] to use. When `cache_dir` is `None` the platform
    ///              cache directory is used (e.g. `~/.cache/islas_weather_cache` on Linux).
    ///              The directory is created if it doesn't exist.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `IslasWeather` client on success, or an [`IslasError`] if
    /// the cache directory cannot be resolved or created, or the HTTP client cannot be built.
    ///
    /// # Errors
    ///
    /// Returns [`IslasError::CacheDirResolution`] if no cache directory is configured and the
    /// platform one cannot be found.
    /// Returns [`IslasError::CacheDirCreation`] if the cache directory cannot be created.
    /// Returns [`IslasError::HttpClient`] if the HTTP client cannot be initialised.
    /// Returns [`IslasError::Catalog`] if the bundled catalog is invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, IslasError, WeatherConfig};
    /// # async fn run() -> Result<(), IslasError> {
    /// let config = WeatherConfig::builder()
    ///     .aemet_api_key("my-key")
    ///     .cache_dir("/var/cache/islas")
    ///     .build();
    /// let client = IslasWeather::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: WeatherConfig) -> Result<Self, IslasError> {
        let cache_dir = match &config.cache_dir {
            Some(dir) => dir.clone(),
            None => get_cache_dir()?,
        };
        ensure_cache_dir_exists(&cache_dir).await?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(IslasError::HttpClient)?;

        let mut sources: Vec<Arc<dyn LiveSource>> = Vec::new();
        match config.api_key() {
            Some(key) => sources.push(Arc::new(AemetSource::new(
                http.clone(),
                config.aemet_base_url.clone(),
                Some(key.to_string()),
            ))),
            None => info!("No national service key configured, using Open-Meteo only"),
        }
        sources.push(Arc::new(OpenMeteoSource::new(
            http.clone(),
            config.open_meteo_base_url.clone(),
        )));

        let importer = config.api_key().map(|key| {
            HistoryImporter::builder()
                .client(http.clone())
                .api_key(key)
                .base_url(config.aemet_base_url.clone())
                .build()
        });

        let history_dir = cache_dir.join(HISTORY_SUBDIR);
        let mut client = Self::with_parts()
            .catalog(StationCatalog::bundled()?)
            .sources(sources)
            .store(Arc::new(ArtifactStore::new(&history_dir)))
            .persistent_cache(PersistentCache::new(
                cache_dir.join(LIVE_CACHE_SUBDIR),
                chrono::Duration::seconds(config.persistent_cache_ttl_secs),
            ))
            .memory_ttl(chrono::Duration::seconds(config.memory_cache_ttl_secs))
            .air_quality(AirQualityClient::new(http, config.air_quality_base_url.clone()))
            .call();
        client.importer = importer;
        client.history_dir = Some(history_dir);
        Ok(client)
    }

    /// Assembles a client from explicit parts.
    ///
    /// This is how tests and embedders plug in their own [`LiveSource`]s and
    /// [`HistoricalStore`]. Nothing here touches the network or the filesystem.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.catalog(StationCatalog)`: **Required.** The stations to resolve against.
    /// * `.sources(Vec<Arc<dyn LiveSource>>)`: **Required.** Live sources, tried in order.
    /// * `.store(Arc<dyn HistoricalStore>)`: **Required.** Daily history for climatology.
    /// * `.persistent_cache(PersistentCache)`: Optional. Without it the on-disk cache rung is skipped.
    /// * `.memory_ttl(chrono::Duration)`: Optional. Defaults to 15 minutes.
    /// * `.air_quality(AirQualityClient)`: Optional. Without it [`calima_status`](Self::calima_status) reports "not configured".
    /// * `.clock(Arc<dyn Clock>)`: Optional. Defaults to the system clock.
    /// * `.attempt_timeout(Duration)`: Optional. Per-source bound, defaults to 10 seconds.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, InMemoryStore, StationCatalog, CatalogError};
    /// # use std::sync::Arc;
    /// # fn run() -> Result<(), CatalogError> {
    /// let client = IslasWeather::with_parts()
    ///     .catalog(StationCatalog::bundled()?)
    ///     .sources(vec![])
    ///     .store(Arc::new(InMemoryStore::new()))
    ///     .call();
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub fn with_parts(
        catalog: StationCatalog,
        sources: Vec<Arc<dyn LiveSource>>,
        store: Arc<dyn HistoricalStore>,
        persistent_cache: Option<PersistentCache>,
        memory_ttl: Option<chrono::Duration>,
        air_quality: Option<AirQualityClient>,
        clock: Option<Arc<dyn Clock>>,
        attempt_timeout: Option<Duration>,
    ) -> Self {
        let resolver = StationResolver::new(Arc::new(catalog));
        let live = LiveWeatherService::builder()
            .resolver(resolver.clone())
            .sources(sources)
            .maybe_persistent_cache(persistent_cache)
            .maybe_memory_ttl(memory_ttl)
            .maybe_clock(clock.clone())
            .maybe_attempt_timeout(attempt_timeout)
            .build();
        let climate = match clock {
            Some(clock) => ClimateEngine::with_clock(store, resolver.clone(), clock),
            None => ClimateEngine::new(store, resolver.clone()),
        };
        Self {
            resolver,
            live,
            climate,
            air_quality,
            importer: None,
            history_dir: None,
        }
    }

    /// The station catalog this client resolves against.
    pub fn catalog(&self) -> &StationCatalog {
        self.resolver.catalog()
    }

    /// Finds the single nearest station to a location.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to resolve.
    /// * `.altitude_mode(AltitudeMode)`: Optional. How summit stations are treated
    ///   ([`AltitudeMode`]). Defaults to [`AltitudeMode::Regular`], which ignores them.
    ///
    /// # Returns
    ///
    /// The nearest station with its distance, or `None` when no station qualifies.
    /// With [`AltitudeMode::PreferHighAltitude`], a regular station is returned instead (and
    /// `high_altitude_fallback` set) when the nearest summit station is more than three times
    /// as far as a regular station lying within 40 km.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, InMemoryStore, StationCatalog, LatLon, AltitudeMode};
    /// # use std::sync::Arc;
    /// # let client = IslasWeather::with_parts()
    /// #     .catalog(StationCatalog::bundled().unwrap())
    /// #     .sources(vec![])
    /// #     .store(Arc::new(InMemoryStore::new()))
    /// #     .call();
    /// let santa_cruz = LatLon(28.4636, -16.2518);
    /// let nearest = client.find_station().location(santa_cruz).call().unwrap();
    /// assert_eq!(nearest.station.id, "C449C");
    ///
    /// let teide = LatLon(28.2724, -16.6425);
    /// let summit = client
    ///     .find_station()
    ///     .location(teide)
    ///     .altitude_mode(AltitudeMode::PreferHighAltitude)
    ///     .call()
    ///     .unwrap();
    /// assert!(summit.station.high_altitude);
    /// ```
    #[builder]
    pub fn find_station(
        &self,
        location: LatLon,
        altitude_mode: Option<AltitudeMode>,
    ) -> Option<NearestStation> {
        self.resolver
            .nearest(location, altitude_mode.unwrap_or_default())
    }

    /// Lists the stations nearest to a location, closest first.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.limit(usize)`: Optional. Maximum number of stations. Defaults to `3`.
    /// * `.include_high_altitude(bool)`: Optional. Whether summit stations are listed.
    ///   Defaults to `false`.
    #[builder]
    pub fn nearest_stations(
        &self,
        location: LatLon,
        limit: Option<usize>,
        include_high_altitude: Option<bool>,
    ) -> Vec<NearestStation> {
        self.resolver.nearest_n(
            location,
            limit.unwrap_or(BLEND_STATION_COUNT),
            !include_high_altitude.unwrap_or(false),
        )
    }

    /// Resolves a place name (town, beach, airport) to the station covering it.
    ///
    /// An exact case-insensitive alias match wins; otherwise the first partial match in
    /// catalog order is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, InMemoryStore, StationCatalog};
    /// # use std::sync::Arc;
    /// # let client = IslasWeather::with_parts()
    /// #     .catalog(StationCatalog::bundled().unwrap())
    /// #     .sources(vec![])
    /// #     .store(Arc::new(InMemoryStore::new()))
    /// #     .call();
    /// let station = client.station_by_alias("los rodeos").unwrap();
    /// assert_eq!(station.id, "C447A");
    /// ```
    pub fn station_by_alias(&self, text: &str) -> Option<&Station> {
        self.resolver.find_by_alias(text)
    }

    /// Fetches the current weather for one station or one point.
    ///
    /// The request walks an ordered ladder and stops at the first rung that yields data:
    /// the in-memory cache (15 minutes), each live source in turn (each bounded by a
    /// timeout), then the on-disk cache (24 hours). Fresh source data is written back to both
    /// caches. The returned [`LiveReading`] says which rung answered.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point, used by sources that query by coordinates.
    /// * `.station_id(&str)`: Optional. The station indicator, required by the national service.
    /// * `.force_refresh(bool)`: Optional. Skip both cache reads. Defaults to `false`.
    ///
    /// # Returns
    ///
    /// [`LiveOutcome::Available`] or [`LiveOutcome::Unavailable`]. Source failures are logged,
    /// never returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, IslasError, WeatherConfig, LatLon, LiveOutcome};
    /// # async fn run() -> Result<(), IslasError> {
    /// let client = IslasWeather::new(WeatherConfig::from_env()).await?;
    /// let outcome = client
    ///     .live_weather()
    ///     .location(LatLon(28.4775, -16.3292))
    ///     .station_id("C447A")
    ///     .call()
    ///     .await;
    /// match outcome {
    ///     LiveOutcome::Available(reading) => {
    ///         println!("{} °C, {}", reading.snapshot.temperature_c, reading.snapshot.label)
    ///     }
    ///     LiveOutcome::Unavailable => println!("No live data right now"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn live_weather(
        &self,
        location: LatLon,
        station_id: Option<&str>,
        force_refresh: Option<bool>,
    ) -> LiveOutcome {
        let mut request = match station_id {
            Some(id) => FetchRequest::for_station(id, location),
            None => FetchRequest::for_location(location),
        };
        if force_refresh.unwrap_or(false) {
            request = request.forced();
        }
        self.live.fetch(&request).await
    }

    /// Estimates the current weather at an arbitrary point.
    ///
    /// When a regular station lies within 5 km its reading is used directly; otherwise the
    /// three nearest regular stations are fetched concurrently and blended by inverse
    /// distance weighting. The attribution lists every station that contributed and its
    /// weight.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to estimate.
    /// * `.force_refresh(bool)`: Optional. Skip cache reads for every contributing station.
    #[builder]
    pub async fn weather_at(
        &self,
        location: LatLon,
        force_refresh: Option<bool>,
    ) -> PointResult<LiveReading> {
        self.live
            .weather_at(location, force_refresh.unwrap_or(false))
            .await
    }

    /// The historical chance of a sunny day at a station within a calendar window.
    ///
    /// Ten years of daily history are read; a store failure yields a zero, low-confidence
    /// result rather than an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use islas_weather::{IslasWeather, InMemoryStore, StationCatalog, DayWindow};
    /// # use std::sync::Arc;
    /// # async fn run() {
    /// # let client = IslasWeather::with_parts()
    /// #     .catalog(StationCatalog::bundled().unwrap())
    /// #     .sources(vec![])
    /// #     .store(Arc::new(InMemoryStore::new()))
    /// #     .call();
    /// let july = DayWindow::month(7).unwrap();
    /// let chance = client.sun_chance("C429I", july).await;
    /// println!("{}% ({:?})", chance.percentage, chance.confidence);
    /// # }
    /// ```
    pub async fn sun_chance(&self, station_id: &str, window: DayWindow) -> SunChance {
        self.climate.sun_chance(station_id, window).await
    }

    /// The sun chance at an arbitrary point, interpolated from the nearest stations the same
    /// way [`weather_at`](Self::weather_at) blends live data.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to estimate.
    /// * `.window(DayWindow)`: **Required.** The calendar window, matched in every year.
    #[builder]
    pub async fn sun_chance_at(&self, location: LatLon, window: DayWindow) -> PointResult<SunChance> {
        self.climate.sun_chance_at(location, window).await
    }

    /// The three best weeks of the year at a station, ranked by sun chance and a comfort
    /// bonus for the mean daily maximum. Empty when the station has no history.
    pub async fn best_weeks(&self, station_id: &str) -> Vec<WeekScore> {
        self.climate.best_weeks(station_id).await
    }

    /// The current calima (Saharan dust) status at a point.
    ///
    /// # Errors
    ///
    /// Returns [`IslasError::LiveSource`] if the air-quality service fails or the client was
    /// assembled without one.
    pub async fn calima_status(&self, location: LatLon) -> Result<CalimaStatus, IslasError> {
        let client = self
            .air_quality
            .as_ref()
            .ok_or(LiveSourceError::NotConfigured("air-quality"))?;
        Ok(client.calima_status(location).await?)
    }

    /// Downloads a station's daily history and stores it where the climatology engine reads.
    ///
    /// Requests are spread out (10 s between four-month chunks, 30 s backoff on throttling),
    /// so importing ten years takes several minutes. Only available on clients built with
    /// [`IslasWeather::new`] and a national service key.
    ///
    /// # Errors
    ///
    /// Returns [`IslasError::LiveSource`] with
    /// [`LiveSourceError::NotConfigured`] when no key is configured, and
    /// [`IslasError::Import`] when the download or the artifact write fails.
    pub async fn import_history(
        &self,
        station_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<PathBuf, IslasError> {
        let (Some(importer), Some(dir)) = (&self.importer, &self.history_dir) else {
            return Err(LiveSourceError::NotConfigured("aemet").into());
        };
        Ok(importer
            .import_to_artifact(station_id, start_year, end_year, dir)
            .await?)
    }

    /// Where imported history artifacts are stored, when the client owns a cache directory.
    pub fn history_dir(&self) -> Option<&Path> {
        self.history_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::store::InMemoryStore;
    use crate::live::pipeline::tests::{snapshot, start, FakeSource};
    use crate::live::pipeline::Freshness;
    use crate::types::daily_record::DailyWeatherRecord;
    use crate::utils::tests::ManualClock;
    use chrono::NaiveDate;

    const SANTA_CRUZ: LatLon = LatLon(28.4636, -16.2518);

    fn client_with(source: FakeSource, store: InMemoryStore) -> (IslasWeather, Arc<FakeSource>) {
        let source = Arc::new(source);
        let client = IslasWeather::with_parts()
            .catalog(StationCatalog::bundled().unwrap())
            .sources(vec![source.clone() as Arc<dyn LiveSource>])
            .store(Arc::new(store))
            .clock(Arc::new(ManualClock::new(start())))
            .call();
        (client, source)
    }

    #[test]
    fn station_queries_use_bundled_catalog() {
        let (client, _) = client_with(FakeSource::new("fake"), InMemoryStore::new());
        assert!(!client.catalog().is_empty());

        let nearest = client.find_station().location(SANTA_CRUZ).call().unwrap();
        assert_eq!(nearest.station.id, "C449C");
        assert!(!nearest.high_altitude_fallback);

        let listed = client.nearest_stations().location(SANTA_CRUZ).call();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|n| !n.station.high_altitude));
        assert!(listed.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));

        let alias = client.station_by_alias("Puerto de la Cruz").unwrap();
        assert_eq!(alias.id, "C459Z");
        assert!(client.station_by_alias("Reykjavik").is_none());
    }

    #[tokio::test]
    async fn live_weather_caches_between_calls() {
        let (client, source) = client_with(
            FakeSource::new("fake").station("C449C", snapshot(24)),
            InMemoryStore::new(),
        );

        let first = client
            .live_weather()
            .location(SANTA_CRUZ)
            .station_id("C449C")
            .call()
            .await;
        assert_eq!(first.reading().unwrap().freshness, Freshness::Fresh);

        let second = client
            .live_weather()
            .location(SANTA_CRUZ)
            .station_id("C449C")
            .call()
            .await;
        assert_eq!(second.reading().unwrap().freshness, Freshness::MemoryCache);
        assert_eq!(source.calls(), 1);

        let forced = client
            .live_weather()
            .location(SANTA_CRUZ)
            .station_id("C449C")
            .force_refresh(true)
            .call()
            .await;
        assert_eq!(forced.reading().unwrap().freshness, Freshness::Fresh);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn weather_at_station_point_is_single_station() {
        let (client, _) = client_with(
            FakeSource::new("fake").always(snapshot(22)),
            InMemoryStore::new(),
        );
        let result = client.weather_at().location(SANTA_CRUZ).call().await;
        let attribution = result.attribution().unwrap();
        assert_eq!(attribution.contributions.len(), 1);
        assert_eq!(attribution.contributions[0].station_id, "C449C");
        assert_eq!(result.value().unwrap().snapshot.temperature_c, 22);
    }

    #[tokio::test]
    async fn climatology_through_client() {
        let store = InMemoryStore::new();
        store.insert((1..=31).map(|d| DailyWeatherRecord {
            sun_hours: Some(if d <= 20 { 9.0 } else { 2.0 }),
            precipitation: Some(0.0),
            ..DailyWeatherRecord::empty("C449C", NaiveDate::from_ymd_opt(2024, 7, d).unwrap())
        }));
        let (client, _) = client_with(FakeSource::new("fake"), store);

        let july = DayWindow::month(7).unwrap();
        let chance = client.sun_chance("C449C", july).await;
        assert_eq!((chance.sunny_days, chance.total_days), (20, 31));
        assert_eq!(chance.percentage, 65);

        let at_point = client
            .sun_chance_at()
            .location(SANTA_CRUZ)
            .window(july)
            .call()
            .await;
        assert_eq!(at_point.value().unwrap().percentage, 65);

        assert!(!client.best_weeks("C449C").await.is_empty());
        assert!(client.best_weeks("C429I").await.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_services_report_errors() {
        let (client, _) = client_with(FakeSource::new("fake"), InMemoryStore::new());
        assert!(matches!(
            client.calima_status(SANTA_CRUZ).await,
            Err(IslasError::LiveSource(LiveSourceError::NotConfigured(_)))
        ));
        assert!(matches!(
            client.import_history("C449C", 2020, 2021).await,
            Err(IslasError::LiveSource(LiveSourceError::NotConfigured(_)))
        ));
    }

    #[tokio::test]
    async fn new_creates_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache_dir = tmp.path().join("nested").join("cache");
        let config = WeatherConfig::builder().cache_dir(cache_dir.clone()).build();

        let client = IslasWeather::new(config).await.unwrap();
        assert!(cache_dir.is_dir());
        assert_eq!(client.history_dir(), Some(cache_dir.join("history").as_path()));
        assert!(client.importer.is_none());
    }

    #[tokio::test]
    async fn new_rejects_file_as_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let config = WeatherConfig::builder().cache_dir(file).build();
        assert!(matches!(
            IslasWeather::new(config).await,
            Err(IslasError::CacheDirCreation(..))
        ));
    }
}
