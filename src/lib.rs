mod client;
mod climate;
mod config;
mod error;
mod geo;
mod history;
mod interpolation;
mod live;
mod schedule;
mod stations;
mod types;
mod utils;

pub use client::IslasWeather;
pub use config::{ConfigError, WeatherConfig};
pub use error::IslasError;
pub use geo::{distance_km, LatLon, EARTH_RADIUS_KM};
pub use schedule::{RefreshTicker, AIR_QUALITY_REFRESH_INTERVAL, LIVE_REFRESH_INTERVAL};
pub use utils::{Clock, SystemClock};

pub use types::attribution::{Attribution, AttributionMode, Contribution, PointResult};
pub use types::daily_record::DailyWeatherRecord;
pub use types::snapshot::LiveWeatherSnapshot;
pub use types::station::{Location, Station};
pub use types::sun_chance::{Confidence, SunChance};
pub use types::weather_condition::WeatherCondition;

pub use stations::catalog::StationCatalog;
pub use stations::error::CatalogError;
pub use stations::resolver::{AltitudeMode, NearestStation, StationPlan, StationResolver};

pub use interpolation::blend::{blend_live, blend_sun_chance, StationObservation};
pub use interpolation::math::{idw_weights, lerp, weighted_mean};

pub use live::aemet::{AemetObservation, AemetSource};
pub use live::air_quality::{AirQualityClient, CalimaLevel, CalimaStatus};
pub use live::cache::{MemoryCache, PersistentCache};
pub use live::error::LiveSourceError;
pub use live::open_meteo::OpenMeteoSource;
pub use live::pipeline::{
    FetchRequest, Freshness, LiveOutcome, LiveReading, LiveWeatherService,
};
pub use live::source::{FetchTarget, LiveSource};

pub use climate::engine::{rank_weeks, ClimateEngine, WeekScore};
pub use climate::error::StoreError;
pub use climate::store::{write_artifact, ArtifactStore, HistoricalStore, InMemoryStore};
pub use climate::sun_chance::{compute_sun_chance, DayWindow};

pub use history::error::ImportError;
pub use history::gap_fill::fill_mean_temperature_gaps;
pub use history::import::{HistoryImporter, ImportChunk, ImportPlan};
