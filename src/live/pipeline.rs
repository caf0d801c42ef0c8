//! The live-weather fetch-and-cache pipeline.
//!
//! A station request walks a fixed ladder and stops at the first rung that yields data:
//!
//! 1. the in-memory cache (skipped on forced refresh),
//! 2. each configured [`LiveSource`] in order, every attempt bounded by a timeout,
//! 3. the persistent cache (skipped on forced refresh),
//! 4. [`LiveOutcome::Unavailable`].
//!
//! Successful source fetches are written through to both cache tiers.

use crate::geo::LatLon;
use crate::interpolation::blend::{blend_live, StationObservation};
use crate::live::cache::{cache_key, MemoryCache, PersistentCache, MEMORY_CACHE_TTL_SECS};
use crate::live::error::LiveSourceError;
use crate::live::source::{FetchTarget, LiveSource};
use crate::stations::resolver::StationResolver;
use crate::types::attribution::PointResult;
use crate::types::snapshot::LiveWeatherSnapshot;
use crate::utils::{Clock, SystemClock};
use bon::bon;
use futures_util::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single source attempt.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a reading came from, ordered from freshest to stalest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    /// Fetched from a live source during this request.
    Fresh,
    /// Served from the in-memory tier.
    MemoryCache,
    /// Served from the on-disk tier after every source failed.
    PersistentCache,
}

impl Freshness {
    pub fn is_cached(self) -> bool {
        self != Freshness::Fresh
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveReading {
    pub snapshot: LiveWeatherSnapshot,
    pub freshness: Freshness,
    /// Name of the source that answered; `None` for cache hits.
    pub source: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveOutcome {
    Available(LiveReading),
    /// No source answered and no usable cache entry exists.
    Unavailable,
}

impl LiveOutcome {
    pub fn reading(&self) -> Option<&LiveReading> {
        match self {
            LiveOutcome::Available(reading) => Some(reading),
            LiveOutcome::Unavailable => None,
        }
    }

    pub fn into_reading(self) -> Option<LiveReading> {
        match self {
            LiveOutcome::Available(reading) => Some(reading),
            LiveOutcome::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, LiveOutcome::Available(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub station_id: Option<String>,
    pub location: LatLon,
    /// Bypass both cache tiers and go straight to the sources.
    pub force_refresh: bool,
}

impl FetchRequest {
    pub fn for_station(station_id: impl Into<String>, location: LatLon) -> Self {
        Self {
            station_id: Some(station_id.into()),
            location,
            force_refresh: false,
        }
    }

    pub fn for_location(location: LatLon) -> Self {
        Self {
            station_id: None,
            location,
            force_refresh: false,
        }
    }

    pub fn forced(mut self) -> Self {
        self.force_refresh = true;
        self
    }
}

pub struct LiveWeatherService {
    resolver: StationResolver,
    sources: Vec<Arc<dyn LiveSource>>,
    memory: MemoryCache,
    persistent: Option<PersistentCache>,
    clock: Arc<dyn Clock>,
    attempt_timeout: Duration,
}

#[bon]
impl LiveWeatherService {
    /// Creates the service.
    ///
    /// Sources are tried in the order given. Without a persistent cache the on-disk rung of
    /// the ladder is skipped.
    #[builder]
    pub fn new(
        resolver: StationResolver,
        sources: Vec<Arc<dyn LiveSource>>,
        persistent_cache: Option<PersistentCache>,
        memory_ttl: Option<chrono::Duration>,
        clock: Option<Arc<dyn Clock>>,
        attempt_timeout: Option<Duration>,
    ) -> Self {
        Self {
            resolver,
            sources,
            memory: MemoryCache::new(
                memory_ttl.unwrap_or_else(|| chrono::Duration::seconds(MEMORY_CACHE_TTL_SECS)),
            ),
            persistent: persistent_cache,
            clock: clock.unwrap_or_else(|| Arc::new(SystemClock)),
            attempt_timeout: attempt_timeout.unwrap_or(DEFAULT_ATTEMPT_TIMEOUT),
        }
    }

    pub fn resolver(&self) -> &StationResolver {
        &self.resolver
    }

    /// Runs one request through the cache and source ladder.
    pub async fn fetch(&self, request: &FetchRequest) -> LiveOutcome {
        let key = cache_key(
            request.station_id.as_deref(),
            request.location.latitude(),
            request.location.longitude(),
        );

        if !request.force_refresh {
            if let Some(snapshot) = self.memory.get(&key, self.clock.now()) {
                debug!("Serving {} from memory cache", key);
                return LiveOutcome::Available(LiveReading {
                    snapshot,
                    freshness: Freshness::MemoryCache,
                    source: None,
                });
            }
        }

        let target = FetchTarget {
            station_id: request.station_id.as_deref(),
            location: request.location,
        };
        for source in &self.sources {
            let attempt = tokio::time::timeout(self.attempt_timeout, source.fetch(target))
                .await
                .unwrap_or_else(|_| {
                    Err(LiveSourceError::Timeout {
                        source_name: source.name(),
                        timeout: self.attempt_timeout,
                    })
                });
            match attempt {
                Ok(snapshot) => {
                    self.write_through(&key, &snapshot).await;
                    return LiveOutcome::Available(LiveReading {
                        snapshot,
                        freshness: Freshness::Fresh,
                        source: Some(source.name()),
                    });
                }
                Err(e) => warn!("Live source {} failed for {}: {}", source.name(), key, e),
            }
        }

        if !request.force_refresh {
            if let Some(persistent) = &self.persistent {
                if let Some(snapshot) = persistent.get(&key, self.clock.now()).await {
                    info!("All live sources failed for {}, serving persistent cache", key);
                    return LiveOutcome::Available(LiveReading {
                        snapshot,
                        freshness: Freshness::PersistentCache,
                        source: None,
                    });
                }
            }
        }

        warn!("No live weather available for {}", key);
        LiveOutcome::Unavailable
    }

    async fn write_through(&self, key: &str, snapshot: &LiveWeatherSnapshot) {
        let now = self.clock.now();
        self.memory.put(key, snapshot.clone(), now);
        if let Some(persistent) = &self.persistent {
            persistent.put(key, snapshot, now).await;
        }
    }

    /// Current conditions at an arbitrary point.
    ///
    /// Resolves the station plan for `point`, fetches every planned station concurrently and
    /// blends whichever subset answered. The reading is reported at the stalest freshness of
    /// its contributors.
    pub async fn weather_at(&self, point: LatLon, force_refresh: bool) -> PointResult<LiveReading> {
        let Some(plan) = self.resolver.plan(point) else {
            return PointResult::Unavailable;
        };

        let fetches = plan.stations().iter().map(|nearest| async move {
            let mut request =
                FetchRequest::for_station(nearest.station.id.clone(), nearest.station.lat_lon());
            request.force_refresh = force_refresh;
            (nearest, self.fetch(&request).await)
        });
        let settled = join_all(fetches).await;

        let mut freshness = Freshness::Fresh;
        let mut nearest_source = None;
        let mut observations = Vec::new();
        for (nearest, outcome) in settled {
            if let LiveOutcome::Available(reading) = outcome {
                freshness = freshness.max(reading.freshness);
                // The plan is ordered nearest-first.
                if observations.is_empty() {
                    nearest_source = reading.source;
                }
                observations.push(StationObservation::new(
                    nearest.station.id.clone(),
                    nearest.distance_km,
                    reading.snapshot,
                ));
            }
        }

        match blend_live(observations) {
            Some((snapshot, attribution)) => PointResult::Available {
                value: LiveReading {
                    snapshot,
                    freshness,
                    source: nearest_source,
                },
                attribution,
            },
            None => PointResult::Unavailable,
        }
    }
}
