//! The two cache tiers in front of the live sources.
//!
//! Tier 1 is process memory with a short TTL and acts as a rate limiter. Tier 2 is a
//! directory of bincode files with a day-long TTL, used only once every source has failed.
//! Both check staleness lazily at read time; there is no background sweep.

use crate::types::snapshot::LiveWeatherSnapshot;
use bincode::config::{Configuration, Fixint, LittleEndian};
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();
const FILE_PREFIX: &str = "live-";
const FILE_EXTENSION: &str = "bin";

pub const MEMORY_CACHE_TTL_SECS: i64 = 15 * 60;
pub const PERSISTENT_CACHE_TTL_SECS: i64 = 24 * 60 * 60;

/// Cache key for a request: the station id, or the rounded coordinates when there is none.
pub fn cache_key(station_id: Option<&str>, latitude: f64, longitude: f64) -> String {
    match station_id {
        Some(id) => id.to_string(),
        None => format!("loc_{latitude:.3}_{longitude:.3}"),
    }
}

/// Process-memory tier keyed by station.
///
/// The map sits behind a mutex so that concurrent fetches for the same key cannot lose an
/// update between the read and the conditional write.
#[derive(Debug)]
pub struct MemoryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (DateTime<Utc>, LiveWeatherSnapshot)>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the entry if it is younger than the TTL. Expired entries are dropped.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<LiveWeatherSnapshot> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((stored_at, snapshot)) if now - *stored_at < self.ttl => Some(snapshot.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores the entry and drops every other entry that has expired by `now`.
    pub fn put(&self, key: &str, snapshot: LiveWeatherSnapshot, now: DateTime<Utc>) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, (stored_at, _)| now - *stored_at < self.ttl);
        entries.insert(key.to_string(), (now, snapshot));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(Duration::seconds(MEMORY_CACHE_TTL_SECS))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    written_at_ms: i64,
    snapshot: LiveWeatherSnapshot,
}

/// On-disk tier. Every failure is logged and treated as a miss; nothing here is surfaced
/// to the caller as an error.
#[derive(Debug, Clone)]
pub struct PersistentCache {
    dir: PathBuf,
    ttl: Duration,
}

impl PersistentCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir
            .join(format!("{FILE_PREFIX}{sanitized}.{FILE_EXTENSION}"))
    }

    /// Reads a fresh, well-formed entry. Stale, undecodable or implausible entries are
    /// deleted and reported as a miss.
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<LiveWeatherSnapshot> {
        let path = self.path_for(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read live cache {}: {}", path.display(), e);
                return None;
            }
        };

        let stored = match bincode::serde::decode_from_slice::<StoredSnapshot, _>(&bytes, BINCODE_CONFIG)
        {
            Ok((stored, _)) => stored,
            Err(e) => {
                warn!("Discarding malformed live cache {}: {}", path.display(), e);
                self.discard(&path).await;
                return None;
            }
        };

        let written_at = DateTime::<Utc>::from_timestamp_millis(stored.written_at_ms);
        let fresh = written_at.is_some_and(|at| now - at <= self.ttl);
        if !fresh {
            debug!("Live cache {} expired", path.display());
            self.discard(&path).await;
            return None;
        }
        if !stored.snapshot.is_plausible() {
            warn!("Discarding implausible live cache {}", path.display());
            self.discard(&path).await;
            return None;
        }
        Some(stored.snapshot)
    }

    /// Writes an entry. Failures are logged and otherwise ignored.
    pub async fn put(&self, key: &str, snapshot: &LiveWeatherSnapshot, now: DateTime<Utc>) {
        let stored = StoredSnapshot {
            written_at_ms: now.timestamp_millis(),
            snapshot: snapshot.clone(),
        };
        let bytes = match bincode::serde::encode_to_vec(&stored, BINCODE_CONFIG) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to encode live cache entry for {}: {}", key, e);
                return;
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("Failed to create cache directory {}: {}", self.dir.display(), e);
            return;
        }
        let path = self.path_for(key);
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            warn!("Failed to write live cache {}: {}", path.display(), e);
        }
    }

    async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}
