//! Runtime configuration for [`IslasWeather`](crate::IslasWeather).
//!
//! Every field has a default, so an empty JSON object is a valid configuration. The national
//! service key is the only value without a usable default; without it the primary live
//! source is skipped and Open-Meteo serves alone.

use crate::history::import::DEFAULT_AEMET_BASE_URL;
use crate::live::cache::{MEMORY_CACHE_TTL_SECS, PERSISTENT_CACHE_TTL_SECS};
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_OPEN_METEO_BASE_URL: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_AIR_QUALITY_BASE_URL: &str = "https://air-quality-api.open-meteo.com/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

pub const AEMET_API_KEY_VAR: &str = "AEMET_API_KEY";
pub const CACHE_DIR_VAR: &str = "ISLAS_WEATHER_CACHE_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),
}

fn default_aemet_base_url() -> String {
    DEFAULT_AEMET_BASE_URL.to_string()
}

fn default_open_meteo_base_url() -> String {
    DEFAULT_OPEN_METEO_BASE_URL.to_string()
}

fn default_air_quality_base_url() -> String {
    DEFAULT_AIR_QUALITY_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_memory_cache_ttl_secs() -> i64 {
    MEMORY_CACHE_TTL_SECS
}

fn default_persistent_cache_ttl_secs() -> i64 {
    PERSISTENT_CACHE_TTL_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct WeatherConfig {
    /// Key for the national service. Blank counts as absent.
    #[serde(default)]
    #[builder(into)]
    pub aemet_api_key: Option<String>,
    #[serde(default = "default_aemet_base_url")]
    #[builder(into, default = default_aemet_base_url())]
    pub aemet_base_url: String,
    #[serde(default = "default_open_meteo_base_url")]
    #[builder(into, default = default_open_meteo_base_url())]
    pub open_meteo_base_url: String,
    #[serde(default = "default_air_quality_base_url")]
    #[builder(into, default = default_air_quality_base_url())]
    pub air_quality_base_url: String,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    #[builder(default = default_request_timeout_secs())]
    pub request_timeout_secs: u64,
    /// Where tier-2 cache files and history artifacts live. Resolved from the platform cache
    /// directory when absent.
    #[serde(default)]
    #[builder(into)]
    pub cache_dir: Option<PathBuf>,
    #[serde(default = "default_memory_cache_ttl_secs")]
    #[builder(default = default_memory_cache_ttl_secs())]
    pub memory_cache_ttl_secs: i64,
    #[serde(default = "default_persistent_cache_ttl_secs")]
    #[builder(default = default_persistent_cache_ttl_secs())]
    pub persistent_cache_ttl_secs: i64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl WeatherConfig {
    pub async fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Defaults, overridden by `AEMET_API_KEY` and `ISLAS_WEATHER_CACHE_DIR` when set.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var(AEMET_API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.aemet_api_key = Some(key);
        }
        if let Some(dir) = var(CACHE_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.aemet_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
