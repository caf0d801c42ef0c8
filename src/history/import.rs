//! Batch import of a station's daily history from the national weather service.
//!
//! The climatological endpoint only serves short date ranges and rate-limits aggressively,
//! so the importer walks the requested years in four-month chunks, pauses between chunks,
//! and retries throttled or failing requests with a fixed backoff. Imported rows go through
//! gap filling and are upserted into the JSON artifact [`ArtifactStore`] reads.
//!
//! [`ArtifactStore`]: crate::ArtifactStore

use crate::climate::store::ArtifactStore;
use crate::history::error::ImportError;
use crate::history::gap_fill::fill_mean_temperature_gaps;
use crate::types::daily_record::DailyWeatherRecord;
use bon::bon;
use chrono::{Datelike, Months, NaiveDate};
use log::{debug, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_AEMET_BASE_URL: &str = "https://opendata.aemet.es/opendata/api";
pub const CHUNK_MONTHS: u32 = 4;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Statuses worth retrying: throttling and transient server failures.
pub fn is_retryable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::SERVICE_UNAVAILABLE
    )
}

/// One request's date range, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportChunk {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub struct ImportPlan;

impl ImportPlan {
    /// Splits `start_year..=end_year` into January-April, May-August and
    /// September-December chunks.
    pub fn chunks(start_year: i32, end_year: i32) -> Result<Vec<ImportChunk>, ImportError> {
        let invalid = || ImportError::InvalidYearRange {
            start: start_year,
            end: end_year,
        };
        if start_year > end_year {
            return Err(invalid());
        }
        let mut chunks = Vec::new();
        let mut start = NaiveDate::from_ymd_opt(start_year, 1, 1).ok_or_else(invalid)?;
        while start.year() <= end_year {
            let next = start
                .checked_add_months(Months::new(CHUNK_MONTHS))
                .ok_or_else(invalid)?;
            let end = next.pred_opt().ok_or_else(invalid)?;
            chunks.push(ImportChunk { start, end });
            start = next;
        }
        Ok(chunks)
    }
}

#[derive(Debug, Deserialize)]
struct DataPointer {
    datos: Option<String>,
    #[serde(default)]
    estado: Option<u16>,
    #[serde(default)]
    descripcion: Option<String>,
}

/// One day as served by the climatological endpoint. Numbers arrive as strings with a
/// decimal comma; precipitation may be `"Ip"` (a trace, below 0.1 mm).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AemetDailyRow {
    pub fecha: String,
    pub tmed: Option<String>,
    pub tmax: Option<String>,
    pub tmin: Option<String>,
    pub prec: Option<String>,
    pub sol: Option<String>,
    pub velmedia: Option<String>,
}

/// Parses a service number: `"21,4"` → 21.4, `"Ip"` → 0.0, anything else → `None`.
pub fn parse_aemet_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?.trim();
    if raw.eq_ignore_ascii_case("ip") {
        return Some(0.0);
    }
    raw.replace(',', ".").parse().ok()
}

impl AemetDailyRow {
    /// Converts the row, or `None` if its date is unreadable.
    pub fn to_record(&self, station_id: &str) -> Option<DailyWeatherRecord> {
        let date = NaiveDate::parse_from_str(self.fecha.trim(), "%Y-%m-%d").ok()?;
        Some(DailyWeatherRecord {
            temp_max: parse_aemet_number(self.tmax.as_deref()),
            temp_min: parse_aemet_number(self.tmin.as_deref()),
            temp_avg: parse_aemet_number(self.tmed.as_deref()),
            precipitation: parse_aemet_number(self.prec.as_deref()),
            sun_hours: parse_aemet_number(self.sol.as_deref()),
            // Served in m/s.
            wind_speed_avg: parse_aemet_number(self.velmedia.as_deref()).map(|v| v * 3.6),
            ..DailyWeatherRecord::empty(station_id, date)
        })
    }
}

pub struct HistoryImporter {
    client: Client,
    base_url: String,
    api_key: String,
    chunk_delay: Duration,
    retry_backoff: Duration,
    max_retries: u32,
}

#[bon]
impl HistoryImporter {
    #[builder]
    pub fn new(
        client: Client,
        #[builder(into)] api_key: String,
        #[builder(into)] base_url: Option<String>,
        chunk_delay: Option<Duration>,
        retry_backoff: Option<Duration>,
        max_retries: Option<u32>,
    ) -> Self {
        Self {
            client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_AEMET_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            chunk_delay: chunk_delay.unwrap_or(DEFAULT_CHUNK_DELAY),
            retry_backoff: retry_backoff.unwrap_or(DEFAULT_RETRY_BACKOFF),
            max_retries: max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
        }
    }

    fn chunk_url(&self, station_id: &str, chunk: &ImportChunk) -> String {
        format!(
            "{}/valores/climatologicos/diarios/datos/fechaini/{}T00:00:00UTC/fechafin/{}T23:59:59UTC/estacion/{}",
            self.base_url,
            chunk.start.format("%Y-%m-%d"),
            chunk.end.format("%Y-%m-%d"),
            station_id
        )
    }

    /// GETs `url` and decodes JSON, retrying retryable statuses up to the configured limit.
    async fn get_with_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        request: impl Fn() -> RequestBuilder,
    ) -> Result<T, ImportError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = request()
                .send()
                .await
                .map_err(|e| ImportError::NetworkRequest(url.to_string(), e))?;
            let status = response.status();

            if is_retryable(status) {
                if attempt > self.max_retries {
                    return Err(ImportError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        status,
                    });
                }
                warn!(
                    "{} answered {} (attempt {}), retrying in {:?}",
                    url, status, attempt, self.retry_backoff
                );
                tokio::time::sleep(self.retry_backoff).await;
                continue;
            }

            let response = response.error_for_status().map_err(|e| ImportError::HttpStatus {
                url: url.to_string(),
                status,
                source: e,
            })?;
            let body = response
                .text()
                .await
                .map_err(|e| ImportError::NetworkRequest(url.to_string(), e))?;
            return serde_json::from_str(&body)
                .map_err(|e| ImportError::JsonParse(url.to_string(), e));
        }
    }

    async fn fetch_chunk(
        &self,
        station_id: &str,
        chunk: &ImportChunk,
    ) -> Result<Vec<AemetDailyRow>, ImportError> {
        let url = self.chunk_url(station_id, chunk);
        let pointer: DataPointer = self
            .get_with_retry(&url, || {
                self.client.get(&url).header("api_key", self.api_key.as_str())
            })
            .await?;

        let Some(data_url) = pointer.datos else {
            if pointer.estado == Some(404) {
                debug!("No data for {} between {} and {}", station_id, chunk.start, chunk.end);
                return Ok(Vec::new());
            }
            return Err(ImportError::MissingDataUrl {
                url,
                description: pointer.descripcion.unwrap_or_default(),
            });
        };
        self.get_with_retry(&data_url, || self.client.get(&data_url))
            .await
    }

    /// Downloads `start_year..=end_year` for a station, deduplicated by date and gap-filled.
    pub async fn import_station(
        &self,
        station_id: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<DailyWeatherRecord>, ImportError> {
        let chunks = ImportPlan::chunks(start_year, end_year)?;
        let mut by_date: BTreeMap<NaiveDate, DailyWeatherRecord> = BTreeMap::new();

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(self.chunk_delay).await;
            }
            let rows = self.fetch_chunk(station_id, chunk).await?;
            let before = by_date.len();
            for record in rows.iter().filter_map(|row| row.to_record(station_id)) {
                by_date.insert(record.date, record);
            }
            info!(
                "{}: chunk {}/{} ({} to {}) added {} days",
                station_id,
                i + 1,
                chunks.len(),
                chunk.start,
                chunk.end,
                by_date.len() - before
            );
        }

        let mut records: Vec<DailyWeatherRecord> = by_date.into_values().collect();
        fill_mean_temperature_gaps(&mut records);
        Ok(records)
    }

    /// Imports a station and upserts the rows into its artifact in `dir`.
    ///
    /// Days already stored outside the imported range are kept, so a long history can be
    /// imported a few years at a time.
    pub async fn import_to_artifact(
        &self,
        station_id: &str,
        start_year: i32,
        end_year: i32,
        dir: &Path,
    ) -> Result<PathBuf, ImportError> {
        let records = self.import_station(station_id, start_year, end_year).await?;
        let store = ArtifactStore::new(dir);
        let total = store.upsert(station_id, &records).await?;
        info!("{}: artifact now holds {} days", station_id, total);
        Ok(store.artifact_path(station_id))
    }
}
