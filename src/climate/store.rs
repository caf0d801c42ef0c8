//! Read access to daily historical records, and the artifact files the importer produces.

use crate::climate::error::StoreError;
use crate::types::daily_record::DailyWeatherRecord;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Records are merged into an artifact this many rows at a time.
pub const UPSERT_BATCH_SIZE: usize = 500;

/// A queryable time series of daily records.
///
/// The query is deliberately coarse: a station and a lower date bound. Row order is not
/// significant. Callers filter by month and day themselves.
#[async_trait]
pub trait HistoricalStore: Send + Sync {
    async fn daily_records(
        &self,
        station_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyWeatherRecord>, StoreError>;
}

/// Store backed by one JSON artifact per station (`{dir}/{station_id}.json`).
///
/// A missing artifact is a station with no history, not an error.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, station_id: &str) -> PathBuf {
        artifact_path(&self.dir, station_id)
    }

    async fn read_all(&self, station_id: &str) -> Result<Vec<DailyWeatherRecord>, StoreError> {
        let path = self.artifact_path(station_id);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No history artifact for {}", station_id);
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::ArtifactRead(path, e)),
        };
        serde_json::from_str(&json).map_err(|e| StoreError::ArtifactParse(path, e))
    }

    /// Inserts or replaces rows keyed on `(station_id, date)`.
    ///
    /// Rows are merged and written [`UPSERT_BATCH_SIZE`] at a time, so a failure part-way
    /// keeps every batch written before it. Rows belonging to other stations are ignored.
    /// Returns the number of rows in the artifact afterwards.
    pub async fn upsert(
        &self,
        station_id: &str,
        records: &[DailyWeatherRecord],
    ) -> Result<usize, StoreError> {
        let mut by_date: BTreeMap<NaiveDate, DailyWeatherRecord> = self
            .read_all(station_id)
            .await?
            .into_iter()
            .map(|r| (r.date, r))
            .collect();

        let own: Vec<&DailyWeatherRecord> =
            records.iter().filter(|r| r.station_id == station_id).collect();
        if own.is_empty() {
            let existing: Vec<DailyWeatherRecord> = by_date.into_values().collect();
            write_artifact(&self.dir, station_id, &existing).await?;
            return Ok(existing.len());
        }
        for (i, batch) in own.chunks(UPSERT_BATCH_SIZE).enumerate() {
            for record in batch {
                by_date.insert(record.date, (*record).clone());
            }
            let merged: Vec<DailyWeatherRecord> = by_date.values().cloned().collect();
            write_artifact(&self.dir, station_id, &merged).await?;
            debug!(
                "Upserted batch {} ({} rows) for {}",
                i + 1,
                batch.len(),
                station_id
            );
        }
        Ok(by_date.len())
    }
}

#[async_trait]
impl HistoricalStore for ArtifactStore {
    async fn daily_records(
        &self,
        station_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyWeatherRecord>, StoreError> {
        let mut records = self.read_all(station_id).await?;
        records.retain(|r| r.date >= since);
        Ok(records)
    }
}

pub(crate) fn artifact_path(dir: &Path, station_id: &str) -> PathBuf {
    dir.join(format!("{station_id}.json"))
}

/// Writes `records` as the artifact for `station_id`, replacing any previous file.
pub async fn write_artifact(
    dir: &Path,
    station_id: &str,
    records: &[DailyWeatherRecord],
) -> Result<PathBuf, StoreError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StoreError::ArtifactWrite(dir.to_path_buf(), e))?;
    let path = artifact_path(dir, station_id);
    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| StoreError::ArtifactEncode(station_id.to_string(), e))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| StoreError::ArtifactWrite(path.clone(), e))?;
    info!(
        "Wrote {} records for {} to {}",
        records.len(),
        station_id,
        path.display()
    );
    Ok(path)
}

/// Process-local store, handy for embedding pre-loaded history and for tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<String, Vec<DailyWeatherRecord>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, records: impl IntoIterator<Item = DailyWeatherRecord>) {
        let mut map = self.records.write().unwrap_or_else(|e| e.into_inner());
        for record in records {
            let rows = map.entry(record.station_id.clone()).or_default();
            match rows.iter_mut().find(|r| r.date == record.date) {
                Some(existing) => *existing = record,
                None => rows.push(record),
            }
        }
    }
}

#[async_trait]
impl HistoricalStore for InMemoryStore {
    async fn daily_records(
        &self,
        station_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<DailyWeatherRecord>, StoreError> {
        let map = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(map
            .get(station_id)
            .map(|rows| rows.iter().filter(|r| r.date >= since).cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(station: &str, date: NaiveDate, tmax: f64) -> DailyWeatherRecord {
        DailyWeatherRecord {
            temp_max: Some(tmax),
            ..DailyWeatherRecord::empty(station, date)
        }
    }

    #[tokio::test]
    async fn missing_artifact_is_empty_history() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let rows = store.daily_records("C447A", day(2015, 1, 1)).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_rows_by_date() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store
            .upsert(
                "C447A",
                &[
                    record("C447A", day(2024, 7, 1), 25.0),
                    record("C447A", day(2024, 7, 2), 26.0),
                ],
            )
            .await
            .unwrap();
        let count = store
            .upsert(
                "C447A",
                &[
                    record("C447A", day(2024, 7, 2), 27.5),
                    record("C447A", day(2024, 7, 3), 24.0),
                    record("C649I", day(2024, 7, 3), 30.0),
                ],
            )
            .await
            .unwrap();
        assert_eq!(count, 3);

        let rows = store.daily_records("C447A", day(2024, 7, 2)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].temp_max, Some(27.5));
    }

    #[tokio::test]
    async fn upsert_handles_more_than_one_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        let start = day(2020, 1, 1);
        let rows: Vec<_> = (0..1200)
            .map(|i| record("C029O", start + chrono::Days::new(i), 22.0))
            .collect();
        store.upsert("C029O", &[record("C029O", day(2019, 12, 31), 21.0)]).await.unwrap();
        assert_eq!(store.upsert("C029O", &rows).await.unwrap(), 1201);

        let stored = store.daily_records("C029O", day(2015, 1, 1)).await.unwrap();
        assert_eq!(stored.len(), 1201);
        assert_eq!(stored[0].date, day(2019, 12, 31));
        assert_eq!(stored[1200].date, start + chrono::Days::new(1199));
    }

    #[tokio::test]
    async fn corrupt_artifact_is_a_parse_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        std::fs::write(store.artifact_path("C447A"), "[{\"date\": 5}]").unwrap();
        assert!(matches!(
            store.daily_records("C447A", day(2015, 1, 1)).await,
            Err(StoreError::ArtifactParse(..))
        ));
    }

    #[tokio::test]
    async fn in_memory_store_filters_by_station_and_date() {
        let store = InMemoryStore::new();
        store.insert([
            record("C447A", day(2014, 6, 1), 24.0),
            record("C447A", day(2024, 6, 1), 25.0),
            record("C649I", day(2024, 6, 1), 27.0),
        ]);
        let rows = store.daily_records("C447A", day(2015, 1, 1)).await.unwrap();
        assert_eq!(rows, vec![record("C447A", day(2024, 6, 1), 25.0)]);
    }
}
