//! The immutable in-memory station list, loaded once from static configuration.

use crate::stations::error::CatalogError;
use crate::types::station::Station;
use log::info;
use std::collections::HashMap;
use std::path::Path;

const BUNDLED_STATIONS: &str = include_str!("../../data/stations.json");

/// The full, read-only list of known stations, with lookup by id.
///
/// Iteration order is the order of the source configuration; resolver tie-breaks and alias
/// matching depend on it. A catalog is never empty: loading an empty list fails with
/// [`CatalogError::Empty`], which callers should treat as a deployment defect.
#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: Vec<Station>,
    index: HashMap<String, usize>,
}

impl StationCatalog {
    /// Builds a catalog from an already-parsed station list, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] for an empty list, [`CatalogError::DuplicateId`] if two
    /// stations share an id, and [`CatalogError::InvalidCoordinates`] for coordinates outside
    /// the WGS84 degree ranges.
    pub fn new(stations: Vec<Station>) -> Result<Self, CatalogError> {
        if stations.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut index = HashMap::with_capacity(stations.len());
        for (i, station) in stations.iter().enumerate() {
            if !station.lat_lon().is_valid() {
                return Err(CatalogError::InvalidCoordinates {
                    id: station.id.clone(),
                    latitude: station.location.latitude,
                    longitude: station.location.longitude,
                });
            }
            if index.insert(station.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(station.id.clone()));
            }
        }
        Ok(Self { stations, index })
    }

    /// Parses a JSON array of station records.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let stations: Vec<Station> = serde_json::from_str(json)?;
        Self::new(stations)
    }

    /// Reads and parses a station catalog file.
    pub async fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::CatalogRead(path.to_path_buf(), e))?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            "Loaded {} stations from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// The station list compiled into the crate.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_json_str(BUNDLED_STATIONS)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Looks a station up by id. Absence is a normal outcome, e.g. when a UI alias still
    /// points at a station that has since been removed from configuration.
    pub fn get(&self, id: &str) -> Option<&Station> {
        self.index.get(id).map(|&i| &self.stations[i])
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
