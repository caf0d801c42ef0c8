//! Defines the data structures representing the fixed weather-observation stations of the
//! archipelago: identity, location, altitude class and the place-name aliases each covers.

use crate::geo::LatLon;
use serde::{Deserialize, Serialize};

/// Represents a single fixed physical weather station.
///
/// Stations are loaded once from static configuration (see
/// [`StationCatalog`](crate::StationCatalog)) and are read-only for the lifetime of the
/// process. The `id` is the national weather service indicator (e.g. `"C447A"`) and is the
/// join key used by the live pipeline, the caches and the historical store.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// The unique station code (e.g., "C447A" for Tenerife Norte airport).
    pub id: String,
    /// Display name.
    pub name: String,
    /// The containing region label, usually the island name.
    pub region: String,
    /// Geographical location details (latitude, longitude, altitude).
    pub location: Location,
    /// Whether the station represents mountain/summit conditions rather than ground-level
    /// civilian conditions. Such stations are ignored by ordinary queries.
    #[serde(default)]
    pub high_altitude: bool,
    /// Whether the station sits on a northern-exposure slope. The precipitation-only
    /// sun-chance proxy is damped for these stations.
    #[serde(default)]
    pub northern_exposure: bool,
    /// Place names this station covers, matched by [`StationResolver::find_by_alias`](crate::StationResolver::find_by_alias).
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Represents the geographical location of a weather station.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Altitude above sea level in meters.
    pub altitude_m: i32,
}

impl Station {
    /// The station position as a [`LatLon`] pair.
    pub fn lat_lon(&self) -> LatLon {
        LatLon(self.location.latitude, self.location.longitude)
    }
}
