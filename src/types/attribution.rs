//! Provenance records attached to every point-based result, so callers can show which
//! station(s) a value came from and how much each one counted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMode {
    /// The value is one station's value, verbatim.
    SingleStation,
    /// The value is an inverse-distance weighted blend of several stations.
    Interpolated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub station_id: String,
    pub distance_km: f64,
    /// Normalized weight; the weights of one attribution sum to 1.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub mode: AttributionMode,
    /// Ordered by descending weight (nearest station first).
    pub contributions: Vec<Contribution>,
}

impl Attribution {
    pub fn single(station_id: impl Into<String>, distance_km: f64) -> Self {
        Self {
            mode: AttributionMode::SingleStation,
            contributions: vec![Contribution {
                station_id: station_id.into(),
                distance_km,
                weight: 1.0,
            }],
        }
    }

    /// The station that contributed most.
    pub fn primary(&self) -> Option<&Contribution> {
        self.contributions.first()
    }
}

/// Result of a point query that may draw on several stations.
#[derive(Debug, Clone, PartialEq)]
pub enum PointResult<T> {
    Available { value: T, attribution: Attribution },
    /// No contributing station produced data.
    Unavailable,
}

impl<T> PointResult<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            PointResult::Available { value, .. } => Some(value),
            PointResult::Unavailable => None,
        }
    }

    pub fn attribution(&self) -> Option<&Attribution> {
        match self {
            PointResult::Available { attribution, .. } => Some(attribution),
            PointResult::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PointResult::Available { .. })
    }
}
