use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse reliability label attached to a climatology result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        };
        write!(f, "{s}")
    }
}

/// How often a station's location historically qualified as "sunny" in a day window.
///
/// For blended results `sunny_days` and `total_days` are plain means of the contributing
/// stations, kept for display only; `percentage` is the inverse-distance weighted blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunChance {
    pub sunny_days: u32,
    pub total_days: u32,
    /// Rounded percentage, 0-100.
    pub percentage: u8,
    pub confidence: Confidence,
    /// Whether the sunny-day count came from measured sun hours rather than the
    /// precipitation proxy.
    pub from_sun_hours: bool,
}

impl SunChance {
    /// The zero-data result: 0 %, low confidence.
    pub fn empty() -> Self {
        Self {
            sunny_days: 0,
            total_days: 0,
            percentage: 0,
            confidence: Confidence::Low,
            from_sun_hours: false,
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_days > 0
    }
}
