//! Great-circle distance between two points on the WGS84 globe.
//!
//! All resolver and interpolation code measures distances through [`distance_km`], so the
//! station switching thresholds (5 km single-station radius, 40 km high-altitude fallback)
//! are always expressed in haversine kilometers.

use haversine::{distance, Location as HaversineLocation, Units};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean Earth radius used by the haversine formula, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Represents a geographical coordinate using latitude and longitude in degrees.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use islas_weather::LatLon;
///
/// let la_laguna = LatLon(28.4853, -16.3159);
/// assert_eq!(la_laguna.0, 28.4853); // Latitude
/// assert_eq!(la_laguna.1, -16.3159); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon(pub f64, pub f64);

impl LatLon {
    pub fn latitude(&self) -> f64 {
        self.0
    }

    pub fn longitude(&self) -> f64 {
        self.1
    }

    /// Whether both components are finite and inside the WGS84 degree ranges.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite()
            && self.1.is_finite()
            && (-90.0..=90.0).contains(&self.0)
            && (-180.0..=180.0).contains(&self.1)
    }
}

/// Haversine distance between `a` and `b` in kilometers.
///
/// Coincident points yield exactly `0.0`. Rounding near antipodal points can push the
/// intermediate haversine term just past 1, which would make the formula return NaN; that
/// case is clamped to half the Earth's circumference.
///
/// ```
/// use islas_weather::{distance_km, LatLon};
///
/// let a = LatLon(28.0, -16.5);
/// assert_eq!(distance_km(a, a), 0.0);
/// ```
pub fn distance_km(a: LatLon, b: LatLon) -> f64 {
    let km = distance(
        HaversineLocation {
            latitude: a.0,
            longitude: a.1,
        },
        HaversineLocation {
            latitude: b.0,
            longitude: b.1,
        },
        Units::Kilometers,
    );
    if km.is_nan() {
        PI * EARTH_RADIUS_KM
    } else {
        km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_points_are_zero() {
        let p = LatLon(28.4636, -16.2518);
        let d = distance_km(p, p);
        assert_eq!(d, 0.0);
        assert!(!d.is_nan());
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (LatLon(28.0, -16.5), LatLon(28.3, -16.9)),
            (LatLon(27.75, -18.0), LatLon(29.25, -13.5)),
            (LatLon(-33.87, 151.21), LatLon(51.51, -0.13)),
        ];
        for (a, b) in pairs {
            let ab = distance_km(a, b);
            let ba = distance_km(b, a);
            assert!((ab - ba).abs() < 1e-9, "{ab} != {ba}");
        }
    }

    #[test]
    fn known_inter_island_distance() {
        // Tenerife Norte airport to Gran Canaria airport, roughly 110 km.
        let tfn = LatLon(28.4775, -16.3292);
        let gcxo = LatLon(27.9319, -15.3886);
        let d = distance_km(tfn, gcxo);
        assert!(d > 100.0 && d < 120.0, "unexpected distance {d}");
    }

    #[test]
    fn antipodal_points_are_finite() {
        let d = distance_km(LatLon(0.0, 0.0), LatLon(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn validity_checks_ranges() {
        assert!(LatLon(28.0, -16.0).is_valid());
        assert!(!LatLon(91.0, 0.0).is_valid());
        assert!(!LatLon(0.0, -181.0).is_valid());
        assert!(!LatLon(f64::NAN, 0.0).is_valid());
    }
}
