use crate::geo::{distance_km, LatLon};
use crate::stations::catalog::StationCatalog;
use crate::types::station::Station;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// A high-altitude station is abandoned in favour of the nearest regular station when it is
/// more than this many times farther away than that regular station...
pub const HIGH_ALTITUDE_FALLBACK_RATIO: f64 = 3.0;
/// ...and the regular station is closer than this.
pub const HIGH_ALTITUDE_FALLBACK_MAX_KM: f64 = 40.0;
/// Below this distance to the nearest station, that station's value is used verbatim.
pub const SINGLE_STATION_RADIUS_KM: f64 = 5.0;
/// Number of stations blended when no station is within [`SINGLE_STATION_RADIUS_KM`].
pub const BLEND_STATION_COUNT: usize = 3;

/// How the high-altitude station class is treated by [`StationResolver::nearest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeMode {
    /// Ignore high-altitude stations even when closer. The default for ordinary queries.
    #[default]
    Regular,
    /// Prefer the nearest high-altitude station, falling back to a much closer regular
    /// station (used for mountain-peak queries).
    PreferHighAltitude,
    /// Whichever station is strictly closer.
    Any,
}

/// A station together with its distance from the query point.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestStation {
    pub station: Station,
    pub distance_km: f64,
    /// Set when [`AltitudeMode::PreferHighAltitude`] was requested but the regular station
    /// was returned because the high-altitude candidate was too far away.
    pub high_altitude_fallback: bool,
}

impl NearestStation {
    fn new(station: &Station, distance_km: f64) -> Self {
        Self {
            station: station.clone(),
            distance_km,
            high_altitude_fallback: false,
        }
    }
}

/// Which stations explain a query point.
#[derive(Debug, Clone, PartialEq)]
pub enum StationPlan {
    /// The nearest regular station is within [`SINGLE_STATION_RADIUS_KM`].
    Single(NearestStation),
    /// Up to [`BLEND_STATION_COUNT`] nearest regular stations, ascending by distance.
    Blend(Vec<NearestStation>),
}

impl StationPlan {
    pub fn stations(&self) -> &[NearestStation] {
        match self {
            StationPlan::Single(nearest) => std::slice::from_ref(nearest),
            StationPlan::Blend(nearest) => nearest,
        }
    }
}

/// Nearest-station queries over a [`StationCatalog`].
///
/// Catalogs hold tens of stations, so every query is a linear scan; ties are broken by
/// catalog order, which makes results deterministic for a given catalog.
#[derive(Debug, Clone)]
pub struct StationResolver {
    catalog: Arc<StationCatalog>,
}

impl StationResolver {
    pub fn new(catalog: Arc<StationCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// Finds the single station that best explains `point`.
    ///
    /// The scan tracks the nearest high-altitude and the nearest regular station separately.
    /// With [`AltitudeMode::PreferHighAltitude`] the high-altitude station wins unless it is
    /// more than [`HIGH_ALTITUDE_FALLBACK_RATIO`] times farther than the regular one *and*
    /// the regular one is within [`HIGH_ALTITUDE_FALLBACK_MAX_KM`]; the regular station is
    /// then returned with `high_altitude_fallback` set.
    ///
    /// A point always resolves to a station when the catalog has any: in
    /// [`AltitudeMode::Regular`] a catalog holding only high-altitude stations yields the
    /// nearest of those.
    pub fn nearest(&self, point: LatLon, mode: AltitudeMode) -> Option<NearestStation> {
        let mut nearest_high: Option<(&Station, f64)> = None;
        let mut nearest_regular: Option<(&Station, f64)> = None;

        for station in self.catalog.stations() {
            let d = distance_km(point, station.lat_lon());
            let slot = if station.high_altitude {
                &mut nearest_high
            } else {
                &mut nearest_regular
            };
            if slot.map_or(true, |(_, best)| d < best) {
                *slot = Some((station, d));
            }
        }

        let chosen = match mode {
            AltitudeMode::PreferHighAltitude => match (nearest_high, nearest_regular) {
                (Some((_, high_d)), Some((regular, regular_d)))
                    if high_d > HIGH_ALTITUDE_FALLBACK_RATIO * regular_d
                        && regular_d < HIGH_ALTITUDE_FALLBACK_MAX_KM =>
                {
                    return Some(NearestStation {
                        high_altitude_fallback: true,
                        ..NearestStation::new(regular, regular_d)
                    });
                }
                (Some(high), _) => Some(high),
                (None, regular) => regular,
            },
            AltitudeMode::Regular => nearest_regular.or(nearest_high),
            AltitudeMode::Any => match (nearest_high, nearest_regular) {
                (Some(high), Some(regular)) => {
                    if high.1 < regular.1 {
                        Some(high)
                    } else {
                        Some(regular)
                    }
                }
                (high, regular) => high.or(regular),
            },
        };

        chosen.map(|(station, d)| NearestStation::new(station, d))
    }

    /// Up to `count` stations ordered by ascending distance.
    ///
    /// With `exclude_high_altitude` the high-altitude class is skipped, unless the catalog
    /// contains nothing else. Equal distances keep catalog order.
    pub fn nearest_n(
        &self,
        point: LatLon,
        count: usize,
        exclude_high_altitude: bool,
    ) -> Vec<NearestStation> {
        if count == 0 {
            return vec![];
        }

        let stations = self.catalog.stations();
        let has_regular = stations.iter().any(|s| !s.high_altitude);
        let skip_high = exclude_high_altitude && has_regular;

        let mut candidates: Vec<(&Station, f64)> = stations
            .iter()
            .filter(|s| !(skip_high && s.high_altitude))
            .map(|s| (s, distance_km(point, s.lat_lon())))
            .collect();

        // Stable sort: ties stay in catalog order.
        candidates.sort_by_key(|(_, d)| OrderedFloat(*d));
        candidates.truncate(count);

        candidates
            .into_iter()
            .map(|(station, d)| NearestStation::new(station, d))
            .collect()
    }

    /// Resolves free text (a place name) to a station through its aliases.
    ///
    /// An exact case-insensitive alias match wins; otherwise the first alias that contains
    /// the text, or is contained in it, is used. "First" follows catalog order.
    pub fn find_by_alias(&self, text: &str) -> Option<&Station> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let stations = self.catalog.stations();

        stations
            .iter()
            .find(|s| {
                s.aliases
                    .iter()
                    .any(|alias| alias.trim().to_lowercase() == needle)
            })
            .or_else(|| {
                stations.iter().find(|s| {
                    s.aliases.iter().any(|alias| {
                        let alias = alias.trim().to_lowercase();
                        !alias.is_empty() && (alias.contains(&needle) || needle.contains(&alias))
                    })
                })
            })
    }

    /// Decides between single-station and blended mode for `point`.
    ///
    /// The boundary is strict: a nearest station at exactly 5.0 km is blended.
    pub fn plan(&self, point: LatLon) -> Option<StationPlan> {
        let nearest = self.nearest(point, AltitudeMode::Regular)?;
        Some(self.plan_around(point, nearest))
    }

    fn plan_around(&self, point: LatLon, nearest: NearestStation) -> StationPlan {
        if nearest.distance_km < SINGLE_STATION_RADIUS_KM {
            StationPlan::Single(nearest)
        } else {
            StationPlan::Blend(self.nearest_n(point, BLEND_STATION_COUNT, true))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::geo::EARTH_RADIUS_KM;
    use crate::types::station::Location;

    /// Degrees of latitude spanning `km` along a meridian.
    pub(crate) fn km_north(km: f64) -> f64 {
        km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0)
    }

    pub(crate) fn station(id: &str, latitude: f64, longitude: f64, high_altitude: bool) -> Station {
        Station {
            id: id.to_string(),
            name: format!("Station {id}"),
            region: "Tenerife".to_string(),
            location: Location {
                latitude,
                longitude,
                altitude_m: if high_altitude { 2300 } else { 50 },
            },
            high_altitude,
            northern_exposure: false,
            aliases: vec![],
        }
    }

    pub(crate) fn resolver(stations: Vec<Station>) -> StationResolver {
        StationResolver::new(Arc::new(StationCatalog::new(stations).unwrap()))
    }

    fn end_to_end_resolver() -> StationResolver {
        resolver(vec![
            station("X", 28.0, -16.5, false),
            station("Y", 28.3, -16.9, true),
        ])
    }

    #[test]
    fn regular_mode_ignores_closer_high_altitude_station() {
        let r = end_to_end_resolver();
        let found = r.nearest(LatLon(28.05, -16.55), AltitudeMode::Regular).unwrap();
        assert_eq!(found.station.id, "X");
        assert!(!found.high_altitude_fallback);

        // Even right next to Y, regular mode answers with X.
        let found = r.nearest(LatLon(28.3, -16.9), AltitudeMode::Regular).unwrap();
        assert_eq!(found.station.id, "X");
    }

    #[test]
    fn prefer_high_altitude_near_peak_returns_peak_station() {
        let r = end_to_end_resolver();
        let found = r
            .nearest(LatLon(28.29, -16.88), AltitudeMode::PreferHighAltitude)
            .unwrap();
        assert_eq!(found.station.id, "Y");
        assert!(!found.high_altitude_fallback);
    }

    #[test]
    fn prefer_high_altitude_without_regular_stations_is_unconditional() {
        let r = resolver(vec![station("Y", 28.3, -16.9, true)]);
        let found = r
            .nearest(LatLon(27.0, -15.0), AltitudeMode::PreferHighAltitude)
            .unwrap();
        assert_eq!(found.station.id, "Y");
        assert!(!found.high_altitude_fallback);
    }

    #[test]
    fn far_high_altitude_station_falls_back_to_regular() {
        // High-altitude candidate at 130 km, regular candidate at 20 km.
        let r = resolver(vec![
            station("HIGH", 28.0 + km_north(130.0), -16.0, true),
            station("REG", 28.0 + km_north(20.0), -16.0, false),
        ]);
        let found = r
            .nearest(LatLon(28.0, -16.0), AltitudeMode::PreferHighAltitude)
            .unwrap();
        assert_eq!(found.station.id, "REG");
        assert!(found.high_altitude_fallback);
        assert!((found.distance_km - 20.0).abs() < 1e-6);
    }

    #[test]
    fn high_altitude_within_ratio_is_kept() {
        // 50 km is not more than 3 x 20 km.
        let r = resolver(vec![
            station("HIGH", 28.0 + km_north(50.0), -16.0, true),
            station("REG", 28.0 + km_north(20.0), -16.0, false),
        ]);
        let found = r
            .nearest(LatLon(28.0, -16.0), AltitudeMode::PreferHighAltitude)
            .unwrap();
        assert_eq!(found.station.id, "HIGH");
        assert!(!found.high_altitude_fallback);
    }

    #[test]
    fn distant_regular_station_does_not_trigger_fallback() {
        // Ratio is exceeded, but the regular station is not within 40 km.
        let r = resolver(vec![
            station("HIGH", 28.0 + km_north(200.0), -16.0, true),
            station("REG", 28.0 + km_north(45.0), -16.0, false),
        ]);
        let found = r
            .nearest(LatLon(28.0, -16.0), AltitudeMode::PreferHighAltitude)
            .unwrap();
        assert_eq!(found.station.id, "HIGH");
    }

    #[test]
    fn any_mode_returns_strictly_closer_station() {
        let r = end_to_end_resolver();
        let found = r.nearest(LatLon(28.29, -16.88), AltitudeMode::Any).unwrap();
        assert_eq!(found.station.id, "Y");
        let found = r.nearest(LatLon(28.01, -16.51), AltitudeMode::Any).unwrap();
        assert_eq!(found.station.id, "X");
    }

    #[test]
    fn nearest_is_deterministic() {
        let r = resolver(StationCatalog::bundled().unwrap().stations().to_vec());
        let point = LatLon(28.3, -16.4);
        let first = r.nearest(point, AltitudeMode::Regular).unwrap();
        for _ in 0..20 {
            assert_eq!(r.nearest(point, AltitudeMode::Regular).unwrap(), first);
        }
    }

    #[test]
    fn only_high_altitude_catalog_still_resolves_in_regular_mode() {
        let r = resolver(vec![station("Y", 28.3, -16.9, true)]);
        let found = r.nearest(LatLon(28.0, -16.0), AltitudeMode::Regular).unwrap();
        assert_eq!(found.station.id, "Y");
    }

    #[test]
    fn nearest_n_orders_by_distance_and_excludes_high_altitude() {
        let r = resolver(vec![
            station("FAR", 28.0 + km_north(30.0), -16.0, false),
            station("PEAK", 28.0 + km_north(1.0), -16.0, true),
            station("NEAR", 28.0 + km_north(10.0), -16.0, false),
            station("MID", 28.0 + km_north(20.0), -16.0, false),
        ]);
        let ids: Vec<_> = r
            .nearest_n(LatLon(28.0, -16.0), 3, true)
            .into_iter()
            .map(|n| n.station.id)
            .collect();
        assert_eq!(ids, ["NEAR", "MID", "FAR"]);

        let ids: Vec<_> = r
            .nearest_n(LatLon(28.0, -16.0), 2, false)
            .into_iter()
            .map(|n| n.station.id)
            .collect();
        assert_eq!(ids, ["PEAK", "NEAR"]);
    }

    #[test]
    fn nearest_n_ties_keep_catalog_order() {
        let r = resolver(vec![
            station("B", 28.1, -16.0, false),
            station("A", 28.1, -16.0, false),
            station("C", 28.2, -16.0, false),
        ]);
        let ids: Vec<_> = r
            .nearest_n(LatLon(28.0, -16.0), 3, true)
            .into_iter()
            .map(|n| n.station.id)
            .collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn nearest_n_zero_and_oversized_counts() {
        let r = end_to_end_resolver();
        assert!(r.nearest_n(LatLon(28.0, -16.5), 0, false).is_empty());
        assert_eq!(r.nearest_n(LatLon(28.0, -16.5), 10, false).len(), 2);
    }

    #[test]
    fn plan_switches_at_five_kilometers() {
        let stations = |first_km: f64| {
            vec![
                station("S1", 28.0 + km_north(first_km), -16.0, false),
                station("S2", 28.0 + km_north(8.0), -16.0, false),
                station("S3", 28.0 + km_north(12.0), -16.0, false),
                station("S4", 28.0 + km_north(25.0), -16.0, false),
            ]
        };
        let point = LatLon(28.0, -16.0);

        match resolver(stations(4.9)).plan(point).unwrap() {
            StationPlan::Single(n) => assert_eq!(n.station.id, "S1"),
            other => panic!("expected single-station plan, got {other:?}"),
        }

        match resolver(stations(5.1)).plan(point).unwrap() {
            StationPlan::Blend(ns) => {
                let ids: Vec<_> = ns.iter().map(|n| n.station.id.as_str()).collect();
                assert_eq!(ids, ["S1", "S2", "S3"]);
            }
            other => panic!("expected blended plan, got {other:?}"),
        }
    }

    #[test]
    fn nearest_at_exactly_five_kilometers_is_blended() {
        let r = resolver(vec![
            station("S1", 28.0 + km_north(5.0), -16.0, false),
            station("S2", 28.0 + km_north(8.0), -16.0, false),
            station("S3", 28.0 + km_north(12.0), -16.0, false),
        ]);
        let point = LatLon(28.0, -16.0);
        let mut nearest = r.nearest(point, AltitudeMode::Regular).unwrap();
        assert_eq!(nearest.station.id, "S1");
        assert!((nearest.distance_km - 5.0).abs() < 1e-9);

        // Pin the measured distance to the boundary itself.
        nearest.distance_km = SINGLE_STATION_RADIUS_KM;
        match r.plan_around(point, nearest.clone()) {
            StationPlan::Blend(ns) => {
                let ids: Vec<_> = ns.iter().map(|n| n.station.id.as_str()).collect();
                assert_eq!(ids, ["S1", "S2", "S3"]);
            }
            other => panic!("expected blended plan, got {other:?}"),
        }

        nearest.distance_km = SINGLE_STATION_RADIUS_KM - 1e-9;
        assert!(matches!(r.plan_around(point, nearest), StationPlan::Single(_)));
    }

    #[test]
    fn alias_exact_match_is_case_insensitive() {
        let r = resolver(StationCatalog::bundled().unwrap().stations().to_vec());
        assert_eq!(r.find_by_alias("teide").unwrap().id, "C430E");
        assert_eq!(r.find_by_alias("  IZAÑA ").unwrap().id, "C430E");
    }

    #[test]
    fn alias_substring_match_uses_catalog_order() {
        let r = resolver(StationCatalog::bundled().unwrap().stations().to_vec());
        // Both "Puerto de la Cruz" and "Puerto del Carmen" contain the text; the first
        // catalogued station wins.
        assert_eq!(r.find_by_alias("puerto").unwrap().id, "C459Z");
        // The text contains the alias.
        assert_eq!(r.find_by_alias("Hotel in Maspalomas").unwrap().id, "C689E");
    }

    #[test]
    fn alias_lookup_misses() {
        let r = resolver(StationCatalog::bundled().unwrap().stations().to_vec());
        assert!(r.find_by_alias("Madrid").is_none());
        assert!(r.find_by_alias("   ").is_none());
    }
}
