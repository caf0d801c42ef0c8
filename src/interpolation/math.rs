//! Interpolation primitives shared by the spatial blender and the temporal gap filler.

/// Distances below this are clamped before weighting, so a station sitting on the query
/// point does not produce an infinite weight.
pub const MIN_WEIGHT_DISTANCE_KM: f64 = 0.1;

/// Normalized inverse-square-distance weights: `w_i = 1 / max(d_i, 0.1)^2`, scaled to sum
/// to 1. Every weight is strictly positive for finite input.
///
/// ```
/// use islas_weather::idw_weights;
///
/// let w = idw_weights(&[1.0, 2.0]);
/// assert!((w[0] - 0.8).abs() < 1e-12);
/// assert!((w[1] - 0.2).abs() < 1e-12);
/// ```
pub fn idw_weights(distances_km: &[f64]) -> Vec<f64> {
    let raw: Vec<f64> = distances_km
        .iter()
        .map(|d| 1.0 / d.max(MIN_WEIGHT_DISTANCE_KM).powi(2))
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / total).collect()
}

/// `Σ w_i · v_i`. Weights are expected to be normalized.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    values.iter().zip(weights).map(|(v, w)| v * w).sum()
}

/// Linear interpolation between `a` (at `t = 0`) and `b` (at `t = 1`).
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one_and_are_positive() {
        let cases: [&[f64]; 5] = [
            &[6.0, 8.0, 12.0],
            &[0.0, 0.0, 0.0],
            &[0.01, 50.0, 500.0],
            &[5.1],
            &[1e-9, 1e9],
        ];
        for distances in cases {
            let w = idw_weights(distances);
            let sum: f64 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "weights {w:?} sum to {sum}");
            assert!(w.iter().all(|&x| x > 0.0), "non-positive weight in {w:?}");
        }
    }

    #[test]
    fn near_zero_distances_are_floored() {
        // Both clamp to 0.1 km, so they weigh the same.
        let w = idw_weights(&[0.0, 0.05]);
        assert!((w[0] - 0.5).abs() < 1e-12);
        assert!((w[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn closer_stations_dominate() {
        let w = idw_weights(&[6.0, 8.0, 12.0]);
        assert!(w[0] > w[1] && w[1] > w[2]);
        let t = weighted_mean(&[20.0, 22.0, 24.0], &w);
        assert!(t > 20.0 && t < 22.0, "blended {t}");
        assert!((t - 20.0).abs() < (t - 24.0).abs());
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        assert_eq!(lerp(10.0, 20.0, 0.0), 10.0);
        assert_eq!(lerp(10.0, 20.0, 1.0), 20.0);
        assert_eq!(lerp(10.0, 20.0, 0.5), 15.0);
    }
}
