use crate::error::{KMeansError, Result};
use ndarray::ArrayView1;
use std::fmt::Debug;

/// Mean Earth radius in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Strategy computing a scalar distance between two coordinate vectors.
///
/// `precise = false` may return any monotonic surrogate of the true distance
/// (e.g. squared distance). It is used wherever only the ordering of
/// distances matters: nearest-cluster search, SSE, k-means++ weights.
pub trait DistanceMetric: Debug + Send + Sync {
    /// Distance between `a` and `b`, which have equal length
    fn distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>, precise: bool) -> f64;

    /// Dimension this metric is restricted to, if any
    fn required_dimension(&self) -> Option<usize> {
        None
    }
}

/// Euclidean distance. Comparison mode skips the square root.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    #[inline]
    fn distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>, precise: bool) -> f64 {
        let sq = squared_euclidean(a, b);
        if precise {
            sq.sqrt()
        } else {
            sq
        }
    }
}

/// Great-circle distance between `[latitude, longitude]` pairs in degrees.
///
/// Precise mode returns kilometres on a sphere of radius
/// `EARTH_RADIUS_KM * scale`; comparison mode returns its square.
///
/// # Panics
///
/// [`DistanceMetric::distance`] panics if either view has fewer than two
/// coordinates. A [`Space`](crate::Space) never passes such views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircle {
    scale: f64,
}

impl GreatCircle {
    /// Create a great-circle metric on a sphere of `EARTH_RADIUS_KM * scale`.
    ///
    /// # Errors
    ///
    /// Returns [`KMeansError::InvalidConfig`] if `scale` is not a positive
    /// finite number.
    pub fn new(scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(KMeansError::InvalidConfig(format!(
                "scale must be a positive finite number, got {}",
                scale
            )));
        }
        Ok(Self { scale })
    }

    /// Factor applied to the Earth radius
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sphere radius in kilometres after scaling
    pub fn radius(&self) -> f64 {
        EARTH_RADIUS_KM * self.scale
    }
}

impl Default for GreatCircle {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl DistanceMetric for GreatCircle {
    fn distance(&self, a: &ArrayView1<f64>, b: &ArrayView1<f64>, precise: bool) -> f64 {
        debug_assert!(a.len() >= 2 && b.len() >= 2, "expected [latitude, longitude]");

        let d = central_angle(a[0], a[1], b[0], b[1]) * self.radius();
        if precise {
            d
        } else {
            d * d
        }
    }

    fn required_dimension(&self) -> Option<usize> {
        Some(2)
    }
}

/// Sum of squared per-dimension differences
#[inline]
pub fn squared_euclidean(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Central angle in radians between two points given in degrees, via the
/// spherical law of cosines. The cosine is clamped to [-1, 1] so round-off
/// near identical or antipodal points cannot leave the acos domain.
/// Identical coordinates always give exactly 0.
pub fn central_angle(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let delta = (lon2 - lon1).to_radians();

    let cos = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * delta.cos();
    cos.clamp(-1.0, 1.0).acos()
}

/// Great-circle distance in kilometres on the mean Earth sphere
pub fn great_circle_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    central_angle(lat1, lon1, lat2, lon2) * EARTH_RADIUS_KM
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_squared_euclidean() {
        let a = array![1.0, 2.0, 3.0];
        let b = array![4.0, 6.0, 3.0];

        assert_relative_eq!(squared_euclidean(&a.view(), &b.view()), 25.0);
    }

    #[test]
    fn test_euclidean_precise_and_comparison() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];

        assert_relative_eq!(Euclidean.distance(&a.view(), &b.view(), true), 5.0);
        assert_relative_eq!(Euclidean.distance(&a.view(), &b.view(), false), 25.0);
    }

    #[test]
    fn test_great_circle_identity_and_symmetry() {
        let metric = GreatCircle::default();
        let paris = array![48.8566, 2.3522];
        let london = array![51.5074, -0.1278];

        assert_eq!(metric.distance(&paris.view(), &paris.view(), true), 0.0);
        assert_relative_eq!(
            metric.distance(&paris.view(), &london.view(), true),
            metric.distance(&london.view(), &paris.view(), true),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_great_circle_same_point_is_zero() {
        let metric = GreatCircle::default();
        let places = [
            array![35.6762, 139.6503],
            array![-33.8688, 151.2093],
            array![40.7128, -74.0060],
            array![89.9999, -179.9999],
        ];

        for p in &places {
            assert_eq!(metric.distance(&p.view(), &p.view(), true), 0.0);
            assert_eq!(metric.distance(&p.view(), &p.view(), false), 0.0);
        }
    }

    #[test]
    fn test_great_circle_rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(GreatCircle::new(scale), Err(KMeansError::InvalidConfig(_))));
        }
        assert_eq!(GreatCircle::new(2.0).unwrap().radius(), 2.0 * EARTH_RADIUS_KM);
    }

    #[test]
    fn test_great_circle_known_distance() {
        // Paris to London is roughly 344 km
        let d = great_circle_km(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((d - 343.5).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_great_circle_scale_and_comparison_mode() {
        let a = array![0.0, 0.0];
        let b = array![0.0, 90.0];
        let quarter = std::f64::consts::FRAC_PI_2 * EARTH_RADIUS_KM;

        let unit = GreatCircle::new(1.0).unwrap();
        let miles = GreatCircle::new(0.621371).unwrap();

        assert_relative_eq!(unit.distance(&a.view(), &b.view(), true), quarter, epsilon = 1e-6);
        assert_relative_eq!(
            miles.distance(&a.view(), &b.view(), true),
            quarter * 0.621371,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            unit.distance(&a.view(), &b.view(), false),
            quarter * quarter,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_antipodal_clamped() {
        let angle = central_angle(90.0, 0.0, -90.0, 0.0);
        assert_relative_eq!(angle, std::f64::consts::PI, epsilon = 1e-9);
    }
}
