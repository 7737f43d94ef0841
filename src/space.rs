use crate::algorithm::{self, KMeansResult, SeedStrategy};
use crate::cluster::Cluster;
use crate::config::KMeansConfig;
use crate::distance::{DistanceMetric, Euclidean, GreatCircle};
use crate::error::{KMeansError, Result};
use crate::point::{Geometry, Point, PointId};
use ndarray::{Array1, Zip};
use rand::Rng;
use std::sync::Arc;

/// A collection of points of fixed dimension, the metric used to compare
/// them, and the k-means engine that partitions them.
///
/// `P` is an opaque per-point payload. It is never inspected by the
/// clustering code and is only kept so callers can map results back to
/// their own data.
///
/// # Example
///
/// ```
/// use kmeans_space::{SeedStrategy, Space};
///
/// let mut space: Space<&str> = Space::new(2).unwrap();
/// space.add_point_with(vec![0.0, 0.0], "a").unwrap();
/// space.add_point_with(vec![0.0, 1.0], "b").unwrap();
/// space.add_point_with(vec![10.0, 10.0], "c").unwrap();
///
/// let clusters = space.solve(2, SeedStrategy::KMeansPlusPlus).unwrap();
/// assert_eq!(clusters.len(), 2);
/// assert_eq!(clusters.iter().map(|c| c.len()).sum::<usize>(), 3);
/// ```
#[derive(Debug)]
pub struct Space<P = ()> {
    geometry: Arc<Geometry>,
    points: Vec<Point>,
    payloads: Vec<Option<P>>,
    config: KMeansConfig,
}

impl<P> Space<P> {
    /// Create a Euclidean space.
    ///
    /// # Errors
    ///
    /// Returns [`KMeansError::InvalidConfig`] if `dimension` is 0.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_metric(dimension, Euclidean)
    }

    /// Create a space of latitude/longitude pairs (degrees) compared by
    /// great-circle distance on a sphere of `6371 km * scale`.
    pub fn geographic(scale: f64) -> Result<Self> {
        Self::with_metric(2, GreatCircle::new(scale)?)
    }

    /// Create a space using a custom distance metric
    pub fn with_metric<M>(dimension: usize, metric: M) -> Result<Self>
    where
        M: DistanceMetric + 'static,
    {
        if dimension < 1 {
            return Err(KMeansError::InvalidConfig("dimension must be at least 1".to_string()));
        }
        if let Some(required) = metric.required_dimension() {
            if required != dimension {
                return Err(KMeansError::InvalidConfig(format!(
                    "metric requires dimension {}, got {}",
                    required, dimension
                )));
            }
        }

        Ok(Self {
            geometry: Arc::new(Geometry::new(dimension, Box::new(metric))),
            points: Vec::new(),
            payloads: Vec::new(),
            config: KMeansConfig::default(),
        })
    }

    /// Replace the clustering configuration
    pub fn with_config(mut self, config: KMeansConfig) -> Self {
        self.config = config;
        self
    }

    /// Configuration used by `solve` and random sampling
    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Number of coordinates per point
    pub fn dimension(&self) -> usize {
        self.geometry.dimension()
    }

    /// Distance metric shared by every point of this space
    pub fn metric(&self) -> &dyn DistanceMetric {
        self.geometry.metric()
    }

    /// Number of attached points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no point has been added yet
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Create a point bound to this space without attaching it
    pub fn make_point(&self, coordinates: impl Into<Array1<f64>>) -> Result<Point> {
        Point::new(coordinates.into(), Arc::clone(&self.geometry))
    }

    /// Attach a point without payload
    pub fn add_point(&mut self, coordinates: impl Into<Array1<f64>>) -> Result<PointId> {
        self.insert(coordinates.into(), None)
    }

    /// Attach a point carrying `payload`
    pub fn add_point_with(
        &mut self,
        coordinates: impl Into<Array1<f64>>,
        payload: P,
    ) -> Result<PointId> {
        self.insert(coordinates.into(), Some(payload))
    }

    fn insert(&mut self, coordinates: Array1<f64>, payload: Option<P>) -> Result<PointId> {
        let point = Point::new(coordinates, Arc::clone(&self.geometry))?;
        let id = PointId {
            space: self.geometry.id(),
            index: self.points.len(),
        };

        self.points.push(point);
        self.payloads.push(payload);
        Ok(id)
    }

    /// The point behind `id`, or `None` if it belongs to another space
    pub fn point(&self, id: PointId) -> Option<&Point> {
        if id.space != self.geometry.id() {
            return None;
        }
        self.points.get(id.index)
    }

    /// Payload attached with `add_point_with`, if any
    pub fn payload(&self, id: PointId) -> Option<&P> {
        if id.space != self.geometry.id() {
            return None;
        }
        self.payloads.get(id.index).and_then(Option::as_ref)
    }

    /// Attached points in insertion order
    pub fn points(&self) -> impl ExactSizeIterator<Item = (PointId, &Point)> + '_ {
        let space = self.geometry.id();
        self.points
            .iter()
            .enumerate()
            .map(move |(index, point)| (PointId { space, index }, point))
    }

    /// Handles of all points in insertion order
    pub fn point_ids(&self) -> impl ExactSizeIterator<Item = PointId> + '_ {
        self.points().map(|(id, _)| id)
    }

    /// Distance between two points of this space
    pub fn distance(&self, a: &Point, b: &Point, precise: bool) -> Result<f64> {
        if a.geometry().id() != self.geometry.id() {
            return Err(KMeansError::InvalidOperation(
                "point does not belong to this space".to_string(),
            ));
        }
        a.distance_to(b, precise)
    }

    /// Per-dimension minimum and maximum over all attached points, as two
    /// synthetic points. `None` when the space is empty.
    pub fn boundaries(&self) -> Option<(Point, Point)> {
        let (first, rest) = self.points.split_first()?;

        let mut min = first.coordinates().to_owned();
        let mut max = first.coordinates().to_owned();
        for point in rest {
            Zip::from(&mut min)
                .and(&mut max)
                .and(&point.coordinates())
                .for_each(|lo, hi, &x| {
                    *lo = lo.min(x);
                    *hi = hi.max(x);
                });
        }

        let geometry = &self.geometry;
        Some((
            Point::new(min, Arc::clone(geometry)).ok()?,
            Point::new(max, Arc::clone(geometry)).ok()?,
        ))
    }

    /// A synthetic point with each coordinate drawn uniformly between the
    /// matching coordinates of `min` and `max`.
    ///
    /// Draws are integers in the truncated inclusive range unless
    /// [`KMeansConfig::continuous_sampling`] is set.
    pub fn random_point<R: Rng>(&self, min: &Point, max: &Point, rng: &mut R) -> Result<Point> {
        for bound in [min, max] {
            if bound.geometry().id() != self.geometry.id() {
                return Err(KMeansError::InvalidOperation(
                    "boundary point does not belong to this space".to_string(),
                ));
            }
        }

        let continuous = self.config.continuous_sampling;
        let coordinates = Zip::from(&min.coordinates())
            .and(&max.coordinates())
            .map_collect(|&lo, &hi| algorithm::sample_coordinate(lo, hi, continuous, rng));

        Point::new(coordinates, Arc::clone(&self.geometry))
    }

    /// Seed `k` clusters and attach every point to the first one
    pub fn initialize_clusters<R: Rng>(
        &self,
        k: usize,
        strategy: SeedStrategy,
        rng: &mut R,
    ) -> Result<Vec<Cluster>> {
        algorithm::initialize_clusters(self, k, strategy, rng)
    }

    /// Run one assignment round: move every point to its nearest cluster and
    /// recompute centroids. Returns `true` if any point moved.
    pub fn iterate(&self, clusters: &mut [Cluster]) -> Result<bool> {
        Ok(algorithm::assign_round(self, clusters, self.config.parallel)? > 0)
    }

    /// Partition the points into `k` clusters, in seeding order
    pub fn solve(&self, k: usize, strategy: SeedStrategy) -> Result<Vec<Cluster>> {
        self.solve_with_callback(k, strategy, |_, _| {})
    }

    /// Like [`Space::solve`], calling `on_iteration` before every round,
    /// including the final round that finds no movement.
    pub fn solve_with_callback<F>(
        &self,
        k: usize,
        strategy: SeedStrategy,
        on_iteration: F,
    ) -> Result<Vec<Cluster>>
    where
        F: FnMut(&Self, &[Cluster]),
    {
        Ok(self.solve_detailed(k, strategy, on_iteration)?.clusters)
    }

    /// Like [`Space::solve_with_callback`], also reporting iteration count
    /// and whether the run converged.
    pub fn solve_detailed<F>(
        &self,
        k: usize,
        strategy: SeedStrategy,
        on_iteration: F,
    ) -> Result<KMeansResult>
    where
        F: FnMut(&Self, &[Cluster]),
    {
        algorithm::solve(self, k, strategy, on_iteration)
    }

    /// Total SSE across `clusters`
    pub fn total_sse(&self, clusters: &[Cluster]) -> Result<f64> {
        clusters
            .iter()
            .map(|c| c.sum_of_squared_error(self))
            .sum()
    }

    /// Index of the cluster holding each point, in point order
    pub fn labels(&self, clusters: &[Cluster]) -> Vec<Option<usize>> {
        let mut labels = vec![None; self.points.len()];
        for (cluster_idx, cluster) in clusters.iter().enumerate() {
            for id in cluster.members() {
                if id.space == self.geometry.id() {
                    if let Some(slot) = labels.get_mut(id.index) {
                        *slot = Some(cluster_idx);
                    }
                }
            }
        }
        labels
    }

    pub(crate) fn id(&self) -> u64 {
        self.geometry.id()
    }

    pub(crate) fn raw_points(&self) -> &[Point] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_zero_dimension_rejected() {
        let result: Result<Space> = Space::new(0);
        assert!(matches!(result, Err(KMeansError::InvalidConfig(_))));
    }

    #[test]
    fn test_geographic_rejects_bad_scale() {
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result: Result<Space> = Space::geographic(scale);
            assert!(matches!(result, Err(KMeansError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_metric_dimension_mismatch() {
        let result: Result<Space> = Space::with_metric(3, GreatCircle::default());
        assert!(matches!(result, Err(KMeansError::InvalidConfig(_))));
    }

    #[test]
    fn test_add_point_checks_dimension() {
        let mut space: Space = Space::new(3).unwrap();
        let result = space.add_point(vec![1.0, 2.0]);

        assert!(matches!(result, Err(KMeansError::InvalidDimensions(_))));
        assert!(space.is_empty());
    }

    #[test]
    fn test_payload_round_trip() {
        let mut space = Space::new(1).unwrap();
        let a = space.add_point_with(vec![1.0], "alpha").unwrap();
        let b = space.add_point(vec![2.0]).unwrap();

        assert_eq!(space.payload(a), Some(&"alpha"));
        assert_eq!(space.payload(b), None);
        assert_eq!(space.len(), 2);
    }

    #[test]
    fn test_foreign_handle_not_resolved() {
        let mut a: Space = Space::new(1).unwrap();
        let mut b: Space = Space::new(1).unwrap();
        a.add_point(vec![1.0]).unwrap();
        let foreign = b.add_point(vec![1.0]).unwrap();

        assert!(a.point(foreign).is_none());
    }

    #[test]
    fn test_boundaries() {
        let mut space: Space = Space::new(2).unwrap();
        assert!(space.boundaries().is_none());

        space.add_point(vec![1.0, -5.0]).unwrap();
        space.add_point(vec![-2.0, 3.0]).unwrap();
        space.add_point(vec![4.0, 0.0]).unwrap();

        let (min, max) = space.boundaries().unwrap();
        assert_eq!(min.coordinates().to_vec(), vec![-2.0, -5.0]);
        assert_eq!(max.coordinates().to_vec(), vec![4.0, 3.0]);
    }

    #[test]
    fn test_random_point_integer_sampling() {
        let mut space: Space = Space::new(2).unwrap();
        space.add_point(vec![0.5, -3.7]).unwrap();
        space.add_point(vec![4.2, 2.9]).unwrap();
        let (min, max) = space.boundaries().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..50 {
            let p = space.random_point(&min, &max, &mut rng).unwrap();
            let x = p.coordinate(0).unwrap();
            let y = p.coordinate(1).unwrap();
            assert_eq!(x.fract(), 0.0);
            assert_eq!(y.fract(), 0.0);
            assert!((0.0..=4.0).contains(&x));
            assert!((-3.0..=2.0).contains(&y));
        }
    }

    #[test]
    fn test_random_point_continuous_sampling() {
        let config = KMeansConfig::default().with_continuous_sampling(true);
        let mut space: Space = Space::new(1).unwrap().with_config(config);
        space.add_point(vec![0.25]).unwrap();
        space.add_point(vec![0.75]).unwrap();
        let (min, max) = space.boundaries().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let p = space.random_point(&min, &max, &mut rng).unwrap();
        let x = p.coordinate(0).unwrap();
        assert!((0.25..=0.75).contains(&x));
    }

    #[test]
    fn test_distance_rejects_foreign_point() {
        let a: Space = Space::new(2).unwrap();
        let b: Space = Space::new(2).unwrap();
        let p = a.make_point(vec![0.0, 0.0]).unwrap();
        let q = b.make_point(vec![0.0, 0.0]).unwrap();

        assert!(matches!(
            a.distance(&p, &q, true),
            Err(KMeansError::InvalidOperation(_))
        ));
        assert!(matches!(
            a.distance(&q, &q, true),
            Err(KMeansError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_geographic_distance() {
        let space: Space = Space::geographic(1.0).unwrap();
        let a = space.make_point(vec![0.0, 0.0]).unwrap();
        let b = space.make_point(vec![0.0, 180.0]).unwrap();

        assert_relative_eq!(
            space.distance(&a, &b, true).unwrap(),
            std::f64::consts::PI * 6371.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_labels() {
        let mut space: Space = Space::new(1).unwrap();
        let ids: Vec<PointId> = [0.0, 1.0, 10.0]
            .iter()
            .map(|&x| space.add_point(vec![x]).unwrap())
            .collect();

        let mut low = Cluster::new(space.make_point(vec![0.5]).unwrap());
        let mut high = Cluster::new(space.make_point(vec![10.0]).unwrap());
        low.attach_all(ids[..2].iter().copied()).unwrap();
        high.attach(ids[2]).unwrap();

        let labels = space.labels(&[low, high]);
        assert_eq!(labels, vec![Some(0), Some(0), Some(1)]);
    }
}
