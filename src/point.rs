use crate::cluster::Cluster;
use crate::distance::DistanceMetric;
use crate::error::{KMeansError, Result};
use ndarray::{Array1, ArrayView1};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_SPACE_ID: AtomicU64 = AtomicU64::new(1);

/// Dimension and metric shared by every point of one space.
///
/// Identity is the allocation itself: two spaces with equal dimension and
/// metric are still distinct.
#[derive(Debug)]
pub(crate) struct Geometry {
    id: u64,
    dimension: usize,
    metric: Box<dyn DistanceMetric>,
}

impl Geometry {
    pub(crate) fn new(dimension: usize, metric: Box<dyn DistanceMetric>) -> Self {
        Self {
            id: NEXT_SPACE_ID.fetch_add(1, Ordering::Relaxed),
            dimension,
            metric,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn dimension(&self) -> usize {
        self.dimension
    }

    pub(crate) fn metric(&self) -> &dyn DistanceMetric {
        self.metric.as_ref()
    }
}

/// Stable handle to a point attached to a [`Space`](crate::Space).
///
/// Handles are only produced by the space that owns the point and are
/// compared by identity, never by coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId {
    pub(crate) space: u64,
    pub(crate) index: usize,
}

impl PointId {
    /// Position of the point in its space's iteration order
    pub fn index(&self) -> usize {
        self.index
    }
}

/// A coordinate vector bound to one space
#[derive(Debug, Clone)]
pub struct Point {
    coordinates: Array1<f64>,
    geometry: Arc<Geometry>,
}

impl Point {
    pub(crate) fn new(coordinates: Array1<f64>, geometry: Arc<Geometry>) -> Result<Self> {
        if coordinates.len() != geometry.dimension() {
            return Err(KMeansError::InvalidDimensions(format!(
                "Expected {} coordinates, got {}",
                geometry.dimension(),
                coordinates.len()
            )));
        }

        Ok(Self {
            coordinates,
            geometry,
        })
    }

    /// Number of coordinates
    pub fn dimension(&self) -> usize {
        self.coordinates.len()
    }

    /// Borrowed view of all coordinates
    pub fn coordinates(&self) -> ArrayView1<'_, f64> {
        self.coordinates.view()
    }

    /// Coordinate at `index`, bounds-checked against the dimension
    pub fn coordinate(&self, index: usize) -> Result<f64> {
        self.coordinates
            .get(index)
            .copied()
            .ok_or(KMeansError::CoordinateOutOfBounds {
                index,
                dimension: self.dimension(),
            })
    }

    /// True when both points were produced by the same space instance
    pub fn same_space(&self, other: &Point) -> bool {
        Arc::ptr_eq(&self.geometry, &other.geometry)
    }

    /// Distance to `other` under the owning space's metric
    pub fn distance_to(&self, other: &Point, precise: bool) -> Result<f64> {
        if !self.same_space(other) {
            return Err(KMeansError::InvalidOperation(
                "cannot measure distance between points of different spaces".to_string(),
            ));
        }

        Ok(self
            .geometry
            .metric()
            .distance(&self.coordinates.view(), &other.coordinates.view(), precise))
    }

    /// Index of the cluster whose centroid is nearest to this point.
    ///
    /// Ties resolve to the first minimum in `clusters` order. Returns
    /// `None` for an empty slice.
    pub fn closest_index(&self, clusters: &[Cluster]) -> Result<Option<usize>> {
        let mut best: Option<(usize, f64)> = None;

        for (i, cluster) in clusters.iter().enumerate() {
            let dist = self.distance_to(cluster.centroid(), false)?;
            match best {
                Some((_, best_dist)) if dist >= best_dist => {}
                _ => best = Some((i, dist)),
            }
        }

        Ok(best.map(|(i, _)| i))
    }

    /// The cluster whose centroid is nearest to this point
    pub fn closest_among<'a>(&self, clusters: &'a [Cluster]) -> Result<Option<&'a Cluster>> {
        Ok(self.closest_index(clusters)?.map(|i| &clusters[i]))
    }

    pub(crate) fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    pub(crate) fn space_id(&self) -> u64 {
        self.geometry.id()
    }

    pub(crate) fn set_coordinates(&mut self, coordinates: Array1<f64>) {
        debug_assert_eq!(coordinates.len(), self.coordinates.len());
        self.coordinates = coordinates;
    }
}
