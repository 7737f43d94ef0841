use crate::error::{KMeansError, Result};
use crate::point::{Point, PointId};
use crate::space::Space;
use ndarray::Array1;
use std::collections::BTreeSet;

/// A centroid plus the set of points currently assigned to it.
///
/// Members are held by handle, so a cluster can never contain another
/// cluster. The centroid only changes through [`Cluster::recompute_centroid`].
#[derive(Debug, Clone)]
pub struct Cluster {
    centroid: Point,
    members: BTreeSet<PointId>,
}

impl Cluster {
    pub(crate) fn new(centroid: Point) -> Self {
        Self {
            centroid,
            members: BTreeSet::new(),
        }
    }

    /// Current centroid, a point of the owning space's geometry
    pub fn centroid(&self) -> &Point {
        &self.centroid
    }

    /// Number of member points
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the cluster has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: PointId) -> bool {
        self.members.contains(&id)
    }

    /// Member handles in space order
    pub fn members(&self) -> impl ExactSizeIterator<Item = PointId> + '_ {
        self.members.iter().copied()
    }

    /// Add a point to this cluster. Returns `false` if it was already a member.
    pub fn attach(&mut self, id: PointId) -> Result<bool> {
        self.check_owned(id)?;
        Ok(self.members.insert(id))
    }

    /// Remove a point. Returns `false` if it was not a member.
    pub fn detach(&mut self, id: PointId) -> bool {
        self.members.remove(&id)
    }

    /// Attach every point, or none if any handle belongs to another space
    pub fn attach_all<I>(&mut self, ids: I) -> Result<usize>
    where
        I: IntoIterator<Item = PointId>,
    {
        let ids: Vec<PointId> = ids.into_iter().collect();
        for &id in &ids {
            self.check_owned(id)?;
        }

        Ok(ids.into_iter().filter(|&id| self.members.insert(id)).count())
    }

    /// Detach every listed point; returns how many were members
    pub fn detach_all<I>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = PointId>,
    {
        ids.into_iter().filter(|id| self.members.remove(id)).count()
    }

    /// Move the centroid to the per-dimension mean of the members.
    ///
    /// An empty cluster keeps its previous centroid.
    pub fn recompute_centroid<P>(&mut self, space: &Space<P>) -> Result<()> {
        if self.members.is_empty() {
            return Ok(());
        }

        let mut sum = Array1::<f64>::zeros(self.centroid.dimension());
        for point in self.member_points(space)? {
            sum += &point.coordinates();
        }
        sum /= self.members.len() as f64;

        self.centroid.set_coordinates(sum);
        Ok(())
    }

    /// Sum over members of the comparison-mode distance to the centroid
    pub fn sum_of_squared_error<P>(&self, space: &Space<P>) -> Result<f64> {
        let mut sse = 0.0;
        for point in self.member_points(space)? {
            sse += point.distance_to(&self.centroid, false)?;
        }
        Ok(sse)
    }

    fn member_points<'s, P>(&self, space: &'s Space<P>) -> Result<Vec<&'s Point>> {
        if space.id() != self.centroid.space_id() {
            return Err(KMeansError::InvalidOperation(
                "cluster belongs to a different space".to_string(),
            ));
        }

        self.members
            .iter()
            .map(|&id| {
                space.point(id).ok_or_else(|| {
                    KMeansError::InvalidOperation(format!("unknown point {}", id.index()))
                })
            })
            .collect()
    }

    fn check_owned(&self, id: PointId) -> Result<()> {
        if id.space != self.centroid.space_id() {
            return Err(KMeansError::InvalidOperation(
                "cannot attach a point from a different space".to_string(),
            ));
        }
        Ok(())
    }
}
