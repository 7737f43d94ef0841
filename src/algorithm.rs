use crate::cluster::Cluster;
use crate::error::{KMeansError, Result};
use crate::point::{Point, PointId};
use crate::space::Space;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;

/// How the initial centroids are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedStrategy {
    /// Random points inside the bounding box of the data. Seeds need not
    /// coincide with data points.
    #[default]
    BoundingBox,
    /// k-means++: the first seed is a uniformly chosen data point, each
    /// following seed is a data point drawn with probability proportional
    /// to its distance from the nearest seed chosen so far.
    #[doc(alias = "DASV")]
    KMeansPlusPlus,
}

/// Result of a k-means run
#[derive(Debug, Clone)]
pub struct KMeansResult {
    /// Final clusters, in seeding order
    pub clusters: Vec<Cluster>,
    /// Number of rounds in which at least one point moved
    pub n_iterations: usize,
    /// `false` only when `max_iters` stopped the run
    pub converged: bool,
}

/// Seed `k` clusters with `strategy`, then attach every point to cluster 0.
pub(crate) fn initialize_clusters<P, R: Rng>(
    space: &Space<P>,
    k: usize,
    strategy: SeedStrategy,
    rng: &mut R,
) -> Result<Vec<Cluster>> {
    if k == 0 {
        return Err(KMeansError::InvalidK("k must be greater than 0".to_string()));
    }

    if space.is_empty() {
        return Err(KMeansError::InsufficientData(
            "cannot seed clusters in an empty space".to_string(),
        ));
    }

    let mut clusters = match strategy {
        SeedStrategy::BoundingBox => seed_bounding_box(space, k, rng)?,
        SeedStrategy::KMeansPlusPlus => seed_kmeans_plus_plus(space, k, rng)?,
    };

    clusters[0].attach_all(space.point_ids())?;

    tracing::debug!(
        k,
        ?strategy,
        n_points = space.len(),
        "initialized clusters"
    );

    Ok(clusters)
}

fn seed_bounding_box<P, R: Rng>(
    space: &Space<P>,
    k: usize,
    rng: &mut R,
) -> Result<Vec<Cluster>> {
    let (min, max) = space.boundaries().ok_or_else(|| {
        KMeansError::InsufficientData("no points to bound".to_string())
    })?;

    (0..k)
        .map(|_| space.random_point(&min, &max, rng).map(Cluster::new))
        .collect()
}

fn seed_kmeans_plus_plus<P, R: Rng>(
    space: &Space<P>,
    k: usize,
    rng: &mut R,
) -> Result<Vec<Cluster>> {
    let points = space.raw_points();
    let n = points.len();

    let mut clusters = Vec::with_capacity(k);
    let first = rng.gen_range(0..n);
    clusters.push(Cluster::new(points[first].clone()));

    let mut weights = vec![0.0f64; n];
    for _ in 1..k {
        let mut total = 0.0;
        for (weight, point) in weights.iter_mut().zip(points) {
            *weight = nearest_distance(point, &clusters)?;
            total += *weight;
        }

        // The draw is an integer in [0, trunc(total)]
        let draw = rng.gen_range(0..=total as u64) as f64;
        let chosen = select_weighted(&weights, draw);

        tracing::trace!(chosen, total, "k-means++ picked seed");
        clusters.push(Cluster::new(points[chosen].clone()));
    }

    Ok(clusters)
}

/// Index of the first point at which `draw` minus the running weight sum
/// drops to zero or below. Falls back to the last point when round-off
/// leaves the remainder positive.
fn select_weighted(weights: &[f64], draw: f64) -> usize {
    let mut remaining = draw;
    for (i, &weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

fn nearest_distance(point: &Point, clusters: &[Cluster]) -> Result<f64> {
    let mut best = f64::INFINITY;
    for cluster in clusters {
        best = best.min(point.distance_to(cluster.centroid(), false)?);
    }
    Ok(best)
}

/// A point staged to leave one cluster for another
struct Move {
    id: PointId,
    from: usize,
    to: usize,
}

/// One assignment round. Moves are collected against the memberships as
/// they were at the start of the round and applied together afterwards.
/// Returns the number of points that moved.
pub(crate) fn assign_round<P>(
    space: &Space<P>,
    clusters: &mut [Cluster],
    parallel: bool,
) -> Result<usize> {
    let mut members = Vec::new();
    for (from, cluster) in clusters.iter().enumerate() {
        for id in cluster.members() {
            let point = space.point(id).ok_or_else(|| {
                KMeansError::InvalidOperation(format!(
                    "cluster member {} is not a point of this space",
                    id.index()
                ))
            })?;
            members.push((from, id, point));
        }
    }

    let current: &[Cluster] = clusters;
    let scan = |&(from, id, point): &(usize, PointId, &Point)| -> Result<Option<Move>> {
        Ok(point
            .closest_index(current)?
            .filter(|&to| to != from)
            .map(|to| Move { id, from, to }))
    };

    let staged: Vec<Option<Move>> = if parallel {
        members.par_iter().map(scan).collect::<Result<_>>()?
    } else {
        members.iter().map(scan).collect::<Result<_>>()?
    };

    let mut detach = vec![Vec::new(); clusters.len()];
    let mut attach = vec![Vec::new(); clusters.len()];
    let mut moved = 0;
    for m in staged.into_iter().flatten() {
        detach[m.from].push(m.id);
        attach[m.to].push(m.id);
        moved += 1;
    }

    for (cluster, ids) in clusters.iter_mut().zip(detach) {
        cluster.detach_all(ids);
    }
    for (cluster, ids) in clusters.iter_mut().zip(attach) {
        cluster.attach_all(ids)?;
    }
    for cluster in clusters.iter_mut() {
        cluster.recompute_centroid(space)?;
    }

    Ok(moved)
}

/// Seed and iterate until a round moves no point, or `max_iters` rounds
/// have moved points.
pub(crate) fn solve<P, F>(
    space: &Space<P>,
    k: usize,
    strategy: SeedStrategy,
    mut on_iteration: F,
) -> Result<KMeansResult>
where
    F: FnMut(&Space<P>, &[Cluster]),
{
    let config = space.config();
    if k == 0 {
        return Err(KMeansError::InvalidK("k must be greater than 0".to_string()));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut clusters = initialize_clusters(space, k, strategy, &mut rng)?;

    let start = Instant::now();
    let mut n_iterations = 0;
    let converged = loop {
        on_iteration(space, &clusters);

        if config.max_iters.is_some_and(|max| n_iterations >= max) {
            tracing::warn!(
                n_iterations,
                "stopped at max_iters before assignments stabilized"
            );
            break false;
        }

        let round_start = Instant::now();
        let moved = assign_round(space, &mut clusters, config.parallel)?;

        tracing::debug!(
            round = n_iterations + 1,
            moved,
            elapsed_s = round_start.elapsed().as_secs_f64(),
            "assignment round"
        );

        if moved == 0 {
            break true;
        }
        n_iterations += 1;
    };

    if converged {
        tracing::info!(
            k,
            n_iterations,
            elapsed_s = start.elapsed().as_secs_f64(),
            "k-means converged"
        );
    }

    Ok(KMeansResult {
        clusters,
        n_iterations,
        converged,
    })
}

/// Draw one coordinate between `lo` and `hi`. Integer mode truncates both
/// bounds and samples the inclusive integer range.
pub(crate) fn sample_coordinate<R: Rng>(
    lo: f64,
    hi: f64,
    continuous: bool,
    rng: &mut R,
) -> f64 {
    let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };

    if continuous {
        if lo >= hi {
            lo
        } else if (hi - lo).is_finite() {
            rng.gen_range(lo..=hi)
        } else {
            // hi - lo overflows, so blend the bounds instead
            let t: f64 = rng.gen();
            (lo * (1.0 - t) + hi * t).clamp(lo, hi)
        }
    } else {
        rng.gen_range(lo.trunc() as i64..=hi.trunc() as i64) as f64
    }
}
