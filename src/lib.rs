//! # kmeans-space
//!
//! K-means clustering over a space of points with a pluggable distance
//! metric.
//!
//! ## Features
//!
//! - **Point spaces**: points of a fixed dimension carrying an optional
//!   caller payload, bound to the [`Space`] that created them
//! - **Pluggable metrics**: Euclidean by default, great-circle distance for
//!   latitude/longitude data, or any [`DistanceMetric`] implementation
//! - **Two seeding strategies**: random points in the bounding box, or
//!   k-means++ weighted sampling from the data
//! - **Assignment-stability convergence**: iterates until no point changes
//!   cluster, with an optional iteration cap
//! - **Parallel scan**: nearest-cluster search runs on rayon, with moves
//!   staged and applied after the scan
//! - **Reproducible**: seeding uses a `ChaCha8Rng` seeded from
//!   [`KMeansConfig::seed`]
//!
//! ## Example
//!
//! ```rust
//! use kmeans_space::{SeedStrategy, Space};
//!
//! let mut space: Space = Space::new(2).unwrap();
//! for (x, y) in [(0.0, 0.0), (0.0, 1.0), (9.0, 9.0), (10.0, 9.0)] {
//!     space.add_point(vec![x, y]).unwrap();
//! }
//!
//! let clusters = space.solve(2, SeedStrategy::KMeansPlusPlus).unwrap();
//! assert_eq!(clusters.len(), 2);
//!
//! // every point ends up in exactly one cluster
//! let total: usize = clusters.iter().map(|c| c.len()).sum();
//! assert_eq!(total, space.len());
//! ```
//!
//! ## Geographic data
//!
//! ```rust
//! use kmeans_space::{KMeansConfig, SeedStrategy, Space};
//!
//! let mut space: Space<&str> = Space::geographic(1.0)
//!     .unwrap()
//!     .with_config(KMeansConfig::new(7).with_max_iters(Some(100)));
//!
//! space.add_point_with(vec![48.8566, 2.3522], "Paris").unwrap();
//! space.add_point_with(vec![51.5074, -0.1278], "London").unwrap();
//! space.add_point_with(vec![40.7128, -74.0060], "New York").unwrap();
//! space.add_point_with(vec![42.3601, -71.0589], "Boston").unwrap();
//!
//! let result = space
//!     .solve_detailed(2, SeedStrategy::KMeansPlusPlus, |_, _| {})
//!     .unwrap();
//!
//! for cluster in &result.clusters {
//!     for id in cluster.members() {
//!         let _city = space.payload(id);
//!     }
//! }
//! ```

mod algorithm;
mod cluster;
mod config;
pub mod distance;
mod error;
mod point;
mod space;

pub use algorithm::{KMeansResult, SeedStrategy};
pub use cluster::Cluster;
pub use config::KMeansConfig;
pub use distance::{DistanceMetric, Euclidean, GreatCircle};
pub use error::{KMeansError, Result};
pub use point::{Point, PointId};
pub use space::Space;
