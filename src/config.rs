/// Configuration for clustering a [`Space`](crate::Space)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KMeansConfig {
    /// Random seed for centroid initialization
    pub seed: u64,

    /// Optional cap on assignment rounds. `None` iterates until no point
    /// moves, which may never happen for non-Euclidean metrics.
    pub max_iters: Option<usize>,

    /// Sample DEFAULT seeds from the continuous bounding box instead of
    /// integer coordinates within it.
    pub continuous_sampling: bool,

    /// Run the nearest-cluster scan on the rayon thread pool
    pub parallel: bool,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_iters: None,
            continuous_sampling: false,
            parallel: true,
        }
    }
}

impl KMeansConfig {
    /// Create a new configuration with the specified seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Cap the number of assignment rounds
    pub fn with_max_iters(mut self, max_iters: Option<usize>) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Toggle continuous sampling for DEFAULT seeding
    pub fn with_continuous_sampling(mut self, continuous: bool) -> Self {
        self.continuous_sampling = continuous;
        self
    }

    /// Toggle the parallel scan
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
