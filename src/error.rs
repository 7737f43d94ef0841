use thiserror::Error;

/// Error types for the kmeans-space library
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    /// The space or metric was configured with invalid parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The number of clusters k is invalid (must be > 0)
    #[error("Invalid k value: {0}")]
    InvalidK(String),

    /// Not enough data points to seed clusters
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Coordinate count does not match the space dimension
    #[error("Dimension mismatch: {0}")]
    InvalidDimensions(String),

    /// Coordinate index outside `0..dimension`
    #[error("Coordinate index {index} out of bounds for dimension {dimension}")]
    CoordinateOutOfBounds { index: usize, dimension: usize },

    /// Operation mixes points from different spaces
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, KMeansError>;
