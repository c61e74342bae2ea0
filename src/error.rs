//! Clustering error types

use thiserror::Error;

/// Errors raised before a clustering run starts iterating
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// Bad k, empty input or inconsistent point dimensions
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// NaN or infinite feature value
    #[error("Point {id} has a non-finite value {value} in dimension {dimension}")]
    NonFiniteFeature { id: i64, dimension: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, ClusterError>;
