//! Error types for clustering.

use thiserror::Error;

/// Errors that can occur while building, training or evaluating a clusterer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClusterError {
    /// A vector's length differs from the configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A dataset that must hold at least one vector is empty.
    #[error("{which} dataset is empty")]
    EmptyDataset { which: &'static str },

    /// A ratio metric whose denominator is zero.
    #[error("{metric} is undefined (zero denominator)")]
    UndefinedMetric { metric: &'static str },

    /// A cluster had no members when its centroid was recomputed.
    ///
    /// Recorded as a training warning; the centroid is reset to the zero vector.
    #[error("cluster {cluster} has no members at iteration {iteration}")]
    EmptyCluster { iteration: usize, cluster: usize },

    /// `test()` or a centroid accessor was used before `train()`.
    #[error("clusterer has not been trained")]
    NotTrained,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// k-means did not reach a fixed point within the iteration cap.
    #[error("no fixed point after {iterations} iterations")]
    NotConverged { iterations: usize },

    /// Training-parity evaluation needs train and test sets of equal length.
    #[error("misaligned datasets: {train_len} training vectors, {test_len} test vectors")]
    MisalignedDatasets { train_len: usize, test_len: usize },

    /// Malformed line in a vector file.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ClusterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClusterError>;
