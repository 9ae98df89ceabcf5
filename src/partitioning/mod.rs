//! Centroid-based partitioning.
//!
//! [`KMeans`] keeps `k` centroids and alternates nearest-centroid assignment with
//! mean recomputation until membership is stable. Each iteration's membership is
//! recorded as a [`Partition`].

pub mod kmeans;
pub mod partition;

pub use kmeans::{KMeans, TrainingState};
pub use partition::Partition;
