//! prefetch-cluster: unsupervised clustering of request vectors, scored as a prefetcher.
//!
//! Two engines share one Euclidean distance primitive and one evaluation routine:
//!
//! - `partitioning/`: k-means with a membership fixed-point stop ([`KMeans`])
//! - `som/`: self-organizing map on an `n x n` grid ([`SelfOrganizingMap`])
//! - `evaluation`: hitrate / accuracy of "prefetch every resource whose centroid value
//!   is at or above a threshold"
//!
//! # Usage
//!
//! ```rust
//! use prefetch_cluster::{generate_request_dataset, KMeans, KMeansParams};
//!
//! let data = generate_request_dataset(200, 50, 32, 4, 0.05, 7).unwrap();
//! let mut km = KMeans::new(KMeansParams::with_k(4), &data).unwrap().with_seed(1);
//! km.train().unwrap();
//! let result = km.test().unwrap();
//! println!("hitrate {}, accuracy {}", result.hitrate, result.accuracy);
//! ```
//!
//! # Evaluation
//!
//! Each vector dimension is a resource. A test vector *requests* resource `j` when its
//! value is exactly `1.0`; its cluster *prefetches* `j` when the centroid value is at
//! least the threshold. Hitrate is recall over requests, accuracy is precision over
//! prefetches. Ratios with a zero denominator are [`Metric::Undefined`].
//!
//! # Reproducibility
//!
//! Centroids start at uniform random values in `[0, 1)`. Without `with_seed(..)`
//! (or explicit initial centroids) two runs generally differ.

pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod partitioning;
pub mod som;
pub mod traits;

// Re-exports
pub use config::{KMeansParams, SomParams, SomTestMode};
pub use dataset::{generate_request_dataset, Dataset};
pub use error::{ClusterError, Result};
pub use evaluation::{EvaluationResult, Metric, PrefetchCounts};
pub use partitioning::{KMeans, Partition, TrainingState};
pub use som::{GridCoord, SelfOrganizingMap};
pub use traits::Clusterer;
