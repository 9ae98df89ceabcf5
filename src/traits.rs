//! Shared clusterer interface.

use crate::evaluation::EvaluationResult;
use crate::Result;

/// Capability shared by the k-means and self-organizing-map clusterers.
///
/// Typical use: construct over a [`Dataset`](crate::Dataset), `train()`, `test()`, then
/// read `report()` or the accessors.
pub trait Clusterer {
    /// Fit centroids to the training set.
    ///
    /// Re-running `train()` re-initializes centroids from the configured seed (or a fresh
    /// random seed) and starts over.
    fn train(&mut self) -> Result<()>;

    /// Assign vectors to the trained centroids and evaluate the prefetch heuristic.
    fn test(&mut self) -> Result<EvaluationResult>;

    /// Human-readable summary: evaluation, members per cluster, centroids.
    fn report(&self) -> String;

    /// Current centroids, in cluster order (row-major for grids).
    fn centroids(&self) -> &[Vec<f32>];

    /// Vector dimensionality.
    fn dimension(&self) -> usize;

    /// Change the prefetch threshold used by subsequent `test()` calls.
    fn set_prefetch_threshold(&mut self, threshold: f64) -> Result<()>;
}
