//! k-means clustering implementation.
//!
//! Lloyd-style iteration with a membership fixed-point stop: centroids start as
//! independent uniform draws in `[0, 1)` per dimension, every iteration assigns each
//! training vector to its nearest centroid and recomputes centroids as member means,
//! and training stops once no vector changes cluster. Each iteration's assignment is
//! kept as an immutable [`Partition`] in the history.

use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::Partition;
use crate::config::{validate_threshold, KMeansParams};
use crate::dataset::Dataset;
use crate::distance::{check_dimension, nearest_centroid};
use crate::error::{ClusterError, Result};
use crate::evaluation::{evaluate, EvaluationResult};
use crate::traits::Clusterer;

/// Where a k-means instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    Uninitialized,
    /// Centroids exist but no fixed point has been reached (yet).
    Training,
    Converged,
}

/// k-means clustering over a borrowed [`Dataset`].
///
/// Results are not reproducible across runs unless a seed is configured with
/// [`KMeans::with_seed`] or centroids are supplied with
/// [`KMeans::with_initial_centroids`].
#[derive(Debug)]
pub struct KMeans<'a> {
    data: &'a Dataset,
    params: KMeansParams,
    seed: Option<u64>,
    initial_centroids: Option<Vec<Vec<f32>>>,
    /// Centroids (k x dimension)
    centroids: Vec<Vec<f32>>,
    /// One partition per completed iteration
    history: Vec<Partition>,
    warnings: Vec<ClusterError>,
    state: TrainingState,
    test_partition: Option<Partition>,
    evaluation: Option<EvaluationResult>,
}

impl<'a> KMeans<'a> {
    /// Create a k-means clusterer over `data`.
    pub fn new(params: KMeansParams, data: &'a Dataset) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            data,
            params,
            seed: None,
            initial_centroids: None,
            centroids: Vec::new(),
            history: Vec::new(),
            warnings: Vec::new(),
            state: TrainingState::Uninitialized,
            test_partition: None,
            evaluation: None,
        })
    }

    /// Configure a deterministic seed for centroid initialization.
    ///
    /// When set, repeated `train()` calls on the same data produce identical results.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start training from these centroids instead of random ones.
    pub fn with_initial_centroids(mut self, centroids: Vec<Vec<f32>>) -> Result<Self> {
        if centroids.len() != self.params.k {
            return Err(ClusterError::InvalidParameter(format!(
                "expected {} initial centroids, got {}",
                self.params.k,
                centroids.len()
            )));
        }
        for c in &centroids {
            check_dimension(self.data.dimension(), c.len())?;
        }
        self.initial_centroids = Some(centroids);
        Ok(self)
    }

    /// Reset centroids and history to the starting point of a training run.
    pub fn initialize(&mut self) {
        self.centroids = match &self.initial_centroids {
            Some(centroids) => centroids.clone(),
            None => self.random_centroids(),
        };
        self.history.clear();
        self.warnings.clear();
        self.test_partition = None;
        self.evaluation = None;
        self.state = TrainingState::Training;
    }

    /// Uniform `[0, 1)` per dimension, drawn independently.
    fn random_centroids(&self) -> Vec<Vec<f32>> {
        // Use an explicit seed when configured; otherwise derive one from entropy.
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let dimension = self.data.dimension();

        (0..self.params.k)
            .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
            .collect()
    }

    /// Train until membership stops changing.
    ///
    /// Fails with [`ClusterError::NotConverged`] after `max_iterations`; the centroids
    /// of the last iteration are kept and remain usable by `test()`.
    pub fn train(&mut self) -> Result<()> {
        self.initialize();

        for _ in 0..self.params.max_iterations {
            if self.step()? {
                info!(
                    iterations = self.history.len(),
                    k = self.params.k,
                    "k-means converged"
                );
                return Ok(());
            }
        }

        warn!(
            iterations = self.params.max_iterations,
            "k-means did not reach a fixed point"
        );
        Err(ClusterError::NotConverged {
            iterations: self.params.max_iterations,
        })
    }

    /// Run one assignment + update iteration on the training set.
    ///
    /// Returns `true` when the new partition is a subset of the previous one, i.e. the
    /// fixed point is reached. Calls [`KMeans::initialize`] first if needed.
    pub fn step(&mut self) -> Result<bool> {
        if self.state == TrainingState::Uninitialized {
            self.initialize();
        }
        let iteration = self.history.len() + 1;
        let partition = self.assign(self.data.train())?;
        self.update_centroids(&partition, iteration);

        info!(iteration, "k-means iteration");
        for (cluster, size) in partition.cluster_sizes().into_iter().enumerate() {
            debug!(iteration, cluster, members = size, "cluster size");
        }

        let converged = self
            .history
            .last()
            .is_some_and(|previous| partition.is_subset_of(previous));
        self.history.push(partition);
        if converged {
            self.state = TrainingState::Converged;
        }
        Ok(converged)
    }

    /// Assign every vector to its nearest centroid (ties to the lowest cluster index).
    pub fn assign(&self, vectors: &[Vec<f32>]) -> Result<Partition> {
        if self.centroids.is_empty() {
            return Err(ClusterError::NotTrained);
        }
        let assignments = vectors
            .iter()
            .map(|v| nearest_centroid(v, &self.centroids).map(|best| best.unwrap_or(0)))
            .collect::<Result<Vec<usize>>>()?;
        Partition::from_assignments(&assignments, self.params.k)
    }

    /// Recompute centroids as member means; empty clusters reset to the zero vector.
    fn update_centroids(&mut self, partition: &Partition, iteration: usize) {
        let data = self.data;
        let train = data.train();
        let dimension = data.dimension();

        for (cluster, (centroid, members)) in
            self.centroids.iter_mut().zip(partition.iter()).enumerate()
        {
            if members.is_empty() {
                warn!(iteration, cluster, "empty cluster, centroid reset to zero");
                self.warnings
                    .push(ClusterError::EmptyCluster { iteration, cluster });
                centroid.iter_mut().for_each(|x| *x = 0.0);
                continue;
            }

            let mut sums = vec![0.0f64; dimension];
            for &m in members {
                for (sum, &val) in sums.iter_mut().zip(train[m].iter()) {
                    *sum += f64::from(val);
                }
            }
            let count = members.len() as f64;
            for (c, sum) in centroid.iter_mut().zip(sums) {
                *c = (sum / count) as f32;
            }
        }
    }

    /// Assign the test set to the trained centroids and evaluate prefetching.
    ///
    /// Centroids are not modified.
    pub fn test(&mut self) -> Result<EvaluationResult> {
        if self.state == TrainingState::Uninitialized {
            return Err(ClusterError::NotTrained);
        }
        let test = self.data.test();
        if test.is_empty() {
            return Err(ClusterError::EmptyDataset { which: "test" });
        }

        let partition = self.assign(test)?;
        let result = evaluate(
            self.centroids.iter().zip(partition.iter()),
            test,
            self.params.prefetch_threshold,
        )?;
        info!(
            hitrate = %result.hitrate,
            accuracy = %result.accuracy,
            threshold = self.params.prefetch_threshold,
            "k-means test"
        );

        self.test_partition = Some(partition);
        self.evaluation = Some(result);
        Ok(result)
    }

    pub fn set_prefetch_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold(threshold)?;
        self.params.prefetch_threshold = threshold;
        Ok(())
    }

    pub fn params(&self) -> &KMeansParams {
        &self.params
    }

    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Get centroids.
    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    /// Partitions of every iteration of the last training run, oldest first.
    pub fn history(&self) -> &[Partition] {
        &self.history
    }

    /// Partition produced by iteration `iteration` (1-based).
    pub fn partition(&self, iteration: usize) -> Option<&Partition> {
        iteration
            .checked_sub(1)
            .and_then(|idx| self.history.get(idx))
    }

    /// Training-set membership after the last iteration.
    pub fn current_partition(&self) -> Option<&Partition> {
        self.history.last()
    }

    /// Test-set membership from the last `test()` call.
    pub fn test_partition(&self) -> Option<&Partition> {
        self.test_partition.as_ref()
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    /// Non-fatal conditions recorded during the last training run.
    pub fn warnings(&self) -> &[ClusterError] {
        &self.warnings
    }

    /// Evaluation, members and prototypes as text.
    pub fn report(&self) -> String {
        let mut out = String::new();
        match &self.evaluation {
            Some(result) => {
                let _ = writeln!(out, "{result}");
            }
            None => {
                let _ = writeln!(
                    out,
                    "Prefetch threshold={}\n(not tested)",
                    self.params.prefetch_threshold
                );
            }
        }

        let members = self.test_partition.as_ref().or(self.history.last());
        for cluster in 0..self.params.k {
            let list = members.map(|p| p.members(cluster)).unwrap_or(&[]);
            let _ = writeln!(out, "\nMembers cluster[{cluster}] :{list:?}");
        }
        for (cluster, centroid) in self.centroids.iter().enumerate() {
            let _ = write!(out, "\nPrototype cluster[{cluster}] :");
            for x in centroid {
                let _ = write!(out, "{x} ");
            }
            out.push('\n');
        }
        out
    }
}

impl Clusterer for KMeans<'_> {
    fn train(&mut self) -> Result<()> {
        KMeans::train(self)
    }

    fn test(&mut self) -> Result<EvaluationResult> {
        KMeans::test(self)
    }

    fn report(&self) -> String {
        KMeans::report(self)
    }

    fn centroids(&self) -> &[Vec<f32>] {
        KMeans::centroids(self)
    }

    fn dimension(&self) -> usize {
        self.data.dimension()
    }

    fn set_prefetch_threshold(&mut self, threshold: f64) -> Result<()> {
        KMeans::set_prefetch_threshold(self, threshold)
    }
}
