//! Grid-of-centroids clusterer: training loop, BMU search and test modes.

use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::grid::{cells, GridCoord};
use crate::config::{validate_threshold, SomParams, SomTestMode};
use crate::dataset::Dataset;
use crate::distance::{check_dimension, nearest_centroid};
use crate::error::{ClusterError, Result};
use crate::evaluation::{evaluate, EvaluationResult};
use crate::partitioning::Partition;
use crate::traits::Clusterer;

/// Self-organizing map over a borrowed [`Dataset`].
#[derive(Debug)]
pub struct SelfOrganizingMap<'a> {
    data: &'a Dataset,
    params: SomParams,
    seed: Option<u64>,
    initial_centroids: Option<Vec<Vec<f32>>>,
    /// Row-major cell centroids, `grid_size^2 x dimension`
    centroids: Vec<Vec<f32>>,
    trained: bool,
    /// Cell membership from the last `test()`, one "cluster" per cell in scan order
    members: Option<Partition>,
    evaluation: Option<EvaluationResult>,
}

impl<'a> SelfOrganizingMap<'a> {
    pub fn new(params: SomParams, data: &'a Dataset) -> Result<Self> {
        params.validate()?;
        let floats = params.num_cells().checked_mul(data.dimension());
        if floats.map_or(true, |n| n > isize::MAX as usize / std::mem::size_of::<f32>()) {
            return Err(ClusterError::InvalidParameter(format!(
                "a {0}x{0} grid of {1}-dimensional centroids is too large",
                params.grid_size,
                data.dimension()
            )));
        }
        Ok(Self {
            data,
            params,
            seed: None,
            initial_centroids: None,
            centroids: Vec::new(),
            trained: false,
            members: None,
            evaluation: None,
        })
    }

    /// Configure a deterministic seed for centroid initialization.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start training from these cell centroids (row-major) instead of random ones.
    pub fn with_initial_centroids(mut self, centroids: Vec<Vec<f32>>) -> Result<Self> {
        let cells = self.num_cells();
        if centroids.len() != cells {
            return Err(ClusterError::InvalidParameter(format!(
                "expected {cells} initial centroids, got {}",
                centroids.len()
            )));
        }
        for c in &centroids {
            check_dimension(self.data.dimension(), c.len())?;
        }
        self.initial_centroids = Some(centroids);
        Ok(self)
    }

    pub fn grid_size(&self) -> usize {
        self.params.grid_size
    }

    pub fn num_cells(&self) -> usize {
        self.params.num_cells()
    }

    fn initialize(&mut self) {
        self.centroids = match &self.initial_centroids {
            Some(centroids) => centroids.clone(),
            None => {
                let seed = self.seed.unwrap_or_else(|| rand::rng().random());
                let mut rng = StdRng::seed_from_u64(seed);
                let dimension = self.data.dimension();
                (0..self.num_cells())
                    .map(|_| (0..dimension).map(|_| rng.random::<f32>()).collect())
                    .collect()
            }
        };
        self.members = None;
        self.evaluation = None;
    }

    /// Train for the configured number of epochs.
    ///
    /// Training vectors are visited in dataset order each epoch.
    pub fn train(&mut self) -> Result<()> {
        self.initialize();
        let data = self.data;
        let epochs = self.params.epochs;

        for epoch in 0..epochs {
            let learning_rate = self.params.learning_rate_at(epoch);
            let radius = self.params.radius_at(epoch);
            info!(epoch, epochs, learning_rate, radius, "som epoch");

            for vector in data.train() {
                let bmu = self.best_matching_unit(vector)?;
                self.pull_neighborhood(bmu, radius, learning_rate, vector);
            }
        }

        self.trained = true;
        Ok(())
    }

    /// Grid cell whose centroid is closest to `vector`; ties go to the first cell in
    /// scan order.
    pub fn best_matching_unit(&self, vector: &[f32]) -> Result<GridCoord> {
        let idx = nearest_centroid(vector, &self.centroids)?.ok_or(ClusterError::NotTrained)?;
        Ok(GridCoord::from_index(idx, self.params.grid_size))
    }

    /// Move every cell within `radius` (Manhattan, inclusive) of `bmu` toward `vector`.
    fn pull_neighborhood(
        &mut self,
        bmu: GridCoord,
        radius: f64,
        learning_rate: f64,
        vector: &[f32],
    ) {
        let n = self.params.grid_size;
        for (cell, centroid) in cells(n).zip(self.centroids.iter_mut()) {
            if cell.manhattan(bmu) as f64 > radius {
                continue;
            }
            for (c, &x) in centroid.iter_mut().zip(vector.iter()) {
                let pulled = f64::from(*c) * (1.0 - learning_rate) + learning_rate * f64::from(x);
                *c = pulled as f32;
            }
        }
    }

    /// Assign each vector to its best matching unit.
    pub fn assign(&self, vectors: &[Vec<f32>]) -> Result<Partition> {
        let assignments = vectors
            .iter()
            .map(|v| self.best_matching_unit(v).map(|c| c.index(self.params.grid_size)))
            .collect::<Result<Vec<usize>>>()?;
        Partition::from_assignments(&assignments, self.num_cells())
    }

    /// Assign vectors to cells and evaluate prefetching on the test set.
    ///
    /// Which vectors get assigned depends on [`SomTestMode`]: the test set itself, or
    /// (for parity with older runs) the training set, whose member indices are then
    /// looked up in the test set.
    pub fn test(&mut self) -> Result<EvaluationResult> {
        if !self.trained {
            return Err(ClusterError::NotTrained);
        }
        let data = self.data;
        if data.test().is_empty() {
            return Err(ClusterError::EmptyDataset { which: "test" });
        }

        let members = match self.params.test_mode {
            SomTestMode::TestSet => self.assign(data.test())?,
            SomTestMode::TrainingParity => {
                if data.n_train() != data.n_test() {
                    return Err(ClusterError::MisalignedDatasets {
                        train_len: data.n_train(),
                        test_len: data.n_test(),
                    });
                }
                self.assign(data.train())?
            }
        };
        for (idx, size) in members.cluster_sizes().into_iter().enumerate() {
            let cell = GridCoord::from_index(idx, self.params.grid_size);
            debug!(%cell, members = size, "cell size");
        }

        let result = evaluate(
            self.centroids.iter().zip(members.iter()),
            data.test(),
            self.params.prefetch_threshold,
        )?;
        info!(
            hitrate = %result.hitrate,
            accuracy = %result.accuracy,
            threshold = self.params.prefetch_threshold,
            mode = ?self.params.test_mode,
            "som test"
        );

        self.members = Some(members);
        self.evaluation = Some(result);
        Ok(result)
    }

    pub fn set_prefetch_threshold(&mut self, threshold: f64) -> Result<()> {
        validate_threshold(threshold)?;
        self.params.prefetch_threshold = threshold;
        Ok(())
    }

    pub fn params(&self) -> &SomParams {
        &self.params
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Row-major cell centroids.
    pub fn centroids(&self) -> &[Vec<f32>] {
        &self.centroids
    }

    /// Centroid of one cell.
    pub fn centroid(&self, cell: GridCoord) -> Option<&[f32]> {
        if cell.x >= self.params.grid_size || cell.y >= self.params.grid_size {
            return None;
        }
        self.centroids
            .get(cell.index(self.params.grid_size))
            .map(Vec::as_slice)
    }

    /// Members of `cell` from the last `test()`.
    pub fn members(&self, cell: GridCoord) -> &[usize] {
        let n = self.params.grid_size;
        match &self.members {
            Some(p) if cell.x < n && cell.y < n => p.members(cell.index(n)),
            _ => &[],
        }
    }

    pub fn evaluation(&self) -> Option<&EvaluationResult> {
        self.evaluation.as_ref()
    }

    pub fn report(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Initial learning Rate={}",
            self.params.initial_learning_rate
        );
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

        let n = self.params.grid_size;
        for cell in cells(n) {
            let _ = writeln!(out, "\nMembers cluster{cell} :{:?}", self.members(cell));
        }
        for (cell, centroid) in cells(n).zip(self.centroids.iter()) {
            let _ = write!(out, "\nPrototype cluster{cell} :");
            for x in centroid {
                let _ = write!(out, " {x}");
            }
            out.push('\n');
        }
        out
    }
}

impl Clusterer for SelfOrganizingMap<'_> {
    fn train(&mut self) -> Result<()> {
        SelfOrganizingMap::train(self)
    }

    fn test(&mut self) -> Result<EvaluationResult> {
        SelfOrganizingMap::test(self)
    }

    fn report(&self) -> String {
        SelfOrganizingMap::report(self)
    }

    fn centroids(&self) -> &[Vec<f32>] {
        SelfOrganizingMap::centroids(self)
    }

    fn dimension(&self) -> usize {
        self.data.dimension()
    }

    fn set_prefetch_threshold(&mut self, threshold: f64) -> Result<()> {
        SelfOrganizingMap::set_prefetch_threshold(self, threshold)
    }
}
