//! Clusterer parameters.
//!
//! Parameter structs follow the usual `Params` + `Default` shape and are range-checked
//! with `validate()` when a clusterer is constructed. Both derive serde so the CLI can
//! read them from a JSON file; missing fields fall back to the defaults.

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::error::{ClusterError, Result};

/// Default prefetch threshold for both clusterers.
pub const DEFAULT_PREFETCH_THRESHOLD: f64 = 0.5;

/// Default initial SOM learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 0.8;

/// k-means parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansParams {
    /// Number of clusters
    pub k: usize,

    /// Centroid value at or above which a resource counts as prefetched
    pub prefetch_threshold: f64,

    /// Safety cap on assignment/update iterations
    pub max_iterations: usize,
}

impl Default for KMeansParams {
    fn default() -> Self {
        Self {
            k: 8,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            max_iterations: 1000,
        }
    }
}

impl KMeansParams {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(ClusterError::InvalidParameter(
                "k must be greater than 0".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::InvalidParameter(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        validate_threshold(self.prefetch_threshold)
    }
}

/// Which vectors the SOM assigns to grid cells during `test()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SomTestMode {
    /// Assign the test vectors and evaluate them, like k-means does.
    #[default]
    TestSet,
    /// Assign the training vectors, then evaluate the test vectors found at the same
    /// indices. Needs index-aligned sets of equal length.
    TrainingParity,
}

/// Self-organizing map parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SomParams {
    /// Side length of the square grid (the map has `grid_size * grid_size` cells)
    pub grid_size: usize,

    /// Number of passes over the training set
    pub epochs: usize,

    /// Learning rate at epoch 0, decays linearly to 0
    pub initial_learning_rate: f64,

    /// Centroid value at or above which a resource counts as prefetched
    pub prefetch_threshold: f64,

    pub test_mode: SomTestMode,
}

impl Default for SomParams {
    fn default() -> Self {
        Self {
            grid_size: 4,
            epochs: 100,
            initial_learning_rate: DEFAULT_LEARNING_RATE,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            test_mode: SomTestMode::TestSet,
        }
    }
}

impl SomParams {
    pub fn new(grid_size: usize, epochs: usize) -> Self {
        Self {
            grid_size,
            epochs,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 || self.epochs == 0 {
            return Err(ClusterError::InvalidParameter(
                "grid_size and epochs must be greater than 0".to_string(),
            ));
        }
        if self.grid_size.checked_mul(self.grid_size).is_none() {
            return Err(ClusterError::InvalidParameter(format!(
                "grid_size {} overflows the cell count",
                self.grid_size
            )));
        }
        let lr = self.initial_learning_rate;
        if !(lr.is_finite() && lr > 0.0 && lr <= 1.0) {
            return Err(ClusterError::InvalidParameter(format!(
                "initial_learning_rate must be in (0, 1], got {lr}"
            )));
        }
        validate_threshold(self.prefetch_threshold)
    }

    /// Number of grid cells, `grid_size * grid_size`. Only meaningful after `validate()`.
    pub fn num_cells(&self) -> usize {
        self.grid_size.saturating_mul(self.grid_size)
    }

    /// Learning rate used during `epoch`: `initial * (1 - epoch / epochs)`.
    ///
    /// Defined for `epoch` in `0..=epochs`; it is exactly 0 at `epoch == epochs`.
    pub fn learning_rate_at(&self, epoch: usize) -> f64 {
        self.initial_learning_rate * self.decay(epoch)
    }

    /// Neighborhood radius used during `epoch`: `grid_size * (1 - epoch / epochs) / 2`.
    pub fn radius_at(&self, epoch: usize) -> f64 {
        self.grid_size as f64 * self.decay(epoch) / 2.0
    }

    fn decay(&self, epoch: usize) -> f64 {
        1.0 - epoch as f64 / self.epochs as f64
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
        return Err(ClusterError::InvalidParameter(format!(
            "prefetch_threshold must be in [0, 1], got {threshold}"
        )));
    }
    Ok(())
}

/// Read a parameter struct from a JSON file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let text = std::fs::read_to_string(path.as_ref())?;
    serde_json::from_str(&text).map_err(|e| ClusterError::Parse {
        line: e.line(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        KMeansParams::default().validate().unwrap();
        SomParams::default().validate().unwrap();
    }

    #[test]
    fn zero_k_is_rejected() {
        assert!(matches!(
            KMeansParams::with_k(0).validate(),
            Err(ClusterError::InvalidParameter(_))
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let p = SomParams {
            initial_learning_rate: 0.0,
            ..SomParams::default()
        };
        assert!(p.validate().is_err());

        let p = SomParams {
            prefetch_threshold: 1.5,
            ..SomParams::default()
        };
        assert!(p.validate().is_err());

        let p = KMeansParams {
            prefetch_threshold: f64::NAN,
            ..KMeansParams::default()
        };
        assert!(p.validate().is_err());
    }

    #[test]
    fn overflowing_grid_is_rejected() {
        let p = SomParams::new(1usize << (usize::BITS / 2), 1);
        assert!(matches!(
            p.validate(),
            Err(ClusterError::InvalidParameter(_))
        ));
        let p = SomParams::new((1usize << (usize::BITS / 2)) - 1, 1);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn schedule_starts_at_initial_and_ends_at_zero() {
        let p = SomParams {
            grid_size: 6,
            epochs: 10,
            initial_learning_rate: 0.8,
            ..SomParams::default()
        };
        assert_eq!(p.learning_rate_at(0), 0.8);
        assert_eq!(p.radius_at(0), 3.0);
        assert_eq!(p.learning_rate_at(10), 0.0);
        assert_eq!(p.radius_at(10), 0.0);
        assert!((p.learning_rate_at(5) - 0.4).abs() < 1e-12);
        assert!((p.radius_at(5) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let p: SomParams =
            serde_json::from_str(r#"{"grid_size": 3, "test_mode": "training_parity"}"#).unwrap();
        assert_eq!(p.grid_size, 3);
        assert_eq!(p.epochs, 100);
        assert_eq!(p.test_mode, SomTestMode::TrainingParity);
    }
}
