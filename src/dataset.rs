//! Training/test vector sets.
//!
//! A [`Dataset`] is the validated pair of vector sets both clusterers read from. Every
//! vector in both sets has the same length, checked once at construction so the
//! clustering loops can index freely.
//!
//! Vectors typically come from a request log: dimension `j` of vector `i` is `1.0` when
//! client `i` requested resource `j`. [`generate_request_dataset`] synthesizes data of
//! that shape for tests and benchmarks.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::check_dimension;
use crate::error::{ClusterError, Result};

/// A training set and a test set of equal-dimension vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    train: Vec<Vec<f32>>,
    test: Vec<Vec<f32>>,
    dimension: usize,
}

impl Dataset {
    /// Build a dataset, checking every vector against `dimension`.
    ///
    /// The training set must be non-empty and every component finite. An empty test set
    /// is accepted here and rejected later by `test()`.
    pub fn new(dimension: usize, train: Vec<Vec<f32>>, test: Vec<Vec<f32>>) -> Result<Self> {
        if dimension == 0 {
            return Err(ClusterError::InvalidParameter(
                "dimension must be greater than 0".to_string(),
            ));
        }
        if train.is_empty() {
            return Err(ClusterError::EmptyDataset { which: "training" });
        }
        for v in train.iter().chain(test.iter()) {
            check_dimension(dimension, v.len())?;
            if let Some(x) = v.iter().find(|x| !x.is_finite()) {
                return Err(ClusterError::InvalidParameter(format!(
                    "vector components must be finite, got {x}"
                )));
            }
        }
        Ok(Self {
            train,
            test,
            dimension,
        })
    }

    /// Build a dataset taking the dimension from the first training vector.
    pub fn from_vectors(train: Vec<Vec<f32>>, test: Vec<Vec<f32>>) -> Result<Self> {
        let dimension = train
            .first()
            .map(Vec::len)
            .ok_or(ClusterError::EmptyDataset { which: "training" })?;
        Self::new(dimension, train, test)
    }

    /// Load training and test vectors from two text files (see [`parse_vectors`]).
    pub fn from_paths(train: impl AsRef<Path>, test: impl AsRef<Path>) -> Result<Self> {
        let train = read_vectors(train)?;
        let test = read_vectors(test)?;
        Self::from_vectors(train, test)
    }

    pub fn train(&self) -> &[Vec<f32>] {
        &self.train
    }

    pub fn test(&self) -> &[Vec<f32>] {
        &self.test
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of training vectors.
    pub fn n_train(&self) -> usize {
        self.train.len()
    }

    /// Number of test vectors.
    pub fn n_test(&self) -> usize {
        self.test.len()
    }
}

/// Read vectors from a file.
pub fn read_vectors(path: impl AsRef<Path>) -> Result<Vec<Vec<f32>>> {
    let file = File::open(path.as_ref())?;
    parse_vectors(BufReader::new(file))
}

/// Parse one vector per line.
///
/// Components are separated by whitespace or commas. Blank lines and lines starting
/// with `#` are skipped. `NaN` and infinities are parse errors. Line numbers in errors
/// are 1-based.
pub fn parse_vectors<R: BufRead>(reader: R) -> Result<Vec<Vec<f32>>> {
    let mut vectors = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let vector = trimmed
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|tok| !tok.is_empty())
            .map(|tok| match tok.parse::<f32>() {
                Ok(x) if x.is_finite() => Ok(x),
                Ok(_) => Err(ClusterError::Parse {
                    line: idx + 1,
                    message: format!("{tok:?}: not a finite number"),
                }),
                Err(e) => Err(ClusterError::Parse {
                    line: idx + 1,
                    message: format!("{tok:?}: {e}"),
                }),
            })
            .collect::<Result<Vec<f32>>>()?;
        vectors.push(vector);
    }
    Ok(vectors)
}

/// Generate a synthetic request dataset.
///
/// Draws `n_patterns` binary access patterns (each resource on with probability 0.3),
/// then emits request vectors that copy a pattern and flip each bit with probability
/// `noise`. Test vector `i` follows the same pattern as training vector `i`, so the two
/// sets are index-aligned when `n_train == n_test`.
///
/// # Arguments
///
/// * `n_train` - Number of training vectors
/// * `n_test` - Number of test vectors
/// * `dimension` - Number of resources per vector
/// * `n_patterns` - Number of distinct access patterns
/// * `noise` - Per-bit flip probability
/// * `seed` - Random seed for reproducibility
pub fn generate_request_dataset(
    n_train: usize,
    n_test: usize,
    dimension: usize,
    n_patterns: usize,
    noise: f64,
    seed: u64,
) -> Result<Dataset> {
    if n_patterns == 0 {
        return Err(ClusterError::InvalidParameter(
            "n_patterns must be greater than 0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&noise) {
        return Err(ClusterError::InvalidParameter(format!(
            "noise must be in [0, 1], got {noise}"
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let patterns: Vec<Vec<bool>> = (0..n_patterns)
        .map(|_| (0..dimension).map(|_| rng.random_bool(0.3)).collect())
        .collect();

    let owners: Vec<usize> = (0..n_train.max(n_test))
        .map(|_| rng.random_range(0..n_patterns))
        .collect();

    let sample = |pattern: &[bool], rng: &mut StdRng| -> Vec<f32> {
        pattern
            .iter()
            .map(|&on| {
                let flip = rng.random_bool(noise);
                if on ^ flip {
                    1.0
                } else {
                    0.0
                }
            })
            .collect()
    };

    let train: Vec<Vec<f32>> = owners[..n_train]
        .iter()
        .map(|&p| sample(&patterns[p], &mut rng))
        .collect();
    let test: Vec<Vec<f32>> = owners[..n_test]
        .iter()
        .map(|&p| sample(&patterns[p], &mut rng))
        .collect();

    Dataset::new(dimension, train, test)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_mismatched_vectors() {
        let err = Dataset::new(2, vec![vec![0.0, 1.0]], vec![vec![1.0]]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn new_rejects_empty_training_set() {
        let err = Dataset::new(2, Vec::new(), vec![vec![1.0, 0.0]]).unwrap_err();
        assert_eq!(err, ClusterError::EmptyDataset { which: "training" });
    }

    #[test]
    fn new_accepts_empty_test_set() {
        let ds = Dataset::new(1, vec![vec![0.5]], Vec::new()).unwrap();
        assert_eq!(ds.n_test(), 0);
    }

    #[test]
    fn parse_vectors_skips_comments_and_mixes_separators() {
        let text = "# requests\n1 0 1\n\n0.5,0.25, 1\n";
        let vectors = parse_vectors(text.as_bytes()).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0, 1.0], vec![0.5, 0.25, 1.0]]);
    }

    #[test]
    fn parse_vectors_reports_line_number() {
        let text = "1 0\n1 x\n";
        match parse_vectors(text.as_bytes()).unwrap_err() {
            ClusterError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_vectors_rejects_non_finite() {
        for text in ["1 0\n0 NaN\n", "1 0\n0 inf\n"] {
            match parse_vectors(text.as_bytes()).unwrap_err() {
                ClusterError::Parse { line, .. } => assert_eq!(line, 2),
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn generated_dataset_is_binary_and_seeded() {
        let a = generate_request_dataset(20, 10, 16, 3, 0.05, 7).unwrap();
        let b = generate_request_dataset(20, 10, 16, 3, 0.05, 7).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.n_train(), 20);
        assert_eq!(a.n_test(), 10);
        assert!(a
            .train()
            .iter()
            .chain(a.test().iter())
            .flatten()
            .all(|&x| x == 0.0 || x == 1.0));
    }
}
