//! Prefetch evaluation.
//!
//! Each vector dimension is treated as a binary feature. For a vector assigned to a
//! cluster, dimension `j` is
//!
//! - **requested** if the vector's value is exactly `1.0`,
//! - **prefetched** if the cluster centroid's value is `>= threshold`,
//! - a **hit** if both hold.
//!
//! hitrate = hits / requests (recall), accuracy = hits / prefetched (precision).
//! A zero denominator yields [`Metric::Undefined`], never a NaN.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};

/// A ratio that may have no defined value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Metric {
    Defined(f64),
    /// The denominator was zero.
    Undefined,
}

impl Metric {
    /// `numerator / denominator`, or `Undefined` when the denominator is zero.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            Metric::Undefined
        } else {
            Metric::Defined(numerator as f64 / denominator as f64)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Metric::Defined(v) => Some(v),
            Metric::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Metric::Defined(_))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Defined(v) => write!(f, "{v}"),
            Metric::Undefined => write!(f, "undefined"),
        }
    }
}

/// Raw request/prefetch/hit totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefetchCounts {
    pub requests: u64,
    pub prefetched: u64,
    pub hits: u64,
}

impl PrefetchCounts {
    /// Add the per-dimension outcome of one vector against its cluster's centroid.
    ///
    /// `features` and `centroid` must have the same length; callers pass vectors from a
    /// validated dataset.
    pub fn accumulate(&mut self, features: &[f32], centroid: &[f32], threshold: f64) {
        for (&value, &proto) in features.iter().zip(centroid.iter()) {
            let requested = value == 1.0;
            let prefetched = f64::from(proto) >= threshold;
            self.requests += u64::from(requested);
            self.prefetched += u64::from(prefetched);
            self.hits += u64::from(requested && prefetched);
        }
    }

    pub fn hitrate(&self) -> Metric {
        Metric::ratio(self.hits, self.requests)
    }

    pub fn accuracy(&self) -> Metric {
        Metric::ratio(self.hits, self.prefetched)
    }
}

/// Outcome of one `test()` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub counts: PrefetchCounts,
    pub threshold: f64,
    pub hitrate: Metric,
    pub accuracy: Metric,
}

impl EvaluationResult {
    pub fn from_counts(counts: PrefetchCounts, threshold: f64) -> Self {
        Self {
            counts,
            threshold,
            hitrate: counts.hitrate(),
            accuracy: counts.accuracy(),
        }
    }

    /// Hitrate, or [`ClusterError::UndefinedMetric`] when nothing was requested.
    pub fn hitrate_value(&self) -> Result<f64> {
        self.hitrate
            .value()
            .ok_or(ClusterError::UndefinedMetric { metric: "hitrate" })
    }

    /// Accuracy, or [`ClusterError::UndefinedMetric`] when nothing was prefetched.
    pub fn accuracy_value(&self) -> Result<f64> {
        self.accuracy
            .value()
            .ok_or(ClusterError::UndefinedMetric { metric: "accuracy" })
    }

    /// `hitrate + accuracy`, the single score the threshold is usually tuned against.
    pub fn combined(&self) -> Metric {
        match (self.hitrate, self.accuracy) {
            (Metric::Defined(h), Metric::Defined(a)) => Metric::Defined(h + a),
            _ => Metric::Undefined,
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Prefetch threshold={}", self.threshold)?;
        writeln!(f, "Hitrate: {}", self.hitrate)?;
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        write!(f, "Hitrate+Accuracy={}", self.combined())
    }
}

/// Evaluate cluster assignments against a vector set.
///
/// `clusters` yields `(centroid, member indices)` pairs in the order they should be
/// scanned; member indices point into `vectors`.
pub fn evaluate<'c, 'm, C, I>(
    clusters: I,
    vectors: &[Vec<f32>],
    threshold: f64,
) -> Result<EvaluationResult>
where
    C: AsRef<[f32]> + 'c,
    I: IntoIterator<Item = (&'c C, &'m [usize])>,
{
    let mut counts = PrefetchCounts::default();
    for (centroid, members) in clusters {
        let centroid = centroid.as_ref();
        for &m in members {
            let features = vectors.get(m).ok_or_else(|| {
                ClusterError::InvalidParameter(format!(
                    "member index {m} out of range for {} vectors",
                    vectors.len()
                ))
            })?;
            crate::distance::check_dimension(centroid.len(), features.len())?;
            counts.accumulate(features, centroid, threshold);
        }
    }
    Ok(EvaluationResult::from_counts(counts, threshold))
}
