//! Euclidean distance over dense fixed-dimension vectors.
//!
//! Both clusterers are fixed to the L2 metric. The checked functions here return
//! [`ClusterError::DimensionMismatch`] instead of the `f32::INFINITY` convention used by
//! some vector libraries, because a length mismatch inside a validated [`Dataset`] is a
//! programming error that should surface.
//!
//! [`Dataset`]: crate::dataset::Dataset

use crate::error::{ClusterError, Result};

/// Squared L2 distance, without the length check.
#[inline]
#[must_use]
pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Euclidean (L2) distance `sqrt(sum((a[i]-b[i])^2))`.
#[inline]
pub fn l2_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimension(a.len(), b.len())?;
    Ok(l2_distance_squared(a, b).sqrt())
}

/// Index of the centroid closest to `vector`.
///
/// Scans in ascending index order and keeps the first strict minimum, so ties go to the
/// lowest index. Returns `None` when `centroids` is empty.
pub fn nearest_centroid<C: AsRef<[f32]>>(
    vector: &[f32],
    centroids: &[C],
) -> Result<Option<usize>> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = l2_distance(vector, centroid.as_ref())?;
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            // NaN never beats a finite distance; the first centroid is taken regardless.
            Some(_) if dist.is_nan() => {}
            _ => best = Some((idx, dist)),
        }
    }
    Ok(best.map(|(idx, _)| idx))
}

#[inline]
pub(crate) fn check_dimension(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(ClusterError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_distance_matches_pythagoras() {
        let d = l2_distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
        assert!((d - 5.0).abs() < 1e-6);
    }

    #[test]
    fn l2_distance_is_zero_for_identical() {
        let a = [0.25_f32, 1.0, 7.5];
        assert_eq!(l2_distance(&a, &a).unwrap(), 0.0);
    }

    #[test]
    fn l2_distance_rejects_length_mismatch() {
        let err = l2_distance(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn nearest_centroid_breaks_ties_by_lowest_index() {
        let centroids = vec![vec![1.0_f32, 0.0], vec![-1.0, 0.0], vec![0.0, 5.0]];
        // Equidistant from centroid 0 and 1.
        assert_eq!(nearest_centroid(&[0.0, 0.0], &centroids).unwrap(), Some(0));
        assert_eq!(nearest_centroid(&[0.0, 4.0], &centroids).unwrap(), Some(2));
    }

    #[test]
    fn nearest_centroid_of_nothing_is_none() {
        let centroids: Vec<Vec<f32>> = Vec::new();
        assert_eq!(nearest_centroid(&[1.0], &centroids).unwrap(), None);
    }
}
