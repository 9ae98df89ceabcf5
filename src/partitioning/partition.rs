//! Immutable cluster-membership snapshots.

use serde::{Deserialize, Serialize};

use crate::error::{ClusterError, Result};

/// Assignment of vector indices to clusters at one point in training.
///
/// Member lists are kept in ascending index order. Every index assigned by the pass
/// that built the partition appears in exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<usize>>", into = "Vec<Vec<usize>>")]
pub struct Partition {
    members: Vec<Vec<usize>>,
}

impl From<Vec<Vec<usize>>> for Partition {
    /// Sorts each member list so [`Partition::is_subset_of`] can binary search.
    fn from(mut members: Vec<Vec<usize>>) -> Self {
        for list in &mut members {
            list.sort_unstable();
        }
        Self { members }
    }
}

impl From<Partition> for Vec<Vec<usize>> {
    fn from(partition: Partition) -> Self {
        partition.members
    }
}

impl Partition {
    /// Build a partition from per-vector cluster assignments.
    ///
    /// Fails with [`ClusterError::InvalidParameter`] if an assignment is not
    /// `< num_clusters`.
    pub fn from_assignments(assignments: &[usize], num_clusters: usize) -> Result<Self> {
        let mut members = vec![Vec::new(); num_clusters];
        for (idx, &cluster) in assignments.iter().enumerate() {
            let list = members.get_mut(cluster).ok_or_else(|| {
                ClusterError::InvalidParameter(format!(
                    "vector {idx} assigned to cluster {cluster} of {num_clusters}"
                ))
            })?;
            list.push(idx);
        }
        Ok(Self { members })
    }

    pub fn num_clusters(&self) -> usize {
        self.members.len()
    }

    /// Member indices of `cluster` (empty if out of range).
    pub fn members(&self, cluster: usize) -> &[usize] {
        self.members.get(cluster).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Member lists of every cluster, in cluster order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.members.iter().map(Vec::as_slice)
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }

    /// Total number of assigned indices.
    pub fn len(&self) -> usize {
        self.members.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cluster of each index `0..n`, or `None` for indices this partition never assigned.
    pub fn assignments(&self, n: usize) -> Vec<Option<usize>> {
        let mut out = vec![None; n];
        for (cluster, members) in self.members.iter().enumerate() {
            for &m in members {
                if let Some(slot) = out.get_mut(m) {
                    *slot = Some(cluster);
                }
            }
        }
        out
    }

    /// True when every cluster's members are a subset of the same cluster in `previous`.
    ///
    /// This is the k-means fixed-point test: no vector moved to a cluster it was not in.
    pub fn is_subset_of(&self, previous: &Partition) -> bool {
        self.members.iter().enumerate().all(|(cluster, current)| {
            let prev = previous.members(cluster);
            current.iter().all(|m| prev.binary_search(m).is_ok())
        })
    }
}
