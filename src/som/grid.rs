//! Square grid addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cell coordinate in an `n x n` map. Cells are scanned row-major: `x` outer, `y` inner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: usize,
    pub y: usize,
}

impl GridCoord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Coordinate of flat index `idx` in a grid of side `n`.
    #[inline]
    pub fn from_index(idx: usize, n: usize) -> Self {
        Self {
            x: idx / n,
            y: idx % n,
        }
    }

    /// Flat row-major index in a grid of side `n`.
    #[inline]
    pub fn index(self, n: usize) -> usize {
        self.x * n + self.y
    }

    /// `|dx| + |dy|`
    #[inline]
    pub fn manhattan(self, other: GridCoord) -> usize {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}][{}]", self.x, self.y)
    }
}

/// All coordinates of a grid of side `n`, in scan order.
pub fn cells(n: usize) -> impl Iterator<Item = GridCoord> {
    (0..n * n).map(move |idx| GridCoord::from_index(idx, n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_row_major() {
        let order: Vec<GridCoord> = cells(2).collect();
        assert_eq!(
            order,
            vec![
                GridCoord::new(0, 0),
                GridCoord::new(0, 1),
                GridCoord::new(1, 0),
                GridCoord::new(1, 1)
            ]
        );
        for (idx, c) in order.iter().enumerate() {
            assert_eq!(c.index(2), idx);
        }
    }

    #[test]
    fn manhattan_distance() {
        assert_eq!(GridCoord::new(0, 3).manhattan(GridCoord::new(2, 1)), 4);
        assert_eq!(GridCoord::new(1, 1).manhattan(GridCoord::new(1, 1)), 0);
    }
}
