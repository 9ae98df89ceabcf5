//! Self-organizing map (Kohonen map).
//!
//! An `n x n` grid of centroids trained for a fixed number of epochs. For every
//! training vector the best matching unit (BMU) is found, and every cell within
//! Manhattan distance `r(e)` of it is pulled toward the vector:
//!
//! ```text
//! c[i] = c[i] * (1 - lr(e)) + lr(e) * v[i]
//! lr(e) = lr0 * (1 - e / E)
//! r(e)  = n * (1 - e / E) / 2
//! ```
//!
//! All cells inside the radius get the same pull. There is no convergence test; the
//! epoch count alone ends training.

pub mod grid;
pub mod map;

pub use grid::GridCoord;
pub use map::SelfOrganizingMap;
