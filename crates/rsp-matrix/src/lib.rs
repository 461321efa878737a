#![deny(missing_docs)]
#![doc = "Response-matrix engine: fixed-order and variable-order binned matrices with interpolation, elementwise algebra and marginalization."]

pub mod algebra;
pub mod fixed;
pub mod general;
/// Content hashing.
pub mod hash;
pub mod reduce;
pub mod shared;
/// Statistics report.
pub mod stats;

pub use algebra::{probability, ratio, ElementwiseAlgebra};
pub use fixed::{FixedMatrix, OrderedMatrix};
pub use general::GeneralMatrix;
pub use hash::{canonical_hash_general, canonical_hash_ordered};
pub use shared::{Freeze, Frozen};
pub use stats::{AxisSummary, MatrixStatistics};
