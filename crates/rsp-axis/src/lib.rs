#![deny(missing_docs)]
#![doc = "Axis models for response matrices: explicit, linear and logarithmic edges plus the equal-solid-angle spherical partition."]

pub mod axis;
pub mod edges;
pub mod fisbel;

pub use axis::{checked_bin_product, Axis, Binning};
pub use edges::{BinEdges, BinPosition};
pub use fisbel::FisbelBinning;
