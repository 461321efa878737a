//! Named axes over either binning, and the size cap check.

use std::f64::consts::PI;

use rsp_core::{ErrorInfo, RspError};

use crate::edges::BinEdges;
use crate::fisbel::FisbelBinning;

/// Binning discipline of an [`Axis`].
#[derive(Debug, Clone, PartialEq)]
pub enum Binning {
    /// One coordinate split by edges.
    Edges(BinEdges),
    /// Two coordinates `(longitude, latitude)` split into equal solid angles.
    Fisbel(FisbelBinning),
}

impl Binning {
    /// Number of coordinates the binning consumes.
    pub fn dimension(&self) -> usize {
        match self {
            Binning::Edges(_) => 1,
            Binning::Fisbel(_) => 2,
        }
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        match self {
            Binning::Edges(edges) => edges.bin_count(),
            Binning::Fisbel(fisbel) => fisbel.bin_count(),
        }
    }
}

/// A named binning used as one axis of a matrix.
///
/// Equality compares the binning only; names are labels.
#[derive(Debug, Clone)]
pub struct Axis {
    names: Vec<String>,
    binning: Binning,
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.binning == other.binning
    }
}

impl Axis {
    /// One-dimensional axis over explicit edges.
    pub fn new(name: impl Into<String>, edges: BinEdges) -> Self {
        Self {
            names: vec![name.into()],
            binning: Binning::Edges(edges),
        }
    }

    /// One-dimensional axis from a raw edge list.
    pub fn from_edges(name: impl Into<String>, edges: Vec<f64>) -> Result<Self, RspError> {
        let name = name.into();
        let edges = BinEdges::from_edges(edges).map_err(|err| label(err, &name))?;
        Ok(Self::new(name, edges))
    }

    /// One-dimensional axis with `bins` equal-width bins.
    pub fn linear(name: impl Into<String>, bins: usize, min: f64, max: f64) -> Result<Self, RspError> {
        let name = name.into();
        let edges = BinEdges::linear(bins, min, max).map_err(|err| label(err, &name))?;
        Ok(Self::new(name, edges))
    }

    /// One-dimensional axis with geometrically growing bins.
    pub fn logarithmic(
        name: impl Into<String>,
        bins: usize,
        min: f64,
        max: f64,
    ) -> Result<Self, RspError> {
        let name = name.into();
        let edges = BinEdges::logarithmic(bins, min, max).map_err(|err| label(err, &name))?;
        Ok(Self::new(name, edges))
    }

    /// Two-dimensional equal-solid-angle axis.
    pub fn fisbel(
        longitude_name: impl Into<String>,
        latitude_name: impl Into<String>,
        binning: FisbelBinning,
    ) -> Self {
        Self {
            names: vec![longitude_name.into(), latitude_name.into()],
            binning: Binning::Fisbel(binning),
        }
    }

    /// Axis names, one per coordinate.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names joined for messages.
    pub fn label(&self) -> String {
        self.names.join("/")
    }

    /// The binning.
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// The edges of a one-dimensional axis.
    pub fn edges(&self) -> Option<&BinEdges> {
        match &self.binning {
            Binning::Edges(edges) => Some(edges),
            Binning::Fisbel(_) => None,
        }
    }

    /// Number of coordinates the axis consumes.
    pub fn dimension(&self) -> usize {
        self.binning.dimension()
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        self.binning.bin_count()
    }

    /// Bin for the given coordinates, `None` when they are outside the axis
    /// or when their count does not match [`Axis::dimension`].
    pub fn find_bin(&self, values: &[f64]) -> Option<usize> {
        match (&self.binning, values) {
            (Binning::Edges(edges), [x]) => edges.find_bin(*x),
            (Binning::Fisbel(fisbel), [longitude, latitude]) => fisbel.find_bin(*longitude, *latitude),
            _ => None,
        }
    }

    /// Whether the coordinates fall into a bin.
    pub fn in_range(&self, values: &[f64]) -> bool {
        self.find_bin(values).is_some()
    }

    /// Width of a one-dimensional bin or solid angle of a spherical one.
    ///
    /// # Panics
    ///
    /// Panics if `bin >= self.bin_count()`.
    pub fn area(&self, bin: usize) -> f64 {
        match &self.binning {
            Binning::Edges(edges) => edges.width(bin),
            Binning::Fisbel(fisbel) => fisbel.solid_angle(bin),
        }
    }

    /// Whether both axes bin identically.
    pub fn same_binning(&self, other: &Axis) -> bool {
        self == other
    }

    /// Lower bound of every coordinate.
    pub fn minima(&self) -> Vec<f64> {
        match &self.binning {
            Binning::Edges(edges) => vec![edges.low_edge()],
            Binning::Fisbel(fisbel) => vec![fisbel.longitude_shift(), 0.0],
        }
    }

    /// Upper bound of every coordinate.
    pub fn maxima(&self) -> Vec<f64> {
        match &self.binning {
            Binning::Edges(edges) => vec![edges.high_edge()],
            Binning::Fisbel(fisbel) => vec![fisbel.longitude_shift() + 2.0 * PI, PI],
        }
    }
}

fn label(err: RspError, name: &str) -> RspError {
    match err {
        RspError::Configuration(info) => RspError::Configuration(info.with_context("axis", name)),
        other => other,
    }
}

/// Product of bin counts, or a configuration error when it exceeds `max_bins`.
pub fn checked_bin_product(
    bin_counts: impl IntoIterator<Item = usize>,
    max_bins: u64,
) -> Result<usize, RspError> {
    let mut product: u64 = 1;
    for (index, count) in bin_counts.into_iter().enumerate() {
        product = product.checked_mul(count as u64).unwrap_or(u64::MAX);
        if product > max_bins {
            return Err(RspError::Configuration(
                ErrorInfo::new("size-cap-exceeded", "the bin-count product exceeds the size cap")
                    .with_axis(index)
                    .with_context("max_bins", max_bins.to_string())
                    .with_hint("use fewer bins or raise engine.max_bins"),
            ));
        }
    }
    usize::try_from(product).map_err(|_| {
        RspError::Configuration(ErrorInfo::new(
            "size-cap-exceeded",
            "the bin-count product does not fit in memory",
        ))
    })
}
