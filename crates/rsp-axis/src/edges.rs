//! One-dimensional binning by explicit, linear or logarithmic edges.

use rsp_core::{ErrorInfo, RspError};
use serde::{Deserialize, Serialize};

/// Position of a coordinate relative to a set of bin edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinPosition {
    /// Below the first edge.
    Underflow,
    /// Inside bin `i`.
    Bin(usize),
    /// At or above the last edge.
    Overflow,
}

/// Strictly increasing bin edges; `n + 1` edges describe `n` bins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct BinEdges {
    edges: Vec<f64>,
}

fn configuration(code: &str, message: impl Into<String>) -> RspError {
    RspError::Configuration(ErrorInfo::new(code, message))
}

impl BinEdges {
    /// Validates and wraps an explicit edge list.
    pub fn from_edges(edges: Vec<f64>) -> Result<Self, RspError> {
        if edges.len() < 2 {
            return Err(RspError::Configuration(
                ErrorInfo::new("too-few-edges", "an axis needs at least two edges")
                    .with_context("edges", edges.len().to_string()),
            ));
        }
        if let Some(index) = edges.iter().position(|edge| !edge.is_finite()) {
            return Err(RspError::Configuration(
                ErrorInfo::new("non-finite-edge", "axis edges must be finite")
                    .with_context("index", index.to_string())
                    .with_context("value", edges[index].to_string()),
            ));
        }
        if let Some(index) = edges.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(RspError::Configuration(
                ErrorInfo::new("non-increasing-edges", "axis edges must be strictly increasing")
                    .with_context("index", (index + 1).to_string())
                    .with_context("value", edges[index + 1].to_string())
                    .with_context("previous", edges[index].to_string()),
            ));
        }
        Ok(Self { edges })
    }

    /// A single bin `[0, 1)`.
    pub fn unit() -> Self {
        Self {
            edges: vec![0.0, 1.0],
        }
    }

    /// `bins` equal-width bins spanning `[min, max]`.
    pub fn linear(bins: usize, min: f64, max: f64) -> Result<Self, RspError> {
        Self::check_range(bins, min, max)?;
        let width = (max - min) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| min + width * i as f64).collect();
        edges.push(max);
        Self::from_edges(edges)
    }

    /// `bins` bins whose edges form a geometric progression from `min` to `max`.
    pub fn logarithmic(bins: usize, min: f64, max: f64) -> Result<Self, RspError> {
        Self::check_range(bins, min, max)?;
        if min <= 0.0 {
            return Err(RspError::Configuration(
                ErrorInfo::new("non-positive-minimum", "logarithmic axes need a positive minimum")
                    .with_context("min", min.to_string()),
            ));
        }
        let (low, high) = (min.ln(), max.ln());
        let step = (high - low) / bins as f64;
        let mut edges = Vec::with_capacity(bins + 1);
        edges.push(min);
        edges.extend((1..bins).map(|i| (low + step * i as f64).exp()));
        edges.push(max);
        Self::from_edges(edges)
    }

    fn check_range(bins: usize, min: f64, max: f64) -> Result<(), RspError> {
        if bins == 0 {
            return Err(configuration("zero-bins", "an axis needs at least one bin"));
        }
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-range", "axis minimum must be below its maximum")
                    .with_context("min", min.to_string())
                    .with_context("max", max.to_string()),
            ));
        }
        Ok(())
    }

    /// Prepends an underflow bin reaching down to `bound`.
    pub fn with_underflow(mut self, bound: f64) -> Result<Self, RspError> {
        if !bound.is_finite() || bound >= self.edges[0] {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-underflow", "underflow bound must lie below the first edge")
                    .with_context("bound", bound.to_string())
                    .with_context("first", self.edges[0].to_string()),
            ));
        }
        self.edges.insert(0, bound);
        Ok(self)
    }

    /// Appends an overflow bin reaching up to `bound`.
    pub fn with_overflow(mut self, bound: f64) -> Result<Self, RspError> {
        let last = self.high_edge();
        if !bound.is_finite() || bound <= last {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-overflow", "overflow bound must lie above the last edge")
                    .with_context("bound", bound.to_string())
                    .with_context("last", last.to_string()),
            ));
        }
        self.edges.push(bound);
        Ok(self)
    }

    /// The edges, lowest first.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins, one less than the number of edges.
    pub fn bin_count(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lowest edge.
    pub fn low_edge(&self) -> f64 {
        self.edges[0]
    }

    /// Highest edge.
    pub fn high_edge(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// Classifies `x` against the edges. A value equal to the last edge overflows.
    pub fn locate(&self, x: f64) -> BinPosition {
        if x.is_nan() || x < self.low_edge() {
            return BinPosition::Underflow;
        }
        if x >= self.high_edge() {
            return BinPosition::Overflow;
        }
        BinPosition::Bin(self.edges.partition_point(|edge| *edge <= x) - 1)
    }

    /// Bin holding `x`, if any.
    pub fn find_bin(&self, x: f64) -> Option<usize> {
        match self.locate(x) {
            BinPosition::Bin(bin) => Some(bin),
            _ => None,
        }
    }

    /// Bin holding `x`, clamped to the first or last bin outside the range.
    pub fn find_bin_clamped(&self, x: f64) -> usize {
        match self.locate(x) {
            BinPosition::Underflow => 0,
            BinPosition::Bin(bin) => bin,
            BinPosition::Overflow => self.bin_count() - 1,
        }
    }

    /// Whether `x` falls into any bin.
    pub fn in_range(&self, x: f64) -> bool {
        self.find_bin(x).is_some()
    }

    /// Center of `bin`.
    ///
    /// # Panics
    ///
    /// Panics if `bin >= self.bin_count()`.
    pub fn center(&self, bin: usize) -> f64 {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }

    /// Width of `bin`.
    ///
    /// # Panics
    ///
    /// Panics if `bin >= self.bin_count()`.
    pub fn width(&self, bin: usize) -> f64 {
        self.edges[bin + 1] - self.edges[bin]
    }
}

impl TryFrom<Vec<f64>> for BinEdges {
    type Error = RspError;

    fn try_from(edges: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_edges(edges)
    }
}

impl From<BinEdges> for Vec<f64> {
    fn from(edges: BinEdges) -> Self {
        edges.edges
    }
}
