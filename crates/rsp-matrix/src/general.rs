//! Variable-order matrix over a list of heterogeneous axes.

use rsp_axis::{checked_bin_product, Axis, BinEdges, FisbelBinning};
use rsp_core::{
    display_name, tracing_sink, Diagnostic, DropStats, EngineConfig, ErrorInfo, MatrixMeta,
    RspError, SharedSink,
};

use crate::reduce;
use crate::stats::{AxisSummary, MatrixStatistics};

/// Matrix over an ordered list of one- and two-dimensional axes with flat,
/// axis-0-fastest storage.
#[derive(Debug, Clone)]
pub struct GeneralMatrix {
    meta: MatrixMeta,
    axes: Vec<Axis>,
    values: Vec<f32>,
    max_bins: u64,
    sink: SharedSink,
    drops: DropStats,
}

impl PartialEq for GeneralMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.axes == other.axes
            && self
                .axes
                .iter()
                .zip(&other.axes)
                .all(|(left, right)| left.names() == right.names())
            && self.values == other.values
    }
}

impl GeneralMatrix {
    /// Creates a matrix without axes holding a single scalar bin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            meta: MatrixMeta::named(name),
            axes: Vec::new(),
            values: vec![0.0],
            max_bins: EngineConfig::default().max_bins,
            sink: tracing_sink(),
            drops: DropStats::default(),
        }
    }

    /// Applies the size cap of `config`.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.max_bins = config.max_bins;
        self
    }

    /// Routes diagnostics to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Matrix name.
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Renames the matrix.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.meta.name = name.into();
    }

    /// Descriptive metadata.
    pub fn meta(&self) -> &MatrixMeta {
        &self.meta
    }

    /// Mutable metadata.
    pub fn meta_mut(&mut self) -> &mut MatrixMeta {
        &mut self.meta
    }

    /// Diagnostics sink.
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Totals of values dropped by the soft setters.
    pub fn drop_stats(&self) -> DropStats {
        self.drops
    }

    /// The axes.
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    /// Number of axes.
    pub fn axis_count(&self) -> usize {
        self.axes.len()
    }

    /// Sum of the axis dimensions.
    pub fn order(&self) -> usize {
        self.axes.iter().map(Axis::dimension).sum()
    }

    /// Total number of bins.
    pub fn bin_count(&self) -> usize {
        self.values.len()
    }

    /// Flat value buffer.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Mutable flat value buffer.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.values
    }

    /// Appends `axis` as the slowest-varying one.
    ///
    /// Existing values end up in bin 0 of the new axis; all other bins start at zero.
    pub fn add_axis(&mut self, axis: Axis) -> Result<(), RspError> {
        let counts = self
            .axes
            .iter()
            .chain(std::iter::once(&axis))
            .map(Axis::bin_count);
        let total = checked_bin_product(counts, self.max_bins).map_err(|err| match err {
            RspError::Configuration(info) => RspError::Configuration(
                info.with_matrix(display_name(self.name()))
                    .with_context("axis-name", axis.label()),
            ),
            other => other,
        })?;
        self.axes.push(axis);
        self.values.resize(total, 0.0);
        Ok(())
    }

    /// Appends a one-dimensional axis over explicit edges.
    pub fn add_axis_edges(&mut self, name: impl Into<String>, edges: Vec<f64>) -> Result<(), RspError> {
        let axis = Axis::from_edges(name, edges).map_err(|err| self.labelled(err))?;
        self.add_axis(axis)
    }

    /// Appends a linear axis, optionally extended by underflow and overflow bins.
    pub fn add_axis_linear(
        &mut self,
        name: impl Into<String>,
        bins: usize,
        min: f64,
        max: f64,
        underflow: Option<f64>,
        overflow: Option<f64>,
    ) -> Result<(), RspError> {
        let edges = BinEdges::linear(bins, min, max);
        self.add_extended(name.into(), edges, underflow, overflow)
    }

    /// Appends a logarithmic axis, optionally extended by underflow and overflow bins.
    pub fn add_axis_logarithmic(
        &mut self,
        name: impl Into<String>,
        bins: usize,
        min: f64,
        max: f64,
        underflow: Option<f64>,
        overflow: Option<f64>,
    ) -> Result<(), RspError> {
        let edges = BinEdges::logarithmic(bins, min, max);
        self.add_extended(name.into(), edges, underflow, overflow)
    }

    fn add_extended(
        &mut self,
        name: String,
        edges: Result<BinEdges, RspError>,
        underflow: Option<f64>,
        overflow: Option<f64>,
    ) -> Result<(), RspError> {
        let mut edges = edges.map_err(|err| self.labelled_axis(err, &name))?;
        if let Some(bound) = underflow {
            edges = edges
                .with_underflow(bound)
                .map_err(|err| self.labelled_axis(err, &name))?;
        }
        if let Some(bound) = overflow {
            edges = edges
                .with_overflow(bound)
                .map_err(|err| self.labelled_axis(err, &name))?;
        }
        self.add_axis(Axis::new(name, edges))
    }

    /// Appends an equal-solid-angle axis of `bins` cells.
    pub fn add_axis_fisbel(
        &mut self,
        longitude_name: impl Into<String>,
        latitude_name: impl Into<String>,
        bins: usize,
        longitude_shift: f64,
    ) -> Result<(), RspError> {
        let binning =
            FisbelBinning::with_shift(bins, longitude_shift).map_err(|err| self.labelled(err))?;
        self.add_axis(Axis::fisbel(longitude_name, latitude_name, binning))
    }

    fn labelled(&self, err: RspError) -> RspError {
        match err {
            RspError::Configuration(info) => {
                RspError::Configuration(info.with_matrix(display_name(self.name())))
            }
            other => other,
        }
    }

    fn labelled_axis(&self, err: RspError, axis: &str) -> RspError {
        match self.labelled(err) {
            RspError::Configuration(info) => {
                RspError::Configuration(info.with_context("axis-name", axis))
            }
            other => other,
        }
    }

    /// Flat offset of per-axis bin indices.
    pub fn find_bin(&self, bins: &[usize]) -> Result<usize, RspError> {
        if bins.len() != self.axes.len() {
            return Err(RspError::Bounds(
                ErrorInfo::new("arity-mismatch", "wrong number of bin indices")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.axes.len().to_string())
                    .with_context("found", bins.len().to_string()),
            ));
        }
        let mut offset = 0;
        let mut stride = 1;
        for (index, (&bin, axis)) in bins.iter().zip(&self.axes).enumerate() {
            if bin >= axis.bin_count() {
                return Err(RspError::Bounds(
                    ErrorInfo::new("bin-out-of-range", "bin index outside the axis")
                        .with_matrix(display_name(self.name()))
                        .with_axis(index)
                        .with_context("bin", bin.to_string())
                        .with_context("bins", axis.bin_count().to_string()),
                ));
            }
            offset += bin * stride;
            stride *= axis.bin_count();
        }
        Ok(offset)
    }

    /// Per-axis bin indices of a flat offset.
    pub fn find_bins(&self, offset: usize) -> Result<Vec<usize>, RspError> {
        self.check_offset(offset)?;
        let mut rest = offset;
        Ok(self
            .axes
            .iter()
            .map(|axis| {
                let bin = rest % axis.bin_count();
                rest /= axis.bin_count();
                bin
            })
            .collect())
    }

    fn check_offset(&self, offset: usize) -> Result<(), RspError> {
        if offset >= self.values.len() {
            return Err(RspError::Bounds(
                ErrorInfo::new("offset-out-of-range", "flat index outside the matrix")
                    .with_matrix(display_name(self.name()))
                    .with_context("offset", offset.to_string())
                    .with_context("bins", self.values.len().to_string()),
            ));
        }
        Ok(())
    }

    fn check_value(&self, value: f32) -> Result<(), RspError> {
        if !value.is_finite() {
            return Err(RspError::Value(
                ErrorInfo::new("non-finite-value", "matrix content must be finite")
                    .with_matrix(display_name(self.name()))
                    .with_context("value", value.to_string()),
            ));
        }
        Ok(())
    }

    /// Resolves coordinates to a flat offset; `Ok(None)` when outside an axis.
    fn locate(&self, values: &[f64]) -> Result<Option<usize>, RspError> {
        if values.len() != self.order() {
            return Err(RspError::Value(
                ErrorInfo::new("coordinate-arity", "wrong number of coordinates")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.order().to_string())
                    .with_context("found", values.len().to_string()),
            ));
        }
        let mut offset = 0;
        let mut stride = 1;
        let mut start = 0;
        for axis in &self.axes {
            let end = start + axis.dimension();
            let Some(bin) = axis.find_bin(&values[start..end]) else {
                return Ok(None);
            };
            offset += bin * stride;
            stride *= axis.bin_count();
            start = end;
        }
        Ok(Some(offset))
    }

    fn dropped(&mut self, coordinates: Vec<f64>, value: f32) {
        self.drops.record(f64::from(value));
        self.sink.emit(Diagnostic::Dropped {
            matrix: self.meta.name.clone(),
            coordinates,
            value: f64::from(value),
        });
    }

    /// Sets the bin holding `values`; returns `Ok(false)` when they are outside the matrix.
    pub fn set(&mut self, values: &[f64], value: f32) -> Result<bool, RspError> {
        self.check_value(value)?;
        match self.locate(values)? {
            Some(offset) => {
                self.values[offset] = value;
                Ok(true)
            }
            None => {
                self.dropped(values.to_vec(), value);
                Ok(false)
            }
        }
    }

    /// Adds to the bin holding `values`; returns `Ok(false)` when they are outside the matrix.
    pub fn add(&mut self, values: &[f64], value: f32) -> Result<bool, RspError> {
        self.check_value(value)?;
        match self.locate(values)? {
            Some(offset) => {
                self.values[offset] += value;
                Ok(true)
            }
            None => {
                self.dropped(values.to_vec(), value);
                Ok(false)
            }
        }
    }

    fn soft_offset(&self, bins: &[usize]) -> Result<Option<usize>, RspError> {
        match self.find_bin(bins) {
            Ok(offset) => Ok(Some(offset)),
            Err(RspError::Bounds(info)) if info.code == "bin-out-of-range" => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Sets a bin by per-axis index; out-of-range indices are dropped.
    pub fn set_bins(&mut self, bins: &[usize], value: f32) -> Result<bool, RspError> {
        self.check_value(value)?;
        match self.soft_offset(bins)? {
            Some(offset) => {
                self.values[offset] = value;
                Ok(true)
            }
            None => {
                self.dropped(bins.iter().map(|bin| *bin as f64).collect(), value);
                Ok(false)
            }
        }
    }

    /// Adds to a bin by per-axis index; out-of-range indices are dropped.
    pub fn add_bins(&mut self, bins: &[usize], value: f32) -> Result<bool, RspError> {
        self.check_value(value)?;
        match self.soft_offset(bins)? {
            Some(offset) => {
                self.values[offset] += value;
                Ok(true)
            }
            None => {
                self.dropped(bins.iter().map(|bin| *bin as f64).collect(), value);
                Ok(false)
            }
        }
    }

    /// Sets a bin by per-axis index, failing when an index is out of range.
    pub fn set_bin(&mut self, bins: &[usize], value: f32) -> Result<(), RspError> {
        self.check_value(value)?;
        let offset = self.find_bin(bins)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Reads a bin by per-axis index, failing when an index is out of range.
    pub fn get_bin(&self, bins: &[usize]) -> Result<f32, RspError> {
        Ok(self.values[self.find_bin(bins)?])
    }

    /// Sets a bin by flat offset.
    pub fn set_flat(&mut self, offset: usize, value: f32) -> Result<(), RspError> {
        self.check_value(value)?;
        self.check_offset(offset)?;
        self.values[offset] = value;
        Ok(())
    }

    /// Adds to a bin by flat offset.
    pub fn add_flat(&mut self, offset: usize, value: f32) -> Result<(), RspError> {
        self.check_value(value)?;
        self.check_offset(offset)?;
        self.values[offset] += value;
        Ok(())
    }

    /// Reads a bin by flat offset.
    pub fn get_flat(&self, offset: usize) -> Result<f32, RspError> {
        self.check_offset(offset)?;
        Ok(self.values[offset])
    }

    /// Value of the bin holding `values`, zero outside the matrix.
    pub fn get(&self, values: &[f64]) -> Result<f32, RspError> {
        Ok(self
            .locate(values)?
            .map_or(0.0, |offset| self.values[offset]))
    }

    /// Nearest-bin lookup.
    ///
    /// True multilinear interpolation across mixed one- and two-dimensional
    /// axes is not implemented; this returns the same value as
    /// [`GeneralMatrix::get`].
    pub fn get_interpolated(&self, values: &[f64]) -> Result<f32, RspError> {
        self.get(values)
    }

    /// Product of the per-axis widths and solid angles of the bin holding
    /// `values`, zero outside the matrix.
    pub fn area(&self, values: &[f64]) -> Result<f64, RspError> {
        let Some(offset) = self.locate(values)? else {
            return Ok(0.0);
        };
        let bins = self.find_bins(offset)?;
        Ok(self
            .axes
            .iter()
            .zip(bins)
            .map(|(axis, bin)| axis.area(bin))
            .product())
    }

    /// Sum of all bins.
    pub fn sum(&self) -> f64 {
        reduce::total(&self.values)
    }

    /// Largest bin value.
    pub fn maximum(&self) -> f32 {
        self.values.iter().copied().fold(f32::MIN, f32::max)
    }

    /// Smallest bin value.
    pub fn minimum(&self) -> f32 {
        self.values.iter().copied().fold(f32::MAX, f32::min)
    }

    /// Number of bins holding a non-zero value.
    pub fn nonzero_bins(&self) -> usize {
        self.values.iter().filter(|value| **value != 0.0).count()
    }

    /// Fraction of bins holding zero.
    pub fn sparsity(&self) -> f64 {
        1.0 - self.nonzero_bins() as f64 / self.values.len() as f64
    }

    /// Sums over every axis not listed in `keep` (strictly increasing axis indices).
    pub fn marginalize(&self, keep: &[usize]) -> Result<GeneralMatrix, RspError> {
        reduce::validate_selection(keep, self.axes.len(), display_name(self.name()))?;
        let sizes: Vec<usize> = self.axes.iter().map(Axis::bin_count).collect();
        Ok(GeneralMatrix {
            meta: self.meta.clone(),
            axes: keep.iter().map(|axis| self.axes[*axis].clone()).collect(),
            values: reduce::marginalize(&sizes, &self.values, keep),
            max_bins: self.max_bins,
            sink: self.sink.clone(),
            drops: DropStats::default(),
        })
    }

    /// Sums over the axes flagged `true`, keeping the others in order.
    pub fn collapse(&self, collapse: &[bool]) -> Result<GeneralMatrix, RspError> {
        if collapse.len() != self.axes.len() {
            return Err(RspError::Value(
                ErrorInfo::new("axis-selection", "one flag per axis is required")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.axes.len().to_string())
                    .with_context("found", collapse.len().to_string()),
            ));
        }
        self.marginalize(&reduce::kept_axes(collapse))
    }

    /// Summary report of contents and axes.
    pub fn statistics(&self) -> MatrixStatistics {
        let axes = self
            .axes
            .iter()
            .map(|axis| AxisSummary {
                names: axis.names().to_vec(),
                minima: axis.minima(),
                maxima: axis.maxima(),
                bins: axis.bin_count(),
            })
            .collect();
        MatrixStatistics::compute(&self.meta.name, self.order(), axes, &self.values)
    }

    /// Whether `other` has pairwise identical axes.
    pub fn same_axes(&self, other: &GeneralMatrix) -> bool {
        self.axes == other.axes
    }
}
