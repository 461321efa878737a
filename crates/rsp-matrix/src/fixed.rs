//! Matrices over a fixed number of one-dimensional axes.
//!
//! [`OrderedMatrix`] is the order-generic engine: `K` edge axes and one flat
//! `f32` buffer with axis 0 varying fastest. Lookups walk the buffer the way
//! a tree of sub-matrices would be walked: the last axis is the outer one and
//! each of its bins owns a contiguous slice holding a matrix of order `K - 1`.
//! [`FixedMatrix`] wraps it with array-typed accessors for a compile-time order.

use std::ops::{Deref, DerefMut};

use rsp_axis::{checked_bin_product, BinEdges, BinPosition};
use rsp_core::{
    display_name, tracing_sink, Diagnostic, DropStats, EngineConfig, ErrorInfo, Extrapolation,
    MatrixMeta, RspError, SharedSink, ValueAnchor, MAX_FIXED_ORDER,
};

use crate::reduce;
use crate::stats::{AxisSummary, MatrixStatistics};

/// Runtime-order matrix over one-dimensional edge axes.
#[derive(Debug, Clone)]
pub struct OrderedMatrix {
    meta: MatrixMeta,
    axes: Vec<BinEdges>,
    names: Vec<String>,
    values: Vec<f32>,
    max_bins: u64,
    sink: SharedSink,
    drops: DropStats,
}

impl PartialEq for OrderedMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.axes == other.axes
            && self.names == other.names
            && self.values == other.values
    }
}

impl OrderedMatrix {
    /// Creates a matrix of `order` single-bin axes spanning `[0, 1)`.
    pub fn new(name: impl Into<String>, order: usize) -> Result<Self, RspError> {
        let name = name.into();
        if order == 0 || order > MAX_FIXED_ORDER {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-order", "fixed-order matrices support orders 1 to 17")
                    .with_matrix(display_name(&name))
                    .with_context("order", order.to_string()),
            ));
        }
        Ok(Self::unit(name, order))
    }

    /// Creates a matrix and sets its axes in one step.
    pub fn with_axes(name: impl Into<String>, axes: Vec<BinEdges>) -> Result<Self, RspError> {
        let mut matrix = Self::new(name, axes.len())?;
        matrix.set_axes(axes)?;
        Ok(matrix)
    }

    pub(crate) fn unit(name: String, order: usize) -> Self {
        Self {
            meta: MatrixMeta::named(name),
            names: vec![String::new(); order],
            axes: vec![BinEdges::unit(); order],
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

    /// Number of axes.
    pub fn order(&self) -> usize {
        self.axes.len()
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

    /// Value anchoring convention.
    pub fn anchor(&self) -> ValueAnchor {
        self.meta.anchor
    }

    /// Sets the value anchoring convention.
    pub fn set_anchor(&mut self, anchor: ValueAnchor) {
        self.meta.anchor = anchor;
    }

    /// Diagnostics sink.
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Totals of values dropped by [`OrderedMatrix::add`].
    pub fn drop_stats(&self) -> DropStats {
        self.drops
    }

    /// Axes, innermost first.
    pub fn axes(&self) -> &[BinEdges] {
        &self.axes
    }

    /// Axis names.
    pub fn axis_names(&self) -> &[String] {
        &self.names
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

    /// Replaces the axes and clears every value.
    pub fn set_axes(&mut self, axes: Vec<BinEdges>) -> Result<(), RspError> {
        if axes.len() != self.order() {
            return Err(RspError::Configuration(
                ErrorInfo::new("axis-count", "number of axes does not match the order")
                    .with_matrix(display_name(self.name()))
                    .with_context("order", self.order().to_string())
                    .with_context("axes", axes.len().to_string()),
            ));
        }
        let total = checked_bin_product(axes.iter().map(BinEdges::bin_count), self.max_bins)
            .map_err(|err| self.labelled(err))?;
        self.axes = axes;
        self.values = vec![0.0; total];
        self.drops = DropStats::default();
        Ok(())
    }

    /// Sets the axis names; missing entries stay empty.
    pub fn set_axis_names<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.resize(self.order(), String::new());
        self.names = names;
    }

    /// Builds a matrix from already validated parts; the buffer length must match.
    pub fn from_parts(
        meta: MatrixMeta,
        axes: Vec<BinEdges>,
        names: Vec<String>,
        values: Vec<f32>,
        config: &EngineConfig,
    ) -> Result<Self, RspError> {
        let mut matrix = Self::new(meta.name.clone(), axes.len())?.with_config(config);
        matrix.set_axes(axes)?;
        if values.len() != matrix.values.len() {
            return Err(RspError::Configuration(
                ErrorInfo::new("buffer-size", "value count does not match the axes")
                    .with_matrix(display_name(&meta.name))
                    .with_context("expected", matrix.values.len().to_string())
                    .with_context("found", values.len().to_string()),
            ));
        }
        matrix.meta = meta;
        matrix.set_axis_names(names);
        matrix.values = values;
        Ok(matrix)
    }

    fn labelled(&self, err: RspError) -> RspError {
        match err {
            RspError::Configuration(info) => {
                RspError::Configuration(info.with_matrix(display_name(self.name())))
            }
            other => other,
        }
    }

    /// Flat offset of per-axis bins, or a bounds error.
    pub fn offset(&self, bins: &[usize]) -> Result<usize, RspError> {
        if bins.len() != self.order() {
            return Err(RspError::Bounds(
                ErrorInfo::new("arity-mismatch", "wrong number of bin indices")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.order().to_string())
                    .with_context("found", bins.len().to_string()),
            ));
        }
        let mut offset = 0;
        let mut stride = 1;
        for (axis, (&bin, edges)) in bins.iter().zip(&self.axes).enumerate() {
            if bin >= edges.bin_count() {
                return Err(RspError::Bounds(
                    ErrorInfo::new("bin-out-of-range", "bin index outside the axis")
                        .with_matrix(display_name(self.name()))
                        .with_axis(axis)
                        .with_context("bin", bin.to_string())
                        .with_context("bins", edges.bin_count().to_string()),
                ));
            }
            offset += bin * stride;
            stride *= edges.bin_count();
        }
        Ok(offset)
    }

    /// Writes one bin.
    ///
    /// # Panics
    ///
    /// Panics when `bins` has the wrong length or any index is outside its axis.
    pub fn set_bin_content(&mut self, bins: &[usize], value: f32) {
        match self.offset(bins) {
            Ok(offset) => self.values[offset] = value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Reads one bin.
    ///
    /// # Panics
    ///
    /// Panics when `bins` has the wrong length or any index is outside its axis.
    pub fn bin_content(&self, bins: &[usize]) -> f32 {
        match self.try_bin_content(bins) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }

    /// Reads one bin, reporting bounds violations as errors.
    pub fn try_bin_content(&self, bins: &[usize]) -> Result<f32, RspError> {
        Ok(self.values[self.offset(bins)?])
    }

    fn check_arity(&self, x: &[f64]) -> Result<(), RspError> {
        if x.len() != self.order() {
            return Err(RspError::Value(
                ErrorInfo::new("coordinate-arity", "wrong number of coordinates")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.order().to_string())
                    .with_context("found", x.len().to_string()),
            ));
        }
        Ok(())
    }

    /// Adds `value` to the bin holding `x`.
    ///
    /// Coordinates outside any axis are dropped: the call returns `Ok(false)`,
    /// a [`Diagnostic::Dropped`] is emitted and [`OrderedMatrix::drop_stats`] grows.
    pub fn add(&mut self, x: &[f64], value: f32) -> Result<bool, RspError> {
        self.check_arity(x)?;
        Ok(self.add_unchecked(x, value))
    }

    pub(crate) fn add_unchecked(&mut self, x: &[f64], value: f32) -> bool {
        if fill(&self.axes, &mut self.values, x, value) {
            return true;
        }
        self.drops.record(f64::from(value));
        self.sink.emit(Diagnostic::Dropped {
            matrix: self.meta.name.clone(),
            coordinates: x.to_vec(),
            value: f64::from(value),
        });
        false
    }

    /// Value of the bin holding `x`, clamped to the edge bins outside the domain.
    pub fn get(&self, x: &[f64]) -> Result<f32, RspError> {
        self.check_arity(x)?;
        Ok(self.get_unchecked(x))
    }

    pub(crate) fn get_unchecked(&self, x: &[f64]) -> f32 {
        let mut offset = 0;
        let mut stride = 1;
        for (edges, &coordinate) in self.axes.iter().zip(x) {
            offset += edges.find_bin_clamped(coordinate) * stride;
            stride *= edges.bin_count();
        }
        self.values[offset]
    }

    /// Multilinear interpolation between the anchors given by [`OrderedMatrix::anchor`].
    pub fn get_interpolated(&self, x: &[f64], extrapolation: Extrapolation) -> Result<f32, RspError> {
        self.check_arity(x)?;
        Ok(self.get_interpolated_unchecked(x, extrapolation))
    }

    pub(crate) fn get_interpolated_unchecked(&self, x: &[f64], extrapolation: Extrapolation) -> f32 {
        interpolate(&self.axes, &self.values, x, self.meta.anchor, extrapolation) as f32
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

    /// Sums over every axis not listed in `keep` (0-based, strictly increasing).
    ///
    /// The result keeps the metadata, the selected axes and their names.
    pub fn sum_matrix(&self, keep: &[usize]) -> Result<OrderedMatrix, RspError> {
        reduce::validate_selection(keep, self.order(), display_name(self.name()))?;
        let sizes: Vec<usize> = self.axes.iter().map(BinEdges::bin_count).collect();
        let values = reduce::marginalize(&sizes, &self.values, keep);

        let mut reduced = Self::unit(self.meta.name.clone(), keep.len());
        reduced.meta = self.meta.clone();
        reduced.max_bins = self.max_bins;
        reduced.sink = self.sink.clone();
        reduced.axes = keep.iter().map(|axis| self.axes[*axis].clone()).collect();
        reduced.names = keep.iter().map(|axis| self.names[*axis].clone()).collect();
        reduced.values = values;
        Ok(reduced)
    }

    /// Product of the widths of the bins at `bins`.
    pub fn bin_area(&self, bins: &[usize]) -> Result<f64, RspError> {
        self.offset(bins)?;
        Ok(bins
            .iter()
            .zip(&self.axes)
            .map(|(bin, edges)| edges.width(*bin))
            .product())
    }

    /// Pins every axis given as `Some(x)` and keeps the `None` axes.
    ///
    /// Each bin of the slice holds [`OrderedMatrix::get_interpolated`] at the
    /// pinned coordinates and the bin centers of the kept axes. Metadata, kept
    /// axes and their names carry over.
    pub fn slice_interpolated(
        &self,
        pinned: &[Option<f64>],
        extrapolation: Extrapolation,
    ) -> Result<OrderedMatrix, RspError> {
        if pinned.len() != self.order() {
            return Err(RspError::Value(
                ErrorInfo::new("coordinate-arity", "wrong number of slice coordinates")
                    .with_matrix(display_name(self.name()))
                    .with_context("expected", self.order().to_string())
                    .with_context("found", pinned.len().to_string()),
            ));
        }
        if let Some(axis) = pinned.iter().position(|x| x.is_some_and(|x| !x.is_finite())) {
            return Err(RspError::Value(
                ErrorInfo::new("non-finite-coordinate", "slice coordinates must be finite")
                    .with_matrix(display_name(self.name()))
                    .with_axis(axis),
            ));
        }
        let keep: Vec<usize> = pinned
            .iter()
            .enumerate()
            .filter(|(_, x)| x.is_none())
            .map(|(axis, _)| axis)
            .collect();
        if keep.is_empty() {
            return Err(RspError::Value(
                ErrorInfo::new("axis-selection", "a slice keeps at least one axis")
                    .with_matrix(display_name(self.name())),
            ));
        }

        let mut slice = Self::unit(self.meta.name.clone(), keep.len());
        slice.meta = self.meta.clone();
        slice.max_bins = self.max_bins;
        slice.sink = self.sink.clone();
        slice.axes = keep.iter().map(|axis| self.axes[*axis].clone()).collect();
        slice.names = keep.iter().map(|axis| self.names[*axis].clone()).collect();

        let total: usize = slice.axes.iter().map(BinEdges::bin_count).product();
        let mut x: Vec<f64> = pinned.iter().map(|x| x.unwrap_or_default()).collect();
        let mut bins = vec![0usize; keep.len()];
        let mut values = Vec::with_capacity(total);
        for _ in 0..total {
            for ((axis, bin), edges) in keep.iter().zip(&bins).zip(&slice.axes) {
                x[*axis] = edges.center(*bin);
            }
            values.push(self.get_interpolated_unchecked(&x, extrapolation));
            for (bin, edges) in bins.iter_mut().zip(&slice.axes) {
                *bin += 1;
                if *bin < edges.bin_count() {
                    break;
                }
                *bin = 0;
            }
        }
        slice.values = values;
        Ok(slice)
    }

    /// Summary report of contents and axes.
    pub fn statistics(&self) -> MatrixStatistics {
        let axes = self
            .axes
            .iter()
            .zip(&self.names)
            .map(|(edges, name)| AxisSummary {
                names: vec![name.clone()],
                minima: vec![edges.low_edge()],
                maxima: vec![edges.high_edge()],
                bins: edges.bin_count(),
            })
            .collect();
        MatrixStatistics::compute(&self.meta.name, self.order(), axes, &self.values)
    }

    /// Whether `other` has identical axes.
    pub fn same_axes(&self, other: &OrderedMatrix) -> bool {
        self.axes == other.axes
    }
}

/// Bin of the first edge exceeding `x`, scanning from the low end.
fn scan_bin(edges: &BinEdges, x: f64) -> Option<usize> {
    match edges.edges().iter().position(|edge| *edge > x) {
        Some(0) | None => None,
        Some(upper) => Some(upper - 1),
    }
}

fn fill(axes: &[BinEdges], values: &mut [f32], x: &[f64], value: f32) -> bool {
    let outer = axes.len() - 1;
    let Some(bin) = scan_bin(&axes[outer], x[outer]) else {
        return false;
    };
    if outer == 0 {
        values[bin] += value;
        return true;
    }
    let stride = values.len() / axes[outer].bin_count();
    fill(
        &axes[..outer],
        &mut values[bin * stride..(bin + 1) * stride],
        &x[..outer],
        value,
    )
}

/// Legacy lower-bound position: -1 below the axis, `bins` at or above its end.
fn position(edges: &BinEdges, x: f64, anchor: ValueAnchor) -> isize {
    let bins = edges.bin_count() as isize;
    let bin = match edges.locate(x) {
        BinPosition::Underflow => return -1,
        BinPosition::Overflow => return bins,
        BinPosition::Bin(bin) => bin,
    };
    match anchor {
        ValueAnchor::BinCenters if x < edges.center(bin) => bin as isize - 1,
        _ => bin as isize,
    }
}

fn knot(edges: &BinEdges, index: usize, anchor: ValueAnchor) -> f64 {
    match anchor {
        ValueAnchor::BinCenters => edges.center(index),
        ValueAnchor::BinEdges => edges.edges()[index],
    }
}

fn interpolate(
    axes: &[BinEdges],
    values: &[f32],
    x: &[f64],
    anchor: ValueAnchor,
    extrapolation: Extrapolation,
) -> f64 {
    let outer = axes.len() - 1;
    let edges = &axes[outer];
    let bins = edges.bin_count();
    let stride = values.len() / bins;
    let child = |index: usize| -> f64 {
        if outer == 0 {
            f64::from(values[index])
        } else {
            interpolate(
                &axes[..outer],
                &values[index * stride..(index + 1) * stride],
                &x[..outer],
                anchor,
                extrapolation,
            )
        }
    };

    if bins == 1 {
        return child(0);
    }

    let coordinate = x[outer];
    let raw = position(edges, coordinate, anchor);
    let lower = if raw < 0 {
        match extrapolation {
            Extrapolation::Clamp => return child(0),
            Extrapolation::Linear => 0,
        }
    } else if raw as usize >= bins - 1 {
        match extrapolation {
            Extrapolation::Clamp => return child(bins - 1),
            Extrapolation::Linear => bins - 2,
        }
    } else {
        raw as usize
    };

    let (x0, x1) = (knot(edges, lower, anchor), knot(edges, lower + 1, anchor));
    let (y0, y1) = (child(lower), child(lower + 1));
    y0 + (coordinate - x0) / (x1 - x0) * (y1 - y0)
}

/// [`OrderedMatrix`] with the order fixed at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedMatrix<const K: usize> {
    inner: OrderedMatrix,
}

impl<const K: usize> FixedMatrix<K> {
    const VALID_ORDER: () = assert!(
        K >= 1 && K <= MAX_FIXED_ORDER,
        "fixed-order matrices support orders 1 to 17"
    );

    /// Creates a matrix with single-bin unit axes.
    pub fn new(name: impl Into<String>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_ORDER;
        Self {
            inner: OrderedMatrix::unit(name.into(), K),
        }
    }

    /// Creates a matrix over the given axes.
    pub fn with_axes(name: impl Into<String>, axes: [BinEdges; K]) -> Result<Self, RspError> {
        let mut matrix = Self::new(name);
        matrix.set_axes(axes)?;
        Ok(matrix)
    }

    /// Routes diagnostics to `sink`.
    pub fn with_sink(self, sink: SharedSink) -> Self {
        Self {
            inner: self.inner.with_sink(sink),
        }
    }

    /// Replaces the axes and clears every value.
    pub fn set_axes(&mut self, axes: [BinEdges; K]) -> Result<(), RspError> {
        self.inner.set_axes(axes.into())
    }

    /// Sets the axis names.
    pub fn set_axis_names<S: Into<String>>(&mut self, names: [S; K]) {
        self.inner.set_axis_names(names);
    }

    /// Writes one bin.
    ///
    /// # Panics
    ///
    /// Panics when an index is outside its axis.
    pub fn set_bin_content(&mut self, bins: [usize; K], value: f32) {
        self.inner.set_bin_content(&bins, value);
    }

    /// Reads one bin.
    ///
    /// # Panics
    ///
    /// Panics when an index is outside its axis.
    pub fn bin_content(&self, bins: [usize; K]) -> f32 {
        self.inner.bin_content(&bins)
    }

    /// Adds `value` at `x`; returns `false` when it was dropped.
    pub fn add(&mut self, x: [f64; K], value: f32) -> bool {
        self.inner.add_unchecked(&x, value)
    }

    /// Clamped nearest-below lookup.
    pub fn get(&self, x: [f64; K]) -> f32 {
        self.inner.get_unchecked(&x)
    }

    /// Interpolated lookup.
    pub fn get_interpolated(&self, x: [f64; K], extrapolation: Extrapolation) -> f32 {
        self.inner.get_interpolated_unchecked(&x, extrapolation)
    }

    /// Marginalizes onto `J` axes.
    pub fn sum_matrix<const J: usize>(&self, keep: [usize; J]) -> Result<FixedMatrix<J>, RspError> {
        let reduced = self.inner.sum_matrix(&keep)?;
        Ok(FixedMatrix { inner: reduced })
    }

    /// Borrows the runtime-order matrix.
    pub fn as_ordered(&self) -> &OrderedMatrix {
        &self.inner
    }

    /// Unwraps the runtime-order matrix.
    pub fn into_ordered(self) -> OrderedMatrix {
        self.inner
    }
}

impl<const K: usize> TryFrom<OrderedMatrix> for FixedMatrix<K> {
    type Error = RspError;

    fn try_from(matrix: OrderedMatrix) -> Result<Self, Self::Error> {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_ORDER;
        if matrix.order() != K {
            return Err(RspError::Mismatch(
                ErrorInfo::new("order-mismatch", "matrix order differs from the requested one")
                    .with_matrix(display_name(matrix.name()))
                    .with_context("expected", K.to_string())
                    .with_context("found", matrix.order().to_string()),
            ));
        }
        Ok(Self { inner: matrix })
    }
}

impl<const K: usize> Deref for FixedMatrix<K> {
    type Target = OrderedMatrix;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<const K: usize> DerefMut for FixedMatrix<K> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(anchor: ValueAnchor) -> OrderedMatrix {
        let mut matrix = OrderedMatrix::with_axes(
            "ramp",
            vec![
                BinEdges::from_edges(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap(),
                BinEdges::from_edges(vec![0.0, 2.0, 6.0]).unwrap(),
            ],
        )
        .unwrap()
        .with_sink(rsp_core::silent_sink());
        matrix.set_axis_names(["Energy", "Angle"]);
        matrix.set_anchor(anchor);
        // row 0 holds 10, 20, 30, 40; row 1 holds 110 .. 140
        for (offset, value) in matrix.values_mut().iter_mut().enumerate() {
            *value = (offset % 4 + 1) as f32 * 10.0 + (offset / 4) as f32 * 100.0;
        }
        matrix
    }

    #[test]
    fn bin_area_multiplies_widths() {
        let matrix = ramp(ValueAnchor::BinCenters);
        assert_eq!(matrix.bin_area(&[0, 0]).unwrap(), 2.0);
        assert_eq!(matrix.bin_area(&[3, 1]).unwrap(), 4.0);
        assert_eq!(matrix.bin_area(&[4, 0]).unwrap_err().code(), "bin-out-of-range");
        assert_eq!(matrix.bin_area(&[0]).unwrap_err().code(), "arity-mismatch");
    }

    #[test]
    fn slice_pins_axes_at_interpolated_values() {
        let matrix = ramp(ValueAnchor::BinCenters);
        // angle centers are 1 and 4, so 2.5 sits halfway between the rows
        let slice = matrix
            .slice_interpolated(&[None, Some(2.5)], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(slice.order(), 1);
        assert_eq!(slice.axis_names(), &["Energy".to_string()]);
        assert_eq!(slice.axes()[0], matrix.axes()[0]);
        assert_eq!(slice.values(), &[60.0, 70.0, 80.0, 90.0]);

        let column = matrix
            .slice_interpolated(&[Some(2.0), None], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(column.values(), &[25.0, 125.0]);
    }

    #[test]
    fn slice_follows_anchor_and_extrapolation() {
        let edges = ramp(ValueAnchor::BinEdges);
        // edge knots: angle 0 and 2, so 1.0 is halfway
        let slice = edges
            .slice_interpolated(&[None, Some(1.0)], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(slice.values()[0], 65.0);

        let centered = ramp(ValueAnchor::BinCenters);
        let clamped = centered
            .slice_interpolated(&[None, Some(10.0)], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(clamped.values(), &[110.0, 120.0, 130.0, 140.0]);
        let below = centered
            .slice_interpolated(&[None, Some(-3.0)], Extrapolation::Clamp)
            .unwrap();
        assert_eq!(below.values(), &[10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn slice_needs_a_free_axis() {
        let matrix = ramp(ValueAnchor::BinCenters);
        let err = matrix
            .slice_interpolated(&[Some(1.0), Some(1.0)], Extrapolation::Clamp)
            .unwrap_err();
        assert_eq!(err.code(), "axis-selection");
        let err = matrix
            .slice_interpolated(&[None], Extrapolation::Clamp)
            .unwrap_err();
        assert_eq!(err.code(), "coordinate-arity");
        let err = matrix
            .slice_interpolated(&[None, Some(f64::NAN)], Extrapolation::Clamp)
            .unwrap_err();
        assert_eq!(err.code(), "non-finite-coordinate");
    }
}
