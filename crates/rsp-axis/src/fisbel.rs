//! Equal-solid-angle partition of the sphere into iso-latitude collars.
//!
//! The sphere is cut into collars bounded by circles of constant latitude
//! (polar angle). Both polar caps hold a single cell. Every inner collar holds
//! as many equal-width longitude cells as keep each cell close to the target
//! area `4π / N`, and its lower edge is chosen so that the collar area is an
//! exact multiple of that target. The partition is mirrored around the
//! equator.

use std::f64::consts::PI;

use rsp_core::{ErrorInfo, RspError};

const TWO_PI: f64 = 2.0 * PI;

/// Equal-area spherical binning addressed by `(longitude, latitude)` in radians.
///
/// Latitude is the polar angle, `0` at the north pole and `π` at the south
/// pole. Cells are numbered collar by collar starting at the north pole and,
/// within a collar, by increasing longitude.
#[derive(Debug, Clone, PartialEq)]
pub struct FisbelBinning {
    requested: usize,
    longitude_shift: f64,
    latitude_edges: Vec<f64>,
    longitude_bins: Vec<usize>,
    bins_before: Vec<usize>,
}

impl FisbelBinning {
    /// Partitions the sphere into approximately `bins` cells.
    pub fn new(bins: usize) -> Result<Self, RspError> {
        Self::with_shift(bins, 0.0)
    }

    /// Same as [`FisbelBinning::new`] with the longitude origin moved by `shift` radians.
    pub fn with_shift(bins: usize, shift: f64) -> Result<Self, RspError> {
        if bins == 0 {
            return Err(RspError::Configuration(ErrorInfo::new(
                "zero-bins",
                "a spherical axis needs at least one bin",
            )));
        }
        if !shift.is_finite() {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-shift", "longitude shift must be finite")
                    .with_context("shift", shift.to_string()),
            ));
        }

        let (latitude_edges, longitude_bins) = if bins == 1 {
            (vec![0.0, PI], vec![1])
        } else {
            partition(bins)
        };

        if latitude_edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(RspError::Configuration(
                ErrorInfo::new("degenerate-partition", "collar edges are not increasing")
                    .with_context("bins", bins.to_string()),
            ));
        }

        let mut bins_before = Vec::with_capacity(longitude_bins.len());
        let mut total = 0;
        for count in &longitude_bins {
            bins_before.push(total);
            total += count;
        }

        Ok(Self {
            requested: bins,
            longitude_shift: shift,
            latitude_edges,
            longitude_bins,
            bins_before,
        })
    }

    /// Number of cells that was asked for.
    pub fn requested_bins(&self) -> usize {
        self.requested
    }

    /// Longitude offset in radians.
    pub fn longitude_shift(&self) -> f64 {
        self.longitude_shift
    }

    /// Collar boundaries, `0` through `π`.
    pub fn latitude_edges(&self) -> &[f64] {
        &self.latitude_edges
    }

    /// Number of longitude cells in each collar.
    pub fn longitude_bins(&self) -> &[usize] {
        &self.longitude_bins
    }

    /// Number of cells the partition actually produced.
    pub fn bin_count(&self) -> usize {
        match (self.bins_before.last(), self.longitude_bins.last()) {
            (Some(before), Some(last)) => before + last,
            _ => 0,
        }
    }

    /// Cell containing the direction, or `None` for a latitude outside `[0, π]`.
    pub fn find_bin(&self, longitude: f64, latitude: f64) -> Option<usize> {
        if !longitude.is_finite() || !latitude.is_finite() || !(0.0..=PI).contains(&latitude) {
            return None;
        }
        if latitude == 0.0 {
            return Some(0);
        }
        if latitude == PI {
            return Some(self.bin_count() - 1);
        }

        let mut phi = (longitude - self.longitude_shift).rem_euclid(TWO_PI);
        if phi >= TWO_PI {
            phi = 0.0;
        }

        let collar = self.latitude_edges.partition_point(|edge| *edge < latitude) - 1;
        let cells = self.longitude_bins[collar];
        let cell = ((phi / (TWO_PI / cells as f64)) as usize).min(cells - 1);
        Some(self.bins_before[collar] + cell)
    }

    fn collar_of(&self, bin: usize) -> usize {
        self.bins_before.partition_point(|before| *before <= bin) - 1
    }

    /// Solid angle of `bin` in steradians.
    ///
    /// # Panics
    ///
    /// Panics if `bin >= self.bin_count()`.
    pub fn solid_angle(&self, bin: usize) -> f64 {
        assert!(bin < self.bin_count(), "spherical bin {bin} out of range");
        let collar = self.collar_of(bin);
        let top = self.latitude_edges[collar];
        let bottom = self.latitude_edges[collar + 1];
        TWO_PI * (top.cos() - bottom.cos()) / self.longitude_bins[collar] as f64
    }

    /// Direction `(longitude, latitude)` at the middle of `bin`.
    ///
    /// # Panics
    ///
    /// Panics if `bin >= self.bin_count()`.
    pub fn bin_center(&self, bin: usize) -> (f64, f64) {
        assert!(bin < self.bin_count(), "spherical bin {bin} out of range");
        let collar = self.collar_of(bin);
        let latitude = 0.5 * (self.latitude_edges[collar] + self.latitude_edges[collar + 1]);
        let cell = (bin - self.bins_before[collar]) as f64;
        let width = TWO_PI / self.longitude_bins[collar] as f64;
        let longitude = ((cell + 0.5) * width + self.longitude_shift).rem_euclid(TWO_PI);
        (longitude, latitude)
    }
}

fn partition(bins: usize) -> (Vec<f64>, Vec<usize>) {
    let area = 4.0 * PI / bins as f64;
    let collars = ((PI / area.sqrt() - 1.0) + 0.5) as usize + 2;

    let mut longitude_bins = vec![0usize; collars];
    let mut edges = vec![0.0; collars + 1];
    edges[collars] = PI;

    longitude_bins[0] = 1;
    longitude_bins[collars - 1] = 1;
    edges[1] = (1.0 - 2.0 / bins as f64).clamp(-1.0, 1.0).acos();
    edges[collars - 1] = PI - edges[1];

    let half = collars / 2;
    let last = if collars % 2 == 0 { half - 1 } else { half };
    for collar in 1..=last {
        let unused_latitude = edges[collars - collar] - edges[collar];
        let unused_collars = (collars - 2 * collar) as f64;
        let edge_estimate = edges[collar] + unused_latitude / unused_collars;
        let bins_estimate = TWO_PI * (edges[collar].cos() - edge_estimate.cos()) / area;

        let next_bins = ((bins_estimate + 0.5) as usize).max(1);
        let next_edge = (edges[collar].cos() - next_bins as f64 * area / TWO_PI)
            .clamp(-1.0, 1.0)
            .acos();

        longitude_bins[collar] = next_bins;
        longitude_bins[collars - collar - 1] = next_bins;
        if collar != half {
            edges[collar + 1] = next_edge;
            edges[collars - collar - 1] = PI - next_edge;
        }
    }

    (edges, longitude_bins)
}
