use std::fmt;

use serde::Serialize;

/// Range and bin count of one axis in a statistics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSummary {
    /// Coordinate names.
    pub names: Vec<String>,
    /// Lower bound per coordinate.
    pub minima: Vec<f64>,
    /// Upper bound per coordinate.
    pub maxima: Vec<f64>,
    /// Number of bins.
    pub bins: usize,
}

/// Content summary of a matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixStatistics {
    /// Matrix name.
    pub name: String,
    /// Number of axes.
    pub axis_count: usize,
    /// Number of coordinates.
    pub order: usize,
    /// Total number of bins.
    pub bins: usize,
    /// Bins holding a non-zero value.
    pub nonzero_bins: usize,
    /// Percentage of zero bins.
    pub sparseness: f64,
    /// Largest value.
    pub maximum: f32,
    /// Smallest value.
    pub minimum: f32,
    /// Sum of all values.
    pub sum: f64,
    /// Mean bin value.
    pub average: f64,
    /// Per-axis summaries.
    pub axes: Vec<AxisSummary>,
}

impl MatrixStatistics {
    /// Single pass over `values`.
    pub fn compute(name: &str, order: usize, axes: Vec<AxisSummary>, values: &[f32]) -> Self {
        let mut sum = 0.0f64;
        let mut maximum = f32::MIN;
        let mut minimum = f32::MAX;
        let mut nonzero_bins = 0;
        for &value in values {
            sum += f64::from(value);
            maximum = maximum.max(value);
            minimum = minimum.min(value);
            if value != 0.0 {
                nonzero_bins += 1;
            }
        }
        let bins = values.len();
        Self {
            name: name.to_string(),
            axis_count: axes.len(),
            order,
            bins,
            nonzero_bins,
            sparseness: 100.0 - 100.0 * nonzero_bins as f64 / bins as f64,
            maximum,
            minimum,
            sum,
            average: sum / bins as f64,
            axes,
        }
    }
}

impl fmt::Display for MatrixStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Statistics for response matrix \"{}\":", self.name)?;
        writeln!(f)?;
        writeln!(f, "Number of axes:           {}", self.axis_count)?;
        writeln!(f, "Number of dimensions:     {}", self.order)?;
        writeln!(f, "Number of bins:           {}", self.bins)?;
        writeln!(f, "Number of non-zero bins:  {}", self.nonzero_bins)?;
        writeln!(f, "Sparseness:               {} %", self.sparseness)?;
        writeln!(f, "Maximum:                  {}", self.maximum)?;
        writeln!(f, "Minimum:                  {}", self.minimum)?;
        writeln!(f, "Sum:                      {}", self.sum)?;
        writeln!(f, "Average value:            {}", self.average)?;
        writeln!(f)?;
        writeln!(f, "Axes:")?;
        for (index, axis) in self.axes.iter().enumerate() {
            write!(f, "  x{index}:  ")?;
            for (coordinate, name) in axis.names.iter().enumerate() {
                if coordinate > 0 {
                    write!(f, "  +  ")?;
                }
                write!(
                    f,
                    "{} (from {} to {} with {} bins)",
                    name, axis.minima[coordinate], axis.maxima[coordinate], axis.bins
                )?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
