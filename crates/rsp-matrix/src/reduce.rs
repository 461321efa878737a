//! Marginalization over flat mixed-radix buffers.

use rsp_core::{ErrorInfo, RspError};

/// Checks that `keep` lists distinct axes in increasing order, all below `axis_count`.
pub(crate) fn validate_selection(
    keep: &[usize],
    axis_count: usize,
    matrix: &str,
) -> Result<(), RspError> {
    if keep.is_empty() {
        return Err(RspError::Value(
            ErrorInfo::new("axis-selection", "at least one axis must be kept").with_matrix(matrix),
        ));
    }
    if let Some(&axis) = keep.iter().find(|axis| **axis >= axis_count) {
        return Err(RspError::Bounds(
            ErrorInfo::new("axis-out-of-range", "selected axis does not exist")
                .with_matrix(matrix)
                .with_axis(axis)
                .with_context("axes", axis_count.to_string()),
        ));
    }
    if keep.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(RspError::Value(
            ErrorInfo::new("axis-selection", "selected axes must be strictly increasing")
                .with_matrix(matrix)
                .with_context("axes", format!("{keep:?}")),
        ));
    }
    Ok(())
}

/// Sums `values` (laid out with axis 0 fastest over `sizes`) onto the axes in `keep`.
///
/// `keep` must already be validated. Every output bin is accumulated in `f64`.
pub fn marginalize(sizes: &[usize], values: &[f32], keep: &[usize]) -> Vec<f32> {
    let mut kept_strides = vec![0usize; sizes.len()];
    let mut stride = 1;
    for &axis in keep {
        kept_strides[axis] = stride;
        stride *= sizes[axis];
    }

    let mut sums = vec![0.0f64; stride];
    let mut index = vec![0usize; sizes.len()];
    let mut target = 0usize;
    for value in values {
        sums[target] += f64::from(*value);

        // odometer step, axis 0 fastest
        for (axis, size) in sizes.iter().enumerate() {
            index[axis] += 1;
            target += kept_strides[axis];
            if index[axis] < *size {
                break;
            }
            target -= kept_strides[axis] * index[axis];
            index[axis] = 0;
        }
    }

    sums.into_iter().map(|sum| sum as f32).collect()
}

/// Axes not flagged in `collapse`, in order.
pub fn kept_axes(collapse: &[bool]) -> Vec<usize> {
    collapse
        .iter()
        .enumerate()
        .filter(|(_, collapsed)| !**collapsed)
        .map(|(axis, _)| axis)
        .collect()
}

/// Sum of all values in `f64`.
pub fn total(values: &[f32]) -> f64 {
    values.iter().map(|value| f64::from(*value)).sum()
}
