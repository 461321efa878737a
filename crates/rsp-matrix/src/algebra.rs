//! Elementwise arithmetic between matrices with identical axes.
//!
//! The `try_*` methods report incompatible axes as [`RspError::Mismatch`].
//! The compound-assignment operators report them as a
//! [`Diagnostic::AxisMismatch`] and leave the left operand untouched.

use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use rsp_core::{display_name, Diagnostic, ErrorInfo, RspError, SharedSink};

use crate::fixed::{FixedMatrix, OrderedMatrix};
use crate::general::GeneralMatrix;
use crate::reduce;

/// Elementwise operations over a flat value buffer.
pub trait ElementwiseAlgebra: Clone {
    /// Name used in errors and diagnostics.
    fn label(&self) -> &str;
    /// Whether both operands have pairwise identical axes.
    fn same_axes(&self, other: &Self) -> bool;
    /// Flat values.
    fn values(&self) -> &[f32];
    /// Mutable flat values.
    fn values_mut(&mut self) -> &mut [f32];
    /// Diagnostics sink of the left operand.
    fn sink(&self) -> &SharedSink;

    /// Fails unless `other` has the same axes.
    fn check_compatible(&self, other: &Self, operation: &str) -> Result<(), RspError> {
        if self.same_axes(other) {
            return Ok(());
        }
        Err(RspError::Mismatch(
            ErrorInfo::new("axis-mismatch", "matrices have different axes")
                .with_matrix(display_name(self.label()))
                .with_context("other", display_name(other.label()))
                .with_context("operation", operation),
        ))
    }

    /// `self += other` elementwise.
    fn try_add_matrix(&mut self, other: &Self) -> Result<(), RspError> {
        self.check_compatible(other, "add")?;
        combine(self.values_mut(), other.values(), |left, right| left + right);
        Ok(())
    }

    /// `self -= other` elementwise.
    fn try_sub_matrix(&mut self, other: &Self) -> Result<(), RspError> {
        self.check_compatible(other, "subtract")?;
        combine(self.values_mut(), other.values(), |left, right| left - right);
        Ok(())
    }

    /// `self *= other` elementwise.
    fn try_mul_matrix(&mut self, other: &Self) -> Result<(), RspError> {
        self.check_compatible(other, "multiply")?;
        combine(self.values_mut(), other.values(), |left, right| left * right);
        Ok(())
    }

    /// `self /= other` elementwise; bins divided by zero become zero.
    fn try_div_matrix(&mut self, other: &Self) -> Result<(), RspError> {
        self.check_compatible(other, "divide")?;
        combine(self.values_mut(), other.values(), safe_div);
        Ok(())
    }

    /// Adds `scalar` to every bin.
    fn add_scalar(&mut self, scalar: f32) {
        self.values_mut().iter_mut().for_each(|value| *value += scalar);
    }

    /// Subtracts `scalar` from every bin.
    fn sub_scalar(&mut self, scalar: f32) {
        self.values_mut().iter_mut().for_each(|value| *value -= scalar);
    }

    /// Multiplies every bin by `scalar`.
    fn mul_scalar(&mut self, scalar: f32) {
        self.values_mut().iter_mut().for_each(|value| *value *= scalar);
    }

    /// Divides every bin by `scalar`; a zero divisor zeroes the matrix.
    fn div_scalar(&mut self, scalar: f32) {
        self.values_mut()
            .iter_mut()
            .for_each(|value| *value = safe_div(*value, scalar));
    }

    /// Runs `operation`, turning a mismatch into a diagnostic.
    fn or_report(
        &mut self,
        other: &Self,
        operation: &str,
        apply: fn(&mut Self, &Self) -> Result<(), RspError>,
    ) {
        if apply(self, other).is_err() {
            self.sink().emit(Diagnostic::AxisMismatch {
                matrix: self.label().to_string(),
                other: other.label().to_string(),
                operation: operation.to_string(),
            });
        }
    }
}

fn combine(left: &mut [f32], right: &[f32], op: impl Fn(f32, f32) -> f32) {
    for (value, other) in left.iter_mut().zip(right) {
        *value = op(*value, *other);
    }
}

fn safe_div(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Bayesian ratio: `a / b` rescaled by `sum(b) / sum(a)` measured before the division.
///
/// The rescale is skipped when `a` sums to zero.
pub fn ratio<M: ElementwiseAlgebra>(a: &mut M, b: &M) -> Result<(), RspError> {
    a.check_compatible(b, "ratio")?;
    let sum_a = reduce::total(a.values());
    let sum_b = reduce::total(b.values());
    a.try_div_matrix(b)?;
    if sum_a != 0.0 {
        a.mul_scalar((sum_b / sum_a) as f32);
    }
    Ok(())
}

/// Replaces `a` with `a / (a + b)`.
pub fn probability<M: ElementwiseAlgebra>(a: &mut M, b: &M) -> Result<(), RspError> {
    a.check_compatible(b, "probability")?;
    let mut total = b.clone();
    total.try_add_matrix(a)?;
    a.try_div_matrix(&total)
}

impl ElementwiseAlgebra for OrderedMatrix {
    fn label(&self) -> &str {
        self.name()
    }

    fn same_axes(&self, other: &Self) -> bool {
        OrderedMatrix::same_axes(self, other)
    }

    fn values(&self) -> &[f32] {
        OrderedMatrix::values(self)
    }

    fn values_mut(&mut self) -> &mut [f32] {
        OrderedMatrix::values_mut(self)
    }

    fn sink(&self) -> &SharedSink {
        OrderedMatrix::sink(self)
    }
}

impl ElementwiseAlgebra for GeneralMatrix {
    fn label(&self) -> &str {
        self.name()
    }

    fn same_axes(&self, other: &Self) -> bool {
        GeneralMatrix::same_axes(self, other)
    }

    fn values(&self) -> &[f32] {
        GeneralMatrix::values(self)
    }

    fn values_mut(&mut self) -> &mut [f32] {
        GeneralMatrix::values_mut(self)
    }

    fn sink(&self) -> &SharedSink {
        GeneralMatrix::sink(self)
    }
}

macro_rules! impl_assign_ops {
    ($matrix:ty) => {
        impl AddAssign<&$matrix> for $matrix {
            fn add_assign(&mut self, other: &$matrix) {
                self.or_report(other, "add", <$matrix>::try_add_matrix);
            }
        }

        impl SubAssign<&$matrix> for $matrix {
            fn sub_assign(&mut self, other: &$matrix) {
                self.or_report(other, "subtract", <$matrix>::try_sub_matrix);
            }
        }

        impl MulAssign<&$matrix> for $matrix {
            fn mul_assign(&mut self, other: &$matrix) {
                self.or_report(other, "multiply", <$matrix>::try_mul_matrix);
            }
        }

        impl DivAssign<&$matrix> for $matrix {
            fn div_assign(&mut self, other: &$matrix) {
                self.or_report(other, "divide", <$matrix>::try_div_matrix);
            }
        }

        impl AddAssign<f32> for $matrix {
            fn add_assign(&mut self, scalar: f32) {
                self.add_scalar(scalar);
            }
        }

        impl SubAssign<f32> for $matrix {
            fn sub_assign(&mut self, scalar: f32) {
                self.sub_scalar(scalar);
            }
        }

        impl MulAssign<f32> for $matrix {
            fn mul_assign(&mut self, scalar: f32) {
                self.mul_scalar(scalar);
            }
        }

        impl DivAssign<f32> for $matrix {
            fn div_assign(&mut self, scalar: f32) {
                self.div_scalar(scalar);
            }
        }
    };
}

impl_assign_ops!(OrderedMatrix);
impl_assign_ops!(GeneralMatrix);

impl<const K: usize> AddAssign<&FixedMatrix<K>> for FixedMatrix<K> {
    fn add_assign(&mut self, other: &FixedMatrix<K>) {
        **self += other.as_ordered();
    }
}

impl<const K: usize> SubAssign<&FixedMatrix<K>> for FixedMatrix<K> {
    fn sub_assign(&mut self, other: &FixedMatrix<K>) {
        **self -= other.as_ordered();
    }
}

impl<const K: usize> MulAssign<&FixedMatrix<K>> for FixedMatrix<K> {
    fn mul_assign(&mut self, other: &FixedMatrix<K>) {
        **self *= other.as_ordered();
    }
}

impl<const K: usize> DivAssign<&FixedMatrix<K>> for FixedMatrix<K> {
    fn div_assign(&mut self, other: &FixedMatrix<K>) {
        **self /= other.as_ordered();
    }
}

impl<const K: usize> AddAssign<f32> for FixedMatrix<K> {
    fn add_assign(&mut self, scalar: f32) {
        **self += scalar;
    }
}

impl<const K: usize> SubAssign<f32> for FixedMatrix<K> {
    fn sub_assign(&mut self, scalar: f32) {
        **self -= scalar;
    }
}

impl<const K: usize> MulAssign<f32> for FixedMatrix<K> {
    fn mul_assign(&mut self, scalar: f32) {
        **self *= scalar;
    }
}

impl<const K: usize> DivAssign<f32> for FixedMatrix<K> {
    fn div_assign(&mut self, scalar: f32) {
        **self /= scalar;
    }
}
