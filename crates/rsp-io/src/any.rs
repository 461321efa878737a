use std::path::Path;

use rsp_core::{display_name, ErrorInfo, MatrixMeta, RspError};
use rsp_matrix::{
    probability, ratio, ElementwiseAlgebra, FixedMatrix, GeneralMatrix, MatrixStatistics,
    OrderedMatrix,
};

use crate::tag::TypeTag;
use crate::writer::{encode_general, encode_ordered, write_matrix, Encoded, Encoding, WriteOptions};

/// A matrix of either family, as produced by [`read_matrix`](crate::read_matrix).
#[derive(Debug, Clone, PartialEq)]
pub enum AnyMatrix {
    /// Fixed-order matrix.
    Ordered(OrderedMatrix),
    /// General matrix.
    General(GeneralMatrix),
}

impl AnyMatrix {
    /// Family name used in messages.
    pub fn family(&self) -> &'static str {
        match self {
            AnyMatrix::Ordered(_) => "fixed-order",
            AnyMatrix::General(_) => "general",
        }
    }

    /// Type tag of this matrix with the given body encoding.
    pub fn type_tag(&self, encoding: Encoding) -> Result<TypeTag, RspError> {
        let stream = encoding == Encoding::Stream;
        match self {
            AnyMatrix::Ordered(matrix) => TypeTag::fixed(matrix.order(), stream),
            AnyMatrix::General(_) => Ok(TypeTag::general(stream)),
        }
    }

    /// Matrix name.
    pub fn name(&self) -> &str {
        &self.meta().name
    }

    /// Descriptive metadata.
    pub fn meta(&self) -> &MatrixMeta {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.meta(),
            AnyMatrix::General(matrix) => matrix.meta(),
        }
    }

    /// Mutable metadata.
    pub fn meta_mut(&mut self) -> &mut MatrixMeta {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.meta_mut(),
            AnyMatrix::General(matrix) => matrix.meta_mut(),
        }
    }

    /// Number of bins.
    pub fn bin_count(&self) -> usize {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.bin_count(),
            AnyMatrix::General(matrix) => matrix.bin_count(),
        }
    }

    /// Sum of all bins.
    pub fn sum(&self) -> f64 {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.sum(),
            AnyMatrix::General(matrix) => matrix.sum(),
        }
    }

    /// Summary report.
    pub fn statistics(&self) -> MatrixStatistics {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.statistics(),
            AnyMatrix::General(matrix) => matrix.statistics(),
        }
    }

    /// SHA-256 content digest.
    pub fn canonical_hash(&self) -> String {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.canonical_hash(),
            AnyMatrix::General(matrix) => matrix.canonical_hash(),
        }
    }

    fn family_mismatch(&self, other: &AnyMatrix, operation: &str) -> RspError {
        RspError::Mismatch(
            ErrorInfo::new("family-mismatch", "matrices belong to different families")
                .with_matrix(display_name(self.name()))
                .with_context("other", display_name(other.name()))
                .with_context("operation", operation)
                .with_context("families", format!("{}/{}", self.family(), other.family())),
        )
    }

    /// `self += other`.
    pub fn try_add_assign(&mut self, other: &AnyMatrix) -> Result<(), RspError> {
        match (self, other) {
            (AnyMatrix::Ordered(left), AnyMatrix::Ordered(right)) => left.try_add_matrix(right),
            (AnyMatrix::General(left), AnyMatrix::General(right)) => left.try_add_matrix(right),
            (left, right) => Err(left.family_mismatch(right, "add")),
        }
    }

    /// `self -= other`.
    pub fn try_sub_assign(&mut self, other: &AnyMatrix) -> Result<(), RspError> {
        match (self, other) {
            (AnyMatrix::Ordered(left), AnyMatrix::Ordered(right)) => left.try_sub_matrix(right),
            (AnyMatrix::General(left), AnyMatrix::General(right)) => left.try_sub_matrix(right),
            (left, right) => Err(left.family_mismatch(right, "subtract")),
        }
    }

    /// `self /= other`; bins divided by zero become zero.
    pub fn try_div_assign(&mut self, other: &AnyMatrix) -> Result<(), RspError> {
        match (self, other) {
            (AnyMatrix::Ordered(left), AnyMatrix::Ordered(right)) => left.try_div_matrix(right),
            (AnyMatrix::General(left), AnyMatrix::General(right)) => left.try_div_matrix(right),
            (left, right) => Err(left.family_mismatch(right, "divide")),
        }
    }

    /// Multiplies every bin by `factor`.
    pub fn scale(&mut self, factor: f32) {
        match self {
            AnyMatrix::Ordered(matrix) => matrix.mul_scalar(factor),
            AnyMatrix::General(matrix) => matrix.mul_scalar(factor),
        }
    }

    /// Bayesian ratio, see [`rsp_matrix::ratio`].
    pub fn ratio(&mut self, other: &AnyMatrix) -> Result<(), RspError> {
        match (self, other) {
            (AnyMatrix::Ordered(left), AnyMatrix::Ordered(right)) => ratio(left, right),
            (AnyMatrix::General(left), AnyMatrix::General(right)) => ratio(left, right),
            (left, right) => Err(left.family_mismatch(right, "ratio")),
        }
    }

    /// `self / (self + other)`, see [`rsp_matrix::probability`].
    pub fn probability(&mut self, other: &AnyMatrix) -> Result<(), RspError> {
        match (self, other) {
            (AnyMatrix::Ordered(left), AnyMatrix::Ordered(right)) => probability(left, right),
            (AnyMatrix::General(left), AnyMatrix::General(right)) => probability(left, right),
            (left, right) => Err(left.family_mismatch(right, "probability")),
        }
    }

    /// Encodes the matrix.
    pub fn encode(&self, options: &WriteOptions) -> Result<Encoded, RspError> {
        match self {
            AnyMatrix::Ordered(matrix) => encode_ordered(matrix, options),
            AnyMatrix::General(matrix) => encode_general(matrix, options),
        }
    }

    /// Writes the matrix to `path`.
    pub fn write(&self, path: impl AsRef<Path>, options: &WriteOptions) -> Result<Encoding, RspError> {
        write_matrix(path, self, options)
    }

    fn unexpected(&self, expected: &str) -> RspError {
        RspError::Mismatch(
            ErrorInfo::new("family-mismatch", "matrix belongs to another family")
                .with_matrix(display_name(self.name()))
                .with_context("expected", expected)
                .with_context("found", self.family()),
        )
    }

    /// Unwraps a fixed-order matrix.
    pub fn into_ordered(self) -> Result<OrderedMatrix, RspError> {
        match self {
            AnyMatrix::Ordered(matrix) => Ok(matrix),
            other => Err(other.unexpected("fixed-order")),
        }
    }

    /// Unwraps a fixed-order matrix of order `K`.
    pub fn into_fixed<const K: usize>(self) -> Result<FixedMatrix<K>, RspError> {
        FixedMatrix::try_from(self.into_ordered()?)
    }

    /// Unwraps a general matrix.
    pub fn into_general(self) -> Result<GeneralMatrix, RspError> {
        match self {
            AnyMatrix::General(matrix) => Ok(matrix),
            other => Err(other.unexpected("general")),
        }
    }
}

impl From<OrderedMatrix> for AnyMatrix {
    fn from(matrix: OrderedMatrix) -> Self {
        AnyMatrix::Ordered(matrix)
    }
}

impl<const K: usize> From<FixedMatrix<K>> for AnyMatrix {
    fn from(matrix: FixedMatrix<K>) -> Self {
        AnyMatrix::Ordered(matrix.into_ordered())
    }
}

impl From<GeneralMatrix> for AnyMatrix {
    fn from(matrix: GeneralMatrix) -> Self {
        AnyMatrix::General(matrix)
    }
}
