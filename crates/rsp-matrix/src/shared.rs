//! Read-only shared views for concurrent readers.
//!
//! Population needs `&mut` access to a matrix; once it is complete the
//! matrix is frozen into an `Arc`-backed view that can be cloned into worker
//! threads. No mutation is possible while any view is alive, and the matrix
//! only becomes mutable again once every clone has been dropped.

use std::ops::Deref;
use std::sync::Arc;

/// Immutable, cheaply cloneable handle to a finished matrix.
#[derive(Debug)]
pub struct Frozen<M> {
    inner: Arc<M>,
}

impl<M> Clone for Frozen<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M> Frozen<M> {
    /// Freezes `matrix`.
    pub fn new(matrix: M) -> Self {
        Self {
            inner: Arc::new(matrix),
        }
    }

    /// Returns the matrix when this is the last view, otherwise hands the view back.
    pub fn thaw(self) -> Result<M, Self> {
        Arc::try_unwrap(self.inner).map_err(|inner| Self { inner })
    }

    /// Number of live views.
    pub fn readers(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<M> Deref for Frozen<M> {
    type Target = M;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Conversion into a [`Frozen`] view.
pub trait Freeze: Sized {
    /// Ends the mutable phase.
    fn freeze(self) -> Frozen<Self> {
        Frozen::new(self)
    }
}

impl Freeze for crate::fixed::OrderedMatrix {}
impl Freeze for crate::general::GeneralMatrix {}
impl<const K: usize> Freeze for crate::fixed::FixedMatrix<K> {}
