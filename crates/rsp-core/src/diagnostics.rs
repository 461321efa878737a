//! Injected diagnostics channel.
//!
//! Soft conditions (dropped fills, no-op algebra, format downgrades) are not
//! errors. They are reported through a [`DiagnosticsSink`] owned by each
//! matrix so callers and tests decide whether they are logged, captured or
//! discarded.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A soft condition observed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// A fill or set landed outside the covered domain and was discarded.
    Dropped {
        /// Matrix name.
        matrix: String,
        /// Coordinates that were requested.
        coordinates: Vec<f64>,
        /// Value that was discarded.
        value: f64,
    },
    /// Elementwise algebra was requested on matrices with different axes.
    AxisMismatch {
        /// Left-hand matrix name.
        matrix: String,
        /// Right-hand matrix name.
        other: String,
        /// Operation that was skipped.
        operation: String,
    },
    /// A stream encoding was requested but the sparse form was written instead.
    StreamDowngraded {
        /// Matrix name.
        matrix: String,
        /// Fraction of zero bins that triggered the downgrade.
        sparsity: f64,
    },
    /// A matrix file carries no centered flag; bin centers are assumed.
    MissingCenteredFlag {
        /// File that was read.
        path: String,
    },
    /// A matrix file carries no version record; version 1 is assumed.
    MissingVersion {
        /// File that was read.
        path: String,
    },
    /// A record kind the reader does not understand was skipped.
    SkippedRecord {
        /// File that was read.
        path: String,
        /// One-based line number.
        line: usize,
        /// Leading keyword of the record.
        keyword: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Dropped {
                matrix,
                coordinates,
                value,
            } => write!(
                f,
                "{matrix}: value {value} at {coordinates:?} is outside the matrix and was dropped"
            ),
            Diagnostic::AxisMismatch {
                matrix,
                other,
                operation,
            } => write!(
                f,
                "{matrix}: matrices have different axes, {operation} with {other} skipped"
            ),
            Diagnostic::StreamDowngraded { matrix, sparsity } => write!(
                f,
                "{matrix}: {:.1}% of the bins are empty, writing sparse form instead of stream",
                sparsity * 100.0
            ),
            Diagnostic::MissingCenteredFlag { path } => write!(
                f,
                "{path}: no CE record found, assuming values at bin centers"
            ),
            Diagnostic::MissingVersion { path } => {
                write!(f, "{path}: no Version record found, assuming version 1")
            }
            Diagnostic::SkippedRecord {
                path,
                line,
                keyword,
            } => write!(f, "{path}:{line}: skipped unknown record {keyword}"),
        }
    }
}

/// Receiver of [`Diagnostic`] values.
pub trait DiagnosticsSink: Send + Sync + fmt::Debug {
    /// Delivers one diagnostic.
    fn emit(&self, diagnostic: Diagnostic);
}

/// Shared handle to a sink, cloned into every matrix that reports through it.
pub type SharedSink = Arc<dyn DiagnosticsSink>;

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Dropped { .. } | Diagnostic::SkippedRecord { .. } => {
                debug!("{diagnostic}")
            }
            Diagnostic::StreamDowngraded { .. } | Diagnostic::MissingVersion { .. } => {
                info!("{diagnostic}")
            }
            Diagnostic::AxisMismatch { .. } | Diagnostic::MissingCenteredFlag { .. } => {
                warn!("{diagnostic}")
            }
        }
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSink;

impl DiagnosticsSink for SilentSink {
    fn emit(&self, _diagnostic: Diagnostic) {}
}

/// Keeps every diagnostic in memory; intended for tests and batch reports.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Returns a copy of the collected diagnostics.
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.guard().clone()
    }

    /// Removes and returns the collected diagnostics.
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.guard())
    }

    /// Number of diagnostics collected so far.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

impl DiagnosticsSink for CollectingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.guard().push(diagnostic);
    }
}

/// Returns the default sink, which forwards to `tracing`.
pub fn tracing_sink() -> SharedSink {
    Arc::new(TracingSink)
}

/// Returns a sink that discards everything.
pub fn silent_sink() -> SharedSink {
    Arc::new(SilentSink)
}

/// Running total of values discarded by out-of-domain fills.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropStats {
    /// Number of discarded fills.
    pub count: u64,
    /// Sum of the discarded values.
    pub mass: f64,
}

impl DropStats {
    /// Records one discarded value.
    pub fn record(&mut self, value: f64) {
        self.count += 1;
        self.mass += value;
    }
}
