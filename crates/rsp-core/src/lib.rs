#![deny(missing_docs)]
#![doc = "Shared error, diagnostics, configuration and metadata types for the response-matrix engine."]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Engine limits loaded from YAML.
pub mod config;
pub mod diagnostics;
pub mod errors;

pub use config::{EngineConfig, MAX_FIXED_ORDER};
pub use diagnostics::{
    silent_sink, tracing_sink, CollectingSink, Diagnostic, DiagnosticsSink, DropStats,
    SharedSink, SilentSink, TracingSink,
};
pub use errors::{ErrorInfo, RspError};

/// Where a stored value sits relative to its axis bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueAnchor {
    /// Value `i` describes the center of bin `i`.
    #[default]
    BinCenters,
    /// Value `i` is a knot located at edge `i`.
    BinEdges,
}

impl ValueAnchor {
    /// Whether this is the centered convention (the `CE` record).
    pub fn is_centered(self) -> bool {
        matches!(self, ValueAnchor::BinCenters)
    }

    /// Maps the `CE` flag onto an anchor.
    pub fn from_centered(centered: bool) -> Self {
        if centered {
            ValueAnchor::BinCenters
        } else {
            ValueAnchor::BinEdges
        }
    }
}

/// Behaviour of interpolation outside the outermost anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Extrapolation {
    /// Return the boundary value.
    #[default]
    Clamp,
    /// Continue the trend of the outermost pair of anchors.
    Linear,
}

/// Descriptive data carried alongside the values of every matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMeta {
    /// Matrix name (`NM`).
    pub name: String,
    /// Number of simulated events that went into the matrix (`TS`).
    #[serde(default)]
    pub simulated_events: u64,
    /// Far-field start area used for normalization (`SA`).
    #[serde(default)]
    pub far_field_area: f64,
    /// Externally assigned hash of the producing model (`HA`).
    #[serde(default)]
    pub hash: u64,
    /// Value anchoring convention (`CE`).
    #[serde(default)]
    pub anchor: ValueAnchor,
}

impl MatrixMeta {
    /// Creates metadata with the given name and defaults elsewhere.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for MatrixMeta {
    fn default() -> Self {
        Self {
            name: String::new(),
            simulated_events: 0,
            far_field_area: 0.0,
            hash: 0,
            anchor: ValueAnchor::BinCenters,
        }
    }
}

/// Display name used in messages when a matrix has no name.
pub fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "<unnamed>"
    } else {
        name
    }
}

impl fmt::Display for ValueAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_centered() { "true" } else { "false" })
    }
}

impl FromStr for ValueAnchor {
    type Err = RspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" | "1" => Ok(ValueAnchor::BinCenters),
            "false" | "0" => Ok(ValueAnchor::BinEdges),
            other => Err(RspError::Value(
                ErrorInfo::new("invalid-flag", "centered flag must be true or false")
                    .with_context("value", other),
            )),
        }
    }
}
