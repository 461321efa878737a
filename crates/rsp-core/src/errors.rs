//! Structured error types shared across the response-matrix crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`RspError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (matrix name, axis, offending value, path).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Shorthand for attaching the matrix name.
    pub fn with_matrix(self, name: &str) -> Self {
        self.with_context("matrix", name)
    }

    /// Shorthand for attaching the offending axis index.
    pub fn with_axis(self, axis: usize) -> Self {
        self.with_context("axis", axis.to_string())
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the response-matrix engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum RspError {
    /// Invalid axis definitions, size cap violations and bad configuration.
    #[error("configuration error: {0}")]
    Configuration(ErrorInfo),
    /// Bin or offset indices outside the matrix.
    #[error("bounds error: {0}")]
    Bounds(ErrorInfo),
    /// Rejected argument values (non-finite content, wrong coordinate count).
    #[error("value error: {0}")]
    Value(ErrorInfo),
    /// Reading or writing matrix files.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Algebra between matrices with different axes.
    #[error("mismatch error: {0}")]
    Mismatch(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl RspError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            RspError::Configuration(info)
            | RspError::Bounds(info)
            | RspError::Value(info)
            | RspError::Io(info)
            | RspError::Mismatch(info)
            | RspError::Serde(info) => info,
        }
    }

    /// Returns the stable error code.
    pub fn code(&self) -> &str {
        &self.info().code
    }
}
