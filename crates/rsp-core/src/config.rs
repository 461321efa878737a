use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RspError};

/// Highest order a fixed-order matrix supports.
pub const MAX_FIXED_ORDER: usize = 17;

/// YAML-configurable limits and thresholds of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on the product of all axis bin counts.
    #[serde(default = "default_max_bins")]
    pub max_bins: u64,
    /// Zero-bin fraction above which a requested stream is written sparse.
    #[serde(default = "default_sparse_threshold")]
    pub sparse_threshold: f64,
    /// Number of lines the header pass inspects before giving up.
    #[serde(default = "default_header_scan_lines")]
    pub header_scan_lines: usize,
}

fn default_max_bins() -> u64 {
    1 << 28
}

fn default_sparse_threshold() -> f64 {
    0.9
}

fn default_header_scan_lines() -> usize {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_bins: default_max_bins(),
            sparse_threshold: default_sparse_threshold(),
            header_scan_lines: default_header_scan_lines(),
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from YAML text and validates it.
    pub fn from_yaml_str(text: &str) -> Result<Self, RspError> {
        let config: Self = serde_yaml::from_str(text).map_err(|err| {
            RspError::Configuration(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RspError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|err| {
            RspError::Io(
                ErrorInfo::new("read-failed", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&text).map_err(|err| match err {
            RspError::Configuration(info) => RspError::Configuration(
                info.with_context("path", path.display().to_string()),
            ),
            other => other,
        })
    }

    /// Checks that limits are usable.
    pub fn validate(&self) -> Result<(), RspError> {
        if self.max_bins == 0 {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-config", "max_bins must be positive")
                    .with_context("max_bins", "0"),
            ));
        }
        if !(0.0..=1.0).contains(&self.sparse_threshold) {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-config", "sparse_threshold must lie in [0, 1]")
                    .with_context("sparse_threshold", self.sparse_threshold.to_string()),
            ));
        }
        if self.header_scan_lines == 0 {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-config", "header_scan_lines must be positive")
                    .with_context("header_scan_lines", "0"),
            ));
        }
        Ok(())
    }
}
