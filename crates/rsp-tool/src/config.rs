//! YAML configuration of the tool.

use std::fs;
use std::path::Path;

use rsp_core::{EngineConfig, ErrorInfo, RspError};
use serde::{Deserialize, Serialize};

/// Settings of the `join` command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinConfig {
    /// File name suffixes that are joined, one output per suffix.
    #[serde(default = "default_suffixes")]
    pub suffixes: Vec<String>,
}

fn default_suffixes() -> Vec<String> {
    vec![".rsp".to_string()]
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            suffixes: default_suffixes(),
        }
    }
}

fn default_stream() -> bool {
    true
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Engine limits.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Join settings.
    #[serde(default)]
    pub join: JoinConfig,
    /// Request stream bodies for written files.
    #[serde(default = "default_stream")]
    pub stream: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            join: JoinConfig::default(),
            stream: default_stream(),
        }
    }
}

impl ToolConfig {
    /// Parses and validates YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, RspError> {
        let config: Self = serde_yaml::from_str(text).map_err(|err| {
            RspError::Configuration(ErrorInfo::new("config-parse", err.to_string()))
        })?;
        config.engine.validate()?;
        if config.join.suffixes.iter().any(String::is_empty) {
            return Err(RspError::Configuration(
                ErrorInfo::new("invalid-config", "join suffixes must not be empty")
                    .with_hint("use e.g. \".rsp\" or \".x.rsp\""),
            ));
        }
        Ok(config)
    }

    /// Loads `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, RspError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
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
}
