#![doc = "Commands behind the `rsp-tool` binary: append, divide, ratio, probability, join and stats over response matrix files."]

pub mod commands;
pub mod config;

pub use commands::Session;
pub use config::{JoinConfig, ToolConfig};
