//! Subcommands of `rsp-tool`, one module each.

pub mod append;
pub mod divide;
pub mod join;
pub mod probability;
pub mod ratio;
pub mod stats;

use std::error::Error;
use std::path::{Path, PathBuf};

use rsp_core::{RspError, SharedSink};
use rsp_io::{read_matrix, AnyMatrix, Encoding, ReadOptions, WriteOptions};
use tracing::info;

use crate::config::ToolConfig;

/// Configuration and I/O settings shared by every command.
#[derive(Debug, Clone)]
pub struct Session {
    /// Loaded configuration.
    pub config: ToolConfig,
    /// Settings of every read.
    pub read: ReadOptions,
    /// Settings of every write.
    pub write: WriteOptions,
}

impl Session {
    /// Builds a session; `sparse` overrides the configured encoding.
    pub fn new(config: ToolConfig, sparse: bool) -> Self {
        let read = ReadOptions::from_config(config.engine.clone());
        let write = WriteOptions::from_config(&config.engine, config.stream && !sparse);
        Self {
            config,
            read,
            write,
        }
    }

    /// Routes engine diagnostics to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.read = self.read.with_sink(sink.clone());
        self.write = self.write.with_sink(sink);
        self
    }

    /// Reads a matrix of either family.
    pub fn load(&self, path: &Path) -> Result<AnyMatrix, RspError> {
        read_matrix(path, &self.read)
    }

    /// Writes `matrix` and logs the encoding used.
    pub fn store(&self, path: &Path, matrix: &AnyMatrix) -> Result<Encoding, RspError> {
        let encoding = matrix.write(path, &self.write)?;
        info!(
            path = %path.display(),
            matrix = matrix.name(),
            %encoding,
            "stored response matrix"
        );
        Ok(encoding)
    }
}

/// Reads two matrices, combines them into the first and writes the result.
pub(crate) fn combine_pair(
    session: &Session,
    first: &Path,
    second: &Path,
    output: &PathBuf,
    apply: impl FnOnce(&mut AnyMatrix, &AnyMatrix) -> Result<(), RspError>,
) -> Result<AnyMatrix, Box<dyn Error>> {
    let mut left = session.load(first)?;
    let right = session.load(second)?;
    apply(&mut left, &right)?;
    session.store(output, &left)?;
    Ok(left)
}
