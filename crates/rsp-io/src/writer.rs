//! Writers for both matrix families.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use rsp_axis::{Axis, Binning};
use rsp_core::{
    display_name, tracing_sink, Diagnostic, EngineConfig, ErrorInfo, MatrixMeta, RspError,
    SharedSink,
};
use rsp_matrix::{GeneralMatrix, OrderedMatrix};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::any::AnyMatrix;
use crate::header::FORMAT_VERSION;
use crate::lexer::{quote, single_line};
use crate::tag::TypeTag;

/// Body encoding that was actually written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// Binary stream of every value.
    Stream,
    /// Text rows for the non-zero bins.
    Sparse,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Stream => "stream",
            Encoding::Sparse => "sparse",
        })
    }
}

/// Settings of a write.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Request the binary stream body.
    pub stream: bool,
    /// Zero-bin fraction above which a requested stream is written sparse.
    pub sparse_threshold: f64,
    /// Receiver of the downgrade diagnostic.
    pub sink: SharedSink,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default(), true)
    }
}

impl WriteOptions {
    /// Options taking the threshold from `config`.
    pub fn from_config(config: &EngineConfig, stream: bool) -> Self {
        Self {
            stream,
            sparse_threshold: config.sparse_threshold,
            sink: tracing_sink(),
        }
    }

    /// Options requesting the sparse body.
    pub fn sparse() -> Self {
        Self {
            stream: false,
            ..Self::default()
        }
    }

    /// Routes diagnostics to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    fn choose(&self, name: &str, sparsity: f64) -> Encoding {
        if !self.stream {
            return Encoding::Sparse;
        }
        if sparsity > self.sparse_threshold {
            self.sink.emit(Diagnostic::StreamDowngraded {
                matrix: name.to_string(),
                sparsity,
            });
            return Encoding::Sparse;
        }
        Encoding::Stream
    }
}

/// Bytes of an encoded matrix together with the body encoding used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Body encoding.
    pub encoding: Encoding,
}

fn sparsity(values: &[f32]) -> f64 {
    let zeros = values.iter().filter(|value| **value == 0.0).count();
    zeros as f64 / values.len() as f64
}

fn write_header(out: &mut String, tag: TypeTag, meta: &MatrixMeta, order: usize) {
    // Writing into a String cannot fail.
    let _ = writeln!(out, "# Response matrix file");
    let _ = writeln!(out);
    let _ = writeln!(out, "Version {FORMAT_VERSION}");
    let _ = writeln!(out, "Type {tag}");
    let _ = writeln!(out);
    let _ = writeln!(out, "NM {}", single_line(&meta.name));
    let _ = writeln!(out, "OD {order}");
    let _ = writeln!(out, "TS {}", meta.simulated_events);
    let _ = writeln!(out, "SA {}", meta.far_field_area);
    let _ = writeln!(out, "HA {}", meta.hash);
    let _ = writeln!(out, "CE {}", meta.anchor);
    let _ = writeln!(out);
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn finish(mut out: String, values: &[f32], encoding: Encoding) -> Result<Vec<u8>, RspError> {
    if encoding == Encoding::Sparse {
        return Ok(out.into_bytes());
    }
    let _ = writeln!(out, "StartStream {}", values.len());
    let payload = bincode::serialize(values)
        .map_err(|err| RspError::Serde(ErrorInfo::new("encode-stream", err.to_string())))?;
    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(&payload);
    bytes.extend_from_slice(b"\nStopStream\n");
    Ok(bytes)
}

/// Encodes a fixed-order matrix.
pub fn encode_ordered(matrix: &OrderedMatrix, options: &WriteOptions) -> Result<Encoded, RspError> {
    let encoding = options.choose(matrix.name(), sparsity(matrix.values()));
    let order = matrix.order();
    let tag = TypeTag::fixed(order, encoding == Encoding::Stream)?;
    let mut out = String::new();
    write_header(&mut out, tag, matrix.meta(), order);

    for (index, (edges, name)) in matrix.axes().iter().zip(matrix.axis_names()).enumerate() {
        let _ = writeln!(out, "A{} {}", index + 1, join(edges.edges()));
        let _ = writeln!(out, "N{} {}", index + 1, single_line(name));
    }
    let _ = writeln!(out);

    if encoding == Encoding::Sparse {
        let mut bins = vec![0usize; order];
        for &value in matrix.values() {
            if value != 0.0 {
                let centers = bins
                    .iter()
                    .zip(matrix.axes())
                    .map(|(bin, edges)| edges.center(*bin));
                let _ = writeln!(out, "R{order} {} {value}", join(centers));
            }
            advance(&mut bins, matrix.axes().iter().map(|edges| edges.bin_count()));
        }
    }
    let bytes = finish(out, matrix.values(), encoding)?;
    Ok(Encoded { bytes, encoding })
}

fn write_axis(out: &mut String, axis: &Axis) {
    let _ = writeln!(out, "AN {}", join(axis.names().iter().map(|name| quote(name))));
    match axis.binning() {
        Binning::Edges(edges) => {
            let _ = writeln!(out, "AT 1D BinEdges");
            let _ = writeln!(out, "AD {}", join(edges.edges()));
        }
        Binning::Fisbel(fisbel) => {
            let _ = writeln!(out, "AT 2D FISBEL");
            let _ = writeln!(out, "AD {} {}", fisbel.requested_bins(), fisbel.longitude_shift());
        }
    }
}

/// Encodes a general matrix.
pub fn encode_general(matrix: &GeneralMatrix, options: &WriteOptions) -> Result<Encoded, RspError> {
    if matrix.axis_count() == 0 {
        return Err(RspError::Configuration(
            ErrorInfo::new("missing-axis", "general matrix has no axis to write")
                .with_matrix(display_name(matrix.name())),
        ));
    }
    let encoding = options.choose(matrix.name(), sparsity(matrix.values()));
    let tag = TypeTag::general(encoding == Encoding::Stream);
    let mut out = String::new();
    write_header(&mut out, tag, matrix.meta(), matrix.order());

    for axis in matrix.axes() {
        write_axis(&mut out, axis);
    }
    let _ = writeln!(out);

    if encoding == Encoding::Sparse {
        let mut bins = vec![0usize; matrix.axis_count()];
        for &value in matrix.values() {
            if value != 0.0 {
                let _ = writeln!(out, "RD {} {value}", join(&bins));
            }
            advance(&mut bins, matrix.axes().iter().map(Axis::bin_count));
        }
    }
    let bytes = finish(out, matrix.values(), encoding)?;
    Ok(Encoded { bytes, encoding })
}

/// Steps a mixed-radix counter, axis 0 fastest.
fn advance(bins: &mut [usize], sizes: impl Iterator<Item = usize>) {
    for (bin, size) in bins.iter_mut().zip(sizes) {
        *bin += 1;
        if *bin < size {
            return;
        }
        *bin = 0;
    }
}

fn store(path: &Path, encoded: Encoded, name: &str) -> Result<Encoding, RspError> {
    fs::write(path, &encoded.bytes).map_err(|err| {
        RspError::Io(
            ErrorInfo::new("write-failed", err.to_string())
                .with_context("path", path.display().to_string())
                .with_matrix(name),
        )
    })?;
    debug!(
        path = %path.display(),
        encoding = %encoded.encoding,
        bytes = encoded.bytes.len(),
        "wrote response matrix"
    );
    Ok(encoded.encoding)
}

/// Writes a fixed-order matrix and returns the body encoding used.
pub fn write_ordered(
    path: impl AsRef<Path>,
    matrix: &OrderedMatrix,
    options: &WriteOptions,
) -> Result<Encoding, RspError> {
    store(path.as_ref(), encode_ordered(matrix, options)?, matrix.name())
}

/// Writes a general matrix and returns the body encoding used.
pub fn write_general(
    path: impl AsRef<Path>,
    matrix: &GeneralMatrix,
    options: &WriteOptions,
) -> Result<Encoding, RspError> {
    store(path.as_ref(), encode_general(matrix, options)?, matrix.name())
}

/// Writes a matrix of either family and returns the body encoding used.
pub fn write_matrix(
    path: impl AsRef<Path>,
    matrix: &AnyMatrix,
    options: &WriteOptions,
) -> Result<Encoding, RspError> {
    store(path.as_ref(), matrix.encode(options)?, matrix.name())
}
