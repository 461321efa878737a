//! Parsers for both matrix families.
//!
//! Every failure is reported as [`RspError::Io`] carrying `path` and `line`
//! context, and no partially built matrix ever escapes.

use std::fs;
use std::path::Path;

use rsp_axis::{checked_bin_product, Axis, BinEdges, FisbelBinning};
use rsp_core::{tracing_sink, Diagnostic, EngineConfig, ErrorInfo, RspError, SharedSink};
use rsp_matrix::{FixedMatrix, GeneralMatrix, OrderedMatrix};
use tracing::debug;

use crate::any::AnyMatrix;
use crate::header::{scan_header, Header, HEADER_KEYWORDS};
use crate::lexer::{at_line, in_file, located, parse_all, parse_token, quoted_names, Cursor, Record};
use crate::tag::TypeTag;

/// Label used for in-memory inputs.
pub const MEMORY_SOURCE: &str = "<memory>";

/// Settings of a read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Size cap and header scan window.
    pub config: EngineConfig,
    /// Receiver of header and skipped-record diagnostics; also installed in the result.
    pub sink: SharedSink,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            sink: tracing_sink(),
        }
    }
}

impl ReadOptions {
    /// Options with the given engine configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Routes diagnostics to `sink`.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }
}

/// Reads a matrix of either family.
pub fn read_matrix(path: impl AsRef<Path>, options: &ReadOptions) -> Result<AnyMatrix, RspError> {
    let path = path.as_ref();
    let label = path.display().to_string();
    let data = fs::read(path).map_err(|err| {
        RspError::Io(
            ErrorInfo::new("read-failed", err.to_string()).with_context("path", label.as_str()),
        )
    })?;
    debug!(path = %label, bytes = data.len(), "reading response matrix");
    decode_from(&data, &label, options)
}

/// Reads a fixed-order matrix of any order.
pub fn read_ordered(path: impl AsRef<Path>, options: &ReadOptions) -> Result<OrderedMatrix, RspError> {
    read_matrix(path, options)?.into_ordered()
}

/// Reads a fixed-order matrix of order `K`.
pub fn read_fixed<const K: usize>(
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<FixedMatrix<K>, RspError> {
    FixedMatrix::try_from(read_ordered(path, options)?)
}

/// Reads a general matrix.
pub fn read_general(path: impl AsRef<Path>, options: &ReadOptions) -> Result<GeneralMatrix, RspError> {
    read_matrix(path, options)?.into_general()
}

/// Decodes a matrix from the bytes of a file.
pub fn decode(data: &[u8], options: &ReadOptions) -> Result<AnyMatrix, RspError> {
    decode_from(data, MEMORY_SOURCE, options)
}

fn decode_from(data: &[u8], path: &str, options: &ReadOptions) -> Result<AnyMatrix, RspError> {
    let header = scan_header(data, path, options)?;
    debug!(path, tag = %header.tag, name = %header.meta.name, "dispatching matrix parser");
    match header.tag {
        TypeTag::Fixed { order, .. } => {
            parse_ordered(data, path, order, header, options).map(AnyMatrix::Ordered)
        }
        TypeTag::General { .. } => parse_general(data, path, header, options).map(AnyMatrix::General),
    }
}

struct Row {
    line: usize,
    coordinates: Vec<f64>,
    value: f32,
}

/// Body records shared by both parsers.
enum Body<'a> {
    Header,
    Values(Vec<f32>),
    Row(Row),
    Other(Record<'a>),
}

struct BodyReader<'a> {
    cursor: Cursor<'a>,
    path: &'a str,
    row_keyword: String,
    row_width: usize,
    max_bins: u64,
    sink: &'a SharedSink,
    stream_tagged: bool,
    stream_seen: bool,
}

impl<'a> BodyReader<'a> {
    fn next_body(&mut self) -> Option<Result<Body<'a>, RspError>> {
        let record = match self.cursor.next_record()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err)),
        };
        Some(self.classify(record))
    }

    fn classify(&mut self, record: Record<'a>) -> Result<Body<'a>, RspError> {
        if HEADER_KEYWORDS.contains(&record.keyword) {
            return Ok(Body::Header);
        }
        if record.keyword == "StartStream" {
            return self.stream(&record).map(Body::Values);
        }
        if record.keyword == "StopStream" {
            return Err(RspError::Io(located(
                "unexpected-stop-stream",
                "StopStream without a preceding StartStream",
                self.path,
                record.line,
            )));
        }
        if record.keyword == self.row_keyword {
            if self.stream_tagged {
                return Err(RspError::Io(
                    located("unexpected-row", "sparse row in a stream-tagged file", self.path, record.line)
                        .with_context("record", record.keyword),
                ));
            }
            return self.row(&record).map(Body::Row);
        }
        Ok(Body::Other(record))
    }

    fn row(&self, record: &Record<'_>) -> Result<Row, RspError> {
        let tokens: Vec<&str> = record.tokens().collect();
        if tokens.len() != self.row_width + 1 {
            return Err(RspError::Io(
                located("row-arity", "row has the wrong number of entries", self.path, record.line)
                    .with_context("expected", (self.row_width + 1).to_string())
                    .with_context("found", tokens.len().to_string()),
            ));
        }
        let coordinates = tokens[..self.row_width]
            .iter()
            .map(|token| parse_token(token, "row coordinate", self.path, record.line))
            .collect::<Result<Vec<f64>, _>>()?;
        let value: f32 = parse_token(tokens[self.row_width], "row value", self.path, record.line)?;
        if !value.is_finite() || coordinates.iter().any(|x| !x.is_finite()) {
            return Err(RspError::Io(
                located("non-finite-value", "row entries must be finite", self.path, record.line)
                    .with_context("row", record.rest),
            ));
        }
        Ok(Row {
            line: record.line,
            coordinates,
            value,
        })
    }

    fn stream(&mut self, record: &Record<'_>) -> Result<Vec<f32>, RspError> {
        let line = record.line;
        if self.stream_seen {
            return Err(RspError::Io(located(
                "duplicate-stream",
                "more than one value stream",
                self.path,
                line,
            )));
        }
        self.stream_seen = true;
        let count: u64 = parse_token(record.rest, "stream count", self.path, line)?;
        if count > self.max_bins {
            return Err(RspError::Io(
                located("size-cap-exceeded", "stream is larger than the bin cap", self.path, line)
                    .with_context("count", count.to_string())
                    .with_context("max_bins", self.max_bins.to_string()),
            ));
        }
        let payload = self.cursor.remaining();
        let mut reader = payload;
        let values: Vec<f32> = bincode::deserialize_from(&mut reader).map_err(|err| {
            RspError::Io(
                located("truncated-stream", "value stream could not be decoded", self.path, line)
                    .with_context("cause", err.to_string()),
            )
        })?;
        self.cursor.skip(payload.len() - reader.len());
        if values.len() as u64 != count {
            return Err(RspError::Io(
                located("stream-size-mismatch", "stream length differs from its declared count", self.path, line)
                    .with_context("declared", count.to_string())
                    .with_context("found", values.len().to_string()),
            ));
        }
        match self.cursor.next_record() {
            Some(Ok(stop)) if stop.keyword == "StopStream" => Ok(values),
            Some(Err(err)) => Err(err),
            _ => Err(RspError::Io(located(
                "missing-stop-stream",
                "value stream is not followed by StopStream",
                self.path,
                self.cursor.line().max(line),
            ))),
        }
    }

    fn skipped(&self, record: &Record<'_>) {
        self.sink.emit(Diagnostic::SkippedRecord {
            path: self.path.to_string(),
            line: record.line,
            keyword: record.keyword.to_string(),
        });
    }
}

fn check_declared_order(header: &Header, order: usize, path: &str) -> Result<(), RspError> {
    match header.order {
        Some(declared) if declared != order => Err(RspError::Io(
            ErrorInfo::new("order-mismatch", "OD record disagrees with the matrix axes")
                .with_context("path", path)
                .with_context("declared", declared.to_string())
                .with_context("found", order.to_string()),
        )),
        _ => Ok(()),
    }
}

fn require_stream(
    header: &Header,
    stream: &Option<(usize, Vec<f32>)>,
    path: &str,
    line: usize,
) -> Result<(), RspError> {
    if header.tag.is_stream() && stream.is_none() {
        return Err(RspError::Io(
            located("missing-stream", "stream-tagged file has no StartStream body", path, line)
                .with_context("type", header.tag.to_string())
                .with_hint("the file is probably truncated"),
        ));
    }
    Ok(())
}

fn check_stream(
    values: &Option<(usize, Vec<f32>)>,
    bins: usize,
    path: &str,
) -> Result<(), RspError> {
    match values {
        Some((line, values)) if values.len() != bins => Err(RspError::Io(
            located("stream-size-mismatch", "stream length differs from the bin count", path, *line)
                .with_context("expected", bins.to_string())
                .with_context("found", values.len().to_string()),
        )),
        _ => Ok(()),
    }
}

fn axis_index(record: &Record<'_>, prefix: char, order: usize, path: &str) -> Option<Result<usize, RspError>> {
    let digits = record.keyword.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    Some(match digits.parse::<usize>() {
        Ok(index) if (1..=order).contains(&index) => Ok(index - 1),
        _ => Err(RspError::Io(
            located("axis-out-of-range", "axis record beyond the matrix order", path, record.line)
                .with_context("record", record.keyword)
                .with_context("order", order.to_string()),
        )),
    })
}

fn is_row_keyword(keyword: &str) -> bool {
    keyword
        .strip_prefix('R')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|byte| byte.is_ascii_digit()))
}

fn parse_ordered(
    data: &[u8],
    path: &str,
    order: usize,
    header: Header,
    options: &ReadOptions,
) -> Result<OrderedMatrix, RspError> {
    check_declared_order(&header, order, path)?;
    let mut body = BodyReader {
        cursor: Cursor::new(data, path),
        path,
        row_keyword: format!("R{order}"),
        row_width: order,
        max_bins: options.config.max_bins,
        sink: &options.sink,
        stream_tagged: header.tag.is_stream(),
        stream_seen: false,
    };
    let mut axes: Vec<Option<BinEdges>> = vec![None; order];
    let mut names = vec![String::new(); order];
    let mut stream = None;
    let mut rows = Vec::new();

    while let Some(item) = body.next_body() {
        match item? {
            Body::Header => {}
            Body::Values(values) => stream = Some((body.cursor.line(), values)),
            Body::Row(row) => rows.push(row),
            Body::Other(record) => {
                if let Some(index) = axis_index(&record, 'A', order, path) {
                    let index = index?;
                    let edges = parse_all(&record, "bin edge", path)?;
                    let edges = BinEdges::from_edges(edges)
                        .map_err(|err| at_line(err, path, record.line))?;
                    axes[index] = Some(edges);
                } else if let Some(index) = axis_index(&record, 'N', order, path) {
                    names[index?] = record.rest.to_string();
                } else if is_row_keyword(record.keyword) {
                    return Err(RspError::Io(
                        located("row-arity", "row order differs from the matrix order", path, record.line)
                            .with_context("record", record.keyword)
                            .with_context("order", order.to_string()),
                    ));
                } else {
                    body.skipped(&record);
                }
            }
        }
    }

    let mut complete = Vec::with_capacity(order);
    for (index, edges) in axes.into_iter().enumerate() {
        let Some(edges) = edges else {
            return Err(RspError::Io(
                ErrorInfo::new("missing-axis", "axis record not found")
                    .with_context("path", path)
                    .with_axis(index)
                    .with_context("record", format!("A{}", index + 1)),
            ));
        };
        complete.push(edges);
    }
    require_stream(&header, &stream, path, body.cursor.line())?;
    let bins = checked_bin_product(complete.iter().map(BinEdges::bin_count), options.config.max_bins)
        .map_err(|err| in_file(err, path))?;
    check_stream(&stream, bins, path)?;
    let mut values = stream.map_or_else(|| vec![0.0; bins], |(_, values)| values);

    for row in rows {
        let mut offset = 0;
        let mut stride = 1;
        for (axis, (edges, x)) in complete.iter().zip(&row.coordinates).enumerate() {
            let Some(bin) = edges.find_bin(*x) else {
                return Err(RspError::Io(
                    located("row-outside-domain", "row coordinates are outside the axes", path, row.line)
                        .with_axis(axis)
                        .with_context("value", x.to_string()),
                ));
            };
            offset += bin * stride;
            stride *= edges.bin_count();
        }
        values[offset] += row.value;
    }

    let matrix = OrderedMatrix::from_parts(header.meta, complete, names, values, &options.config)
        .map_err(|err| in_file(err, path))?;
    Ok(matrix.with_sink(options.sink.clone()))
}

/// Axis block in progress: `AN`, then `AT`, then `AD`.
#[derive(Default)]
struct PendingAxis {
    names: Option<Vec<String>>,
    kind: Option<AxisKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AxisKind {
    Edges,
    Fisbel,
}

impl AxisKind {
    fn parse(record: &Record<'_>, path: &str) -> Result<Self, RspError> {
        let tokens: Vec<&str> = record.tokens().collect();
        match tokens.as_slice() {
            ["1D", "BinEdges"] => Ok(AxisKind::Edges),
            ["2D", "FISBEL"] => Ok(AxisKind::Fisbel),
            _ => Err(RspError::Io(
                located("unknown-axis-type", "unsupported axis type", path, record.line)
                    .with_context("value", record.rest)
                    .with_hint("supported axis types are `1D BinEdges` and `2D FISBEL`"),
            )),
        }
    }

    fn dimension(self) -> usize {
        match self {
            AxisKind::Edges => 1,
            AxisKind::Fisbel => 2,
        }
    }
}

fn build_axis(pending: PendingAxis, record: &Record<'_>, path: &str) -> Result<Axis, RspError> {
    let incomplete = |missing: &str| {
        RspError::Io(
            located("incomplete-axis", "axis data without a complete axis header", path, record.line)
                .with_context("missing", missing),
        )
    };
    let names = pending.names.ok_or_else(|| incomplete("AN"))?;
    let kind = pending.kind.ok_or_else(|| incomplete("AT"))?;
    if names.len() != kind.dimension() {
        return Err(RspError::Io(
            located("axis-names", "number of axis names differs from the axis dimension", path, record.line)
                .with_context("expected", kind.dimension().to_string())
                .with_context("found", names.len().to_string()),
        ));
    }
    let mut names = names.into_iter();
    let first = names.next().unwrap_or_default();
    match kind {
        AxisKind::Edges => {
            let edges = parse_all(record, "bin edge", path)?;
            Axis::from_edges(first, edges).map_err(|err| at_line(err, path, record.line))
        }
        AxisKind::Fisbel => {
            let tokens: Vec<&str> = record.tokens().collect();
            let (bins, shift) = match tokens.as_slice() {
                [bins] => (parse_token(bins, "bin count", path, record.line)?, 0.0),
                [bins, shift] => (
                    parse_token(bins, "bin count", path, record.line)?,
                    parse_token(shift, "longitude shift", path, record.line)?,
                ),
                _ => {
                    return Err(RspError::Io(
                        located("malformed-token", "FISBEL data is `<bins> [<shift>]`", path, record.line)
                            .with_context("token", record.rest),
                    ))
                }
            };
            let binning = FisbelBinning::with_shift(bins, shift)
                .map_err(|err| at_line(err, path, record.line))?;
            Ok(Axis::fisbel(first, names.next().unwrap_or_default(), binning))
        }
    }
}

fn parse_general(
    data: &[u8],
    path: &str,
    header: Header,
    options: &ReadOptions,
) -> Result<GeneralMatrix, RspError> {
    let mut body = BodyReader {
        cursor: Cursor::new(data, path),
        path,
        row_keyword: "RD".to_string(),
        row_width: 0,
        max_bins: options.config.max_bins,
        sink: &options.sink,
        stream_tagged: header.tag.is_stream(),
        stream_seen: false,
    };
    let mut matrix = GeneralMatrix::new(header.meta.name.clone())
        .with_config(&options.config)
        .with_sink(options.sink.clone());
    let mut pending = PendingAxis::default();
    let mut stream = None;
    let mut rows = Vec::new();

    while let Some(item) = body.next_body() {
        match item? {
            Body::Header => {}
            Body::Values(values) => stream = Some((body.cursor.line(), values)),
            Body::Row(row) => rows.push(row),
            Body::Other(record) => match record.keyword {
                "AN" => pending.names = Some(quoted_names(record.rest, path, record.line)?),
                "AT" => pending.kind = Some(AxisKind::parse(&record, path)?),
                "AD" => {
                    let axis = build_axis(std::mem::take(&mut pending), &record, path)?;
                    matrix
                        .add_axis(axis)
                        .map_err(|err| at_line(err, path, record.line))?;
                    body.row_width = matrix.axis_count();
                }
                _ => body.skipped(&record),
            },
        }
    }

    let end = body.cursor.line();
    if pending.names.is_some() || pending.kind.is_some() {
        return Err(RspError::Io(
            located("incomplete-axis", "axis header without an AD record", path, end)
                .with_context("missing", "AD"),
        ));
    }
    if matrix.axis_count() == 0 {
        return Err(RspError::Io(
            ErrorInfo::new("missing-axis", "general matrix without any axis")
                .with_context("path", path)
                .with_hint("each axis is an AN, AT and AD record block"),
        ));
    }
    check_declared_order(&header, matrix.order(), path)?;
    require_stream(&header, &stream, path, end)?;
    check_stream(&stream, matrix.bin_count(), path)?;
    if let Some((_, values)) = stream {
        matrix.values_mut().copy_from_slice(&values);
    }
    for row in rows {
        let bins: Vec<usize> = row
            .coordinates
            .iter()
            .map(|index| {
                if index.fract() == 0.0 && *index >= 0.0 {
                    Ok(*index as usize)
                } else {
                    Err(RspError::Io(
                        located("malformed-token", "bin indices must be non-negative integers", path, row.line)
                            .with_context("token", index.to_string()),
                    ))
                }
            })
            .collect::<Result<_, _>>()?;
        let offset = matrix.find_bin(&bins).map_err(|err| {
            RspError::Io(
                located("row-outside-domain", "row bin indices are outside the axes", path, row.line)
                    .with_context("cause", err.to_string()),
            )
        })?;
        matrix.values_mut()[offset] += row.value;
    }
    *matrix.meta_mut() = header.meta;
    Ok(matrix)
}
