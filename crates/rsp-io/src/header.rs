//! First pass over a matrix file.
//!
//! Only the leading records are inspected, up to
//! [`EngineConfig::header_scan_lines`](rsp_core::EngineConfig) lines or the
//! first `StartStream`, whichever comes first. The result selects the parser.

use rsp_core::{Diagnostic, MatrixMeta, RspError, ValueAnchor};

use crate::lexer::{at_line, located, parse_token, Cursor};
use crate::reader::ReadOptions;
use crate::tag::TypeTag;

/// Version written by this crate and assumed when a file has none.
pub const FORMAT_VERSION: u32 = 1;

/// Keywords owned by the header; body parsers skip them.
pub(crate) const HEADER_KEYWORDS: [&str; 8] = ["Version", "Type", "NM", "OD", "TS", "SA", "HA", "CE"];

/// Header records of a matrix file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// `Version`, defaulted to [`FORMAT_VERSION`].
    pub version: u32,
    /// `Type`.
    pub tag: TypeTag,
    /// `NM`, `TS`, `SA`, `HA` and `CE`.
    pub meta: MatrixMeta,
    /// `OD`, when present.
    pub order: Option<usize>,
}

/// Scans the header of `data`; `path` only labels errors and diagnostics.
pub fn scan_header(data: &[u8], path: &str, options: &ReadOptions) -> Result<Header, RspError> {
    let mut cursor = Cursor::new(data, path);
    let mut version = None;
    let mut tag = None;
    let mut order = None;
    let mut anchor = None;
    let mut meta = MatrixMeta::default();

    while let Some(record) = cursor.next_record() {
        let record = record?;
        if record.line > options.config.header_scan_lines {
            break;
        }
        let line = record.line;
        match record.keyword {
            "StartStream" => break,
            "Version" => version = Some(parse_token(record.rest, "format version", path, line)?),
            "Type" => tag = Some(record.rest.parse::<TypeTag>().map_err(|err| at_line(err, path, line))?),
            "NM" => meta.name = record.rest.to_string(),
            "OD" => order = Some(parse_token(record.rest, "order", path, line)?),
            "TS" => meta.simulated_events = parse_token(record.rest, "simulated events", path, line)?,
            "SA" => meta.far_field_area = parse_token(record.rest, "far-field area", path, line)?,
            "HA" => meta.hash = parse_token(record.rest, "hash", path, line)?,
            "CE" => {
                anchor = Some(
                    record
                        .rest
                        .parse::<ValueAnchor>()
                        .map_err(|err| at_line(err, path, line))?,
                )
            }
            _ => {}
        }
    }

    let Some(tag) = tag else {
        return Err(RspError::Io(
            located("missing-type", "no Type record in the file header", path, cursor.line())
                .with_hint("the Type record must appear within the scanned header lines"),
        ));
    };
    let version = version.unwrap_or_else(|| {
        options.sink.emit(Diagnostic::MissingVersion {
            path: path.to_string(),
        });
        FORMAT_VERSION
    });
    meta.anchor = anchor.unwrap_or_else(|| {
        options.sink.emit(Diagnostic::MissingCenteredFlag {
            path: path.to_string(),
        });
        ValueAnchor::BinCenters
    });
    Ok(Header {
        version,
        tag,
        meta,
        order,
    })
}
