use std::sync::Arc;

use rsp_axis::BinEdges;
use rsp_core::{silent_sink, CollectingSink, Diagnostic, EngineConfig, RspError, ValueAnchor};
use rsp_io::{decode, encode_ordered, read_matrix, scan_header, ReadOptions, TypeTag, WriteOptions};
use rsp_matrix::OrderedMatrix;
use tempfile::tempdir;

fn quiet() -> ReadOptions {
    ReadOptions::default().with_sink(silent_sink())
}

fn io_failure(text: &str) -> RspError {
    let err = decode(text.as_bytes(), &quiet()).unwrap_err();
    assert!(matches!(err, RspError::Io(_)), "{err}");
    err
}

fn line_of(err: &RspError) -> Option<&str> {
    err.info().context.get("line").map(String::as_str)
}

fn streamed() -> Vec<u8> {
    let mut matrix =
        OrderedMatrix::with_axes("streamed", vec![BinEdges::linear(4, 0.0, 4.0).unwrap()]).unwrap();
    matrix.values_mut().copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
    encode_ordered(&matrix, &WriteOptions::default().with_sink(silent_sink()))
        .unwrap()
        .bytes
}

fn replace(bytes: &[u8], from: &str, to: &str) -> Vec<u8> {
    let position = bytes
        .windows(from.len())
        .position(|window| window == from.as_bytes())
        .unwrap();
    let mut replaced = bytes[..position].to_vec();
    replaced.extend_from_slice(to.as_bytes());
    replaced.extend_from_slice(&bytes[position + from.len()..]);
    replaced
}

const ORDER_ONE: &str = "Version 1\nType ResponseMatrixO1\nNM one\nCE true\n";

#[test]
fn missing_files_are_io_errors() {
    let dir = tempdir().unwrap();
    let err = read_matrix(dir.path().join("absent.rsp"), &quiet()).unwrap_err();
    assert!(matches!(&err, RspError::Io(info) if info.code == "read-failed"));
    assert!(err.info().context["path"].ends_with("absent.rsp"));
}

#[test]
fn type_record_is_required() {
    let err = io_failure("Version 1\nNM untyped\nA1 0 1\n");
    assert_eq!(err.code(), "missing-type");
    assert!(err.info().hint.is_some());
}

#[test]
fn unknown_types_name_the_line() {
    let err = io_failure("Version 1\nType ResponseMatrixO18\n");
    assert_eq!(err.code(), "unknown-type");
    assert_eq!(line_of(&err), Some("2"));
}

#[test]
fn type_beyond_the_scan_window_is_missed() {
    let mut options = quiet();
    options.config = EngineConfig {
        header_scan_lines: 2,
        ..EngineConfig::default()
    };
    let text = "Version 1\nNM late\nCE true\nType ResponseMatrixO1\nA1 0 1\n";
    let err = decode(text.as_bytes(), &options).unwrap_err();
    assert_eq!(err.code(), "missing-type");
}

#[test]
fn invalid_axes_keep_their_code() {
    let err = io_failure(&format!("{ORDER_ONE}A1 5.0 3.0 9.0\n"));
    assert_eq!(err.code(), "non-increasing-edges");
    assert_eq!(line_of(&err), Some("5"));
    assert_eq!(err.info().context.get("family").map(String::as_str), Some("configuration"));
}

#[test]
fn missing_axes_fail() {
    let text = "Type ResponseMatrixO2\nCE true\nA1 0 1 2\nN1 x\n";
    let err = io_failure(text);
    assert_eq!(err.code(), "missing-axis");
    assert_eq!(err.info().context.get("axis").map(String::as_str), Some("1"));
}

#[test]
fn axis_records_beyond_the_order_fail() {
    let err = io_failure(&format!("{ORDER_ONE}A1 0 1\nA2 0 1\n"));
    assert_eq!(err.code(), "axis-out-of-range");
}

#[test]
fn malformed_tokens_fail() {
    assert_eq!(io_failure(&format!("{ORDER_ONE}A1 0 one 2\n")).code(), "malformed-token");
    assert_eq!(io_failure("Type ResponseMatrixO1\nTS many\nA1 0 1\n").code(), "malformed-token");
    assert_eq!(io_failure("Type ResponseMatrixO1\nCE maybe\nA1 0 1\n").code(), "invalid-flag");
}

#[test]
fn rows_must_fit_the_matrix() {
    let outside = io_failure(&format!("{ORDER_ONE}A1 0 1 2\nR1 2.5 1\n"));
    assert_eq!(outside.code(), "row-outside-domain");
    assert_eq!(line_of(&outside), Some("6"));

    assert_eq!(io_failure(&format!("{ORDER_ONE}A1 0 1 2\nR1 0.5\n")).code(), "row-arity");
    assert_eq!(io_failure(&format!("{ORDER_ONE}A1 0 1 2\nR2 0.5 0.5 1\n")).code(), "row-arity");
    assert_eq!(io_failure(&format!("{ORDER_ONE}A1 0 1 2\nR1 0.5 nan\n")).code(), "non-finite-value");
}

#[test]
fn declared_order_must_match() {
    let err = io_failure("Type ResponseMatrixO1\nOD 2\nCE true\nA1 0 1\n");
    assert_eq!(err.code(), "order-mismatch");
}

#[test]
fn stream_count_must_match_the_axes() {
    let bytes = replace(&streamed(), "StartStream 4\n", "StartStream 5\n");
    let err = decode(&bytes, &quiet()).unwrap_err();
    assert_eq!(err.code(), "stream-size-mismatch");

    let bytes = replace(&streamed(), "A1 0 1 2 3 4\n", "A1 0 1 2 3\n");
    let err = decode(&bytes, &quiet()).unwrap_err();
    assert_eq!(err.code(), "stream-size-mismatch");
}

#[test]
fn truncated_streams_fail() {
    let mut bytes = streamed();
    bytes.truncate(bytes.len() - 20);
    let err = decode(&bytes, &quiet()).unwrap_err();
    assert!(matches!(&err, RspError::Io(info) if info.code == "truncated-stream"), "{err}");
}

#[test]
fn stop_stream_is_required() {
    let mut bytes = streamed();
    bytes.truncate(bytes.len() - "StopStream\n".len());
    let err = decode(&bytes, &quiet()).unwrap_err();
    assert_eq!(err.code(), "missing-stop-stream");
}

#[test]
fn stream_tags_require_a_stream_body() {
    let bytes = streamed();
    let start = bytes
        .windows("StartStream".len())
        .position(|window| window == b"StartStream")
        .unwrap();
    let err = decode(&bytes[..start], &quiet()).unwrap_err();
    assert!(matches!(&err, RspError::Io(info) if info.code == "missing-stream"), "{err}");

    let general = "Type ResponseMatrixONStream\nCE true\nAN \"x\"\nAT 1D BinEdges\nAD 0 1 2\n";
    assert_eq!(io_failure(general).code(), "missing-stream");
}

#[test]
fn stream_tagged_files_reject_rows() {
    let err = io_failure("Type ResponseMatrixO1Stream\nCE true\nA1 0 1 2\nR1 0.5 1\n");
    assert_eq!(err.code(), "unexpected-row");
    assert_eq!(line_of(&err), Some("4"));

    let general = "Type ResponseMatrixONStream\nCE true\nAN \"x\"\nAT 1D BinEdges\nAD 0 1 2\nRD 1 3\n";
    assert_eq!(io_failure(general).code(), "unexpected-row");
}

#[test]
fn size_cap_applies_to_reads() {
    let options = ReadOptions::from_config(EngineConfig {
        max_bins: 3,
        ..EngineConfig::default()
    })
    .with_sink(silent_sink());
    let err = decode(&streamed(), &options).unwrap_err();
    assert!(matches!(&err, RspError::Io(info) if info.code == "size-cap-exceeded"), "{err}");

    let err = decode(format!("{ORDER_ONE}A1 0 1 2 3 4\n").as_bytes(), &options).unwrap_err();
    assert_eq!(err.code(), "size-cap-exceeded");

    let huge = "Type ResponseMatrixO1Stream\nCE true\nA1 0 1\nStartStream 1000000000\n";
    assert_eq!(io_failure(huge).code(), "size-cap-exceeded");
}

#[test]
fn general_axis_blocks_are_validated() {
    let header = "Version 1\nType ResponseMatrixON\nCE true\n";
    assert_eq!(io_failure(&format!("{header}AT 1D BinEdges\nAD 0 1\n")).code(), "incomplete-axis");
    assert_eq!(io_failure(&format!("{header}AN \"x\"\nAT 3D Cube\nAD 0 1\n")).code(), "unknown-axis-type");
    assert_eq!(io_failure(&format!("{header}AN \"x\"\nAT 2D FISBEL\nAD 8\n")).code(), "axis-names");
    assert_eq!(
        io_failure(&format!("{header}AN \"x\"\nAT 1D BinEdges\nAD 0 1\nRD 1 4\n")).code(),
        "row-outside-domain"
    );
    assert_eq!(
        io_failure(&format!("{header}AN \"x\"\nAT 1D BinEdges\nAD 0 1\nRD 0.5 4\n")).code(),
        "malformed-token"
    );
}

#[test]
fn general_axis_blocks_must_be_closed() {
    let header = "Version 1\nType ResponseMatrixON\nCE true\n";
    let dangling = format!("{header}AN \"Energy\"\nAT 1D BinEdges\nAD 0 1 2\nAN \"Time\"\nAT 1D BinEdges\n");
    let err = io_failure(&dangling);
    assert_eq!(err.code(), "incomplete-axis");
    assert_eq!(err.info().context.get("missing").map(String::as_str), Some("AD"));

    assert_eq!(io_failure(header).code(), "missing-axis");
}

#[test]
fn missing_flags_are_reported_and_defaulted() {
    let sink = Arc::new(CollectingSink::new());
    let options = ReadOptions::default().with_sink(sink.clone());
    let text = "Type ResponseMatrixO1\nNM bare\nA1 0 1\nXX ignored record\nR1 0.5 2\n";
    let matrix = decode(text.as_bytes(), &options).unwrap().into_ordered().unwrap();
    assert_eq!(matrix.anchor(), ValueAnchor::BinCenters);
    assert_eq!(matrix.values(), &[2.0]);

    let events = sink.drain();
    assert!(events.contains(&Diagnostic::MissingVersion {
        path: "<memory>".to_string()
    }));
    assert!(events.contains(&Diagnostic::MissingCenteredFlag {
        path: "<memory>".to_string()
    }));
    assert!(events.contains(&Diagnostic::SkippedRecord {
        path: "<memory>".to_string(),
        line: 4,
        keyword: "XX".to_string(),
    }));
}

#[test]
fn header_scan_reads_metadata_only() {
    let header = scan_header(&streamed(), "memory", &quiet()).unwrap();
    assert_eq!(header.tag, TypeTag::Fixed { order: 1, stream: true });
    assert_eq!(header.meta.name, "streamed");
    assert_eq!(header.order, Some(1));
    assert_eq!(header.version, 1);
}
