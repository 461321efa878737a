#![deny(missing_docs)]
#![doc = "Line-oriented text and binary-stream file grammar for response matrices, with automatic sparse/stream selection."]

/// Family-erased matrix handle.
pub mod any;
pub mod header;
mod lexer;
pub mod reader;
/// `Type` record values.
pub mod tag;
pub mod writer;

pub use any::AnyMatrix;
pub use header::{scan_header, Header, FORMAT_VERSION};
pub use reader::{
    decode, read_fixed, read_general, read_matrix, read_ordered, ReadOptions, MEMORY_SOURCE,
};
pub use tag::TypeTag;
pub use writer::{
    encode_general, encode_ordered, write_general, write_matrix, write_ordered, Encoded, Encoding,
    WriteOptions,
};
