//! parquet-reader - file-open and lazy cursor reader for parquet-rs
//! (spec.md §4.9).
//!
//! `Reader::open` validates the envelope and decodes the footer;
//! `Reader::get_cursor` returns a lazy, per-row-group materializing
//! iterator with optional column projection.

pub mod cursor;
pub mod error;
pub mod reader;

pub use cursor::Cursor;
pub use error::{ReaderError, ReaderResult};
pub use reader::Reader;
