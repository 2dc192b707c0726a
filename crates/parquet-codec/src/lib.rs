//! parquet-codec - Value codecs (PLAIN, RLE/bit-packed hybrid) and
//! page-body compression for parquet-rs.
//!
//! Pure allocation-only transforms between typed values and bytes: no
//! file I/O, no schema awareness beyond the primitive-type kit.
//! `parquet-format` calls into this crate to fill page bodies; this
//! crate has no knowledge of pages, chunks, or the file envelope.

pub mod compression;
pub mod error;
pub mod plain;
pub mod rle;
pub mod snappy;

pub use error::{CodecError, CodecResult, CompressionError, CompressionResult};
