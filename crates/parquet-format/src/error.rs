//! Errors for the on-disk envelope layer (spec.md §7).
//!
//! Wraps the lower layers' errors (`CoreError` from schema/shred,
//! `CodecError`/`CompressionError` from the codec crate) alongside the
//! envelope-specific variants named in spec.md §7, plus the IO and
//! thrift-protocol failures those operations actually surface.

use parquet_codec::{CodecError, CompressionError};
use parquet_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("bad magic bytes")]
    BadMagic,

    #[error("bad footer trailer: {0}")]
    BadTrailer(String),

    #[error("unsupported file version: {0}")]
    BadVersion(i32),

    #[error("column chunk references an external file: {0}")]
    ExternalRef(String),

    #[error("unknown page type: {0}")]
    UnknownPageType(String),

    #[error("truncated while reading {0}")]
    Truncated(String),

    #[error("thrift structure out of spec: {0}")]
    Thrift(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Compression(#[from] CompressionError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type FormatResult<T> = std::result::Result<T, FormatError>;
