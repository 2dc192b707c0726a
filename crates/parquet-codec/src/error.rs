//! Error types for the value codecs and page-body compressors
//! (spec.md §7).

use thiserror::Error;

/// Failures encoding or decoding PLAIN or RLE/bit-packed values
/// (spec.md §4.4, §4.5).
#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("invalid RLE/bit-packed stream: {0}")]
    InvalidRle(String),

    #[error("unsupported type for this encoding: {0:?}")]
    UnsupportedType(parquet_core::PrimitiveType),

    #[error("RLE/bit-packed encoding requires a bit width")]
    MissingBitWidth,

    #[error("buffer underflow: needed {needed} bytes, had {available}")]
    Truncated { needed: usize, available: usize },
}

/// Failures compressing or decompressing a page body (spec.md §4.6).
#[derive(Debug, Error, PartialEq)]
pub enum CompressionError {
    #[error("malformed snappy stream: {0}")]
    InvalidSnappy(String),

    #[error("unknown compression method: {0}")]
    UnknownMethod(String),

    #[error("truncated compressed stream: {0}")]
    Truncated(String),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
pub type CompressionResult<T> = std::result::Result<T, CompressionError>;
