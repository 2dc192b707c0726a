//! Error types for the schema, type-kit and shredder layers.
//!
//! Mirrors the teacher crate's pattern: one `thiserror` enum per
//! concern plus a crate-local `Result` alias (see
//! `otlp2parquet-writer::error::WriterError` for the shape this is
//! modeled on), trimmed of the OTLP-specific error-code/URL fields
//! this crate has no use for.

use thiserror::Error;

/// Failures converting between the tagged [`crate::value::Value`] tree
/// and a primitive wire value (spec.md §4.1).
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("invalid value for logical type {logical}: {reason}")]
    InvalidValue { logical: &'static str, reason: String },

    #[error("unknown logical type name: {0}")]
    UnknownType(String),
}

/// Failures building or querying a [`crate::schema::Schema`] (spec.md §4.2).
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("unknown logical type name: {0}")]
    UnknownType(String),

    #[error("unsupported encoding {encoding} for logical type {logical}")]
    UnsupportedEncoding { encoding: String, logical: String },

    #[error("unsupported compression: {0}")]
    UnsupportedCompression(String),

    #[error("precision/scale out of range: precision={precision}, scale={scale}")]
    PrecisionScaleOutOfRange { precision: i32, scale: i32 },

    #[error("FIXED_LEN_BYTE_ARRAY field '{0}' is missing required typeLength")]
    MissingTypeLength(String),

    #[error("duplicate field path: {0}")]
    DuplicatePath(String),

    #[error("leaf field '{0}' may not have children")]
    LeafWithChildren(String),

    #[error("internal field '{0}' may not have a primitive type")]
    InternalWithPrimitiveType(String),

    #[error("field path not found: {0}")]
    PathNotFound(String),
}

/// Failures during Dremel shredding or materialization (spec.md §4.3).
#[derive(Debug, Error, PartialEq)]
pub enum ShredError {
    #[error("missing required field: {0}")]
    MissingRequired(String),

    #[error("too many values for non-repeated field: {0}")]
    TooManyValues(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Umbrella error for call sites that can hit any of the three above
/// (e.g. [`crate::schema::Schema::build`] validating a DECIMAL scale).
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Shred(#[from] ShredError),
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
