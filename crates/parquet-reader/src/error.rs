//! Reader errors (spec.md §7): wraps the lower layers plus the
//! reader's own lifecycle failures.

use parquet_core::CoreError;
use parquet_format::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("reader used after close")]
    Closed,

    #[error("column path {0:?} does not match any field in the schema")]
    UnknownColumn(Vec<String>),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ReaderResult<T> = std::result::Result<T, ReaderError>;
