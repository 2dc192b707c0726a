//! Writer errors (spec.md §7): wraps the lower layers and adds the
//! writer's own lifecycle failures.

use parquet_core::CoreError;
use parquet_format::FormatError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("writer used after close")]
    Closed,

    #[error("cannot close a file with zero rows or zero leaf fields")]
    EmptyFile,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type WriterResult<T> = std::result::Result<T, WriterError>;
