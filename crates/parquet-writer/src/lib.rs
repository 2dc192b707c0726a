//! parquet-writer - row-buffering writer for parquet-rs (spec.md §4.8).
//!
//! A synchronous batch API: `Writer::new` opens a file and emits the
//! header, `append_row` shreds and buffers records, flushing a row
//! group once `WriterProperties::row_group_size` is reached, and
//! `close` flushes the residual buffer and writes the footer.

pub mod error;
pub mod properties;
pub mod writer;

pub use error::{WriterError, WriterResult};
pub use properties::{WriterProperties, WriterPropertiesBuilder, DEFAULT_PAGE_SIZE, DEFAULT_ROW_GROUP_SIZE};
pub use writer::Writer;
