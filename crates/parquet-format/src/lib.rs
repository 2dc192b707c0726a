//! parquet-format - On-disk envelope for parquet-rs.
//!
//! Bridges [`parquet_core::Schema`] and the values
//! [`parquet_codec`] encodes to the thrift compact-binary structures
//! `parquet-format-safe` generates from `parquet.thrift`: schema
//! flattening, data pages, column chunks, row groups and the
//! magic-bounded file envelope (spec.md §4.7-§4.9, §6).

pub mod bridge;
pub mod column_chunk;
pub mod error;
pub mod file;
pub mod page;
pub mod schema_convert;

pub use column_chunk::{
    build_column_metadata, check_not_external, read_column_chunk, read_column_metadata, write_column_chunk,
};
pub use error::{FormatError, FormatResult};
pub use file::{build_row_group, open, write_footer, write_header, FileFooter, FILE_VERSION, MAGIC};
pub use page::{decode_data_page, encode_data_page, read_page_header, write_page_header, EncodedPage};
pub use schema_convert::{elements_to_schema, schema_to_elements};

pub use parquet_format_safe::{ColumnChunk, ColumnMetaData, FileMetaData, PageHeader, RowGroup, SchemaElement};
