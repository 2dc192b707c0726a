//! parquet-rs - a from-scratch reader/writer for the Apache Parquet
//! columnar file format.
//!
//! This crate re-exports the public surface of its workspace members:
//! schema and record modeling ([`parquet_core`]), value codecs and
//! compression ([`parquet_codec`]), the on-disk envelope
//! ([`parquet_format`]), and the batch writer/reader
//! ([`parquet_writer`]/[`parquet_reader`]).
//!
//! ```no_run
//! use parquet_rs::schema::FieldDef;
//! use parquet_rs::{Schema, Value, Writer, WriterProperties};
//! use std::fs::File;
//!
//! let schema = Schema::build(vec![
//!     FieldDef::leaf("name", "UTF8"),
//!     FieldDef::leaf("quantity", "INT64").optional(),
//! ])
//! .unwrap();
//!
//! let file = File::create("out.parquet").unwrap();
//! let mut writer = Writer::new(file, schema, WriterProperties::default()).unwrap();
//! writer
//!     .append_row(&Value::record([
//!         ("name".to_string(), Value::from("apples")),
//!         ("quantity".to_string(), Value::Int(10)),
//!     ]))
//!     .unwrap();
//! writer.close().unwrap();
//! ```

pub use parquet_core::{
    materialize, materialize_canonical, schema, shred, types, value, CoreError, FieldDef, FieldRef, Leaf,
    PrimitiveValue, Result as CoreResult, Schema, SchemaError, ShredError, TypeError, Value,
};
pub use parquet_core::{CompressionName, EncodingName, LogicalType, OriginalType, PrimitiveType, Repetition};

pub use parquet_codec::{CodecError, CodecResult, CompressionError, CompressionResult};

pub use parquet_format::{FormatError, FormatResult};

pub use parquet_writer::{WriterError, WriterProperties, WriterPropertiesBuilder, WriterResult, Writer};

pub use parquet_reader::{Cursor, Reader, ReaderError, ReaderResult};
