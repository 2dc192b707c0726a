//! parquet-core - Schema model, logical-type conversions and Dremel
//! shredding for parquet-rs.
//!
//! Pure domain logic only: no file I/O, no compression, no wire
//! format. `parquet-format` builds the on-disk envelope on top of
//! [`schema::Schema`] and [`shred::RowBuffer`]; `parquet-codec` encodes
//! the primitive values this crate produces.

pub mod conversions;
pub mod error;
pub mod schema;
pub mod shred;
pub mod types;
pub mod value;

pub use error::{CoreError, Result, SchemaError, ShredError, TypeError};
pub use schema::{FieldDef, FieldRef, Leaf, Schema};
pub use shred::{materialize, materialize_canonical, shred, ColumnData, RowBuffer};
pub use types::{CompressionName, EncodingName, LogicalType, OriginalType, PrimitiveType, Repetition};
pub use value::{PrimitiveValue, Value};
