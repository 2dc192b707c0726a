//! The dynamic record shape records arrive in, and the primitive wire
//! values the type kit converts them to and from.
//!
//! spec.md §9 flags the source's heterogeneous record trees as needing
//! re-architecture under a typed language; this is the "tagged value
//! tree" strategy it suggests.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

/// A value anywhere in a record tree: a field's contents before
/// shredding, or a freshly materialized field after assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    List(Vec<Value>),
    /// Key/value pairs in insertion order (this is a dynamic record
    /// tree, not a schema-typed map; order matters for round-tripping).
    Map(Vec<(Value, Value)>),
    /// Named fields in declaration order.
    Record(Vec<(String, Value)>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_record(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a named field on a `Record` value. Returns `None` both
    /// when `self` isn't a record and when the field is absent —
    /// callers that need to distinguish "absent record" from "absent
    /// field" check `is_null()` first, per spec.md §4.3 step 1.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record()?.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn record<I: IntoIterator<Item = (String, Value)>>(fields: I) -> Value {
        Value::Record(fields.into_iter().collect())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Bytes(v.as_bytes().to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Bytes(v.into_bytes())
    }
}

/// A value already mapped onto one of the eight wire primitive types
/// (spec.md §3), ready for PLAIN/RLE encoding. This is the boundary
/// `parquet-codec` consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    /// Sign-magnitude `(low64, hi32)` pair; see spec.md §4.1's INT96 note.
    Int96(i64, u32),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveValue::Bool(v) => write!(f, "{v}"),
            PrimitiveValue::Int32(v) => write!(f, "{v}"),
            PrimitiveValue::Int64(v) => write!(f, "{v}"),
            PrimitiveValue::Int96(lo, hi) => write!(f, "({lo}, {hi})"),
            PrimitiveValue::Float(v) => write!(f, "{v}"),
            PrimitiveValue::Double(v) => write!(f, "{v}"),
            PrimitiveValue::Bytes(v) => write!(f, "{v:?}"),
            PrimitiveValue::FixedLenByteArray(v) => write!(f, "{v:?}"),
        }
    }
}
