//! The wire-level type kit (spec.md §4.1): primitive types, the
//! logical-type overlay, and repetition.

use std::fmt;

/// The fixed set of wire-level primitive types (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::Boolean => "BOOLEAN",
            PrimitiveType::Int32 => "INT32",
            PrimitiveType::Int64 => "INT64",
            PrimitiveType::Int96 => "INT96",
            PrimitiveType::Float => "FLOAT",
            PrimitiveType::Double => "DOUBLE",
            PrimitiveType::ByteArray => "BYTE_ARRAY",
            PrimitiveType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
        };
        f.write_str(s)
    }
}

/// Repetition type of a schema node (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    Required,
    Optional,
    Repeated,
}

/// The logical/original type name as written in a schema definition's
/// `type` option (spec.md §3). `Decimal` carries precision/scale and is
/// resolved onto a primitive-specific [`LogicalType`] variant by
/// [`resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginalType {
    Utf8,
    Enum,
    Json,
    Bson,
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Interval,
    Decimal,
    List,
    Map,
    MapKeyValue,
}

impl OriginalType {
    /// Parses a schema field's `type` option. Returns `None` for
    /// primitive-only fields (no original type overlay) — the caller
    /// is expected to have already matched the bare primitive names.
    pub fn parse(name: &str) -> Option<OriginalType> {
        Some(match name {
            "UTF8" => OriginalType::Utf8,
            "ENUM" => OriginalType::Enum,
            "JSON" => OriginalType::Json,
            "BSON" => OriginalType::Bson,
            "DATE" => OriginalType::Date,
            "TIME_MILLIS" => OriginalType::TimeMillis,
            "TIME_MICROS" => OriginalType::TimeMicros,
            "TIMESTAMP_MILLIS" => OriginalType::TimestampMillis,
            "TIMESTAMP_MICROS" => OriginalType::TimestampMicros,
            "UINT_8" => OriginalType::Uint8,
            "UINT_16" => OriginalType::Uint16,
            "UINT_32" => OriginalType::Uint32,
            "UINT_64" => OriginalType::Uint64,
            "INT_8" => OriginalType::Int8,
            "INT_16" => OriginalType::Int16,
            "INT_32" => OriginalType::Int32,
            "INT_64" => OriginalType::Int64,
            "INTERVAL" => OriginalType::Interval,
            "DECIMAL" => OriginalType::Decimal,
            "LIST" => OriginalType::List,
            "MAP" => OriginalType::Map,
            "MAP_KEY_VALUE" => OriginalType::MapKeyValue,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            OriginalType::Utf8 => "UTF8",
            OriginalType::Enum => "ENUM",
            OriginalType::Json => "JSON",
            OriginalType::Bson => "BSON",
            OriginalType::Date => "DATE",
            OriginalType::TimeMillis => "TIME_MILLIS",
            OriginalType::TimeMicros => "TIME_MICROS",
            OriginalType::TimestampMillis => "TIMESTAMP_MILLIS",
            OriginalType::TimestampMicros => "TIMESTAMP_MICROS",
            OriginalType::Uint8 => "UINT_8",
            OriginalType::Uint16 => "UINT_16",
            OriginalType::Uint32 => "UINT_32",
            OriginalType::Uint64 => "UINT_64",
            OriginalType::Int8 => "INT_8",
            OriginalType::Int16 => "INT_16",
            OriginalType::Int32 => "INT_32",
            OriginalType::Int64 => "INT_64",
            OriginalType::Interval => "INTERVAL",
            OriginalType::Decimal => "DECIMAL",
            OriginalType::List => "LIST",
            OriginalType::Map => "MAP",
            OriginalType::MapKeyValue => "MAP_KEY_VALUE",
        }
    }
}

/// The resolved logical type attached to a leaf: `original` overlaid
/// onto a concrete primitive carrier (spec.md §4.1). DECIMAL splits
/// into four variants keyed by carrier, matching `resolve`'s mapping
/// of `DECIMAL` onto `DECIMAL_32/64/FIXED/BINARY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalType {
    Utf8,
    Enum,
    Json,
    Bson,
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Interval,
    Decimal32 { scale: i32 },
    Decimal64 { scale: i32 },
    DecimalFixed { scale: i32, length: i32 },
    DecimalBinary { scale: i32 },
}

impl LogicalType {
    /// `resolve(original, primitive) -> logical` from spec.md §4.1.
    pub fn resolve(
        original: OriginalType,
        primitive: PrimitiveType,
        scale: Option<i32>,
        type_length: Option<i32>,
    ) -> Result<LogicalType, crate::error::TypeError> {
        use crate::error::TypeError;

        Ok(match original {
            OriginalType::Decimal => {
                let scale = scale.unwrap_or(0);
                match primitive {
                    PrimitiveType::Int32 => LogicalType::Decimal32 { scale },
                    PrimitiveType::Int64 => LogicalType::Decimal64 { scale },
                    PrimitiveType::FixedLenByteArray => LogicalType::DecimalFixed {
                        scale,
                        length: type_length.ok_or_else(|| TypeError::InvalidValue {
                            logical: "DECIMAL",
                            reason: "FIXED-LEN-BYTES-backed DECIMAL requires typeLength".into(),
                        })?,
                    },
                    PrimitiveType::ByteArray => LogicalType::DecimalBinary { scale },
                    other => {
                        return Err(TypeError::InvalidValue {
                            logical: "DECIMAL",
                            reason: format!("unsupported carrier primitive {other}"),
                        })
                    }
                }
            }
            OriginalType::Utf8 => LogicalType::Utf8,
            OriginalType::Enum => LogicalType::Enum,
            OriginalType::Json => LogicalType::Json,
            OriginalType::Bson => LogicalType::Bson,
            OriginalType::Date => LogicalType::Date,
            OriginalType::TimeMillis => LogicalType::TimeMillis,
            OriginalType::TimeMicros => LogicalType::TimeMicros,
            OriginalType::TimestampMillis => LogicalType::TimestampMillis,
            OriginalType::TimestampMicros => LogicalType::TimestampMicros,
            OriginalType::Uint8 => LogicalType::Uint8,
            OriginalType::Uint16 => LogicalType::Uint16,
            OriginalType::Uint32 => LogicalType::Uint32,
            OriginalType::Uint64 => LogicalType::Uint64,
            OriginalType::Int8 => LogicalType::Int8,
            OriginalType::Int16 => LogicalType::Int16,
            OriginalType::Int32 => LogicalType::Int32,
            OriginalType::Int64 => LogicalType::Int64,
            OriginalType::Interval => LogicalType::Interval,
            OriginalType::List | OriginalType::Map | OriginalType::MapKeyValue => {
                return Err(TypeError::InvalidValue {
                    logical: original.name(),
                    reason: "structural type has no primitive-carried logical conversion".into(),
                })
            }
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogicalType::Utf8 => "UTF8",
            LogicalType::Enum => "ENUM",
            LogicalType::Json => "JSON",
            LogicalType::Bson => "BSON",
            LogicalType::Date => "DATE",
            LogicalType::TimeMillis => "TIME_MILLIS",
            LogicalType::TimeMicros => "TIME_MICROS",
            LogicalType::TimestampMillis => "TIMESTAMP_MILLIS",
            LogicalType::TimestampMicros => "TIMESTAMP_MICROS",
            LogicalType::Uint8 => "UINT_8",
            LogicalType::Uint16 => "UINT_16",
            LogicalType::Uint32 => "UINT_32",
            LogicalType::Uint64 => "UINT_64",
            LogicalType::Int8 => "INT_8",
            LogicalType::Int16 => "INT_16",
            LogicalType::Int32 => "INT_32",
            LogicalType::Int64 => "INT_64",
            LogicalType::Interval => "INTERVAL",
            LogicalType::Decimal32 { .. }
            | LogicalType::Decimal64 { .. }
            | LogicalType::DecimalFixed { .. }
            | LogicalType::DecimalBinary { .. } => "DECIMAL",
        }
    }
}

/// Value encoding chosen for a leaf column (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncodingName {
    Plain,
    Rle,
}

impl EncodingName {
    pub fn parse(name: &str) -> Option<EncodingName> {
        match name {
            "PLAIN" => Some(EncodingName::Plain),
            "RLE" => Some(EncodingName::Rle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EncodingName::Plain => "PLAIN",
            EncodingName::Rle => "RLE",
        }
    }
}

/// Page/column-chunk compression codec (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressionName {
    Uncompressed,
    Gzip,
    Snappy,
    Lzo,
    Brotli,
    Lz4,
}

impl CompressionName {
    pub fn parse(name: &str) -> Option<CompressionName> {
        match name {
            "UNCOMPRESSED" => Some(CompressionName::Uncompressed),
            "GZIP" => Some(CompressionName::Gzip),
            "SNAPPY" => Some(CompressionName::Snappy),
            "LZO" => Some(CompressionName::Lzo),
            "BROTLI" => Some(CompressionName::Brotli),
            "LZ4" => Some(CompressionName::Lz4),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionName::Uncompressed => "UNCOMPRESSED",
            CompressionName::Gzip => "GZIP",
            CompressionName::Snappy => "SNAPPY",
            CompressionName::Lzo => "LZO",
            CompressionName::Brotli => "BROTLI",
            CompressionName::Lz4 => "LZ4",
        }
    }
}
