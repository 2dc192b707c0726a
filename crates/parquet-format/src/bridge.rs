//! Conversions between `parquet-core`'s native enums and the
//! thrift-generated wire enums in `parquet-format-safe`. One `match`
//! per direction per enum, the out-of-range arm always failing with
//! [`FormatError::Thrift`] rather than panicking.

use parquet_core::{CompressionName, EncodingName, OriginalType, PrimitiveType, Repetition};
use parquet_format_safe::{CompressionCodec, ConvertedType, Encoding, FieldRepetitionType, Type as TType};

use crate::error::{FormatError, FormatResult};

pub fn primitive_to_thrift(primitive: PrimitiveType) -> TType {
    match primitive {
        PrimitiveType::Boolean => TType::BOOLEAN,
        PrimitiveType::Int32 => TType::INT32,
        PrimitiveType::Int64 => TType::INT64,
        PrimitiveType::Int96 => TType::INT96,
        PrimitiveType::Float => TType::FLOAT,
        PrimitiveType::Double => TType::DOUBLE,
        PrimitiveType::ByteArray => TType::BYTE_ARRAY,
        PrimitiveType::FixedLenByteArray => TType::FIXED_LEN_BYTE_ARRAY,
    }
}

pub fn thrift_to_primitive(ty: TType) -> FormatResult<PrimitiveType> {
    Ok(match ty {
        TType::BOOLEAN => PrimitiveType::Boolean,
        TType::INT32 => PrimitiveType::Int32,
        TType::INT64 => PrimitiveType::Int64,
        TType::INT96 => PrimitiveType::Int96,
        TType::FLOAT => PrimitiveType::Float,
        TType::DOUBLE => PrimitiveType::Double,
        TType::BYTE_ARRAY => PrimitiveType::ByteArray,
        TType::FIXED_LEN_BYTE_ARRAY => PrimitiveType::FixedLenByteArray,
        other => return Err(FormatError::Thrift(format!("unknown physical type {other:?}"))),
    })
}

pub fn repetition_to_thrift(repetition: Repetition) -> FieldRepetitionType {
    match repetition {
        Repetition::Required => FieldRepetitionType::REQUIRED,
        Repetition::Optional => FieldRepetitionType::OPTIONAL,
        Repetition::Repeated => FieldRepetitionType::REPEATED,
    }
}

pub fn thrift_to_repetition(repetition: FieldRepetitionType) -> FormatResult<Repetition> {
    Ok(match repetition {
        FieldRepetitionType::REQUIRED => Repetition::Required,
        FieldRepetitionType::OPTIONAL => Repetition::Optional,
        FieldRepetitionType::REPEATED => Repetition::Repeated,
        other => return Err(FormatError::Thrift(format!("unknown repetition type {other:?}"))),
    })
}

pub fn encoding_to_thrift(encoding: EncodingName) -> Encoding {
    match encoding {
        EncodingName::Plain => Encoding::PLAIN,
        EncodingName::Rle => Encoding::RLE,
    }
}

pub fn thrift_to_encoding(encoding: Encoding) -> FormatResult<EncodingName> {
    Ok(match encoding {
        Encoding::PLAIN => EncodingName::Plain,
        Encoding::RLE => EncodingName::Rle,
        other => return Err(FormatError::Thrift(format!("unsupported value encoding {other:?}"))),
    })
}

pub fn compression_to_thrift(compression: CompressionName) -> CompressionCodec {
    match compression {
        CompressionName::Uncompressed => CompressionCodec::UNCOMPRESSED,
        CompressionName::Gzip => CompressionCodec::GZIP,
        CompressionName::Snappy => CompressionCodec::SNAPPY,
        CompressionName::Lzo => CompressionCodec::LZO,
        CompressionName::Brotli => CompressionCodec::BROTLI,
        CompressionName::Lz4 => CompressionCodec::LZ4,
    }
}

pub fn thrift_to_compression(codec: CompressionCodec) -> FormatResult<CompressionName> {
    Ok(match codec {
        CompressionCodec::UNCOMPRESSED => CompressionName::Uncompressed,
        CompressionCodec::GZIP => CompressionName::Gzip,
        CompressionCodec::SNAPPY => CompressionName::Snappy,
        CompressionCodec::LZO => CompressionName::Lzo,
        CompressionCodec::BROTLI => CompressionName::Brotli,
        CompressionCodec::LZ4 => CompressionName::Lz4,
        other => return Err(FormatError::Thrift(format!("unsupported compression codec {other:?}"))),
    })
}

pub fn original_to_converted(original: OriginalType) -> ConvertedType {
    match original {
        OriginalType::Utf8 => ConvertedType::UTF8,
        OriginalType::Enum => ConvertedType::ENUM,
        OriginalType::Json => ConvertedType::JSON,
        OriginalType::Bson => ConvertedType::BSON,
        OriginalType::Date => ConvertedType::DATE,
        OriginalType::TimeMillis => ConvertedType::TIME_MILLIS,
        OriginalType::TimeMicros => ConvertedType::TIME_MICROS,
        OriginalType::TimestampMillis => ConvertedType::TIMESTAMP_MILLIS,
        OriginalType::TimestampMicros => ConvertedType::TIMESTAMP_MICROS,
        OriginalType::Uint8 => ConvertedType::UINT_8,
        OriginalType::Uint16 => ConvertedType::UINT_16,
        OriginalType::Uint32 => ConvertedType::UINT_32,
        OriginalType::Uint64 => ConvertedType::UINT_64,
        OriginalType::Int8 => ConvertedType::INT_8,
        OriginalType::Int16 => ConvertedType::INT_16,
        OriginalType::Int32 => ConvertedType::INT_32,
        OriginalType::Int64 => ConvertedType::INT_64,
        OriginalType::Interval => ConvertedType::INTERVAL,
        OriginalType::Decimal => ConvertedType::DECIMAL,
        OriginalType::List => ConvertedType::LIST,
        OriginalType::Map => ConvertedType::MAP,
        OriginalType::MapKeyValue => ConvertedType::MAP_KEY_VALUE,
    }
}

pub fn converted_to_original(converted: ConvertedType) -> FormatResult<OriginalType> {
    Ok(match converted {
        ConvertedType::UTF8 => OriginalType::Utf8,
        ConvertedType::ENUM => OriginalType::Enum,
        ConvertedType::JSON => OriginalType::Json,
        ConvertedType::BSON => OriginalType::Bson,
        ConvertedType::DATE => OriginalType::Date,
        ConvertedType::TIME_MILLIS => OriginalType::TimeMillis,
        ConvertedType::TIME_MICROS => OriginalType::TimeMicros,
        ConvertedType::TIMESTAMP_MILLIS => OriginalType::TimestampMillis,
        ConvertedType::TIMESTAMP_MICROS => OriginalType::TimestampMicros,
        ConvertedType::UINT_8 => OriginalType::Uint8,
        ConvertedType::UINT_16 => OriginalType::Uint16,
        ConvertedType::UINT_32 => OriginalType::Uint32,
        ConvertedType::UINT_64 => OriginalType::Uint64,
        ConvertedType::INT_8 => OriginalType::Int8,
        ConvertedType::INT_16 => OriginalType::Int16,
        ConvertedType::INT_32 => OriginalType::Int32,
        ConvertedType::INT_64 => OriginalType::Int64,
        ConvertedType::INTERVAL => OriginalType::Interval,
        ConvertedType::DECIMAL => OriginalType::Decimal,
        ConvertedType::LIST => OriginalType::List,
        ConvertedType::MAP => OriginalType::Map,
        ConvertedType::MAP_KEY_VALUE => OriginalType::MapKeyValue,
        other => return Err(FormatError::Thrift(format!("unknown converted type {other:?}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_round_trips_through_thrift() {
        for p in [
            PrimitiveType::Boolean,
            PrimitiveType::Int32,
            PrimitiveType::Int64,
            PrimitiveType::Int96,
            PrimitiveType::Float,
            PrimitiveType::Double,
            PrimitiveType::ByteArray,
            PrimitiveType::FixedLenByteArray,
        ] {
            assert_eq!(thrift_to_primitive(primitive_to_thrift(p)).unwrap(), p);
        }
    }

    #[test]
    fn repetition_round_trips_through_thrift() {
        for r in [Repetition::Required, Repetition::Optional, Repetition::Repeated] {
            assert_eq!(thrift_to_repetition(repetition_to_thrift(r)).unwrap(), r);
        }
    }

    #[test]
    fn compression_round_trips_through_thrift() {
        for c in [
            CompressionName::Uncompressed,
            CompressionName::Gzip,
            CompressionName::Snappy,
            CompressionName::Lzo,
            CompressionName::Brotli,
            CompressionName::Lz4,
        ] {
            assert_eq!(thrift_to_compression(compression_to_thrift(c)).unwrap(), c);
        }
    }

    #[test]
    fn original_type_round_trips_through_converted_type() {
        for o in [
            OriginalType::Utf8,
            OriginalType::Decimal,
            OriginalType::List,
            OriginalType::Map,
            OriginalType::MapKeyValue,
            OriginalType::TimestampMicros,
        ] {
            assert_eq!(converted_to_original(original_to_converted(o)).unwrap(), o);
        }
    }
}
