//! `toPrimitive`/`fromPrimitive` conversions for every non-structural
//! logical type (spec.md §4.1). LIST/MAP/MAP_KEY_VALUE are structural
//! sugar handled entirely by the shredder (spec.md §4.3) and never
//! reach this module.

use crate::error::TypeError;
use crate::types::{LogicalType, PrimitiveType};
use crate::value::{PrimitiveValue, Value};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

const DAY_MILLIS: i64 = 86_400_000;

fn invalid(logical: &'static str, reason: impl Into<String>) -> TypeError {
    TypeError::InvalidValue {
        logical,
        reason: reason.into(),
    }
}

fn expect_bytes(logical: &'static str, value: &Value) -> Result<&[u8], TypeError> {
    match value {
        Value::Bytes(b) => Ok(b),
        other => Err(invalid(logical, format!("expected bytes, got {other:?}"))),
    }
}

fn expect_int(logical: &'static str, value: &Value) -> Result<i64, TypeError> {
    match value {
        Value::Int(v) => Ok(*v),
        other => Err(invalid(logical, format!("expected an integer, got {other:?}"))),
    }
}

fn expect_float(logical: &'static str, value: &Value) -> Result<f64, TypeError> {
    match value {
        Value::Float(v) => Ok(*v),
        Value::Int(v) => Ok(*v as f64),
        other => Err(invalid(logical, format!("expected a number, got {other:?}"))),
    }
}

fn range_checked_i32(logical: &'static str, v: i64, lo: i64, hi: i64) -> Result<i32, TypeError> {
    if v < lo || v > hi {
        return Err(invalid(logical, format!("{v} out of range [{lo}, {hi}]")));
    }
    Ok(v as i32)
}

/// `toPrimitive(logical, value, scale?, length?) -> primitive`.
pub fn to_primitive(logical: &LogicalType, value: &Value) -> Result<PrimitiveValue, TypeError> {
    use LogicalType::*;
    Ok(match logical {
        Utf8 | Enum | Json => {
            let bytes = expect_bytes(logical.name(), value)?;
            std::str::from_utf8(bytes)
                .map_err(|e| invalid(logical.name(), format!("not valid UTF-8: {e}")))?;
            PrimitiveValue::Bytes(bytes.to_vec())
        }
        Bson => PrimitiveValue::Bytes(expect_bytes("BSON", value)?.to_vec()),
        Date => {
            let days = match value {
                Value::Date(d) => (*d - epoch_date()).num_days(),
                Value::Int(millis) => millis.div_euclid(DAY_MILLIS),
                other => return Err(invalid("DATE", format!("expected a date, got {other:?}"))),
            };
            PrimitiveValue::Int32(range_checked_i32("DATE", days, i32::MIN as i64, i32::MAX as i64)?)
        }
        TimeMillis => PrimitiveValue::Int32(range_checked_i32(
            "TIME_MILLIS",
            expect_int("TIME_MILLIS", value)?,
            0,
            DAY_MILLIS - 1,
        )?),
        TimeMicros => PrimitiveValue::Int64(expect_int("TIME_MICROS", value)?),
        TimestampMillis => {
            let millis = match value {
                Value::Timestamp(ts) => ts.timestamp_millis(),
                Value::Int(v) => *v,
                other => return Err(invalid("TIMESTAMP_MILLIS", format!("{other:?}"))),
            };
            PrimitiveValue::Int64(millis)
        }
        TimestampMicros => {
            let micros = match value {
                Value::Timestamp(ts) => ts.timestamp_micros(),
                Value::Int(v) => *v,
                other => return Err(invalid("TIMESTAMP_MICROS", format!("{other:?}"))),
            };
            PrimitiveValue::Int64(micros)
        }
        Int8 => PrimitiveValue::Int32(range_checked_i32(
            "INT_8",
            expect_int("INT_8", value)?,
            i8::MIN as i64,
            i8::MAX as i64,
        )?),
        Int16 => PrimitiveValue::Int32(range_checked_i32(
            "INT_16",
            expect_int("INT_16", value)?,
            i16::MIN as i64,
            i16::MAX as i64,
        )?),
        Int32 => PrimitiveValue::Int32(range_checked_i32(
            "INT_32",
            expect_int("INT_32", value)?,
            i32::MIN as i64,
            i32::MAX as i64,
        )?),
        Int64 => PrimitiveValue::Int64(expect_int("INT_64", value)?),
        Uint8 => PrimitiveValue::Int32(range_checked_i32("UINT_8", expect_int("UINT_8", value)?, 0, u8::MAX as i64)?),
        Uint16 => {
            PrimitiveValue::Int32(range_checked_i32("UINT_16", expect_int("UINT_16", value)?, 0, u16::MAX as i64)?)
        }
        Uint32 => {
            let v = expect_int("UINT_32", value)?;
            if !(0..=u32::MAX as i64).contains(&v) {
                return Err(invalid("UINT_32", format!("{v} out of range")));
            }
            PrimitiveValue::Int32(v as u32 as i32)
        }
        Uint64 => {
            let v = expect_int("UINT_64", value)?;
            if v < 0 {
                return Err(invalid("UINT_64", format!("{v} out of range")));
            }
            PrimitiveValue::Int64(v as u64 as i64)
        }
        Interval => {
            let parts = match value {
                Value::List(l) if l.len() == 3 => l,
                other => return Err(invalid("INTERVAL", format!("expected [months, days, millis], got {other:?}"))),
            };
            let mut bytes = Vec::with_capacity(12);
            for part in parts {
                let v = expect_int("INTERVAL", part)?;
                if !(0..=u32::MAX as i64).contains(&v) {
                    return Err(invalid("INTERVAL", format!("component {v} out of u32 range")));
                }
                bytes.extend_from_slice(&(v as u32).to_le_bytes());
            }
            PrimitiveValue::FixedLenByteArray(bytes)
        }
        Decimal32 { scale } => PrimitiveValue::Int32(scaled_decimal(value, *scale)? as i32),
        Decimal64 { scale } => PrimitiveValue::Int64(scaled_decimal(value, *scale)? as i64),
        DecimalFixed { scale, length } => {
            let scaled = scaled_decimal(value, *scale)?;
            PrimitiveValue::FixedLenByteArray(be_bytes_fixed(scaled, *length as usize))
        }
        DecimalBinary { scale } => {
            let scaled = scaled_decimal(value, *scale)?;
            PrimitiveValue::Bytes(be_bytes_minimal(scaled))
        }
    })
}

/// `fromPrimitive?(logical, value, scale?, length?) -> native`.
pub fn from_primitive(logical: &LogicalType, value: &PrimitiveValue) -> Result<Value, TypeError> {
    use LogicalType::*;

    fn as_bytes<'a>(logical: &'static str, v: &'a PrimitiveValue) -> Result<&'a [u8], TypeError> {
        match v {
            PrimitiveValue::Bytes(b) | PrimitiveValue::FixedLenByteArray(b) => Ok(b),
            other => Err(invalid(logical, format!("expected bytes primitive, got {other}"))),
        }
    }

    fn as_i32(logical: &'static str, v: &PrimitiveValue) -> Result<i32, TypeError> {
        match v {
            PrimitiveValue::Int32(i) => Ok(*i),
            other => Err(invalid(logical, format!("expected INT32 primitive, got {other}"))),
        }
    }

    fn as_i64(logical: &'static str, v: &PrimitiveValue) -> Result<i64, TypeError> {
        match v {
            PrimitiveValue::Int64(i) => Ok(*i),
            other => Err(invalid(logical, format!("expected INT64 primitive, got {other}"))),
        }
    }

    Ok(match logical {
        Utf8 | Enum | Json => {
            let bytes = as_bytes(logical.name(), value)?;
            std::str::from_utf8(bytes)
                .map_err(|e| invalid(logical.name(), format!("not valid UTF-8: {e}")))?;
            Value::Bytes(bytes.to_vec())
        }
        Bson => Value::Bytes(as_bytes("BSON", value)?.to_vec()),
        Date => Value::Date(epoch_date() + chrono::Duration::days(as_i32("DATE", value)? as i64)),
        TimeMillis => Value::Int(as_i32("TIME_MILLIS", value)? as i64),
        TimeMicros => Value::Int(as_i64("TIME_MICROS", value)?),
        TimestampMillis => Value::Timestamp(millis_to_datetime(as_i64("TIMESTAMP_MILLIS", value)?)?),
        TimestampMicros => Value::Timestamp(micros_to_datetime(as_i64("TIMESTAMP_MICROS", value)?)?),
        Int8 | Int16 | Int32 => Value::Int(as_i32(logical.name(), value)? as i64),
        Int64 => Value::Int(as_i64("INT_64", value)?),
        Uint8 => Value::Int(as_i32("UINT_8", value)? as u32 as i64 & 0xFF),
        Uint16 => Value::Int(as_i32("UINT_16", value)? as u32 as i64 & 0xFFFF),
        Uint32 => Value::Int(as_i32("UINT_32", value)? as u32 as i64),
        Uint64 => Value::Int(as_i64("UINT_64", value)? as u64 as i64),
        Interval => {
            let bytes = as_bytes("INTERVAL", value)?;
            if bytes.len() != 12 {
                return Err(invalid("INTERVAL", format!("expected 12 bytes, got {}", bytes.len())));
            }
            let parts = (0..3)
                .map(|i| {
                    let mut arr = [0u8; 4];
                    arr.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
                    Value::Int(u32::from_le_bytes(arr) as i64)
                })
                .collect();
            Value::List(parts)
        }
        Decimal32 { scale } => Value::Float(as_i32("DECIMAL", value)? as f64 / 10f64.powi(*scale)),
        Decimal64 { scale } => Value::Float(as_i64("DECIMAL", value)? as f64 / 10f64.powi(*scale)),
        DecimalFixed { scale, .. } => {
            let bytes = as_bytes("DECIMAL", value)?;
            Value::Float(decode_be_bytes(bytes) as f64 / 10f64.powi(*scale))
        }
        DecimalBinary { scale } => {
            let bytes = as_bytes("DECIMAL", value)?;
            Value::Float(decode_be_bytes(bytes) as f64 / 10f64.powi(*scale))
        }
    })
}

fn scaled_decimal(value: &Value, scale: i32) -> Result<i128, TypeError> {
    let v = expect_float("DECIMAL", value)?;
    Ok((v * 10f64.powi(scale)).trunc() as i128)
}

fn be_bytes_fixed(value: i128, length: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    full[full.len() - length..].to_vec()
}

fn be_bytes_minimal(value: i128) -> Vec<u8> {
    let full = value.to_be_bytes();
    let sign_byte = if value.is_negative() { 0xFFu8 } else { 0x00u8 };
    let mut start = 0;
    while start + 1 < full.len() && full[start] == sign_byte && (full[start + 1] & 0x80 == sign_byte & 0x80) {
        start += 1;
    }
    full[start..].to_vec()
}

fn decode_be_bytes(bytes: &[u8]) -> i128 {
    let sign_byte = if bytes.first().is_some_and(|b| b & 0x80 != 0) { 0xFFu8 } else { 0 };
    let mut full = [sign_byte; 16];
    let start = 16 - bytes.len();
    full[start..].copy_from_slice(bytes);
    i128::from_be_bytes(full)
}

/// Identity conversion used for leaves with no original type: the
/// value tree entry maps straight onto the primitive carrier.
pub fn identity_to_primitive(primitive: PrimitiveType, value: &Value, type_length: Option<i32>) -> Result<PrimitiveValue, TypeError> {
    Ok(match primitive {
        PrimitiveType::Boolean => match value {
            Value::Bool(b) => PrimitiveValue::Bool(*b),
            other => return Err(invalid("BOOLEAN", format!("{other:?}"))),
        },
        PrimitiveType::Int32 => PrimitiveValue::Int32(range_checked_i32(
            "INT32",
            expect_int("INT32", value)?,
            i32::MIN as i64,
            i32::MAX as i64,
        )?),
        PrimitiveType::Int64 => PrimitiveValue::Int64(expect_int("INT64", value)?),
        PrimitiveType::Int96 => {
            // Known limitation (spec.md §4.1, §9): the 96-bit carrier is
            // populated from a 64-bit host integer, sign-extended into
            // the high 4 bytes rather than a true 96-bit magnitude.
            let v = expect_int("INT96", value)?;
            let hi = if v < 0 { 0xFFFF_FFFFu32 } else { 0u32 };
            PrimitiveValue::Int96(v, hi)
        }
        PrimitiveType::Float => PrimitiveValue::Float(expect_float("FLOAT", value)? as f32),
        PrimitiveType::Double => PrimitiveValue::Double(expect_float("DOUBLE", value)?),
        PrimitiveType::ByteArray => PrimitiveValue::Bytes(expect_bytes("BYTE_ARRAY", value)?.to_vec()),
        PrimitiveType::FixedLenByteArray => {
            let bytes = expect_bytes("FIXED_LEN_BYTE_ARRAY", value)?;
            if let Some(len) = type_length {
                if bytes.len() != len as usize {
                    return Err(invalid(
                        "FIXED_LEN_BYTE_ARRAY",
                        format!("expected {len} bytes, got {}", bytes.len()),
                    ));
                }
            }
            PrimitiveValue::FixedLenByteArray(bytes.to_vec())
        }
    })
}

/// Identity decode counterpart to [`identity_to_primitive`].
pub fn identity_from_primitive(value: &PrimitiveValue) -> Value {
    match value {
        PrimitiveValue::Bool(b) => Value::Bool(*b),
        PrimitiveValue::Int32(i) => Value::Int(*i as i64),
        PrimitiveValue::Int64(i) => Value::Int(*i),
        PrimitiveValue::Int96(lo, _hi) => Value::Int(*lo),
        PrimitiveValue::Float(f) => Value::Float(*f as f64),
        PrimitiveValue::Double(d) => Value::Float(*d),
        PrimitiveValue::Bytes(b) | PrimitiveValue::FixedLenByteArray(b) => Value::Bytes(b.clone()),
    }
}

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date")
}

fn millis_to_datetime(millis: i64) -> Result<DateTime<Utc>, TypeError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| invalid("TIMESTAMP_MILLIS", format!("{millis} is out of range")))
}

fn micros_to_datetime(micros: i64) -> Result<DateTime<Utc>, TypeError> {
    let seconds = micros.div_euclid(1_000_000);
    let nanos = micros.rem_euclid(1_000_000) * 1_000;
    Utc.timestamp_opt(seconds, nanos as u32)
        .single()
        .ok_or_else(|| invalid("TIMESTAMP_MICROS", format!("{micros} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_round_trips() {
        let logical = LogicalType::Utf8;
        let v = Value::from("hello");
        let p = to_primitive(&logical, &v).unwrap();
        assert_eq!(p, PrimitiveValue::Bytes(b"hello".to_vec()));
        assert_eq!(from_primitive(&logical, &p).unwrap(), v);
    }

    #[test]
    fn date_round_trips_via_days() {
        let logical = LogicalType::Date;
        let days = 19000;
        let expected = epoch_date() + chrono::Duration::days(days);
        let p = to_primitive(&logical, &Value::Date(expected)).unwrap();
        assert_eq!(p, PrimitiveValue::Int32(days as i32));
        assert_eq!(from_primitive(&logical, &p).unwrap(), Value::Date(expected));
    }

    #[test]
    fn timestamp_micros_round_trips() {
        let logical = LogicalType::TimestampMicros;
        let ts = Utc.timestamp_opt(1_700_000_000, 123_000).unwrap();
        let p = to_primitive(&logical, &Value::Timestamp(ts)).unwrap();
        let back = from_primitive(&logical, &p).unwrap();
        assert_eq!(back, Value::Timestamp(ts));
    }

    #[test]
    fn uint8_range_check_rejects_out_of_range() {
        let logical = LogicalType::Uint8;
        assert!(to_primitive(&logical, &Value::Int(256)).is_err());
        assert!(to_primitive(&logical, &Value::Int(-1)).is_err());
        assert!(to_primitive(&logical, &Value::Int(200)).is_ok());
    }

    #[test]
    fn decimal_fixed_round_trips() {
        let logical = LogicalType::DecimalFixed { scale: 2, length: 4 };
        let p = to_primitive(&logical, &Value::Float(123.45)).unwrap();
        match &p {
            PrimitiveValue::FixedLenByteArray(b) => assert_eq!(b.len(), 4),
            _ => panic!("expected fixed len byte array"),
        }
        assert_eq!(from_primitive(&logical, &p).unwrap(), Value::Float(123.45));
    }

    #[test]
    fn decimal_binary_handles_negative_values() {
        let logical = LogicalType::DecimalBinary { scale: 0 };
        let p = to_primitive(&logical, &Value::Float(-5.0)).unwrap();
        assert_eq!(from_primitive(&logical, &p).unwrap(), Value::Float(-5.0));
    }

    #[test]
    fn interval_round_trips() {
        let logical = LogicalType::Interval;
        let v = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        let p = to_primitive(&logical, &v).unwrap();
        assert_eq!(from_primitive(&logical, &p).unwrap(), v);
    }
}
