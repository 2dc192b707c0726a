//! PLAIN codec (spec.md §4.4): identity little-endian packing per
//! primitive type.

use byteorder::{ByteOrder, LittleEndian};
use parquet_core::{PrimitiveType, PrimitiveValue};

use crate::error::{CodecError, CodecResult};

/// Encodes a run of same-typed values into their PLAIN byte layout.
pub fn encode(values: &[PrimitiveValue]) -> Vec<u8> {
    match values.first() {
        None => Vec::new(),
        Some(PrimitiveValue::Bool(_)) => encode_bools(values),
        _ => {
            let mut out = Vec::new();
            for value in values {
                encode_one(value, &mut out);
            }
            out
        }
    }
}

fn encode_one(value: &PrimitiveValue, out: &mut Vec<u8>) {
    match value {
        PrimitiveValue::Bool(_) => unreachable!("booleans are bit-packed as a whole run"),
        PrimitiveValue::Int32(v) => out.extend_from_slice(&v.to_le_bytes()),
        PrimitiveValue::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        PrimitiveValue::Int96(lo, hi) => {
            out.extend_from_slice(&lo.to_le_bytes());
            out.extend_from_slice(&hi.to_le_bytes());
        }
        PrimitiveValue::Float(v) => out.extend_from_slice(&v.to_le_bytes()),
        PrimitiveValue::Double(v) => out.extend_from_slice(&v.to_le_bytes()),
        PrimitiveValue::Bytes(bytes) => {
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        PrimitiveValue::FixedLenByteArray(bytes) => out.extend_from_slice(bytes),
    }
}

fn encode_bools(values: &[PrimitiveValue]) -> Vec<u8> {
    let mut out = vec![0u8; values.len().div_ceil(8)];
    for (i, value) in values.iter().enumerate() {
        let PrimitiveValue::Bool(b) = value else {
            unreachable!("mixed PrimitiveValue variants in one column run")
        };
        if *b {
            out[i / 8] |= 1 << (i % 8);
        }
    }
    out
}

/// Decodes `count` values of `primitive` from `bytes`. `type_length` is
/// required for `FixedLenByteArray` and ignored otherwise.
pub fn decode(
    bytes: &[u8],
    primitive: PrimitiveType,
    type_length: Option<i32>,
    count: usize,
) -> CodecResult<Vec<PrimitiveValue>> {
    match primitive {
        PrimitiveType::Boolean => decode_bools(bytes, count),
        _ => {
            let mut cursor = 0usize;
            let mut out = Vec::with_capacity(count);
            for _ in 0..count {
                out.push(decode_one(bytes, &mut cursor, primitive, type_length)?);
            }
            Ok(out)
        }
    }
}

fn need(bytes: &[u8], offset: usize, len: usize) -> CodecResult<()> {
    if offset + len > bytes.len() {
        return Err(CodecError::Truncated { needed: offset + len, available: bytes.len() });
    }
    Ok(())
}

fn decode_one(
    bytes: &[u8],
    offset: &mut usize,
    primitive: PrimitiveType,
    type_length: Option<i32>,
) -> CodecResult<PrimitiveValue> {
    match primitive {
        PrimitiveType::Boolean => unreachable!("booleans decode as a whole run"),
        PrimitiveType::Int32 => {
            need(bytes, *offset, 4)?;
            let v = LittleEndian::read_i32(&bytes[*offset..*offset + 4]);
            *offset += 4;
            Ok(PrimitiveValue::Int32(v))
        }
        PrimitiveType::Int64 => {
            need(bytes, *offset, 8)?;
            let v = LittleEndian::read_i64(&bytes[*offset..*offset + 8]);
            *offset += 8;
            Ok(PrimitiveValue::Int64(v))
        }
        PrimitiveType::Int96 => {
            need(bytes, *offset, 12)?;
            let lo = LittleEndian::read_i64(&bytes[*offset..*offset + 8]);
            let hi = LittleEndian::read_u32(&bytes[*offset + 8..*offset + 12]);
            *offset += 12;
            Ok(PrimitiveValue::Int96(lo, hi))
        }
        PrimitiveType::Float => {
            need(bytes, *offset, 4)?;
            let v = LittleEndian::read_f32(&bytes[*offset..*offset + 4]);
            *offset += 4;
            Ok(PrimitiveValue::Float(v))
        }
        PrimitiveType::Double => {
            need(bytes, *offset, 8)?;
            let v = LittleEndian::read_f64(&bytes[*offset..*offset + 8]);
            *offset += 8;
            Ok(PrimitiveValue::Double(v))
        }
        PrimitiveType::ByteArray => {
            need(bytes, *offset, 4)?;
            let len = LittleEndian::read_u32(&bytes[*offset..*offset + 4]) as usize;
            *offset += 4;
            need(bytes, *offset, len)?;
            let v = bytes[*offset..*offset + len].to_vec();
            *offset += len;
            Ok(PrimitiveValue::Bytes(v))
        }
        PrimitiveType::FixedLenByteArray => {
            let len = type_length
                .ok_or_else(|| CodecError::InvalidEncoding("FIXED_LEN_BYTE_ARRAY requires typeLength".into()))?
                as usize;
            need(bytes, *offset, len)?;
            let v = bytes[*offset..*offset + len].to_vec();
            *offset += len;
            Ok(PrimitiveValue::FixedLenByteArray(v))
        }
    }
}

fn decode_bools(bytes: &[u8], count: usize) -> CodecResult<Vec<PrimitiveValue>> {
    let needed = count.div_ceil(8);
    need(bytes, 0, needed)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let byte = bytes[i / 8];
        out.push(PrimitiveValue::Bool(byte & (1 << (i % 8)) != 0));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int32_round_trips() {
        let values = vec![PrimitiveValue::Int32(-7), PrimitiveValue::Int32(300)];
        let bytes = encode(&values);
        assert_eq!(bytes.len(), 8);
        let decoded = decode(&bytes, PrimitiveType::Int32, None, 2).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn bool_packs_lsb_first_and_pads_to_byte() {
        let values = vec![true, false, true, true, false, false, false, false, true]
            .into_iter()
            .map(PrimitiveValue::Bool)
            .collect::<Vec<_>>();
        let bytes = encode(&values);
        assert_eq!(bytes.len(), 2);
        assert_eq!(bytes[0], 0b0000_1101);
        let decoded = decode(&bytes, PrimitiveType::Boolean, None, 9).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn byte_array_round_trips() {
        let values = vec![
            PrimitiveValue::Bytes(b"hello".to_vec()),
            PrimitiveValue::Bytes(b"".to_vec()),
            PrimitiveValue::Bytes(b"world!".to_vec()),
        ];
        let bytes = encode(&values);
        let decoded = decode(&bytes, PrimitiveType::ByteArray, None, 3).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn fixed_len_byte_array_round_trips() {
        let values = vec![
            PrimitiveValue::FixedLenByteArray(vec![1, 2, 3, 4]),
            PrimitiveValue::FixedLenByteArray(vec![5, 6, 7, 8]),
        ];
        let bytes = encode(&values);
        assert_eq!(bytes.len(), 8);
        let decoded = decode(&bytes, PrimitiveType::FixedLenByteArray, Some(4), 2).unwrap();
        assert_eq!(decoded, values);
    }

    #[test]
    fn truncated_int64_fails() {
        let err = decode(&[0u8; 4], PrimitiveType::Int64, None, 1).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }
}
