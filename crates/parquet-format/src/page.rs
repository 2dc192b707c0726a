//! Data page assembly and disassembly (spec.md §4.7).
//!
//! V1 body = `rLevelsRLE || dLevelsRLE || valuesEncoded (compressed)`,
//! r/d-levels enveloped. V2 body is the same three pieces, but the
//! level streams drop their length envelope and carry their byte
//! lengths in the page header instead; in both flavors only the
//! values portion is ever compressed, never the levels.

use std::io::{Read, Write};

use parquet_codec::{compression, plain, rle};
use parquet_core::{CompressionName, EncodingName, PrimitiveType, PrimitiveValue};
use parquet_format_safe::thrift::protocol::{TCompactInputProtocol, TCompactOutputProtocol};
use parquet_format_safe::{DataPageHeader, DataPageHeaderV2, Encoding, PageHeader, PageType};

use crate::bridge;
use crate::error::{FormatError, FormatResult};

/// A page ready to be written: header plus its already-assembled body
/// (levels, uncompressed; values, compressed).
pub struct EncodedPage {
    pub header: PageHeader,
    pub body: Vec<u8>,
}

/// Bits needed to represent every integer in `0..=max_level`; `0` when
/// `max_level` is `0`, meaning the level stream is omitted entirely.
fn level_bit_width(max_level: u32) -> u8 {
    if max_level == 0 {
        0
    } else {
        32 - max_level.leading_zeros() as u8
    }
}

/// Fixed bit width used when a leaf's value encoding is RLE (spec.md
/// §4.2 restricts this to BOOLEAN/INT32/INT64). Using the full type
/// width rather than scanning for a minimal one keeps encode/decode
/// symmetric without needing a side channel for the chosen width.
fn rle_value_bit_width(primitive: PrimitiveType) -> u8 {
    match primitive {
        PrimitiveType::Boolean => 1,
        PrimitiveType::Int32 => 32,
        PrimitiveType::Int64 => 64,
        _ => unreachable!("schema construction rejects RLE encoding for other primitives"),
    }
}

#[allow(clippy::too_many_arguments)]
pub fn encode_data_page(
    values: &[PrimitiveValue],
    rlevels: &[u32],
    dlevels: &[u32],
    r_level_max: u32,
    d_level_max: u32,
    num_rows: usize,
    primitive: PrimitiveType,
    value_encoding: EncodingName,
    compression: CompressionName,
    use_v2: bool,
) -> FormatResult<EncodedPage> {
    let num_values = dlevels.len();
    let r_bit_width = level_bit_width(r_level_max);
    let d_bit_width = level_bit_width(d_level_max);

    let rlevels_bytes = if r_bit_width > 0 { rle::encode_levels(rlevels, r_bit_width, use_v2) } else { Vec::new() };
    let dlevels_bytes = if d_bit_width > 0 { rle::encode_levels(dlevels, d_bit_width, use_v2) } else { Vec::new() };

    let raw_values = match value_encoding {
        EncodingName::Plain => plain::encode(values),
        EncodingName::Rle => rle::encode_values(values, rle_value_bit_width(primitive), false)?,
    };
    let compressed_values = compression::compress(compression, &raw_values)?;

    let uncompressed_page_size = rlevels_bytes.len() + dlevels_bytes.len() + raw_values.len();
    let compressed_page_size = rlevels_bytes.len() + dlevels_bytes.len() + compressed_values.len();

    let mut body = Vec::with_capacity(compressed_page_size);
    body.extend_from_slice(&rlevels_bytes);
    body.extend_from_slice(&dlevels_bytes);
    body.extend_from_slice(&compressed_values);

    let thrift_encoding = bridge::encoding_to_thrift(value_encoding);
    let num_nulls = num_values - values.len();

    let header = if use_v2 {
        PageHeader {
            type_: PageType::DATA_PAGE_V2,
            uncompressed_page_size: uncompressed_page_size as i32,
            compressed_page_size: compressed_page_size as i32,
            crc: None,
            data_page_header: None,
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: Some(DataPageHeaderV2 {
                num_values: num_values as i32,
                num_nulls: num_nulls as i32,
                num_rows: num_rows as i32,
                encoding: thrift_encoding,
                definition_levels_byte_length: dlevels_bytes.len() as i32,
                repetition_levels_byte_length: rlevels_bytes.len() as i32,
                is_compressed: Some(compression != CompressionName::Uncompressed),
                statistics: None,
            }),
        }
    } else {
        PageHeader {
            type_: PageType::DATA_PAGE,
            uncompressed_page_size: uncompressed_page_size as i32,
            compressed_page_size: compressed_page_size as i32,
            crc: None,
            data_page_header: Some(DataPageHeader {
                num_values: num_values as i32,
                encoding: thrift_encoding,
                definition_level_encoding: Encoding::RLE,
                repetition_level_encoding: Encoding::RLE,
                statistics: None,
            }),
            index_page_header: None,
            dictionary_page_header: None,
            data_page_header_v2: None,
        }
    };

    Ok(EncodedPage { header, body })
}

pub fn write_page_header<W: Write>(writer: &mut W, header: &PageHeader) -> FormatResult<usize> {
    let mut protocol = TCompactOutputProtocol::new(writer);
    header.write_to_out_protocol(&mut protocol).map_err(|e| FormatError::Thrift(e.to_string()))
}

pub fn read_page_header<R: Read>(reader: &mut R) -> FormatResult<PageHeader> {
    let mut protocol = TCompactInputProtocol::new(reader);
    PageHeader::read_from_in_protocol(&mut protocol).map_err(|e| FormatError::Thrift(e.to_string()))
}

/// Reverses [`encode_data_page`]: decodes a page body back into its
/// three parallel streams, given the leaf's r/d-level maxima.
pub fn decode_data_page(
    header: &PageHeader,
    body: &[u8],
    primitive: PrimitiveType,
    type_length: Option<i32>,
    compression: CompressionName,
    r_level_max: u32,
    d_level_max: u32,
) -> FormatResult<(Vec<PrimitiveValue>, Vec<u32>, Vec<u32>)> {
    let num_values = match header.type_ {
        PageType::DATA_PAGE => header
            .data_page_header
            .as_ref()
            .ok_or_else(|| FormatError::Thrift("DATA_PAGE missing data_page_header".to_string()))?
            .num_values as usize,
        PageType::DATA_PAGE_V2 => header
            .data_page_header_v2
            .as_ref()
            .ok_or_else(|| FormatError::Thrift("DATA_PAGE_V2 missing data_page_header_v2".to_string()))?
            .num_values as usize,
        other => return Err(FormatError::UnknownPageType(format!("{other:?}"))),
    };

    let r_bit_width = level_bit_width(r_level_max);
    let d_bit_width = level_bit_width(d_level_max);
    let mut offset = 0usize;

    let rlevels = if r_bit_width > 0 {
        let (vals, consumed) = read_level_stream(header, body, offset, r_bit_width, num_values, true)?;
        offset += consumed;
        vals
    } else {
        vec![0u32; num_values]
    };

    let dlevels = if d_bit_width > 0 {
        let (vals, consumed) = read_level_stream(header, body, offset, d_bit_width, num_values, false)?;
        offset += consumed;
        vals
    } else {
        vec![0u32; num_values]
    };

    if offset > header.uncompressed_page_size as usize {
        return Err(FormatError::Truncated("page levels exceed declared uncompressed size".to_string()));
    }
    let values_uncompressed_size = header.uncompressed_page_size as usize - offset;

    let compressed_values = body.get(offset..).ok_or_else(|| FormatError::Truncated("page value bytes".to_string()))?;
    let raw_values = compression::decompress(compression, compressed_values, values_uncompressed_size)?;

    let value_encoding = match header.type_ {
        PageType::DATA_PAGE => bridge::thrift_to_encoding(header.data_page_header.as_ref().expect("checked above").encoding)?,
        PageType::DATA_PAGE_V2 => bridge::thrift_to_encoding(header.data_page_header_v2.as_ref().expect("checked above").encoding)?,
        _ => unreachable!("checked above"),
    };

    let non_null_count = dlevels.iter().filter(|&&d| d == d_level_max).count();
    let values = match value_encoding {
        EncodingName::Plain => plain::decode(&raw_values, primitive, type_length, non_null_count)?,
        EncodingName::Rle => rle::decode_values(&raw_values, primitive, rle_value_bit_width(primitive), non_null_count, false)?,
    };

    Ok((values, rlevels, dlevels))
}

/// Reads one level stream starting at `offset`, returning the decoded
/// levels and the number of bytes consumed. V1 streams carry their own
/// 4-byte length envelope; V2 streams are unenveloped and their length
/// comes from the page header instead.
fn read_level_stream(
    header: &PageHeader,
    body: &[u8],
    offset: usize,
    bit_width: u8,
    num_values: usize,
    is_repetition: bool,
) -> FormatResult<(Vec<u32>, usize)> {
    let slice = body.get(offset..).ok_or_else(|| FormatError::Truncated("level stream".to_string()))?;

    match header.type_ {
        PageType::DATA_PAGE => {
            if slice.len() < 4 {
                return Err(FormatError::Truncated("level envelope length".to_string()));
            }
            let len = u32::from_le_bytes(slice[0..4].try_into().expect("checked len")) as usize;
            let total = 4 + len;
            let stream = slice.get(..total).ok_or_else(|| FormatError::Truncated("level envelope body".to_string()))?;
            let levels = rle::decode_levels(stream, bit_width, num_values, false)?;
            Ok((levels, total))
        }
        PageType::DATA_PAGE_V2 => {
            let v2 = header.data_page_header_v2.as_ref().expect("caller checked page type");
            let total = if is_repetition { v2.repetition_levels_byte_length } else { v2.definition_levels_byte_length } as usize;
            let stream = slice.get(..total).ok_or_else(|| FormatError::Truncated("level stream body".to_string()))?;
            let levels = rle::decode_levels(stream, bit_width, num_values, true)?;
            Ok((levels, total))
        }
        other => Err(FormatError::UnknownPageType(format!("{other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_values() -> Vec<PrimitiveValue> {
        vec![PrimitiveValue::Int64(1), PrimitiveValue::Int64(2), PrimitiveValue::Int64(3)]
    }

    #[test]
    fn v1_page_round_trips_required_column() {
        let values = sample_values();
        let dlevels = vec![0u32; 3];
        let rlevels = vec![0u32; 3];
        let encoded = encode_data_page(
            &values,
            &rlevels,
            &dlevels,
            0,
            0,
            3,
            PrimitiveType::Int64,
            EncodingName::Plain,
            CompressionName::Uncompressed,
            false,
        )
        .unwrap();

        let (decoded_values, decoded_r, decoded_d) =
            decode_data_page(&encoded.header, &encoded.body, PrimitiveType::Int64, None, CompressionName::Uncompressed, 0, 0).unwrap();
        assert_eq!(decoded_values, values);
        assert_eq!(decoded_r, rlevels);
        assert_eq!(decoded_d, dlevels);
    }

    #[test]
    fn v1_page_round_trips_optional_column_with_nulls() {
        let values = vec![PrimitiveValue::Bytes(b"a".to_vec()), PrimitiveValue::Bytes(b"b".to_vec())];
        let dlevels = vec![1u32, 0, 1];
        let rlevels = vec![0u32; 3];
        let encoded = encode_data_page(
            &values,
            &rlevels,
            &dlevels,
            0,
            1,
            3,
            PrimitiveType::ByteArray,
            EncodingName::Plain,
            CompressionName::Snappy,
            false,
        )
        .unwrap();

        let (decoded_values, _, decoded_d) =
            decode_data_page(&encoded.header, &encoded.body, PrimitiveType::ByteArray, None, CompressionName::Snappy, 0, 1).unwrap();
        assert_eq!(decoded_values, values);
        assert_eq!(decoded_d, dlevels);
    }

    #[test]
    fn v2_page_round_trips_with_repeated_levels() {
        let values = vec![PrimitiveValue::Int32(10), PrimitiveValue::Int32(20)];
        let rlevels = vec![0u32, 1];
        let dlevels = vec![2u32, 2];
        let encoded = encode_data_page(
            &values,
            &rlevels,
            &dlevels,
            1,
            2,
            1,
            PrimitiveType::Int32,
            EncodingName::Plain,
            CompressionName::Gzip,
            true,
        )
        .unwrap();
        assert_eq!(encoded.header.type_, PageType::DATA_PAGE_V2);

        let (decoded_values, decoded_r, decoded_d) =
            decode_data_page(&encoded.header, &encoded.body, PrimitiveType::Int32, None, CompressionName::Gzip, 1, 2).unwrap();
        assert_eq!(decoded_values, values);
        assert_eq!(decoded_r, rlevels);
        assert_eq!(decoded_d, dlevels);
    }

    #[test]
    fn rle_encoded_boolean_values_round_trip() {
        let values = vec![PrimitiveValue::Bool(true), PrimitiveValue::Bool(false), PrimitiveValue::Bool(true)];
        let dlevels = vec![0u32; 3];
        let rlevels = vec![0u32; 3];
        let encoded = encode_data_page(
            &values,
            &rlevels,
            &dlevels,
            0,
            0,
            3,
            PrimitiveType::Boolean,
            EncodingName::Rle,
            CompressionName::Uncompressed,
            false,
        )
        .unwrap();

        let (decoded_values, ..) =
            decode_data_page(&encoded.header, &encoded.body, PrimitiveType::Boolean, None, CompressionName::Uncompressed, 0, 0).unwrap();
        assert_eq!(decoded_values, values);
    }
}
