//! Page-body compression dispatch (spec.md §4.6): a registry keyed by
//! compression name. `UNCOMPRESSED` is identity; `GZIP`/`BROTLI`/`LZ4`
//! delegate to platform crates; `SNAPPY` is the in-tree codec in
//! [`crate::snappy`]. `LZO` has no registry-available crate in this
//! workspace and is rejected with `UnknownMethod`.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression as GzCompression;
use parquet_core::CompressionName;

use crate::error::{CompressionError, CompressionResult};
use crate::snappy;

pub fn compress(name: CompressionName, data: &[u8]) -> CompressionResult<Vec<u8>> {
    match name {
        CompressionName::Uncompressed => Ok(data.to_vec()),
        CompressionName::Snappy => Ok(snappy::compress(data)),
        CompressionName::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), GzCompression::default());
            encoder.write_all(data).map_err(|e| CompressionError::Truncated(e.to_string()))?;
            encoder.finish().map_err(|e| CompressionError::Truncated(e.to_string()))
        }
        CompressionName::Brotli => {
            let mut out = Vec::new();
            {
                let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 11, 22);
                writer.write_all(data).map_err(|e| CompressionError::Truncated(e.to_string()))?;
            }
            Ok(out)
        }
        CompressionName::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionName::Lzo => Err(CompressionError::UnknownMethod("LZO".into())),
    }
}

pub fn decompress(
    name: CompressionName,
    data: &[u8],
    uncompressed_size: usize,
) -> CompressionResult<Vec<u8>> {
    match name {
        CompressionName::Uncompressed => Ok(data.to_vec()),
        CompressionName::Snappy => snappy::decompress(data),
        CompressionName::Gzip => {
            let mut decoder = GzDecoder::new(data);
            let mut out = Vec::with_capacity(uncompressed_size);
            decoder.read_to_end(&mut out).map_err(|e| CompressionError::Truncated(e.to_string()))?;
            Ok(out)
        }
        CompressionName::Brotli => {
            let mut out = Vec::with_capacity(uncompressed_size);
            let mut decompressor = brotli::Decompressor::new(data, 4096);
            decompressor.read_to_end(&mut out).map_err(|e| CompressionError::Truncated(e.to_string()))?;
            Ok(out)
        }
        CompressionName::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| CompressionError::Truncated(e.to_string())),
        CompressionName::Lzo => Err(CompressionError::UnknownMethod("LZO".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_is_identity() {
        let data = b"hello world".to_vec();
        let compressed = compress(CompressionName::Uncompressed, &data).unwrap();
        assert_eq!(compressed, data);
        let decompressed = decompress(CompressionName::Uncompressed, &compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn gzip_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(CompressionName::Gzip, &data).unwrap();
        let decompressed = decompress(CompressionName::Gzip, &compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn brotli_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(CompressionName::Brotli, &data).unwrap();
        let decompressed = decompress(CompressionName::Brotli, &compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn lz4_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(CompressionName::Lz4, &data).unwrap();
        let decompressed = decompress(CompressionName::Lz4, &compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn snappy_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(20);
        let compressed = compress(CompressionName::Snappy, &data).unwrap();
        let decompressed = decompress(CompressionName::Snappy, &compressed, data.len()).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn lzo_is_rejected() {
        let err = compress(CompressionName::Lzo, b"x").unwrap_err();
        assert!(matches!(err, CompressionError::UnknownMethod(_)));
    }
}
