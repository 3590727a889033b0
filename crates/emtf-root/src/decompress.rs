//! Inflating ROOT compression blocks.
//!
//! A compressed object is a sequence of blocks, each with a 9-byte header:
//! ```text
//! bytes 0-1:  algorithm ("ZL" zlib, "L4" LZ4, "ZS" zstd, "XZ" lzma)
//! byte  2:    method
//! bytes 3-5:  compressed size   (little-endian, 24 bit)
//! bytes 6-8:  uncompressed size (little-endian, 24 bit)
//! ```

use std::io::Read;

use crate::error::{Result, RootError};

/// Size of a block header.
pub const BLOCK_HEADER_LEN: usize = 9;

/// Compression algorithm named by a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    /// zlib / deflate.
    Zlib,
    /// LZ4 with ROOT's 8-byte checksum prefix.
    Lz4,
    /// Zstandard.
    Zstd,
    /// LZMA in an xz container.
    Xz,
}

impl Algorithm {
    fn from_tag(tag: &[u8]) -> Result<Self> {
        match tag {
            b"ZL" => Ok(Self::Zlib),
            b"L4" => Ok(Self::Lz4),
            b"ZS" => Ok(Self::Zstd),
            b"XZ" => Ok(Self::Xz),
            other => Err(RootError::Decompression(format!(
                "unknown compression tag {:?}",
                String::from_utf8_lossy(other)
            ))),
        }
    }
}

/// Parsed block header.
#[derive(Debug, Clone, Copy)]
struct BlockHeader {
    algorithm: Algorithm,
    compressed: usize,
    uncompressed: usize,
}

impl BlockHeader {
    fn parse(b: &[u8]) -> Result<Self> {
        Ok(Self {
            algorithm: Algorithm::from_tag(&b[0..2])?,
            compressed: le24(&b[3..6]),
            uncompressed: le24(&b[6..9]),
        })
    }
}

/// Inflate a sequence of ROOT compression blocks into exactly `expected_len` bytes.
pub fn decompress(src: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected_len);
    let mut rest = src;

    while out.len() < expected_len {
        if rest.len() < BLOCK_HEADER_LEN {
            break;
        }
        let header = BlockHeader::parse(&rest[..BLOCK_HEADER_LEN])?;
        rest = &rest[BLOCK_HEADER_LEN..];
        if header.compressed > rest.len() {
            return Err(RootError::Decompression(format!(
                "block claims {} compressed bytes, {} available",
                header.compressed,
                rest.len()
            )));
        }
        let (payload, tail) = rest.split_at(header.compressed);
        let chunk = inflate(header.algorithm, payload, header.uncompressed)?;
        if chunk.len() != header.uncompressed {
            return Err(RootError::Decompression(format!(
                "{:?} block inflated to {} bytes, header says {}",
                header.algorithm,
                chunk.len(),
                header.uncompressed
            )));
        }
        out.extend_from_slice(&chunk);
        rest = tail;
    }

    if out.len() != expected_len {
        return Err(RootError::Decompression(format!(
            "inflated {} bytes, object length is {}",
            out.len(),
            expected_len
        )));
    }
    Ok(out)
}

fn inflate(algorithm: Algorithm, data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(expected);
    match algorithm {
        Algorithm::Zlib => {
            flate2::read::ZlibDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| RootError::Decompression(format!("zlib: {e}")))?;
        }
        Algorithm::Lz4 => {
            // 8-byte xxhash64 checksum precedes the LZ4 payload; not verified.
            let Some(payload) = data.get(8..) else {
                return Err(RootError::Decompression("lz4 block shorter than its checksum".into()));
            };
            out = lz4_flex::decompress(payload, expected)
                .map_err(|e| RootError::Decompression(format!("lz4: {e}")))?;
        }
        Algorithm::Zstd => {
            let mut decoder = ruzstd::decoding::StreamingDecoder::new(data)
                .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
            decoder
                .read_to_end(&mut out)
                .map_err(|e| RootError::Decompression(format!("zstd: {e}")))?;
        }
        Algorithm::Xz => {
            lzma_rs::xz_decompress(&mut std::io::BufReader::new(data), &mut out)
                .map_err(|e| RootError::Decompression(format!("xz: {e}")))?;
        }
    }
    Ok(out)
}

fn le24(b: &[u8]) -> usize {
    usize::from(b[0]) | (usize::from(b[1]) << 8) | (usize::from(b[2]) << 16)
}

/// Wrap a zlib stream in a single `ZL` block header.
///
/// Used by the fixture writer; payloads must stay below 16 MiB.
#[cfg(any(test, feature = "test-fixtures"))]
pub fn zlib_block(raw: &[u8]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let mut enc = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    // Writing into a Vec cannot fail.
    let _ = enc.write_all(raw);
    let compressed = enc.finish().unwrap_or_default();
    let mut block = Vec::with_capacity(BLOCK_HEADER_LEN + compressed.len());
    block.extend_from_slice(b"ZL");
    block.push(8);
    block.extend_from_slice(&(compressed.len() as u32).to_le_bytes()[..3]);
    block.extend_from_slice(&(raw.len() as u32).to_le_bytes()[..3]);
    block.extend_from_slice(&compressed);
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(tag: &[u8; 2], payload: &[u8], raw_len: usize) -> Vec<u8> {
        let mut b = tag.to_vec();
        b.push(0);
        b.extend_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
        b.extend_from_slice(&(raw_len as u32).to_le_bytes()[..3]);
        b.extend_from_slice(payload);
        b
    }

    #[test]
    fn le24_decodes_three_bytes() {
        assert_eq!(le24(&[0x10, 0, 0]), 16);
        assert_eq!(le24(&[0, 1, 0]), 256);
        assert_eq!(le24(&[0xff, 0xff, 0xff]), 0xff_ffff);
    }

    #[test]
    fn zlib_blocks_concatenate() {
        let a = vec![7u8; 300];
        let b = b"h_res_EMTF_pt_test_pt_all_eta_all".to_vec();
        let mut src = zlib_block(&a);
        src.extend(zlib_block(&b));
        let out = decompress(&src, a.len() + b.len()).unwrap();
        assert_eq!(&out[..300], &a[..]);
        assert_eq!(&out[300..], &b[..]);
    }

    #[test]
    fn xz_block_inflates() {
        let raw = b"emulated EMTF track pT 12.5 eta 1.9".repeat(4);
        let mut packed = Vec::new();
        lzma_rs::xz_compress(&mut std::io::BufReader::new(&raw[..]), &mut packed).unwrap();
        let out = decompress(&block(b"XZ", &packed, raw.len()), raw.len()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn lz4_block_skips_checksum() {
        let raw = b"legacy CSCTF ".repeat(10);
        let mut payload = vec![0u8; 8];
        payload.extend(lz4_flex::compress(&raw));
        let out = decompress(&block(b"L4", &payload, raw.len()), raw.len()).unwrap();
        assert_eq!(out, raw);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let src = block(b"QQ", &[1, 2, 3], 3);
        assert!(matches!(decompress(&src, 3), Err(RootError::Decompression(_))));
    }

    #[test]
    fn truncated_block_is_rejected() {
        let mut src = zlib_block(&[1u8; 64]);
        src.truncate(src.len() - 4);
        assert!(decompress(&src, 64).is_err());
    }

    #[test]
    fn short_output_is_rejected() {
        let src = zlib_block(&[1u8; 10]);
        assert!(decompress(&src, 11).is_err());
    }
}
