//! Gzip for kind 0x01 payloads

use crate::MAX_DECOMPRESSED_SIZE_BYTES;
use flate2::read::GzDecoder;
use std::io::Read as _;

/// Minimum valid gzip file: header 10 + deflate 2 + footer 8
const MIN_GZIP_LEN: usize = 20;

/// Gzip `data` at level 6.
#[inline]
pub fn compress_gzip(data: &[u8]) -> Vec<u8> {
    use ::std::io::Write as _;
    use flate2::{Compression, write::GzEncoder};

    const LEVEL: Compression = Compression::new(6);

    // assume 50% compression ratio + gzip header ~18 bytes
    let estimated_size = data.len() / 2 + 18;
    let mut encoder = GzEncoder::new(Vec::with_capacity(estimated_size), LEVEL);

    // Writing into a Vec cannot fail
    if encoder.write_all(data).is_err() {
        return Vec::new();
    }
    encoder.finish().unwrap_or_default()
}

/// Gunzip a kind 0x01 payload.
///
/// `None` for anything shorter than an empty gzip member (10-byte header,
/// 2-byte deflate block, 8-byte trailer), without the `1f 8b 08` magic, or
/// inflating past [`MAX_DECOMPRESSED_SIZE_BYTES`]. The trailer's ISIZE bounds
/// the allocation; the inflated length is checked again afterwards.
pub fn decompress_gzip(data: &[u8]) -> Option<Vec<u8>> {
    if data.len() < MIN_GZIP_LEN {
        return None;
    }

    // magic number (0x1f 0x8b) and compression method (0x08 = DEFLATE)
    if data[..3] != [0x1f, 0x8b, 0x08] {
        return None;
    }

    // ISIZE: original size mod 2^32, last 4 bytes, little-endian
    let footer: [u8; 4] = data[data.len() - 4..].try_into().ok()?;
    let capacity = u32::from_le_bytes(footer) as usize;

    if capacity > MAX_DECOMPRESSED_SIZE_BYTES {
        tracing::debug!(claimed = capacity, "gzip payload over size limit");
        return None;
    }

    let mut decompressed = Vec::with_capacity(capacity);
    GzDecoder::new(data)
        .take(MAX_DECOMPRESSED_SIZE_BYTES as u64 + 1)
        .read_to_end(&mut decompressed)
        .ok()?;

    if decompressed.len() > MAX_DECOMPRESSED_SIZE_BYTES {
        tracing::debug!(claimed = capacity, "gzip payload inflated past size limit");
        return None;
    }

    Some(decompressed)
}
