//! Voxel buffer codec: run-length encoding followed by LZ4
//!
//! Voxel frames compress extremely well under RLE because edits cluster
//! into runs of identical bytes. The RLE stage emits
//! `[u32 LE original length][(value: u8, run: u16 LE)]*` and the whole
//! stream then passes through LZ4 to catch repeated run patterns.

use thiserror::Error;

/// Longest run a single (value, run) pair can express
const MAX_RUN: usize = u16::MAX as usize;

/// Bytes of the RLE header (original length, u32 LE)
const RLE_HEADER_LEN: usize = 4;

/// Errors from decoding a compressed voxel buffer
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("LZ4 decompression failed: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),

    #[error("RLE stream truncated")]
    Truncated,

    #[error("RLE stream expands to {actual} bytes but header claims {claimed}")]
    Corrupt { claimed: usize, actual: usize },

    #[error("decoded length {decoded} does not match expected {expected}")]
    LengthMismatch { decoded: usize, expected: usize },
}

/// Compress a voxel buffer (RLE, then LZ4)
pub fn compress(data: &[u8]) -> Vec<u8> {
    let rle = rle_encode(data);
    lz4_flex::compress_prepend_size(&rle)
}

/// Decompress a buffer produced by [`compress`]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let rle = lz4_flex::decompress_size_prepended(data)?;
    rle_decode(&rle)
}

/// Decompress and verify the result is exactly `expected_len` bytes.
///
/// Callers restoring into a fixed-extent frame use this so a corrupt or
/// mismatched payload fails loudly instead of writing a short buffer.
pub fn decompress_exact(data: &[u8], expected_len: usize) -> Result<Vec<u8>, CodecError> {
    let out = decompress(data)?;
    if out.len() != expected_len {
        return Err(CodecError::LengthMismatch {
            decoded: out.len(),
            expected: expected_len,
        });
    }
    Ok(out)
}

fn rle_encode(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(RLE_HEADER_LEN + data.len() / 8);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());

    let mut i = 0;
    while i < data.len() {
        let value = data[i];
        let mut run = 1usize;
        while run < MAX_RUN && i + run < data.len() && data[i + run] == value {
            run += 1;
        }
        out.push(value);
        out.extend_from_slice(&(run as u16).to_le_bytes());
        i += run;
    }

    out
}

fn rle_decode(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    if data.len() < RLE_HEADER_LEN {
        return Err(CodecError::Truncated);
    }
    let claimed = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

    let pairs = &data[RLE_HEADER_LEN..];
    if pairs.len() % 3 != 0 {
        return Err(CodecError::Truncated);
    }

    let mut out = Vec::with_capacity(claimed);
    for pair in pairs.chunks_exact(3) {
        let value = pair[0];
        let run = u16::from_le_bytes([pair[1], pair[2]]) as usize;
        out.resize(out.len() + run, value);
    }

    if out.len() != claimed {
        return Err(CodecError::Corrupt {
            claimed,
            actual: out.len(),
        });
    }

    Ok(out)
}
