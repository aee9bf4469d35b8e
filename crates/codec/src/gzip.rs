//! # Overview
//!
//! gzip container framing and one-shot compression helpers.
//!
//! The container layout is fixed: a 10-byte header identifying the format
//! (deflate method byte, no flags, OS byte `0xff` "unknown"), a raw deflate
//! payload, and an 8-byte footer holding the CRC-32 of the uncompressed
//! content and its length mod 2^32, both little-endian. The splicing layer
//! relies on every member carrying exactly this header, so the header is a
//! constant here rather than something delegated to `flate2`'s gzip writer
//! (which stamps mtime and host OS bytes).
//!
//! # Examples
//!
//! ```
//! use codec::gzip;
//!
//! let body = gzip::compress(b"abc", 9)?;
//! assert_eq!(gzip::decompress(&body)?, b"abc");
//! # Ok::<(), std::io::Error>(())
//! ```

use std::io::{self, Read, Write};

use checksums::{Crc32, Crc32Digest};
use flate2::{Compression, read::GzDecoder, write::DeflateEncoder};

/// Fixed container header: magic, deflate method, no flags, zero mtime,
/// no extra-flags byte, OS "unknown".
pub const HEADER: [u8; 10] = [0x1f, 0x8b, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff];

/// Container header length in bytes.
pub const HEADER_LEN: usize = HEADER.len();

/// Container footer length in bytes: 4-byte CRC-32 plus 4-byte length.
pub const FOOTER_LEN: usize = 8;

/// Byte-aligned empty final deflate block (`BFINAL=1`, fixed Huffman,
/// end-of-block). Terminates a stream whose members all had their
/// final-block flags cleared.
pub const FINAL_BLOCK: [u8; 2] = [0x03, 0x00];

/// Smallest well-formed container: header, empty-input deflate payload
/// (two bytes), footer.
pub const MIN_MEMBER_LEN: usize = HEADER_LEN + FINAL_BLOCK.len() + FOOTER_LEN;

/// Level used when a caller supplies one outside the codec's `0..=9` range.
const DEFAULT_LEVEL: u32 = 6;

/// Maps a caller-supplied level onto the codec's accepted range.
///
/// Out-of-range values (including zlib's `-1` "default" sentinel) silently
/// clamp to the default level; existing callers depend on this rather than
/// an error.
#[must_use]
pub fn clamp_level(level: i32) -> Compression {
    if (0..=9).contains(&level) {
        Compression::new(level as u32)
    } else {
        Compression::new(DEFAULT_LEVEL)
    }
}

/// Compresses `input` into a raw deflate byte sequence (no container).
pub fn deflate_to_vec(input: &[u8], level: i32) -> io::Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), clamp_level(level));
    encoder.write_all(input)?;
    encoder.finish()
}

/// Compresses `input` into a complete single-member gzip container.
///
/// The footer's length field wraps at 32 bits, matching the format.
pub fn compress(input: &[u8], level: i32) -> io::Result<Vec<u8>> {
    let deflated = deflate_to_vec(input, level)?;

    let mut body = Vec::with_capacity(HEADER_LEN + deflated.len() + FOOTER_LEN);
    body.extend_from_slice(&HEADER);
    body.extend_from_slice(&deflated);
    body.extend_from_slice(&footer(Crc32::digest_of(input), input.len() as u32));
    Ok(body)
}

/// Decompresses a gzip container produced by [`compress`] or by splicing.
pub fn decompress(stream: &[u8]) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(stream);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output)?;
    Ok(output)
}

/// Encodes a container footer from a checksum digest and a length mod 2^32.
#[must_use]
pub fn footer(checksum: Crc32Digest, length: u32) -> [u8; FOOTER_LEN] {
    let mut bytes = [0u8; FOOTER_LEN];
    bytes[..4].copy_from_slice(&checksum.to_le_bytes());
    bytes[4..].copy_from_slice(&length.to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_payload() {
        let data = b"The quick brown fox jumps over the lazy dog".repeat(4);
        let body = compress(&data, 6).expect("compress");
        assert_eq!(decompress(&body).expect("decompress"), data);
    }

    #[test]
    fn container_carries_fixed_header_and_footer() {
        let data = b"hello";
        let body = compress(data, 6).expect("compress");

        assert_eq!(&body[..HEADER_LEN], &HEADER);

        let tail = &body[body.len() - FOOTER_LEN..];
        assert_eq!(&tail[..4], Crc32::digest_of(data).to_le_bytes());
        assert_eq!(&tail[4..], (data.len() as u32).to_le_bytes());
    }

    #[test]
    fn empty_input_produces_minimal_member() {
        let body = compress(b"", 6).expect("compress");
        assert_eq!(body.len(), MIN_MEMBER_LEN);
        assert_eq!(&body[HEADER_LEN..HEADER_LEN + 2], &FINAL_BLOCK);
        assert_eq!(decompress(&body).expect("decompress"), b"");
    }

    #[test]
    fn out_of_range_level_clamps_to_default() {
        for level in [-1, 10, 99, i32::MIN, i32::MAX] {
            assert_eq!(clamp_level(level).level(), DEFAULT_LEVEL);
        }
        for level in 0..=9 {
            assert_eq!(clamp_level(level).level(), level as u32);
        }
    }

    #[test]
    fn clamped_level_still_round_trips() {
        let data = b"clamp me";
        let body = compress(data, 42).expect("compress with clamped level");
        assert_eq!(decompress(&body).expect("decompress"), data);
    }
}
