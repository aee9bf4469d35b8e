//! # Overview
//!
//! Boundary location and spacer synthesis.
//!
//! Splicing removes a chunk's container framing and its terminal payload
//! byte, then continues the deflate stream with the next chunk's blocks.
//! That requires two bit-exact facts about the chunk's payload: where its
//! final block starts (so the assembler can clear the block's "final" flag),
//! and how many bits of the terminal byte are still live (so a short
//! synthetic byte sequence can re-encode that tail and return the stream to
//! a byte boundary). This module scans the payload block by block to find
//! both, and builds the synthetic sequence — the [`SpacerBytes`].
//!
//! # Algorithm
//!
//! The scan drives [`codec::BlockScanner`] across every block boundary. A
//! deflate block's first header bit is its BFINAL flag, so at each boundary
//! the flag of the *next* block is a known bit of a known byte: bit
//! `8 - intra_byte_bits` of the last consumed byte when the boundary falls
//! mid-byte, bit 0 of the next byte otherwise. The most recent boundary
//! whose flag bit is set is remembered; when the decoder reports end of
//! stream, that position is the true final block, no matter how many blocks
//! or catenated sub-streams the payload contains.

use tracing::{debug, trace};

use crate::error::SpliceError;
use codec::gzip;
use codec::{BlockScanner, ScanError};

/// Synthetic byte sequence that terminates a truncated chunk payload.
///
/// One to six raw bytes re-encoding the tail bits of the payload's terminal
/// byte followed by empty, non-final deflate blocks, so that the stream is
/// byte-aligned and may legally continue with another chunk's first block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SpacerBytes {
    bytes: [u8; Self::MAX_LEN],
    len: u8,
}

impl SpacerBytes {
    /// Largest spacer ever produced; governs per-join overhead.
    pub const MAX_LEN: usize = 6;

    /// Synthesizes the spacer for a payload whose terminal byte is
    /// `terminal` with `unused_bits` dead high bits reported by the decoder
    /// at end of stream.
    ///
    /// `unused_bits` is zlib's `data_type & 7`, so callers always pass
    /// `0..=7`; values outside that range panic.
    #[must_use]
    pub fn for_bit_position(terminal: u8, unused_bits: u8) -> Self {
        assert!(unused_bits <= 7, "intra-byte bit position is 0..=7");

        // Zero the dead high bits, keeping only bits that belong to the
        // already-decoded final block.
        let masked = terminal & (((0x100u16 >> unused_bits) - 1) as u8);

        match unused_bits {
            // Already byte-aligned: re-emit the terminal byte untouched.
            0 => Self::from_slice(&[terminal]),
            // Even positions: cascade empty non-final fixed-Huffman blocks
            // (10 bits each) through the free bits. Each block advances the
            // bit cursor by 10 = 2 (mod 8), so exact alignment is reachable
            // from even positions only.
            2 => Self::from_slice(&[masked | 0x80, 0x00]),
            4 => Self::from_slice(&[masked | 0x20, 0x80, 0x00]),
            6 => Self::from_slice(&[masked | 0x08, 0x20, 0x80, 0x00]),
            // Odd positions: empty non-final stored block. Three header
            // bits, skip to the byte boundary, then LEN=0 and its one's
            // complement. With a single free bit the header spills into the
            // next byte.
            1 => Self::from_slice(&[masked, 0x00, 0x00, 0x00, 0xff, 0xff]),
            _ => Self::from_slice(&[masked, 0x00, 0x00, 0xff, 0xff]),
        }
    }

    fn from_slice(bytes: &[u8]) -> Self {
        let mut spacer = Self {
            bytes: [0; Self::MAX_LEN],
            len: bytes.len() as u8,
        };
        spacer.bytes[..bytes.len()].copy_from_slice(bytes);
        spacer
    }

    /// The spacer bytes, in emission order.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// Number of bytes in the spacer (`1..=6`).
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    /// Always false; every spacer carries at least the terminal byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for SpacerBytes {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

/// Result of locating a chunk's final compressed block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Boundary {
    /// Byte offset, relative to the payload start, of the byte holding the
    /// final block's BFINAL flag.
    pub last_block_bit_position: usize,
    /// Bit of that byte which is the BFINAL flag. The assembler clears it
    /// when the chunk is followed by another.
    pub last_block_bit_mask: u8,
    /// Spacer re-encoding the payload's terminal byte.
    pub spacer: SpacerBytes,
}

/// Scans a complete container body and locates its final compressed block.
///
/// The scan decodes the payload block by block and keeps going until the
/// decoder reports end of stream, so the reported position is the start of
/// the true last block even when earlier blocks also carry a set final
/// flag (catenated sub-streams). The result is a pure function of the body;
/// locating twice yields identical output.
///
/// # Errors
///
/// [`SpliceError::CodecInit`] when the decode session cannot be created,
/// [`SpliceError::Decode`] when the payload is corrupt or ends before its
/// final block. A boundary is never guessed from partial data.
pub fn locate_boundary(body: &[u8]) -> Result<Boundary, SpliceError> {
    if body.len() < gzip::MIN_MEMBER_LEN {
        return Err(ScanError::Truncated.into());
    }
    let payload = &body[gzip::HEADER_LEN..];

    // The first block's flag is bit 0 of the first payload byte.
    let mut last_block = if payload[0] & 0x01 != 0 {
        Some((0usize, 0x01u8))
    } else {
        None
    };

    let mut scanner = BlockScanner::new(payload)?;
    let terminal = loop {
        let boundary = scanner.step()?;
        if boundary.end_of_stream {
            break boundary;
        }

        let bits = boundary.intra_byte_bits;
        if bits != 0 {
            let mask = (0x100u16 >> bits) as u8;
            if payload[boundary.consumed - 1] & mask != 0 {
                trace!(
                    position = boundary.consumed - 1,
                    mask, "final block candidate"
                );
                last_block = Some((boundary.consumed - 1, mask));
            }
        } else if payload.get(boundary.consumed).is_some_and(|byte| byte & 0x01 != 0) {
            trace!(position = boundary.consumed, "final block candidate");
            last_block = Some((boundary.consumed, 0x01));
        }
    };

    // Unreachable for any payload the decoder accepted: the stream cannot
    // end without a block whose flag was observed above.
    let (last_block_bit_position, last_block_bit_mask) = last_block.ok_or_else(|| {
        SpliceError::from(ScanError::Corrupt {
            message: Some("stream ended without a final block flag".to_owned()),
        })
    })?;

    let spacer = SpacerBytes::for_bit_position(
        payload[terminal.consumed - 1],
        terminal.intra_byte_bits,
    );

    debug!(
        last_block_bit_position,
        last_block_bit_mask,
        spacer_len = spacer.len(),
        payload_len = terminal.consumed,
        "boundary located"
    );

    Ok(Boundary {
        last_block_bit_position,
        last_block_bit_mask,
        spacer,
    })
}
