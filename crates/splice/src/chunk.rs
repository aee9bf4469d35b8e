//! # Overview
//!
//! Self-contained compressed chunks and their splice metadata.
//!
//! A [`CompressedChunk`] wraps one raw buffer compressed into a complete
//! gzip container together with everything the splice assembler needs: the
//! payload byte range, the final block's flag position, the precomputed
//! [`SpacerBytes`], and the checksum/length pair the combiner folds.
//! Chunks are immutable once built and may be produced on any number of
//! threads independently; only the final ordered assembly is sequential.

use tracing::debug;

use checksums::Crc32Digest;
use codec::gzip;

use crate::boundary::{SpacerBytes, locate_boundary};
use crate::error::SpliceError;

/// Byte offsets into a chunk's container body.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkOffsets {
    /// Body index where the deflate payload begins (just past the header).
    pub payload_start: usize,
    /// Body index one past the last payload byte that splicing copies
    /// verbatim; the terminal byte beyond it is re-encoded by the spacer.
    pub payload_end: usize,
    /// Offset, relative to `payload_start`, of the byte holding the final
    /// block's flag bit.
    pub last_block_bit_position: usize,
}

/// One raw buffer compressed into an immutable, splice-ready container.
#[derive(Clone, Debug)]
pub struct CompressedChunk {
    body: Vec<u8>,
    original_length: u32,
    checksum: Crc32Digest,
    offsets: ChunkOffsets,
    last_block_bit_mask: u8,
    spacer: SpacerBytes,
}

impl CompressedChunk {
    /// Compresses `raw` into a chunk at the given level.
    ///
    /// Levels outside `0..=9` silently clamp to the codec default. The
    /// chunk's length metadata wraps at 32 bits, matching the container
    /// footer field.
    pub fn compress(raw: &[u8], level: i32) -> Result<Self, SpliceError> {
        let body = gzip::compress(raw, level).map_err(SpliceError::Compression)?;
        let chunk = Self::from_compressed_body(body)?;
        debug!(
            raw_len = raw.len(),
            body_len = chunk.body.len(),
            spacer_len = chunk.spacer.len(),
            "chunk compressed"
        );
        Ok(chunk)
    }

    /// Rebuilds a chunk (metadata included) from a stored container body.
    ///
    /// The checksum and original length are read back from the container
    /// footer; the boundary scan is re-run on the payload.
    pub fn from_compressed_body(body: Vec<u8>) -> Result<Self, SpliceError> {
        let boundary = locate_boundary(&body)?;

        let footer = &body[body.len() - gzip::FOOTER_LEN..];
        let checksum = Crc32Digest::from_le_slice(&footer[..4])?;
        let length_bytes: [u8; 4] = footer[4..].try_into().expect("footer length field is 4 bytes");
        let original_length = u32::from_le_bytes(length_bytes);

        let offsets = ChunkOffsets {
            payload_start: gzip::HEADER_LEN,
            payload_end: body.len() - gzip::FOOTER_LEN - 1,
            last_block_bit_position: boundary.last_block_bit_position,
        };
        debug_assert!(offsets.payload_start < offsets.payload_end);
        debug_assert!(offsets.payload_end < body.len());
        debug_assert!(
            offsets.payload_start + offsets.last_block_bit_position <= offsets.payload_end
        );

        Ok(Self {
            body,
            original_length,
            checksum,
            offsets,
            last_block_bit_mask: boundary.last_block_bit_mask,
            spacer: boundary.spacer,
        })
    }

    /// Complete container body: header, payload, footer.
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Length of the source buffer, mod 2^32.
    #[must_use]
    pub const fn original_length(&self) -> u32 {
        self.original_length
    }

    /// Checksum of the source buffer, mirrored from the container footer.
    #[must_use]
    pub const fn checksum(&self) -> Crc32Digest {
        self.checksum
    }

    /// Byte offsets used by the splice assembler.
    #[must_use]
    pub const fn offsets(&self) -> ChunkOffsets {
        self.offsets
    }

    /// Bit of the byte at the last-block position holding the final flag.
    #[must_use]
    pub const fn last_block_bit_mask(&self) -> u8 {
        self.last_block_bit_mask
    }

    /// Spacer re-encoding the payload's terminal byte.
    #[must_use]
    pub const fn spacer(&self) -> &SpacerBytes {
        &self.spacer
    }

    /// Payload bytes splicing copies verbatim (terminal byte excluded).
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.body[self.offsets.payload_start..self.offsets.payload_end]
    }

    /// Owned copy of [`payload`](Self::payload) with the final block's flag
    /// bit cleared, ready to be followed by the spacer and another chunk.
    #[must_use]
    pub fn spliced_payload(&self) -> Vec<u8> {
        let mut payload = self.payload().to_vec();
        payload[self.offsets.last_block_bit_position] &= !self.last_block_bit_mask;
        payload
    }

    /// The full deflate payload, terminal byte included. Emitted for the
    /// last chunk of a splice, whose final block is kept intact.
    #[must_use]
    pub fn deflate_payload(&self) -> &[u8] {
        &self.body[self.offsets.payload_start..self.body.len() - gzip::FOOTER_LEN]
    }

    /// Length of the full deflate payload in bytes.
    #[must_use]
    pub fn raw_payload_length(&self) -> usize {
        self.body.len() - gzip::HEADER_LEN - gzip::FOOTER_LEN
    }

    /// Body index of the byte holding the final block's flag bit.
    #[must_use]
    pub const fn final_block_flag_index(&self) -> usize {
        self.offsets.payload_start + self.offsets.last_block_bit_position
    }

    /// Decompresses the chunk's own container back into the source bytes.
    pub fn decompress(&self) -> Result<Vec<u8>, SpliceError> {
        gzip::decompress(&self.body).map_err(|err| {
            SpliceError::from(codec::ScanError::Corrupt {
                message: Some(err.to_string()),
            })
        })
    }
}
