//! # Overview
//!
//! Splice assembly: one container header, every chunk's payload joined by
//! spacers, and a single combined footer.
//!
//! The byte layout is:
//!
//! 1. The fixed container header, once.
//! 2. For every chunk but the last: its payload bytes with the final
//!    block's flag bit cleared, then its spacer. Clearing the flag keeps
//!    the decoder running into the next chunk; the spacer re-encodes the
//!    terminal byte's live bits and pads with empty non-final blocks back
//!    to a byte boundary, where the next chunk's first block begins.
//! 3. The last chunk's full deflate payload verbatim, final flag intact,
//!    so the stream terminates normally.
//! 4. An 8-byte footer holding the combined checksum and combined length
//!    (mod 2^32) of all source buffers, in order.
//!
//! Physically copying the bytes is the caller's business; [`SplicePlan`]
//! hands out the exact segments, and [`splice_to_vec`] is the obvious
//! one-buffer assembly of them.

use std::io::{self, Write};

use tracing::debug;

use checksums::{Crc32Combiner, Crc32Digest};
use codec::gzip;

use crate::boundary::SpacerBytes;
use crate::chunk::CompressedChunk;
use crate::error::{InvalidInput, SpliceError};

/// One piece of the spliced stream, in emission order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Segment<'a> {
    /// Bytes copied verbatim from a chunk body, a spacer, or the footer.
    Bytes(&'a [u8]),
    /// A single synthesized byte: a chunk's flag byte with the final-block
    /// bit cleared.
    Byte(u8),
}

/// Combines every chunk's checksum/length pair, in order.
///
/// Equals the checksum and length of the concatenated source buffers; the
/// length wraps at 32 bits like the container footer field.
#[must_use]
pub fn combined_checksum(chunks: &[CompressedChunk]) -> (Crc32Digest, u32) {
    let combiner: Crc32Combiner = chunks
        .iter()
        .map(|chunk| (chunk.checksum(), chunk.original_length()))
        .collect();
    (combiner.digest(), combiner.total_length())
}

/// Encodes the spliced stream's footer: combined checksum, then combined
/// length, both little-endian.
#[must_use]
pub fn combined_footer(chunks: &[CompressedChunk]) -> [u8; gzip::FOOTER_LEN] {
    let (digest, total_length) = combined_checksum(chunks);
    gzip::footer(digest, total_length)
}

/// Upper bound on the spliced stream's size, for preallocation.
///
/// Header and footer, every chunk's full deflate payload, and a worst-case
/// spacer per join. Never an exact fit requirement.
#[must_use]
pub fn estimated_spliced_len(chunks: &[CompressedChunk]) -> usize {
    let payloads: usize = chunks.iter().map(CompressedChunk::raw_payload_length).sum();
    let joins = chunks.len().saturating_sub(1);
    gzip::HEADER_LEN + gzip::FOOTER_LEN + payloads + joins * SpacerBytes::MAX_LEN
}

/// Copy plan for joining an ordered, non-empty sequence of chunks.
#[derive(Debug)]
pub struct SplicePlan<'a> {
    chunks: &'a [CompressedChunk],
    footer: [u8; gzip::FOOTER_LEN],
}

impl<'a> SplicePlan<'a> {
    /// Builds the plan, computing the combined footer up front.
    ///
    /// # Errors
    ///
    /// [`SpliceError::InvalidInput`] when `chunks` is empty.
    pub fn new(chunks: &'a [CompressedChunk]) -> Result<Self, SpliceError> {
        if chunks.is_empty() {
            return Err(InvalidInput::EmptyChunkSequence.into());
        }
        let footer = combined_footer(chunks);
        debug!(
            chunks = chunks.len(),
            estimated_len = estimated_spliced_len(chunks),
            "splice planned"
        );
        Ok(Self { chunks, footer })
    }

    /// Upper bound on the assembled size.
    #[must_use]
    pub fn estimated_len(&self) -> usize {
        estimated_spliced_len(self.chunks)
    }

    /// The exact segments to emit, in order.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment<'_>> {
        // Header + footer + up to four segments per chunk.
        let mut segments = Vec::with_capacity(2 + self.chunks.len() * 4);
        segments.push(Segment::Bytes(&gzip::HEADER));

        let (last, joined) = self
            .chunks
            .split_last()
            .expect("plan construction rejects empty chunk sequences");

        for chunk in joined {
            let body = chunk.body();
            let offsets = chunk.offsets();
            let flag_index = chunk.final_block_flag_index();

            segments.push(Segment::Bytes(&body[offsets.payload_start..flag_index]));
            segments.push(Segment::Byte(
                body[flag_index] & !chunk.last_block_bit_mask(),
            ));
            segments.push(Segment::Bytes(&body[flag_index + 1..offsets.payload_end]));
            segments.push(Segment::Bytes(chunk.spacer().as_slice()));
        }

        segments.push(Segment::Bytes(last.deflate_payload()));
        segments.push(Segment::Bytes(&self.footer));
        segments
    }

    /// Assembles the spliced stream into one buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.estimated_len());
        for segment in self.segments() {
            match segment {
                Segment::Bytes(bytes) => out.extend_from_slice(bytes),
                Segment::Byte(byte) => out.push(byte),
            }
        }
        out
    }

    /// Streams the assembled bytes into `writer`, returning the number of
    /// bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let mut written = 0usize;
        for segment in self.segments() {
            match segment {
                Segment::Bytes(bytes) => {
                    writer.write_all(bytes)?;
                    written += bytes.len();
                }
                Segment::Byte(byte) => {
                    writer.write_all(&[byte])?;
                    written += 1;
                }
            }
        }
        Ok(written)
    }
}

/// Joins `chunks` into one complete, standards-compliant gzip stream.
///
/// Decompressing the result with any standard decoder yields exactly the
/// concatenation of the chunks' source buffers, in order.
pub fn splice_to_vec(chunks: &[CompressedChunk]) -> Result<Vec<u8>, SpliceError> {
    SplicePlan::new(chunks).map(|plan| plan.to_vec())
}

/// Joins `chunks` and streams the result into `writer`, returning the
/// number of bytes written.
pub fn write_spliced<W: Write>(
    chunks: &[CompressedChunk],
    writer: &mut W,
) -> Result<usize, SpliceError> {
    let plan = SplicePlan::new(chunks)?;
    Ok(plan.write_to(writer)?)
}
