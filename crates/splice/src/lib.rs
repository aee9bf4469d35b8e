#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `splice` joins many independently compressed gzip chunks into one valid
//! compressed stream, and computes the stream's overall checksum and
//! length, without ever decompressing and recompressing the combined
//! payload. It targets producers that accumulate data in increments (log or
//! chat fragments, say) and must periodically re-package everything
//! collected so far as a single standards-compliant archive.
//!
//! # Design
//!
//! - [`CompressedChunk`] compresses one buffer into a self-contained
//!   container and captures the splice metadata: payload offsets, the final
//!   block's flag bit, the [`SpacerBytes`], and the checksum/length pair.
//! - [`locate_boundary`] performs the bit-level work: a block-granular
//!   decode of the payload finds where the final compressed block starts
//!   and re-encodes the tail into a short byte-aligned spacer.
//! - [`SplicePlan`] and [`splice_to_vec`] assemble chunks into one stream:
//!   header, flag-cleared payloads joined by spacers, the last chunk
//!   verbatim, and a footer carrying the combined checksum from
//!   [`checksums::Crc32Combiner`].
//!
//! # Concurrency
//!
//! Every operation is synchronous and shares no state between calls.
//! Chunks may be compressed and boundary-located in parallel across
//! threads; only the final ordered assembly is inherently sequential.
//! Codec sessions are owned values torn down on every exit path.
//!
//! # Examples
//!
//! ```
//! use splice::{CompressedChunk, splice_to_vec};
//!
//! let chunks = vec![
//!     CompressedChunk::compress(b"hello", 6)?,
//!     CompressedChunk::compress(b"world", 6)?,
//! ];
//! let stream = splice_to_vec(&chunks)?;
//! assert_eq!(codec::gzip::decompress(&stream)?.as_slice(), b"helloworld");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod boundary;
mod chunk;
mod error;
mod stream;

pub use boundary::{Boundary, SpacerBytes, locate_boundary};
pub use chunk::{ChunkOffsets, CompressedChunk};
pub use error::{InvalidInput, SpliceError};
pub use stream::{
    Segment, SplicePlan, combined_checksum, combined_footer, estimated_spliced_len, splice_to_vec,
    write_spliced,
};
