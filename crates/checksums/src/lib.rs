#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! CRC-32 primitives for the gzip splicing workspace. The crate wraps the
//! streaming checksum exposed by [`flate2`](https://docs.rs/flate2) behind a
//! small digest type with an explicit little-endian wire form, and implements
//! the algebraic combination operation that merges per-chunk checksums into
//! the checksum of their logical concatenation without re-reading any data.
//!
//! # Design
//!
//! - [`Crc32`] computes the checksum of a byte stream incrementally.
//! - [`Crc32Digest`] is the 4-byte value carried in gzip container footers.
//!   It decodes from and encodes to little-endian bytes explicitly, so the
//!   wire format is identical on every host.
//! - [`crc32_combine`] and [`Crc32Combiner`] implement zlib's GF(2) matrix
//!   trick: appending `len` zero bytes to a message transforms its CRC by a
//!   linear operator, so the operator can be applied to a finished checksum
//!   instead of the data.
//!
//! # Examples
//!
//! ```
//! use checksums::{Crc32, Crc32Combiner};
//!
//! let a = Crc32::digest_of(b"hello");
//! let b = Crc32::digest_of(b"world");
//!
//! let mut combiner = Crc32Combiner::new();
//! combiner.push(a, b"hello".len() as u32);
//! combiner.push(b, b"world".len() as u32);
//!
//! assert_eq!(combiner.digest(), Crc32::digest_of(b"helloworld"));
//! assert_eq!(combiner.total_length(), 10);
//! ```

mod crc32;

pub use crc32::{Crc32, Crc32Combiner, Crc32Digest, DigestSliceError, crc32_combine};
