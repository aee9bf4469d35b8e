//! CRC-32 checksum state, wire-format digest, and ordered combination.
//!
//! The checksum algorithm is the one used by gzip containers (polynomial
//! `0xedb88320`, seed equal to the checksum of the empty sequence). The
//! combination operation reproduces zlib's `crc32_combine`: the CRC is linear
//! over GF(2), so "append `len` zero bytes" is a 32x32 bit matrix that can be
//! raised to the required power in `O(log len)` squarings and applied to a
//! finished checksum.

mod combine;
mod digest;
mod error;

pub use combine::{Crc32Combiner, crc32_combine};
pub use digest::Crc32Digest;
pub use error::DigestSliceError;

use flate2::Crc;

/// Streaming CRC-32 over raw bytes.
///
/// Thin wrapper around the checksum state shipped with [`flate2`], kept so
/// the rest of the workspace never touches the codec crate for checksum-only
/// work.
#[derive(Debug, Default)]
pub struct Crc32 {
    inner: Crc,
}

impl Crc32 {
    /// Creates checksum state seeded with the checksum of the empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Crc::new() }
    }

    /// Feeds `data` into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Number of bytes consumed so far.
    #[must_use]
    pub fn bytes_consumed(&self) -> u32 {
        self.inner.amount()
    }

    /// Returns the checksum of everything consumed so far.
    #[must_use]
    pub fn digest(&self) -> Crc32Digest {
        Crc32Digest::from_value(self.inner.sum())
    }

    /// Convenience helper computing the digest of a single buffer.
    #[must_use]
    pub fn digest_of(data: &[u8]) -> Crc32Digest {
        let mut state = Self::new();
        state.update(data);
        state.digest()
    }
}
