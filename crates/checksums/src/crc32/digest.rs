use core::fmt;

use super::error::DigestSliceError;

/// CRC-32 digest as carried in a gzip container footer.
///
/// Containers store the checksum as four little-endian bytes. The digest
/// decodes from and encodes to that byte order explicitly, independent of
/// host endianness, so metadata produced on one machine splices correctly on
/// any other.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Crc32Digest {
    value: u32,
}

impl Crc32Digest {
    /// Number of bytes in the wire representation.
    pub const WIRE_LEN: usize = 4;

    /// Creates a digest from a raw checksum value.
    #[must_use]
    pub const fn from_value(value: u32) -> Self {
        Self { value }
    }

    /// Decodes a digest from its little-endian wire form.
    ///
    /// # Examples
    ///
    /// ```
    /// use checksums::Crc32Digest;
    ///
    /// let digest = Crc32Digest::from_le_slice(&[0x26, 0x39, 0xf4, 0xcb]).unwrap();
    /// assert_eq!(digest.value(), 0xcbf43926);
    /// ```
    pub fn from_le_slice(bytes: &[u8]) -> Result<Self, DigestSliceError> {
        let bytes: [u8; Self::WIRE_LEN] = bytes
            .try_into()
            .map_err(|_| DigestSliceError::new(bytes.len()))?;
        Ok(Self::from_value(u32::from_le_bytes(bytes)))
    }

    /// Returns the raw checksum value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.value
    }

    /// Encodes the digest in its little-endian wire form.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; Self::WIRE_LEN] {
        self.value.to_le_bytes()
    }
}

impl fmt::Display for Crc32Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.value)
    }
}

impl From<u32> for Crc32Digest {
    fn from(value: u32) -> Self {
        Self::from_value(value)
    }
}

impl From<Crc32Digest> for u32 {
    fn from(digest: Crc32Digest) -> Self {
        digest.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_round_trip_preserves_value() {
        let digest = Crc32Digest::from_value(0xdeadbeef);
        let decoded = Crc32Digest::from_le_slice(&digest.to_le_bytes()).expect("4-byte slice");
        assert_eq!(decoded, digest);
    }

    #[test]
    fn wire_form_is_little_endian() {
        let digest = Crc32Digest::from_value(0x01020304);
        assert_eq!(digest.to_le_bytes(), [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn short_slice_is_rejected_with_length() {
        let err = Crc32Digest::from_le_slice(&[1, 2, 3]).expect_err("3 bytes rejected");
        assert_eq!(err.len(), 3);
    }

    #[test]
    fn long_slice_is_rejected() {
        let err = Crc32Digest::from_le_slice(&[0; 5]).expect_err("5 bytes rejected");
        assert_eq!(err.len(), 5);
    }
}
