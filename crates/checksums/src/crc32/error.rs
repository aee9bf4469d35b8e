use core::fmt;

/// Error returned when decoding a CRC-32 digest from a byte slice of the
/// wrong length.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DigestSliceError {
    len: usize,
}

impl DigestSliceError {
    /// Number of bytes required to decode a digest.
    pub const EXPECTED_LEN: usize = 4;

    pub(crate) const fn new(len: usize) -> Self {
        Self { len }
    }

    /// Number of bytes the caller supplied when the error was raised.
    #[must_use]
    pub const fn len(self) -> usize {
        self.len
    }

    /// Reports whether the offending slice was empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for DigestSliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CRC-32 digest requires {} bytes, received {}",
            Self::EXPECTED_LEN,
            self.len
        )
    }
}

impl std::error::Error for DigestSliceError {}
