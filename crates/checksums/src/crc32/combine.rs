use super::digest::Crc32Digest;

/// Reflected CRC-32 polynomial used by gzip containers.
const POLY: u32 = 0xedb88320;

/// Multiplies the GF(2) matrix `mat` by the bit vector `vec`.
fn gf2_matrix_times(mat: &[u32; 32], mut vec: u32) -> u32 {
    let mut sum = 0;
    let mut row = 0;
    while vec != 0 {
        if vec & 1 != 0 {
            sum ^= mat[row];
        }
        vec >>= 1;
        row += 1;
    }
    sum
}

/// Squares a GF(2) matrix: `square = mat * mat`.
fn gf2_matrix_square(square: &mut [u32; 32], mat: &[u32; 32]) {
    for (dst, &row) in square.iter_mut().zip(mat.iter()) {
        *dst = gf2_matrix_times(mat, row);
    }
}

/// Combines two CRC-32 values into the checksum of the concatenated data.
///
/// `crc_a` covers some message `A`, `crc_b` covers a message `B` of `len_b`
/// bytes; the result is the checksum of `A ++ B` computed without touching
/// either message again. The CRC is linear over GF(2): appending `len_b`
/// zero bytes to `A` transforms its checksum by a fixed 32x32 bit matrix,
/// raised here to the required power by repeated squaring.
///
/// The operation is **not** commutative; the second operand's length
/// parameterises the matrix.
///
/// # Examples
///
/// ```
/// use checksums::{Crc32, crc32_combine};
///
/// let ab = crc32_combine(
///     Crc32::digest_of(b"hello").value(),
///     Crc32::digest_of(b"world").value(),
///     5,
/// );
/// assert_eq!(ab, Crc32::digest_of(b"helloworld").value());
/// ```
#[must_use]
pub fn crc32_combine(crc_a: u32, crc_b: u32, len_b: u64) -> u32 {
    // Appending nothing leaves the first checksum untouched.
    if len_b == 0 {
        return crc_a;
    }

    let mut even = [0u32; 32];
    let mut odd = [0u32; 32];

    // Operator for one zero bit: the CRC shift with polynomial feedback.
    odd[0] = POLY;
    let mut row = 1u32;
    for cell in odd.iter_mut().skip(1) {
        *cell = row;
        row <<= 1;
    }

    // Square once for two zero bits, again for four, so the loop below
    // starts at the eight-bit (one zero byte) operator.
    gf2_matrix_square(&mut even, &odd);
    gf2_matrix_square(&mut odd, &even);

    let mut crc = crc_a;
    let mut len = len_b;
    loop {
        gf2_matrix_square(&mut even, &odd);
        if len & 1 != 0 {
            crc = gf2_matrix_times(&even, crc);
        }
        len >>= 1;
        if len == 0 {
            break;
        }

        gf2_matrix_square(&mut odd, &even);
        if len & 1 != 0 {
            crc = gf2_matrix_times(&odd, crc);
        }
        len >>= 1;
        if len == 0 {
            break;
        }
    }

    crc ^ crc_b
}

/// Ordered fold of `(digest, length)` pairs into the checksum and length of
/// their logical concatenation.
///
/// Pairs must be pushed in the same order the corresponding raw buffers were
/// concatenated. The running length wraps at 32 bits to match the gzip
/// footer's length-mod-2^32 field.
#[derive(Clone, Copy, Debug, Default)]
pub struct Crc32Combiner {
    crc: u32,
    total_length: u32,
}

impl Crc32Combiner {
    /// Starts from the checksum of the empty sequence.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            crc: 0,
            total_length: 0,
        }
    }

    /// Appends one `(digest, length)` pair to the running combination.
    pub fn push(&mut self, digest: Crc32Digest, length: u32) {
        self.crc = crc32_combine(self.crc, digest.value(), u64::from(length));
        self.total_length = self.total_length.wrapping_add(length);
    }

    /// Checksum of the concatenation folded so far.
    #[must_use]
    pub const fn digest(&self) -> Crc32Digest {
        Crc32Digest::from_value(self.crc)
    }

    /// Total length of the concatenation, mod 2^32.
    #[must_use]
    pub const fn total_length(&self) -> u32 {
        self.total_length
    }
}

impl Extend<(Crc32Digest, u32)> for Crc32Combiner {
    fn extend<I: IntoIterator<Item = (Crc32Digest, u32)>>(&mut self, pairs: I) {
        for (digest, length) in pairs {
            self.push(digest, length);
        }
    }
}

impl FromIterator<(Crc32Digest, u32)> for Crc32Combiner {
    fn from_iter<I: IntoIterator<Item = (Crc32Digest, u32)>>(pairs: I) -> Self {
        let mut combiner = Self::new();
        combiner.extend(pairs);
        combiner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Crc32;

    #[test]
    fn combining_with_empty_tail_is_identity() {
        let crc = Crc32::digest_of(b"payload").value();
        assert_eq!(crc32_combine(crc, 0, 0), crc);
    }

    #[test]
    fn combine_matches_direct_checksum() {
        let a = b"the quick brown fox ";
        let b = b"jumps over the lazy dog";
        let combined = crc32_combine(
            Crc32::digest_of(a).value(),
            Crc32::digest_of(b).value(),
            b.len() as u64,
        );
        let mut whole = Vec::new();
        whole.extend_from_slice(a);
        whole.extend_from_slice(b);
        assert_eq!(combined, Crc32::digest_of(&whole).value());
    }

    #[test]
    fn combination_is_order_sensitive() {
        let a = Crc32::digest_of(b"abc");
        let b = Crc32::digest_of(b"defg");

        let mut forward = Crc32Combiner::new();
        forward.push(a, 3);
        forward.push(b, 4);

        let mut reversed = Crc32Combiner::new();
        reversed.push(b, 4);
        reversed.push(a, 3);

        assert_ne!(forward.digest(), reversed.digest());
        assert_eq!(forward.total_length(), reversed.total_length());
    }

    #[test]
    fn combiner_folds_many_pairs() {
        let parts: [&[u8]; 4] = [b"alpha", b"", b"beta", b"gamma delta"];
        let combiner: Crc32Combiner = parts
            .iter()
            .map(|part| (Crc32::digest_of(part), part.len() as u32))
            .collect();

        let whole: Vec<u8> = parts.concat();
        assert_eq!(combiner.digest(), Crc32::digest_of(&whole));
        assert_eq!(combiner.total_length() as usize, whole.len());
    }

    #[test]
    fn total_length_wraps_at_32_bits() {
        let mut combiner = Crc32Combiner::new();
        combiner.push(Crc32Digest::from_value(0), u32::MAX);
        combiner.push(Crc32Digest::from_value(0), 2);
        assert_eq!(combiner.total_length(), 1);
    }
}
