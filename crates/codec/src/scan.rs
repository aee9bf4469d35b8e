//! # Overview
//!
//! Block-granular raw-deflate decoding.
//!
//! A [`BlockScanner`] inflates a raw deflate payload with zlib's `Z_BLOCK`
//! flush mode, which makes `inflate` return at every compressed-block
//! boundary. After each pause zlib's `data_type` field reports, in its low
//! three bits, how many bits of the most recently consumed byte still belong
//! to the *next* block's header — the bit-exact information the boundary
//! locator needs to find where the final block starts and to synthesize a
//! byte-aligned splice point. The boundary reached when the final block
//! completes is the terminal one (`data_type` carries both the boundary and
//! last-block bits there); decoding past it would byte-align the stream and
//! discard the terminal bit position, so the session stops at that pause.
//!
//! This is the only module in the workspace that touches `unsafe`: `flate2`
//! deliberately hides zlib's `data_type`, so the session drives
//! [`libz-sys`](https://docs.rs/libz-sys) directly. The `z_stream` lives in
//! a `Box<MaybeUninit<..>>` and is only ever accessed through raw pointers,
//! mirroring how `flate2`'s own C backend wraps the struct. `Drop` calls
//! `inflateEnd` unconditionally, so the session releases zlib's internal
//! buffers on every exit path.

use std::ffi::CStr;
use std::mem::MaybeUninit;
use std::os::raw::{c_int, c_uint};

use libz_sys::{
    Z_BLOCK, Z_BUF_ERROR, Z_DATA_ERROR, Z_MEM_ERROR, Z_NEED_DICT, Z_OK, Z_STREAM_END,
    Z_STREAM_ERROR, inflate, inflateEnd, inflateInit2_, z_stream, zlibVersion,
};
use thiserror::Error;

/// Raw deflate, no zlib or gzip wrapper.
const WINDOW_BITS_RAW: c_int = -15;

/// `data_type` bit zlib sets when `inflate` returned at a block boundary.
const BLOCK_BOUNDARY_BIT: c_int = 128;

/// `data_type` bit zlib sets once the final block's header has been read.
/// At a boundary it refers to the block just completed.
const LAST_BLOCK_BIT: c_int = 64;

/// Decoded output is discarded; the scratch buffer just bounds each call.
const SCRATCH_LEN: usize = 64 * 1024;

/// Error returned when the underlying codec session cannot be created.
#[derive(Clone, Copy, Debug, Error, Eq, PartialEq)]
#[error("failed to initialize inflate session (zlib status {code})")]
pub struct ScanInitError {
    code: i32,
}

impl ScanInitError {
    /// zlib status code reported by `inflateInit2`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self.code
    }
}

/// Errors raised while scanning a compressed payload.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScanError {
    /// zlib reported a data error; the payload is not a valid deflate stream.
    #[error("compressed payload is corrupt: {}", message.as_deref().unwrap_or("no detail"))]
    Corrupt {
        /// Diagnostic message from zlib, when one was provided.
        message: Option<String>,
    },
    /// zlib could not allocate its internal state.
    #[error("decoder ran out of memory")]
    OutOfMemory,
    /// The payload ended before its final block was fully decoded.
    #[error("compressed payload ended before its final block")]
    Truncated,
}

/// Position report produced each time the decoder pauses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlockBoundary {
    /// Number of input bytes consumed so far. The byte at `consumed - 1` is
    /// the most recently read one; when `intra_byte_bits != 0` its top
    /// `intra_byte_bits` bits belong to the next block.
    pub consumed: usize,
    /// Number of unused high bits in the last consumed byte (`0..=7`).
    /// Zero means the next block starts byte-aligned.
    pub intra_byte_bits: u8,
    /// Whether the final block has been fully decoded. No further
    /// boundaries follow once this is set.
    pub end_of_stream: bool,
}

/// Owned, scoped raw-inflate session over one payload slice.
///
/// Created per scan; nothing is shared between sessions, so independent
/// payloads can be scanned concurrently from separate sessions.
pub struct BlockScanner<'a> {
    stream: Box<MaybeUninit<z_stream>>,
    input: &'a [u8],
    /// Bytes of `input` handed to zlib so far (consumed plus `avail_in`).
    fed: usize,
    scratch: Box<[u8]>,
    terminal: Option<BlockBoundary>,
}

impl<'a> BlockScanner<'a> {
    /// Opens a scan session over `input`, a raw deflate payload.
    ///
    /// Bytes past the final block (such as a container footer) are never
    /// consumed.
    pub fn new(input: &'a [u8]) -> Result<Self, ScanInitError> {
        let mut stream: Box<MaybeUninit<z_stream>> = Box::new(MaybeUninit::zeroed());

        // SAFETY: a zeroed z_stream is the documented initial state (null
        // zalloc/zfree select zlib's default allocator); inflateInit2_ fully
        // initializes it or fails without requiring inflateEnd.
        let code = unsafe {
            inflateInit2_(
                stream.as_mut_ptr(),
                WINDOW_BITS_RAW,
                zlibVersion(),
                size_of::<z_stream>() as c_int,
            )
        };
        if code != Z_OK {
            return Err(ScanInitError { code });
        }

        Ok(Self {
            stream,
            input,
            fed: 0,
            scratch: vec![0u8; SCRATCH_LEN].into_boxed_slice(),
            terminal: None,
        })
    }

    /// Advances decoding to the next block boundary or the end of the
    /// stream.
    ///
    /// Once the boundary with [`BlockBoundary::end_of_stream`] set has been
    /// returned, further calls return it again.
    pub fn step(&mut self) -> Result<BlockBoundary, ScanError> {
        if let Some(terminal) = self.terminal {
            return Ok(terminal);
        }

        let strm = self.stream.as_mut_ptr();
        loop {
            // SAFETY: strm was initialized by inflateInit2_; next_in points
            // into `input` which outlives `self`, and next_out into the
            // owned scratch buffer. zlib only reads input and writes within
            // the avail_* bounds handed to it.
            let (code, avail_in, data_type) = unsafe {
                if (*strm).avail_in == 0 && self.fed < self.input.len() {
                    let take = (self.input.len() - self.fed).min(c_uint::MAX as usize);
                    (*strm).next_in = self.input.as_ptr().add(self.fed).cast_mut();
                    (*strm).avail_in = take as c_uint;
                    self.fed += take;
                }
                (*strm).next_out = self.scratch.as_mut_ptr();
                (*strm).avail_out = self.scratch.len() as c_uint;

                let code = inflate(strm, Z_BLOCK);
                (code, (*strm).avail_in as usize, (*strm).data_type)
            };

            match code {
                Z_NEED_DICT | Z_DATA_ERROR | Z_STREAM_ERROR => {
                    return Err(ScanError::Corrupt {
                        message: self.zlib_message(),
                    });
                }
                Z_MEM_ERROR => return Err(ScanError::OutOfMemory),
                Z_BUF_ERROR => {
                    // Fresh output space is supplied every iteration, so no
                    // progress means the input ran out mid-stream.
                    if avail_in == 0 && self.fed == self.input.len() {
                        return Err(ScanError::Truncated);
                    }
                    continue;
                }
                _ => {}
            }

            // The terminal boundary is the one right after the final block
            // completes: zlib pauses there with Z_OK and both the boundary
            // and last-block bits set. Calling inflate again would
            // byte-align the stream before reporting Z_STREAM_END, zeroing
            // `data_type & 7` and losing the terminal bit position.
            let at_boundary = data_type & BLOCK_BOUNDARY_BIT != 0;
            let end_of_stream = code == Z_STREAM_END
                || (at_boundary && data_type & LAST_BLOCK_BIT != 0);

            let boundary = BlockBoundary {
                consumed: self.fed - avail_in,
                intra_byte_bits: (data_type & 7) as u8,
                end_of_stream,
            };

            if end_of_stream {
                self.terminal = Some(boundary);
                return Ok(boundary);
            }
            if at_boundary {
                return Ok(boundary);
            }
            // Scratch filled mid-block; drain and continue.
        }
    }

    fn zlib_message(&mut self) -> Option<String> {
        // SAFETY: msg is either null or a NUL-terminated static string
        // owned by zlib.
        let msg = unsafe { (*self.stream.as_mut_ptr()).msg };
        if msg.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned())
        }
    }
}

impl Drop for BlockScanner<'_> {
    fn drop(&mut self) {
        // SAFETY: the stream was initialized in new(); inflateEnd releases
        // zlib's internal buffers and tolerates repeated calls.
        unsafe {
            inflateEnd(self.stream.as_mut_ptr());
        }
    }
}

impl std::fmt::Debug for BlockScanner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockScanner")
            .field("input_len", &self.input.len())
            .field("fed", &self.fed)
            .field("terminal", &self.terminal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gzip;

    #[test]
    fn empty_stream_finishes_in_one_step() {
        // Deflate of the empty input: one empty final fixed-Huffman block,
        // ten bits, six unused.
        let mut scanner = BlockScanner::new(&gzip::FINAL_BLOCK).expect("init");
        let boundary = scanner.step().expect("step");
        assert_eq!(
            boundary,
            BlockBoundary {
                consumed: 2,
                intra_byte_bits: 6,
                end_of_stream: true,
            }
        );
    }

    #[test]
    fn final_block_boundary_keeps_its_bit_position() {
        // A single fixed-Huffman block over "abc": 3 header bits, three
        // 8-bit literals, the 7-bit end-of-block code. 34 bits, so six of
        // the last byte's bits are unused. The terminal report must carry
        // that count rather than the zero a post-alignment Z_STREAM_END
        // would read.
        let payload = gzip::deflate_to_vec(b"abc", 6).expect("deflate");
        let mut scanner = BlockScanner::new(&payload).expect("init");
        let boundary = scanner.step().expect("step");
        assert!(boundary.end_of_stream);
        assert_eq!(boundary.consumed, payload.len());
        assert_eq!(boundary.intra_byte_bits, 6);
    }

    #[test]
    fn terminal_boundary_is_sticky() {
        let mut scanner = BlockScanner::new(&gzip::FINAL_BLOCK).expect("init");
        let first = scanner.step().expect("step");
        let second = scanner.step().expect("repeat step");
        assert_eq!(first, second);
    }

    #[test]
    fn scan_consumes_exactly_the_stream() {
        let payload = gzip::deflate_to_vec(b"some moderately sized payload", 6).expect("deflate");
        let mut scanner = BlockScanner::new(&payload).expect("init");
        loop {
            let boundary = scanner.step().expect("step");
            assert!(boundary.intra_byte_bits <= 7);
            if boundary.end_of_stream {
                assert_eq!(boundary.consumed, payload.len());
                break;
            }
        }
    }

    #[test]
    fn footer_bytes_after_the_stream_are_not_consumed() {
        let mut payload = gzip::deflate_to_vec(b"payload", 6).expect("deflate");
        let stream_len = payload.len();
        payload.extend_from_slice(&[0xAA; 8]);

        let mut scanner = BlockScanner::new(&payload).expect("init");
        loop {
            let boundary = scanner.step().expect("step");
            if boundary.end_of_stream {
                assert_eq!(boundary.consumed, stream_len);
                break;
            }
        }
    }

    #[test]
    fn truncated_stream_is_reported() {
        let payload = gzip::deflate_to_vec(&vec![7u8; 4096], 6).expect("deflate");
        let truncated = &payload[..payload.len() - 2];

        let mut scanner = BlockScanner::new(truncated).expect("init");
        let err = loop {
            match scanner.step() {
                Ok(boundary) => assert!(!boundary.end_of_stream, "truncated stream ended cleanly"),
                Err(err) => break err,
            }
        };
        assert_eq!(err, ScanError::Truncated);
    }

    #[test]
    fn reserved_block_type_is_corrupt() {
        // BTYPE=11 is reserved; zlib reports a data error immediately.
        let payload = [0x07u8, 0x00, 0x00];
        let mut scanner = BlockScanner::new(&payload).expect("init");
        let err = scanner.step().expect_err("reserved block type");
        assert!(matches!(err, ScanError::Corrupt { .. }));
    }
}
