#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Adapter over the deflate codec for the gzip splicing workspace. Two
//! concerns live here and nowhere else:
//!
//! - [`gzip`] — the fixed container framing (header, footer, terminal empty
//!   block) plus one-shot compression and decompression built on
//!   [`flate2`](https://docs.rs/flate2).
//! - [`scan`] — a raw-deflate decoding session that pauses at every
//!   compressed-block boundary and reports the sub-byte bit position of the
//!   next block's header. `flate2` does not expose zlib's `Z_BLOCK` flush
//!   mode or the `data_type` introspection it feeds, so this module binds
//!   [`libz-sys`](https://docs.rs/libz-sys) directly. All `unsafe` in the
//!   workspace is confined to that module.
//!
//! # Invariants
//!
//! - Every codec session is an owned value whose resources are released on
//!   drop, on success and error paths alike. No ambient codec state is
//!   shared between calls.
//! - Compression helpers return [`std::io::Result`] like the underlying
//!   `flate2` writers; scan errors carry zlib's diagnostic message when one
//!   is available.
//!
//! # Examples
//!
//! ```
//! use codec::gzip;
//!
//! let body = gzip::compress(b"payload", 6)?;
//! assert_eq!(&body[..10], &gzip::HEADER);
//! assert_eq!(gzip::decompress(&body)?, b"payload");
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod gzip;
pub mod scan;

pub use scan::{BlockBoundary, BlockScanner, ScanError, ScanInitError};
