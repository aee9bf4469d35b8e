use std::io;

use checksums::DigestSliceError;
use codec::{ScanError, ScanInitError};
use thiserror::Error;

/// Detail carried by [`SpliceError::InvalidInput`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum InvalidInput {
    /// A checksum buffer of the wrong length was supplied to the combiner.
    #[error(transparent)]
    Digest(#[from] DigestSliceError),
    /// A splice was requested over an empty chunk sequence.
    #[error("splicing requires at least one chunk")]
    EmptyChunkSequence,
}

/// Errors raised while compressing, locating boundaries, or splicing.
///
/// No operation retries internally; every failure carries enough context
/// (stage, chunk index where known) for the caller to decide whether to
/// drop the chunk, retry with different parameters, or abort the splice.
#[derive(Debug, Error)]
pub enum SpliceError {
    /// The underlying codec session could not be created.
    #[error("codec initialization failed")]
    CodecInit(#[from] ScanInitError),

    /// The encoder reported a hard error mid-stream.
    #[error("compression failed")]
    Compression(#[source] io::Error),

    /// The boundary scan hit corrupt or truncated compressed data.
    #[error("boundary scan failed{}", fmt_chunk(*chunk))]
    Decode {
        /// Index of the offending chunk, when the failure occurred inside a
        /// multi-chunk operation.
        chunk: Option<usize>,
        /// Underlying codec diagnostic.
        #[source]
        source: ScanError,
    },

    /// Malformed metadata was supplied by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Writing the assembled stream to its destination failed.
    #[error("failed to write spliced stream")]
    Io(#[from] io::Error),
}

impl SpliceError {
    /// Attaches a chunk index to a decode failure, leaving other variants
    /// untouched.
    #[must_use]
    pub fn for_chunk(self, index: usize) -> Self {
        match self {
            Self::Decode { chunk: None, source } => Self::Decode {
                chunk: Some(index),
                source,
            },
            other => other,
        }
    }
}

impl From<ScanError> for SpliceError {
    fn from(source: ScanError) -> Self {
        Self::Decode {
            chunk: None,
            source,
        }
    }
}

impl From<DigestSliceError> for SpliceError {
    fn from(err: DigestSliceError) -> Self {
        Self::InvalidInput(InvalidInput::Digest(err))
    }
}

fn fmt_chunk(chunk: Option<usize>) -> String {
    chunk.map_or_else(String::new, |index| format!(" for chunk {index}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_reports_chunk_index() {
        let err = SpliceError::from(ScanError::Truncated).for_chunk(3);
        assert_eq!(
            err.to_string(),
            "boundary scan failed for chunk 3".to_string()
        );
    }

    #[test]
    fn for_chunk_leaves_other_variants_untouched() {
        let err = SpliceError::from(InvalidInput::EmptyChunkSequence).for_chunk(1);
        assert!(matches!(
            err,
            SpliceError::InvalidInput(InvalidInput::EmptyChunkSequence)
        ));
    }
}
