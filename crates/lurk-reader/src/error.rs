//! Error types shared by the scanners.

use std::io;

use thiserror::Error;

/// Errors produced by the line scanners.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// Unrecoverable read or seek failure on the underlying stream.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before an offset that was valid when the scanner was
    /// created. The file shrank underneath us; reads from stale offsets are
    /// undefined, so the scanner refuses to continue.
    #[error("stream ended before expected offset {offset} (source was truncated?)")]
    UnexpectedEof {
        /// Absolute offset the scanner expected to still be readable.
        offset: u64,
    },

    /// Repeated zero-byte reads at a position that should have bytes
    /// available.
    #[error("no read progress at offset {offset}")]
    NoProgress {
        /// Absolute offset of the stalled read.
        offset: u64,
    },

    /// Operation attempted on a scanner after `close()`.
    #[error("scanner used after close")]
    UseAfterClose,
}

impl ReaderError {
    /// Rebuild an equivalent error for sticky-failure replay.
    ///
    /// `io::Error` is not `Clone`, so a scanner that must keep returning the
    /// error that poisoned it re-surfaces it through this.
    pub(crate) fn replay(&self) -> ReaderError {
        match self {
            ReaderError::Io(e) => ReaderError::Io(io::Error::new(e.kind(), e.to_string())),
            ReaderError::UnexpectedEof { offset } => {
                ReaderError::UnexpectedEof { offset: *offset }
            }
            ReaderError::NoProgress { offset } => ReaderError::NoProgress { offset: *offset },
            ReaderError::UseAfterClose => ReaderError::UseAfterClose,
        }
    }
}

/// Result alias for scanner operations.
pub type Result<T> = std::result::Result<T, ReaderError>;
