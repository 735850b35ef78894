//! Coordinator-level errors.

use std::io;

use thiserror::Error;

use lurk_reader::ReaderError;

/// Errors surfaced by [`Buffer`](crate::Buffer) operations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// I/O failure opening or seeking the source.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A scanner failed while orienting.
    #[error(transparent)]
    Reader(#[from] ReaderError),

    /// Operation on a closed buffer.
    #[error("buffer is closed")]
    Closed,
}

/// Result alias for buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;
