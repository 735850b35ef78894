//! Backwards line scanning by chunked reverse reads.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{ReaderError, Result};
use crate::read_backwards::read_backwards_from;

/// Consecutive zero-byte reads tolerated while filling a chunk before the
/// scanner gives up with [`ReaderError::NoProgress`].
const MAX_EMPTY_READS: usize = 10;

/// One line yielded by [`BackwardsLineScanner::read_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackwardLine {
    /// The line's bytes, without the trailing `\n`.
    pub bytes: Vec<u8>,
    /// Absolute offset of the line's first byte in the stream.
    pub offset: u64,
    /// True when this line starts at byte 0 and the scanner is exhausted.
    /// Once a line has been returned with `at_start`, every further call
    /// yields an empty line with `at_start` again.
    pub at_start: bool,
}

/// Yields lines in reverse order from an absolute starting position.
///
/// A "line" is the maximal byte run not containing `\n`, bounded on the
/// leading side by the previous `\n` or the beginning of the stream, and on
/// the trailing side by a `\n` or the starting position. The terminating
/// `\n` is never part of the returned bytes.
///
/// The scanner loads fixed-size chunks walking backwards through the stream
/// and reassembles lines across chunk boundaries, so a line may span any
/// number of chunks (including `chunk_size == 1`).
pub struct BackwardsLineScanner<R> {
    reader: R,
    chunk_size: usize,
    /// Absolute offset of the first byte of the earliest loaded chunk.
    next_pos: u64,
    /// Loaded chunks. Index 0 is the first-loaded (latest in the stream);
    /// the last entry is the earliest, and is the one scanned for newlines.
    chunks: Vec<Vec<u8>>,
    /// Cached index of the last `\n` within the earliest chunk, when known.
    pending_newline: Option<usize>,
    /// The scanner has loaded data down to byte 0.
    reached_start: bool,
    /// The at-start line has been emitted.
    exhausted: bool,
    closed: bool,
    failed: Option<ReaderError>,
}

impl<R: Read + Seek> BackwardsLineScanner<R> {
    /// Create a scanner that reads backwards from the position `seek`
    /// resolves to.
    ///
    /// # Errors
    ///
    /// Fails if the initial seek fails.
    pub fn new(mut reader: R, chunk_size: usize, seek: SeekFrom) -> Result<Self> {
        let pos = reader.seek(seek)?;
        Ok(Self {
            reader,
            chunk_size: chunk_size.max(1),
            next_pos: pos,
            chunks: Vec::new(),
            pending_newline: None,
            reached_start: pos == 0,
            exhausted: false,
            closed: false,
            failed: None,
        })
    }

    /// Whether the scanner has emitted its at-start line and has nothing
    /// more to yield.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Release buffered chunks and refuse all further reads.
    pub fn close(&mut self) {
        self.closed = true;
        self.chunks = Vec::new();
        self.pending_newline = None;
    }

    /// Read the next line, walking backwards.
    ///
    /// # Errors
    ///
    /// - [`ReaderError::UseAfterClose`] after [`close`](Self::close).
    /// - [`ReaderError::UnexpectedEof`] if the stream shrank below an offset
    ///   that was valid earlier. The scanner stays failed.
    /// - [`ReaderError::NoProgress`] after repeated stalled reads.
    /// - [`ReaderError::Io`] for seek/read failures. The scanner stays
    ///   failed.
    pub fn read_line(&mut self) -> Result<BackwardLine> {
        if self.closed {
            return Err(ReaderError::UseAfterClose);
        }
        if let Some(err) = &self.failed {
            return Err(err.replay());
        }

        loop {
            if self.pending_newline.is_none() && !self.reached_start {
                if let Err(e) = self.load_chunk() {
                    let surfaced = e.replay();
                    self.failed = Some(e);
                    return Err(surfaced);
                }
            }

            if self.chunks.is_empty() {
                // Nothing buffered and nothing earlier in the stream.
                self.exhausted = true;
                return Ok(BackwardLine {
                    bytes: Vec::new(),
                    offset: 0,
                    at_start: true,
                });
            }

            let nl = match self.pending_newline.take() {
                Some(idx) => Some(idx),
                None => self
                    .chunks
                    .last()
                    .and_then(|chunk| last_newline(chunk)),
            };

            match nl {
                Some(idx) => return Ok(self.emit(Some(idx))),
                None if self.reached_start => return Ok(self.emit(None)),
                // The line continues into earlier chunks; keep loading.
                None => {}
            }
        }
    }

    /// Assemble and return a line that ends at the earliest chunk.
    ///
    /// With `Some(idx)` the line starts just after the `\n` at `idx` in the
    /// earliest chunk; the bytes before it are retained as the tail of the
    /// next (earlier) line. With `None` the line starts at byte 0.
    fn emit(&mut self, nl: Option<usize>) -> BackwardLine {
        let Some(earliest) = self.chunks.pop() else {
            self.exhausted = true;
            return BackwardLine {
                bytes: Vec::new(),
                offset: 0,
                at_start: true,
            };
        };

        let start = nl.map_or(0, |idx| idx + 1);
        let rest: usize = self.chunks.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(earliest.len() - start + rest);
        bytes.extend_from_slice(&earliest[start..]);
        // Remaining chunks were loaded walking backwards, so reverse load
        // order is stream order.
        for chunk in self.chunks.iter().rev() {
            bytes.extend_from_slice(chunk);
        }
        self.chunks.clear();

        match nl {
            Some(idx) => {
                let offset = self.next_pos + idx as u64 + 1;
                let residual = earliest[..idx].to_vec();
                self.pending_newline = last_newline(&residual);
                self.chunks.push(residual);
                BackwardLine {
                    bytes,
                    offset,
                    at_start: false,
                }
            }
            None => {
                self.exhausted = true;
                self.pending_newline = None;
                BackwardLine {
                    bytes,
                    offset: self.next_pos,
                    at_start: true,
                }
            }
        }
    }

    /// Load one more chunk walking backwards, retrying short reads.
    fn load_chunk(&mut self) -> Result<()> {
        let to_read = self.next_pos.min(self.chunk_size as u64) as usize;
        if to_read == 0 {
            self.reached_start = true;
            return Ok(());
        }

        let mut buf = vec![0u8; to_read];
        let first = read_backwards_from(&mut self.reader, self.next_pos, &mut buf)?;
        let chunk_start = self.next_pos - to_read as u64;
        let mut n = first.n;
        let mut empty_reads = 0;
        while n < to_read {
            match self.reader.read(&mut buf[n..]) {
                Ok(0) => {
                    // Either EOF (the file shrank, since `next_pos` was valid
                    // when stored) or a stalling reader. Probe the current
                    // length to tell them apart.
                    let end = self.reader.seek(SeekFrom::End(0))?;
                    if end < self.next_pos {
                        tracing::warn!(
                            expected = self.next_pos,
                            end,
                            "source shrank under the backwards scanner"
                        );
                        return Err(ReaderError::UnexpectedEof {
                            offset: self.next_pos,
                        });
                    }
                    self.reader.seek(SeekFrom::Start(chunk_start + n as u64))?;
                    empty_reads += 1;
                    if empty_reads >= MAX_EMPTY_READS {
                        return Err(ReaderError::NoProgress {
                            offset: chunk_start + n as u64,
                        });
                    }
                }
                Ok(k) => {
                    n += k;
                    empty_reads = 0;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }

        self.next_pos = chunk_start;
        self.chunks.push(buf);
        if self.next_pos == 0 {
            self.reached_start = true;
        }
        Ok(())
    }
}

fn last_newline(chunk: &[u8]) -> Option<usize> {
    chunk.iter().rposition(|&b| b == b'\n')
}
