//! Forwards line scanning that survives end-of-file.
//!
//! Standard line splitters treat EOF as the end of input and hand back (or
//! drop) whatever partial line they were holding. A tail-capable viewer
//! cannot do that: the file it watches grows, and a line that is partial now
//! will be completed by a later append. [`ForwardsLineScanner`] treats EOF as
//! "pause": `scan` returns `false` with no error, the partial token is
//! retained, and the next `scan` splices freshly appended bytes onto it.

use std::borrow::Cow;
use std::io::{self, Read};

const READ_BUF_SIZE: usize = 8 * 1024;

/// Yields `\n`-terminated lines in forward order, resumable across EOF.
pub struct ForwardsLineScanner<R> {
    reader: R,
    /// Accumulated bytes of the line in progress (no trailing `\n`).
    token: Vec<u8>,
    /// `token` holds a partial line awaiting more data.
    carry: bool,
    /// `token` holds a complete line, valid until the next `scan`.
    complete: bool,
    err: Option<io::Error>,
    buf: Vec<u8>,
    buf_pos: usize,
    buf_len: usize,
}

impl<R: Read> ForwardsLineScanner<R> {
    /// Wrap a reader positioned at the start of a line.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            token: Vec::new(),
            carry: false,
            complete: false,
            err: None,
            buf: vec![0u8; READ_BUF_SIZE],
            buf_pos: 0,
            buf_len: 0,
        }
    }

    /// Advance to the next line.
    ///
    /// Returns `true` when a complete line is available via
    /// [`bytes`](Self::bytes). Returns `false` at EOF (no error; call again
    /// once the file has grown) or after a hard I/O error (see
    /// [`last_error`](Self::last_error)).
    pub fn scan(&mut self) -> bool {
        if self.err.is_some() {
            self.complete = false;
            return false;
        }
        if !self.carry {
            self.token.clear();
        }
        self.complete = false;

        loop {
            if self.buf_pos < self.buf_len {
                let window = &self.buf[self.buf_pos..self.buf_len];
                if let Some(i) = window.iter().position(|&b| b == b'\n') {
                    self.token.extend_from_slice(&window[..i]);
                    self.buf_pos += i + 1;
                    self.carry = false;
                    self.complete = true;
                    return true;
                }
                self.token.extend_from_slice(window);
                self.buf_pos = self.buf_len;
            }

            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    // Soft EOF: keep the partial token for a later resume.
                    self.carry = !self.token.is_empty();
                    return false;
                }
                Ok(n) => {
                    self.buf_pos = 0;
                    self.buf_len = n;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    tracing::debug!("forwards scan stopped: {e}");
                    self.err = Some(e);
                    return false;
                }
            }
        }
    }

    /// The current line's bytes, without the terminating `\n`.
    ///
    /// `None` while no complete line is available (mid-carry, after EOF, or
    /// after an error).
    #[must_use]
    pub fn bytes(&self) -> Option<&[u8]> {
        self.complete.then_some(self.token.as_slice())
    }

    /// The current line as text, lossily decoded.
    #[must_use]
    pub fn text(&self) -> Option<Cow<'_, str>> {
        self.bytes().map(String::from_utf8_lossy)
    }

    /// The error that stopped the scanner, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&io::Error> {
        self.err.as_ref()
    }

    /// Unwrap the underlying reader, dropping buffered state.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, OpenOptions};
    use std::io::Write;

    fn temp_with(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn append(path: &std::path::Path, contents: &str) {
        let mut f = OpenOptions::new().append(true).open(path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn reads_line() {
        let (_dir, path) = temp_with("hello\nyou\n");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(s.scan());
        assert_eq!(s.bytes(), Some(b"hello".as_slice()));
        assert!(s.last_error().is_none());
    }

    #[test]
    fn reads_two_lines() {
        let (_dir, path) = temp_with("hello\nyou\n");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("hello"));
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("you"));
    }

    #[test]
    fn finds_eof_without_error() {
        let (_dir, path) = temp_with("hello");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(!s.scan());
        assert_eq!(s.bytes(), None);
        assert!(s.last_error().is_none());
    }

    #[test]
    fn finds_eof_repeatedly() {
        let (_dir, path) = temp_with("hello");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(!s.scan());
        assert!(!s.scan());
        assert_eq!(s.bytes(), None);
        assert!(s.last_error().is_none());
    }

    #[test]
    fn line_ending_exactly_at_eof() {
        let (_dir, path) = temp_with("hi\n");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("hi"));
        assert!(!s.scan());
        assert_eq!(s.bytes(), None);
    }

    #[test]
    fn lone_newline_is_one_empty_line() {
        let (_dir, path) = temp_with("\n");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some(""));
        assert!(!s.scan());
    }

    #[test]
    fn empty_file() {
        let (_dir, path) = temp_with("");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(!s.scan());
        assert!(s.last_error().is_none());
    }

    #[test]
    fn resumes_with_spliced_partial() {
        let (_dir, path) = temp_with("hi");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(!s.scan());
        assert_eq!(s.bytes(), None);

        append(&path, "ya\nwhats up\nmore data");
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("hiya"));
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("whats up"));
        assert!(!s.scan());
        assert_eq!(s.bytes(), None);

        // The buffered partial is still not lost.
        append(&path, " arrives\n");
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("more data arrives"));
    }

    #[test]
    fn partial_survives_many_eof_scans() {
        let (_dir, path) = temp_with("stub");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        for _ in 0..5 {
            assert!(!s.scan());
        }
        append(&path, "born\n");
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("stubborn"));
    }

    #[test]
    fn completed_line_then_append_of_empty_line() {
        let (_dir, path) = temp_with("a\n\n");
        let mut s = ForwardsLineScanner::new(File::open(&path).unwrap());
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some("a"));
        assert!(s.scan());
        assert_eq!(s.text().as_deref(), Some(""));
    }
}
