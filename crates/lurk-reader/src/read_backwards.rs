//! Single-step reverse reads over a seekable stream.
//!
//! A "backwards read" of N bytes ending at position P is a seek to `P - N`
//! followed by one forward read. The primitive never retries short reads:
//! the caller decides whether a short read is a transient hiccup or evidence
//! that the file changed underneath it.

use std::io::{Read, Seek, SeekFrom};

/// Outcome of a single backwards read step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackwardRead {
    /// Bytes actually read into the buffer.
    pub n: usize,
    /// The position the next backwards read should end at, i.e. the absolute
    /// offset of the first byte this read covered. `None` when the stream
    /// position is unknown (seek failed before any movement).
    pub next_pos: Option<u64>,
    /// Whether a seek was performed.
    pub seeked: bool,
    /// Bytes requested but not delivered by the single read
    /// (`to_read - n`), or `None` for the trivial zero-length case.
    pub left: Option<usize>,
}

/// Read up to `buf.len()` bytes ending at absolute position `from_pos`.
///
/// Reads at most `min(from_pos, buf.len())` bytes so the read never crosses
/// the start of the stream. Data lands at the front of `buf`, in file order.
/// Short reads are reported, not retried.
///
/// # Errors
///
/// Propagates seek and read errors from the underlying stream. On a seek
/// error the stream position is unspecified.
pub fn read_backwards_from<R: Read + Seek>(
    reader: &mut R,
    from_pos: u64,
    buf: &mut [u8],
) -> std::io::Result<BackwardRead> {
    let to_read = (from_pos.min(buf.len() as u64)) as usize;
    if to_read == 0 {
        return Ok(BackwardRead {
            n: 0,
            next_pos: Some(from_pos),
            seeked: false,
            left: None,
        });
    }

    let start = from_pos - to_read as u64;
    reader.seek(SeekFrom::Start(start))?;
    let n = reader.read(&mut buf[..to_read])?;

    Ok(BackwardRead {
        n,
        next_pos: Some(start),
        seeked: true,
        left: Some(to_read - n),
    })
}

/// Like [`read_backwards_from`], using the stream's current position as the
/// end of the read.
///
/// # Errors
///
/// Propagates seek and read errors from the underlying stream.
pub fn read_backwards<R: Read + Seek>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<BackwardRead> {
    let pos = reader.stream_position()?;
    read_backwards_from(reader, pos, buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor_at(contents: &str, pos: u64) -> Cursor<Vec<u8>> {
        let mut c = Cursor::new(contents.as_bytes().to_vec());
        c.set_position(pos);
        c
    }

    #[test]
    fn reads_from_end() {
        let mut c = cursor_at("hello", 5);
        let mut buf = [0u8; 2];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 2);
        assert_eq!(res.next_pos, Some(3));
        assert_eq!(&buf, b"lo");
    }

    #[test]
    fn reads_from_middle() {
        let mut c = cursor_at("hello", 3);
        let mut buf = [0u8; 2];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 2);
        assert_eq!(res.next_pos, Some(1));
        assert_eq!(&buf, b"el");
    }

    #[test]
    fn reads_to_start() {
        let mut c = cursor_at("hello", 2);
        let mut buf = [0u8; 2];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 2);
        assert_eq!(res.next_pos, Some(0));
        assert_eq!(&buf, b"he");
    }

    #[test]
    fn capped_by_start() {
        let mut c = cursor_at("hello", 2);
        let mut buf = [0u8; 3];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 2);
        assert_eq!(res.next_pos, Some(0));
        assert_eq!(res.left, Some(1));
        // Only the first two slots are written; the rest is untouched.
        assert_eq!(&buf, &[b'h', b'e', 0]);
    }

    #[test]
    fn does_not_overwrite_unused_buffer() {
        let mut c = cursor_at("hello", 2);
        let mut buf = [b'a', b'b', b'c'];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 2);
        assert_eq!(&buf, b"hec");
    }

    #[test]
    fn trivial_zero_read() {
        let mut c = cursor_at("hello", 5);
        let mut buf = [0u8; 0];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 0);
        assert_eq!(res.next_pos, Some(5));
        assert!(!res.seeked);
        assert_eq!(res.left, None);
    }

    #[test]
    fn capped_zero_read_at_start() {
        let mut c = cursor_at("hello", 0);
        let mut buf = [0u8; 2];
        let res = read_backwards(&mut c, &mut buf).unwrap();
        assert_eq!(res.n, 0);
        assert_eq!(res.next_pos, Some(0));
        assert!(!res.seeked);
    }

    #[test]
    fn short_read_past_shrunken_end() {
        // Pretend the file was 5 bytes when the position was taken, but has
        // since been rewritten to 2 bytes.
        let mut c = Cursor::new(b"ya".to_vec());
        let mut buf = [0u8; 2];
        // Ends at 5, so the seek lands at 3, past the new end: zero bytes.
        let res = read_backwards_from(&mut c, 5, &mut buf).unwrap();
        assert_eq!(res.n, 0);
        assert_eq!(res.next_pos, Some(3));
        assert_eq!(res.left, Some(2));
    }
}
