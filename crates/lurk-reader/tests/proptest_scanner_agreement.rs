//! Property tests pinning the two scanners to each other.
//!
//! The backwards scanner read from the end of a stream must produce exactly
//! the forwards scanner's lines, reversed, and every offset it reports must
//! round-trip through a direct read.

use std::io::{Cursor, Read, Seek, SeekFrom};

use proptest::prelude::*;

use lurk_reader::{BackwardsLineScanner, ForwardsLineScanner};

/// All lines of `contents`, via the forwards scanner. The trailing
/// unterminated line (if any) is withheld by design, so callers should pass
/// `\n`-terminated input when comparing against the backwards scanner.
fn forward_lines(contents: &[u8]) -> Vec<Vec<u8>> {
    let mut scanner = ForwardsLineScanner::new(Cursor::new(contents.to_vec()));
    let mut lines = Vec::new();
    while scanner.scan() {
        lines.push(scanner.bytes().unwrap().to_vec());
    }
    assert!(scanner.last_error().is_none());
    lines
}

fn backward_lines(contents: &[u8], chunk_size: usize) -> Vec<(Vec<u8>, u64)> {
    let cursor = Cursor::new(contents.to_vec());
    let mut scanner = BackwardsLineScanner::new(cursor, chunk_size, SeekFrom::End(0)).unwrap();
    let mut lines = Vec::new();
    loop {
        let line = scanner.read_line().unwrap();
        let at_start = line.at_start;
        lines.push((line.bytes, line.offset));
        if at_start {
            break;
        }
    }
    lines
}

proptest! {
    #[test]
    fn backward_is_reverse_of_forward(
        raw_lines in prop::collection::vec(
            prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 0..40),
            0..20,
        ),
        chunk_size in 1usize..64,
    ) {
        let mut contents = Vec::new();
        for line in &raw_lines {
            contents.extend_from_slice(line);
            contents.push(b'\n');
        }

        let mut forward = forward_lines(&contents);
        // A terminated stream reads backwards as: the empty line after the
        // final newline first, then each content line in reverse. An empty
        // stream is a single empty at-start line.
        forward.push(Vec::new());
        forward.reverse();

        let backward: Vec<Vec<u8>> = backward_lines(&contents, chunk_size)
            .into_iter()
            .map(|(bytes, _)| bytes)
            .collect();

        prop_assert_eq!(backward, forward);
    }

    #[test]
    fn unterminated_tail_goes_to_backward_only(
        head in prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 0..40),
        tail in prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 1..40),
        chunk_size in 1usize..64,
    ) {
        // "<head>\n<tail>" with no trailing newline: forwards withholds the
        // tail, backwards yields it first.
        let mut contents = head.clone();
        contents.push(b'\n');
        contents.extend_from_slice(&tail);

        let forward = forward_lines(&contents);
        prop_assert_eq!(forward, vec![head.clone()]);

        let backward = backward_lines(&contents, chunk_size);
        prop_assert_eq!(backward.len(), 2);
        prop_assert_eq!(&backward[0].0, &tail);
        prop_assert_eq!(backward[0].1, head.len() as u64 + 1);
        prop_assert_eq!(&backward[1].0, &head);
        prop_assert_eq!(backward[1].1, 0);
    }

    #[test]
    fn offsets_round_trip(
        raw_lines in prop::collection::vec(
            prop::collection::vec(any::<u8>().prop_filter("no newline", |b| *b != b'\n'), 0..40),
            1..20,
        ),
        chunk_size in 1usize..64,
    ) {
        let mut contents = Vec::new();
        for line in &raw_lines {
            contents.extend_from_slice(line);
            contents.push(b'\n');
        }

        for (bytes, offset) in backward_lines(&contents, chunk_size) {
            let mut reader = Cursor::new(contents.clone());
            reader.seek(SeekFrom::Start(offset)).unwrap();
            let mut reread = vec![0u8; bytes.len()];
            reader.read_exact(&mut reread).unwrap();
            prop_assert_eq!(reread, bytes);
        }
    }
}
