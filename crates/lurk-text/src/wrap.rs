//! Grapheme- and cell-aware line wrapping.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Line wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// No width wrapping; only embedded newlines break lines.
    None,
    /// Wrap at word boundaries. Words wider than the width get their own
    /// (overlong) line.
    Word,
    /// Wrap at grapheme boundaries.
    Char,
    /// Wrap at word boundaries, breaking overlong words at grapheme
    /// boundaries.
    #[default]
    WordChar,
}

/// Wrap `text` into display lines of at most `width` cells.
///
/// Embedded `\n` forces a hard break (a trailing `\r` before it is
/// stripped). The result always has at least one element: empty input wraps
/// to a single empty line, as does each empty paragraph.
#[must_use]
pub fn wrap_text(text: &str, width: usize, mode: WrapMode) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for raw_paragraph in text.split('\n') {
        let paragraph = raw_paragraph.strip_suffix('\r').unwrap_or(raw_paragraph);
        let before = lines.len();
        match mode {
            WrapMode::None => lines.push(paragraph.to_string()),
            WrapMode::Char => wrap_chars(paragraph, width, &mut lines),
            WrapMode::Word => wrap_words(paragraph, width, false, &mut lines),
            WrapMode::WordChar => wrap_words(paragraph, width, true, &mut lines),
        }
        if lines.len() == before {
            lines.push(String::new());
        }
    }

    lines
}

/// Wrap a single paragraph at grapheme boundaries.
fn wrap_chars(paragraph: &str, width: usize, lines: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_width = 0;

    for grapheme in paragraph.graphemes(true) {
        let gw = grapheme_width(grapheme);
        if line_width + gw > width && !line.is_empty() {
            lines.push(finalize(&line));
            line.clear();
            line_width = 0;
        }
        line.push_str(grapheme);
        line_width += gw;
    }

    if !line.is_empty() {
        lines.push(finalize(&line));
    }
}

/// Wrap a single paragraph at word boundaries.
///
/// Leading whitespace of the paragraph is kept (indented log lines stay
/// indented); whitespace at the start of continuation lines is dropped.
fn wrap_words(paragraph: &str, width: usize, char_fallback: bool, lines: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_width = 0;
    let mut continuation = false;

    for segment in segments(paragraph) {
        let is_ws = segment.chars().all(char::is_whitespace);
        if is_ws && line.is_empty() && continuation {
            continue;
        }

        let seg_width = display_width(segment);
        if line_width + seg_width <= width {
            line.push_str(segment);
            line_width += seg_width;
            continue;
        }

        if !line.is_empty() {
            lines.push(finalize(&line));
            line.clear();
            line_width = 0;
            continuation = true;

            // Inter-word whitespace that caused the wrap is trailing
            // whitespace of the flushed line; discard it.
            if is_ws {
                continue;
            }
        } else if is_ws {
            // Whitespace wider than a whole line at paragraph start.
            continue;
        }

        if seg_width > width {
            if char_fallback {
                break_long_word(segment, width, lines, &mut line, &mut line_width);
            } else {
                lines.push(finalize(segment));
            }
            continuation = true;
        } else {
            line.push_str(segment);
            line_width = seg_width;
        }
    }

    if !line.is_empty() {
        lines.push(finalize(&line));
    }
}

/// Break a word wider than `width` at grapheme boundaries, leaving the
/// remainder in `line` for continuation.
fn break_long_word(
    word: &str,
    width: usize,
    lines: &mut Vec<String>,
    line: &mut String,
    line_width: &mut usize,
) {
    for grapheme in word.graphemes(true) {
        let gw = grapheme_width(grapheme);

        if *line_width + gw > width && !line.is_empty() {
            lines.push(finalize(line));
            line.clear();
            *line_width = 0;
        }
        if *line_width == 0 && grapheme.chars().all(char::is_whitespace) {
            continue;
        }

        line.push_str(grapheme);
        *line_width += gw;
    }
}

/// Split a paragraph into alternating whitespace / non-whitespace segments.
fn segments(paragraph: &str) -> impl Iterator<Item = &str> {
    SegmentIter {
        rest: paragraph,
    }
}

struct SegmentIter<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SegmentIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let first_is_ws = self
            .rest
            .chars()
            .next()
            .is_some_and(char::is_whitespace);
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_whitespace() != first_is_ws)
            .map_or(self.rest.len(), |(i, _)| i);
        let (segment, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(segment)
    }
}

fn finalize(line: &str) -> String {
    line.trim_end().to_string()
}

/// Truncate text to fit within `max_width` cells, respecting grapheme
/// boundaries (never splits an emoji or combining sequence).
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut width = 0;
    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(grapheme);
        if width + gw > max_width {
            break;
        }
        result.push_str(grapheme);
        width += gw;
    }
    result
}

/// Display width of a single grapheme cluster in cells.
#[must_use]
pub fn grapheme_width(grapheme: &str) -> usize {
    grapheme.width()
}

/// Display width of text in cells, with an ASCII fast path.
#[must_use]
pub fn display_width(text: &str) -> usize {
    if text
        .bytes()
        .all(|b| (0x20..0x7f).contains(&b))
    {
        return text.len();
    }
    text.graphemes(true).map(grapheme_width).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_wraps_to_one_empty_line() {
        assert_eq!(wrap_text("", 10, WrapMode::WordChar), vec![""]);
        assert_eq!(wrap_text("", 10, WrapMode::Word), vec![""]);
        assert_eq!(wrap_text("", 10, WrapMode::Char), vec![""]);
        assert_eq!(wrap_text("", 10, WrapMode::None), vec![""]);
    }

    #[test]
    fn short_line_is_untouched() {
        assert_eq!(wrap_text("wxyz", 10, WrapMode::WordChar), vec!["wxyz"]);
    }

    #[test]
    fn unbroken_token_splits_at_width() {
        assert_eq!(
            wrap_text("ghijklmnopqrstuv", 10, WrapMode::WordChar),
            vec!["ghijklmnop", "qrstuv"]
        );
        assert_eq!(
            wrap_text("0123456789abcdef", 10, WrapMode::WordChar),
            vec!["0123456789", "abcdef"]
        );
    }

    #[test]
    fn word_wrap_prefers_word_boundaries() {
        assert_eq!(
            wrap_text("hello world foo bar", 11, WrapMode::WordChar),
            vec!["hello world", "foo bar"]
        );
    }

    #[test]
    fn word_mode_leaves_long_words_whole() {
        assert_eq!(
            wrap_text("a verylongtoken b", 6, WrapMode::Word),
            vec!["a", "verylongtoken", "b"]
        );
    }

    #[test]
    fn wrapped_interword_space_is_discarded() {
        assert_eq!(
            wrap_text("hello  world", 5, WrapMode::WordChar),
            vec!["hello", "world"]
        );
    }

    #[test]
    fn newlines_force_hard_breaks() {
        assert_eq!(
            wrap_text("one\ntwo\n", 10, WrapMode::WordChar),
            vec!["one", "two", ""]
        );
        assert_eq!(wrap_text("a\n\nb", 10, WrapMode::None), vec!["a", "", "b"]);
    }

    #[test]
    fn crlf_is_stripped() {
        assert_eq!(
            wrap_text("one\r\ntwo", 10, WrapMode::WordChar),
            vec!["one", "two"]
        );
    }

    #[test]
    fn cjk_counts_double_width() {
        // Each ideograph is 2 cells, so only two fit in 5 cells.
        assert_eq!(
            wrap_text("你好世界", 5, WrapMode::WordChar),
            vec!["你好", "世界"]
        );
        assert_eq!(display_width("你好"), 4);
    }

    #[test]
    fn char_mode_splits_anywhere() {
        assert_eq!(
            wrap_text("hello world", 4, WrapMode::Char),
            vec!["hell", "o wo", "rld"]
        );
    }

    #[test]
    fn width_one_still_terminates() {
        assert_eq!(
            wrap_text("abc", 1, WrapMode::WordChar),
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn truncate_respects_grapheme_boundaries() {
        assert_eq!(truncate_to_width("hello", 3), "hel");
        assert_eq!(truncate_to_width("你好世界", 5), "你好");
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("", 10), "");
    }

    #[test]
    fn ascii_fast_path_matches_slow_path() {
        let text = "plain ascii text";
        assert_eq!(
            display_width(text),
            text.graphemes(true).map(grapheme_width).sum::<usize>()
        );
    }

    #[test]
    fn whitespace_only_paragraph_becomes_empty_line() {
        assert_eq!(wrap_text("     ", 3, WrapMode::WordChar), vec![""]);
    }

    #[test]
    fn paragraph_indent_is_preserved() {
        assert_eq!(
            wrap_text("  indented line here", 10, WrapMode::WordChar),
            vec!["  indented", "line here"]
        );
    }

    #[test]
    fn long_word_remainder_continues_the_line() {
        assert_eq!(
            wrap_text("aa bbbbbbbbbbbbb cc", 5, WrapMode::WordChar),
            vec!["aa", "bbbbb", "bbbbb", "bbb", "cc"]
        );
    }
}
