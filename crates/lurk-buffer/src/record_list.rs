//! The record cache: a double-ended list of records with a screen cursor.
//!
//! The cursor is the pair `(screen_top, screen_top_offset)`: which record
//! anchors the top of the visible window, and which of its display lines is
//! drawn at the top row. Display-line counts above and below the cursor are
//! maintained incrementally so scroll decisions never walk the list.
//!
//! # Invariants
//!
//! - Empty list ⇔ no cursor ⇔ all counters zero.
//! - `lines_above + lines_below` = total display lines of all records.
//! - `lines_above` = `screen_top_offset` + display lines of all records
//!   before the cursor record.
//! - `0 ≤ screen_top_offset < screen_top.line_count()`.

use std::collections::VecDeque;
use std::sync::Arc;

use lurk_text::WrapMode;

use crate::record::Record;

/// Display-line breakdown of the list relative to a screen of some height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLines {
    /// Display lines strictly above the top row.
    pub above: usize,
    /// Display lines visible on screen.
    pub on: usize,
    /// Display lines below the bottom of the screen.
    pub below: usize,
}

/// Ordered record cache with a screen cursor.
#[derive(Default)]
pub struct RecordList {
    records: VecDeque<Arc<Record>>,
    /// Index of the record anchoring the top of the screen.
    cursor: Option<usize>,
    /// Display-line offset of the top row within the cursor record.
    cursor_offset: usize,
    lines_above: usize,
    lines_below: usize,
}

impl RecordList {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total display lines across all records.
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.lines_above + self.lines_below
    }

    /// Display lines strictly above the top row.
    #[must_use]
    pub fn lines_above(&self) -> usize {
        self.lines_above
    }

    /// Display lines at or after the top row.
    #[must_use]
    pub fn lines_below(&self) -> usize {
        self.lines_below
    }

    /// The record currently anchoring the top of the screen.
    #[must_use]
    pub fn screen_top(&self) -> Option<&Arc<Record>> {
        self.cursor.and_then(|i| self.records.get(i))
    }

    /// Display-line offset of the top row within the cursor record.
    #[must_use]
    pub fn screen_top_offset(&self) -> usize {
        self.cursor_offset
    }

    #[must_use]
    pub fn first(&self) -> Option<&Arc<Record>> {
        self.records.front()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Arc<Record>> {
        self.records.back()
    }

    /// Add a record after the current tail.
    pub fn append(&mut self, record: Arc<Record>) {
        let count = record.line_count();
        self.records.push_back(record);
        if self.cursor.is_none() {
            self.cursor = Some(0);
            self.cursor_offset = 0;
        }
        self.lines_below += count;
    }

    /// Add a record before the current head.
    pub fn prepend(&mut self, record: Arc<Record>) {
        let count = record.line_count();
        self.records.push_front(record);
        match self.cursor {
            None => {
                self.cursor = Some(0);
                self.cursor_offset = 0;
                self.lines_below += count;
            }
            Some(i) => {
                self.cursor = Some(i + 1);
                self.lines_above += count;
            }
        }
    }

    /// Remove and return the head record.
    ///
    /// If the head carried the cursor, the cursor moves to its successor at
    /// offset 0 (or the list becomes empty).
    pub fn pop_first(&mut self) -> Option<Arc<Record>> {
        let removed = self.records.pop_front()?;
        let count = removed.line_count();
        match self.cursor {
            Some(0) => {
                if self.records.is_empty() {
                    self.reset_cursor();
                } else {
                    self.lines_above -= self.cursor_offset;
                    self.lines_below -= count - self.cursor_offset;
                    self.cursor = Some(0);
                    self.cursor_offset = 0;
                }
            }
            Some(i) => {
                self.cursor = Some(i - 1);
                self.lines_above -= count;
            }
            None => {}
        }
        Some(removed)
    }

    /// Remove and return the tail record.
    ///
    /// If the tail carried the cursor, the cursor moves to the last display
    /// line of its predecessor (or the list becomes empty).
    pub fn pop_last(&mut self) -> Option<Arc<Record>> {
        let removed = self.records.pop_back()?;
        let count = removed.line_count();
        match self.cursor {
            Some(i) if i == self.records.len() => {
                if self.records.is_empty() {
                    self.reset_cursor();
                } else {
                    // Drop the removed record's lines from both sides of the
                    // cursor, then land on the new tail's last line.
                    self.lines_above -= self.cursor_offset;
                    self.lines_below -= count - self.cursor_offset;
                    let new_tail = i - 1;
                    let tail_count = self.records[new_tail].line_count();
                    self.cursor = Some(new_tail);
                    self.cursor_offset = tail_count - 1;
                    self.lines_above -= 1;
                    self.lines_below += 1;
                }
            }
            Some(_) => {
                self.lines_below -= count;
            }
            None => {}
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.reset_cursor();
    }

    fn reset_cursor(&mut self) {
        self.cursor = None;
        self.cursor_offset = 0;
        self.lines_above = 0;
        self.lines_below = 0;
    }

    /// Move the cursor up by at most `lines` display lines.
    ///
    /// Returns the lines actually moved, which is smaller than `lines` only
    /// when the top of the cache is reached.
    pub fn scroll_up(&mut self, lines: usize) -> usize {
        let Some(mut cur) = self.cursor else {
            return 0;
        };

        let mut remaining = lines;
        let mut moved = 0;
        loop {
            if self.cursor_offset >= remaining {
                self.cursor_offset -= remaining;
                moved += remaining;
                break;
            }

            moved += self.cursor_offset;
            remaining -= self.cursor_offset;
            self.cursor_offset = 0;

            if cur == 0 {
                break;
            }
            // Stepping onto the previous record consumes one line.
            cur -= 1;
            self.cursor_offset = self.records[cur].line_count() - 1;
            remaining -= 1;
            moved += 1;
        }

        self.cursor = Some(cur);
        self.lines_above -= moved;
        self.lines_below += moved;
        moved
    }

    /// Move the cursor down by at most `lines` display lines.
    ///
    /// Returns the lines actually moved, which is smaller than `lines` only
    /// when the last display line of the cache is reached.
    pub fn scroll_down(&mut self, lines: usize) -> usize {
        let Some(mut cur) = self.cursor else {
            return 0;
        };

        let mut remaining = lines;
        let mut moved = 0;
        loop {
            let left_in_record = self.records[cur].line_count() - self.cursor_offset - 1;
            if left_in_record >= remaining {
                self.cursor_offset += remaining;
                moved += remaining;
                break;
            }

            moved += left_in_record;
            remaining -= left_in_record;
            self.cursor_offset += left_in_record;

            if cur + 1 == self.records.len() {
                break;
            }
            cur += 1;
            self.cursor_offset = 0;
            remaining -= 1;
            moved += 1;
        }

        self.cursor = Some(cur);
        self.lines_above += moved;
        self.lines_below -= moved;
        moved
    }

    /// Anchor the view to the tail: the last display line lands on the
    /// bottom row of a screen `height` rows tall.
    pub fn scroll_to_bottom(&mut self, height: usize) {
        if self.records.is_empty() {
            return;
        }
        let last = self.records.len() - 1;
        let total = self.total_lines();
        self.cursor = Some(last);
        self.cursor_offset = self.records[last].line_count() - 1;
        self.lines_below = 1;
        self.lines_above = total - 1;
        self.scroll_up(height.saturating_sub(1));
    }

    /// Break down the cached display lines around a screen of `height` rows.
    #[must_use]
    pub fn screen_lines(&self, height: usize) -> ScreenLines {
        let on = self.lines_below.min(height);
        ScreenLines {
            above: self.lines_above,
            on,
            below: self.lines_below - on,
        }
    }

    /// Collect up to `count` display lines starting at the cursor.
    ///
    /// Returns fewer than `count` lines only when the cache's tail is
    /// reached.
    #[must_use]
    pub fn lines_to_render(&self, count: usize) -> Vec<String> {
        let Some(cur) = self.cursor else {
            return Vec::new();
        };

        let mut result = Vec::with_capacity(count.min(self.lines_below));
        let mut offset = self.cursor_offset;
        for record in self.records.iter().skip(cur) {
            for line in record.lines().iter().skip(offset) {
                if result.len() == count {
                    return result;
                }
                result.push(line.clone());
            }
            offset = 0;
        }
        result
    }

    /// Re-wrap every record for a new width, keeping the cursor on the same
    /// record (clamping its line offset).
    pub fn rewrap(&mut self, width: usize, mode: WrapMode) {
        for record in &mut self.records {
            *record = Arc::new(record.rewrapped(width, mode));
        }
        if let Some(cur) = self.cursor {
            let count = self.records[cur].line_count();
            self.cursor_offset = self.cursor_offset.min(count - 1);
            let before: usize = self
                .records
                .iter()
                .take(cur)
                .map(|r| r.line_count())
                .sum();
            let total: usize = self.records.iter().map(|r| r.line_count()).sum();
            self.lines_above = before + self.cursor_offset;
            self.lines_below = total - self.lines_above;
        }
    }
}
