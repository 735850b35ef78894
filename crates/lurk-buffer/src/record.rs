//! One logical line from the source, projected and wrapped for display.

use lurk_text::{wrap_text, WrapMode};

use crate::projection::Project;

/// An immutable record: origin offset, post-projection bytes, and the
/// display lines they wrap to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    offset: Option<u64>,
    raw: Vec<u8>,
    lines: Vec<String>,
}

impl Record {
    /// Project and wrap one raw line into a record.
    ///
    /// `offset` is the absolute offset of the line's first byte in the
    /// source, when known; forward-scanned records do not track offsets.
    /// Returns `None` when the projection drops the line — the caller must
    /// not insert anything and should read one more line to compensate.
    pub fn build(
        offset: Option<u64>,
        raw: &[u8],
        width: usize,
        mode: WrapMode,
        projection: &dyn Project,
    ) -> Option<Self> {
        let projected = projection.project(raw)?;
        let text = String::from_utf8_lossy(&projected);
        let lines = wrap_text(&text, width, mode);
        Some(Self {
            offset,
            raw: projected,
            lines,
        })
    }

    /// The same record wrapped for a new width.
    #[must_use]
    pub fn rewrapped(&self, width: usize, mode: WrapMode) -> Self {
        let text = String::from_utf8_lossy(&self.raw);
        Self {
            offset: self.offset,
            raw: self.raw.clone(),
            lines: wrap_text(&text, width, mode),
        }
    }

    /// Absolute offset of the record's first byte in the source, when known.
    #[must_use]
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    /// The post-projection bytes.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The wrapped display lines. Never empty.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of display lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
