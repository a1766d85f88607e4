//! Byte ranges over a text snapshot plus the line and paragraph splitting
//! shared by the highlighter, the list engine and the analyzer.

use serde::{Deserialize, Serialize};

/// `(offset, length)` span in bytes over a UTF-8 buffer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TextRange {
    pub offset: usize,
    pub length: usize,
}

impl TextRange {
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    pub const fn caret(offset: usize) -> Self {
        Self { offset, length: 0 }
    }

    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self::new(start, end.saturating_sub(start))
    }

    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.offset && pos < self.end()
    }

    /// Overlap test. A zero-length range intersects any range that contains or
    /// bounds its position.
    pub fn intersects(&self, other: &TextRange) -> bool {
        if self.is_empty() || other.is_empty() {
            let (point, span) = if self.is_empty() {
                (self.offset, other)
            } else {
                (other.offset, self)
            };
            return point >= span.offset && point <= span.end();
        }
        self.offset < other.end() && other.offset < self.end()
    }

    pub fn union(&self, other: &TextRange) -> TextRange {
        TextRange::from_bounds(self.offset.min(other.offset), self.end().max(other.end()))
    }

    /// Clamp both ends into `text`, snapping to `char` boundaries.
    pub fn clamp_to(&self, text: &str) -> TextRange {
        let start = floor_char_boundary(text, self.offset.min(text.len()));
        let end = ceil_char_boundary(text, self.end().min(text.len())).max(start);
        TextRange::from_bounds(start, end)
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.offset..self.end()).unwrap_or("")
    }
}

impl From<std::ops::Range<usize>> for TextRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        TextRange::from_bounds(range.start, range.end)
    }
}

pub(crate) fn floor_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

pub(crate) fn ceil_char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Byte offset of the character after the one starting at `idx`.
pub(crate) fn next_char_boundary(text: &str, idx: usize) -> usize {
    match text.get(idx..).and_then(|rest| rest.chars().next()) {
        Some(ch) => idx + ch.len_utf8(),
        None => text.len() + 1,
    }
}

/// One line of the buffer: `range` excludes the terminator, `full` includes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub range: TextRange,
    pub full: TextRange,
}

impl LineSpan {
    pub fn text<'a>(&self, text: &'a str) -> &'a str {
        self.range.slice(text)
    }
}

/// Split into lines. A trailing newline yields a final empty line so a caret at
/// the very end of the buffer always has a line to live on.
pub fn line_spans(text: &str) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut cursor = 0usize;
    for segment in text.split_inclusive('\n') {
        let content_len = segment.strip_suffix('\n').map_or(segment.len(), str::len);
        spans.push(LineSpan {
            range: TextRange::new(cursor, content_len),
            full: TextRange::new(cursor, segment.len()),
        });
        cursor += segment.len();
    }
    if text.is_empty() || text.ends_with('\n') {
        spans.push(LineSpan {
            range: TextRange::caret(cursor),
            full: TextRange::caret(cursor),
        });
    }
    spans
}

/// Index of the line holding `pos`; a position at the end of a line's content
/// belongs to that line.
pub fn line_index_at(lines: &[LineSpan], pos: usize) -> usize {
    lines
        .iter()
        .position(|line| pos >= line.range.offset && pos <= line.range.end())
        .unwrap_or_else(|| lines.len().saturating_sub(1))
}

/// Paragraphs are maximal runs of non-blank lines. Ranges exclude the final
/// terminator.
pub fn paragraph_ranges(text: &str) -> Vec<TextRange> {
    let mut paragraphs = Vec::new();
    let mut current: Option<TextRange> = None;
    for line in line_spans(text) {
        if line.text(text).trim().is_empty() {
            if let Some(para) = current.take() {
                paragraphs.push(para);
            }
            continue;
        }
        current = Some(match current {
            Some(para) => para.union(&line.range),
            None => line.range,
        });
    }
    if let Some(para) = current {
        paragraphs.push(para);
    }
    paragraphs
}

/// Leading whitespace width, counting a tab as `tab_width` columns.
pub(crate) fn indent_columns(line: &str, tab_width: usize) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { tab_width } else { 1 })
        .sum()
}
