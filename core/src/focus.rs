//! Active-range computation for typewriter focus and the scroll target that
//! keeps the active line centered.

use serde::Serialize;

use crate::config::HighlightScope;
use crate::linguist::Linguist;
use crate::range::{
    floor_char_boundary, line_index_at, line_spans, paragraph_ranges, TextRange,
};

/// Offset used for range lookups: clamped to `max(0, len - 1)` and floored
/// to a char boundary.
pub fn lookup_offset(text: &str, pos: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    floor_char_boundary(text, pos.min(text.len() - 1))
}

/// Line holding `pos`, including its terminator.
pub fn line_range(text: &str, pos: usize) -> TextRange {
    let lines = line_spans(text);
    let idx = line_index_at(&lines, lookup_offset(text, pos));
    lines[idx].full
}

pub fn line_index(text: &str, pos: usize) -> usize {
    line_index_at(&line_spans(text), lookup_offset(text, pos))
}

/// Blank-line separated block holding `pos`; a blank line is its own block.
pub fn paragraph_range(text: &str, pos: usize) -> TextRange {
    let pos = lookup_offset(text, pos);
    paragraph_ranges(text)
        .into_iter()
        .find(|para| pos >= para.offset && pos <= para.end())
        .unwrap_or_else(|| line_range(text, pos))
}

/// Sentence holding `pos`. Falls back to the closest preceding sentence, then
/// to the line.
pub fn sentence_range(text: &str, pos: usize, linguist: &dyn Linguist) -> TextRange {
    let pos = lookup_offset(text, pos);
    let sentences = linguist.sentences(text);
    if let Some(hit) = sentences
        .iter()
        .find(|s| pos >= s.offset && pos <= s.end())
    {
        return *hit;
    }
    sentences
        .iter()
        .rev()
        .find(|s| s.offset <= pos)
        .copied()
        .unwrap_or_else(|| line_range(text, pos))
}

fn range_at(text: &str, pos: usize, scope: HighlightScope, linguist: &dyn Linguist) -> TextRange {
    match scope {
        HighlightScope::Line => line_range(text, pos),
        HighlightScope::Sentence => sentence_range(text, pos, linguist),
        HighlightScope::Paragraph => paragraph_range(text, pos),
    }
}

/// Range of the configured scope covering the selection. Spans from the unit
/// at the selection start to the unit holding its last character.
pub fn active_range(
    text: &str,
    selection: TextRange,
    scope: HighlightScope,
    linguist: &dyn Linguist,
) -> TextRange {
    if text.is_empty() {
        return TextRange::caret(0);
    }
    let selection = selection.clamp_to(text);
    let first = range_at(text, selection.offset, scope, linguist);
    let range = if selection.is_empty() {
        first
    } else {
        let last_char = floor_char_boundary(text, selection.end() - 1);
        first.union(&range_at(text, last_char, scope, linguist))
    };
    range.clamp_to(text)
}

/// Scroll target emitted in typewriter mode with fixed scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRequest {
    /// Zero-based line index of the caret.
    pub line: usize,
    pub active: TextRange,
}

impl ScrollRequest {
    /// Vertical offset that centers `line`, clamped to the scrollable extent.
    pub fn centered_offset(&self, line_height: f32, viewport_height: f32, content_height: f32) -> f32 {
        let line_center = (self.line as f32 + 0.5) * line_height;
        let target = line_center - viewport_height / 2.0;
        let max_offset = (content_height - viewport_height).max(0.0);
        target.clamp(0.0, max_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linguist::BasicLinguist;

    #[test]
    fn empty_buffer_has_empty_active_range() {
        for scope in [
            HighlightScope::Line,
            HighlightScope::Sentence,
            HighlightScope::Paragraph,
        ] {
            assert_eq!(
                active_range("", TextRange::caret(5), scope, &BasicLinguist),
                TextRange::caret(0)
            );
        }
    }

    #[test]
    fn line_scope_includes_terminator() {
        let text = "one\ntwo\nthree";
        let range = active_range(text, TextRange::caret(5), HighlightScope::Line, &BasicLinguist);
        assert_eq!(range, TextRange::new(4, 4));
    }

    #[test]
    fn caret_past_end_clamps_to_last_char() {
        let text = "one\ntwo";
        assert_eq!(lookup_offset(text, 99), 6);
        assert_eq!(line_range(text, 99), TextRange::new(4, 3));
        assert_eq!(lookup_offset("héllo", 2), 1);
    }

    #[test]
    fn selection_spanning_lines_unions_ranges() {
        let text = "one\ntwo\nthree";
        let range = active_range(text, TextRange::new(1, 5), HighlightScope::Line, &BasicLinguist);
        assert_eq!(range, TextRange::new(0, 8));
    }

    #[test]
    fn sentence_scope() {
        let text = "First one. Second one.";
        let range = active_range(text, TextRange::caret(13), HighlightScope::Sentence, &BasicLinguist);
        assert_eq!(range.slice(text), "Second one.");
    }

    #[test]
    fn paragraph_scope() {
        let text = "a\nb\n\nc";
        assert_eq!(
            active_range(text, TextRange::caret(2), HighlightScope::Paragraph, &BasicLinguist),
            TextRange::new(0, 3)
        );
        assert_eq!(paragraph_range(text, 4), TextRange::new(4, 1));
    }

    #[test]
    fn centered_offset_is_clamped() {
        let req = ScrollRequest {
            line: 10,
            active: TextRange::default(),
        };
        assert_eq!(req.centered_offset(20.0, 100.0, 1000.0), 160.0);
        let top = ScrollRequest { line: 0, ..req };
        assert_eq!(top.centered_offset(20.0, 100.0, 1000.0), 0.0);
        assert_eq!(req.centered_offset(20.0, 100.0, 200.0), 100.0);
        assert_eq!(req.centered_offset(20.0, 500.0, 200.0), 0.0);
    }
}
