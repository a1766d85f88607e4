//! List continuation on newline, ordered renumbering and Tab / Shift-Tab.
//!
//! The engine never mutates text. It returns an [`EditBatch`] whose ranges all
//! refer to the snapshot it was given; the host applies it and reports back.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::config::ListConfig;
use crate::range::{indent_columns, line_index_at, line_spans, LineSpan, TextRange};

static CHECKLIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<bullet>[-*+])[ \t]+\[(?P<mark>[ xX])\](?:[ \t]+|$)")
        .expect("valid checklist regex")
});
static ORDERED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<number>\d+)(?P<sep>[.)])[ \t]+")
        .expect("valid ordered list regex")
});
static UNORDERED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<bullet>[-*+])[ \t]+").expect("valid unordered list regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListMarker {
    Unordered { bullet: char },
    Ordered { number: u64, separator: char },
    Checklist { bullet: char, checked: bool },
}

/// A list line taken apart. Ranges are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    pub indent: String,
    pub marker: ListMarker,
    /// The bullet char or the digits.
    pub marker_range: TextRange,
    /// Everything after the marker and its trailing whitespace.
    pub content: TextRange,
}

impl ListContext {
    /// Classify one line (without terminator) starting at `offset`.
    /// Checklist wins over ordered, ordered over unordered.
    pub fn parse(line: &str, offset: usize) -> Option<Self> {
        let build = |caps: &regex::Captures<'_>, group: &str, marker: ListMarker| {
            let whole = caps.get(0)?;
            let marked = caps.name(group)?;
            Some(ListContext {
                indent: caps.name("indent").map_or("", |m| m.as_str()).to_string(),
                marker,
                marker_range: TextRange::from_bounds(offset + marked.start(), offset + marked.end()),
                content: TextRange::from_bounds(offset + whole.end(), offset + line.len()),
            })
        };
        if let Some(caps) = CHECKLIST_LINE.captures(line) {
            let bullet = caps.name("bullet")?.as_str().chars().next()?;
            let checked = caps.name("mark").is_some_and(|m| m.as_str() != " ");
            return build(&caps, "bullet", ListMarker::Checklist { bullet, checked });
        }
        if let Some(caps) = ORDERED_LINE.captures(line) {
            let number = caps.name("number")?.as_str().parse().ok()?;
            let separator = caps.name("sep")?.as_str().chars().next()?;
            return build(&caps, "number", ListMarker::Ordered { number, separator });
        }
        if let Some(caps) = UNORDERED_LINE.captures(line) {
            let bullet = caps.name("bullet")?.as_str().chars().next()?;
            return build(&caps, "bullet", ListMarker::Unordered { bullet });
        }
        None
    }

    pub fn state(&self) -> ListState {
        match self.marker {
            ListMarker::Unordered { .. } => ListState::Unordered,
            ListMarker::Checklist { .. } => ListState::Checklist,
            ListMarker::Ordered { number, separator } => ListState::Ordered {
                indent: self.indent.clone(),
                number,
                separator,
            },
        }
    }

    /// Marker text for the next item at the same level; `None` when the
    /// ordered number has no successor.
    pub fn continuation(&self) -> Option<String> {
        let marker = match self.marker {
            ListMarker::Unordered { bullet } => format!("{}{bullet} ", self.indent),
            ListMarker::Ordered { number, separator } => {
                format!("{}{}{separator} ", self.indent, number.checked_add(1)?)
            }
            ListMarker::Checklist { bullet, .. } => format!("{}{bullet} [ ] ", self.indent),
        };
        Some(marker)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    NoList,
    Unordered,
    Ordered {
        indent: String,
        number: u64,
        separator: char,
    },
    Checklist,
}

impl ListState {
    pub fn of(line: &str) -> Self {
        ListContext::parse(line, 0).map_or(ListState::NoList, |ctx| ctx.state())
    }
}

/// Replace `range` of the pre-edit snapshot with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditIntent {
    pub range: TextRange,
    pub replacement: String,
}

impl EditIntent {
    pub fn new(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    pub fn delta(&self) -> isize {
        self.replacement.len() as isize - self.range.length as isize
    }
}

/// Non-overlapping edits plus the selection to set once they are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditBatch {
    pub edits: Vec<EditIntent>,
    pub selection: TextRange,
}

impl EditBatch {
    /// Apply to the snapshot the batch was computed from.
    pub fn apply(&self, text: &str) -> String {
        let mut edits: Vec<&EditIntent> = self.edits.iter().collect();
        edits.sort_by(|a, b| b.range.offset.cmp(&a.range.offset));
        let mut out = text.to_string();
        for edit in edits {
            let range = edit.range.clamp_to(&out);
            out.replace_range(range.offset..range.end(), &edit.replacement);
        }
        out
    }
}

/// Re-derive a selection after an edit at `at` changed the length by `delta`.
pub fn adjust_selection(selection: TextRange, at: usize, delta: isize) -> TextRange {
    let shift = |pos: usize| (pos as isize + delta).max(at as isize) as usize;
    let (start, end) = (selection.offset, selection.end());
    let (start, end) = if at < start {
        (shift(start), shift(end))
    } else if at == start {
        if selection.is_empty() {
            let moved = shift(start);
            (moved, moved)
        } else {
            (start, shift(end))
        }
    } else if at < end {
        (start, shift(end))
    } else {
        (start, end)
    };
    TextRange::from_bounds(start, end.max(start))
}

pub struct ListEngine {
    config: ListConfig,
}

impl ListEngine {
    pub fn new(config: ListConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    /// Newline pressed with `edit` selected. `None` means the host should
    /// insert a plain newline.
    pub fn continue_list(&self, text: &str, edit: TextRange) -> Option<EditBatch> {
        let edit = edit.clamp_to(text);
        let lines = line_spans(text);
        let idx = line_index_at(&lines, edit.offset);
        let line = lines[idx];
        if edit.end() > line.range.end() {
            return None;
        }
        let ctx = ListContext::parse(line.text(text), line.range.offset)?;
        if edit.offset < ctx.content.offset {
            return None;
        }

        if ctx.content.slice(text).trim().is_empty() {
            return Some(self.terminate(text, &lines, idx, &ctx));
        }

        let replacement = format!("\n{}", ctx.continuation()?);
        let mut edits = vec![EditIntent::new(edit, replacement.clone())];
        if let ListMarker::Ordered { number, .. } = ctx.marker {
            let indent = indent_columns(&ctx.indent, self.config.tab_width());
            if let Some(start) = number.checked_add(2) {
                edits.extend(self.renumber_after(text, &lines[idx + 1..], indent, start));
            }
        }
        debug!(state = ?ctx.state(), edits = edits.len(), "list continuation");
        Some(EditBatch {
            edits,
            selection: TextRange::caret(edit.offset + replacement.len()),
        })
    }

    /// Empty item: end the list, or step out to the parent ordered level.
    fn terminate(
        &self,
        text: &str,
        lines: &[LineSpan],
        idx: usize,
        ctx: &ListContext,
    ) -> EditBatch {
        let line = lines[idx];
        if let ListMarker::Ordered { .. } = ctx.marker {
            if let Some(parent) = self.ordered_parent(text, lines, idx, &ctx.indent) {
                if let ListMarker::Ordered { number, separator } = parent.marker {
                    let Some(next) = number.checked_add(1) else {
                        return self.end_list(line);
                    };
                    let replacement = format!("{}{next}{separator} ", parent.indent);
                    let parent_indent = indent_columns(&parent.indent, self.config.tab_width());
                    let mut edits = vec![EditIntent::new(line.range, replacement.clone())];
                    if let Some(start) = next.checked_add(1) {
                        edits.extend(self.renumber_after(
                            text,
                            &lines[idx + 1..],
                            parent_indent,
                            start,
                        ));
                    }
                    debug!(edits = edits.len(), "list item moved to parent level");
                    return EditBatch {
                        edits,
                        selection: TextRange::caret(line.range.offset + replacement.len()),
                    };
                }
            }
        }
        self.end_list(line)
    }

    fn end_list(&self, line: LineSpan) -> EditBatch {
        debug!("list terminated");
        EditBatch {
            edits: vec![EditIntent::new(line.full, "\n")],
            selection: TextRange::caret(line.full.offset + 1),
        }
    }

    /// Nearest previous line with a shorter indent, if it is an ordered item.
    fn ordered_parent(
        &self,
        text: &str,
        lines: &[LineSpan],
        idx: usize,
        indent: &str,
    ) -> Option<ListContext> {
        let tab = self.config.tab_width();
        let own = indent_columns(indent, tab);
        if own == 0 {
            return None;
        }
        let parent = lines[..idx].iter().rev().find(|line| {
            let body = line.text(text);
            !body.trim().is_empty() && indent_columns(body, tab) < own
        })?;
        let ctx = ListContext::parse(parent.text(text), parent.range.offset)?;
        matches!(ctx.marker, ListMarker::Ordered { .. }).then_some(ctx)
    }

    /// Renumber ordered siblings at `indent` columns in `lines`, expecting
    /// `start` first. Only changed numbers produce edits.
    pub fn renumber_after(
        &self,
        text: &str,
        lines: &[LineSpan],
        indent: usize,
        start: u64,
    ) -> Vec<EditIntent> {
        let tab = self.config.tab_width();
        let mut expected = start;
        let mut edits = Vec::new();
        for line in lines {
            let body = line.text(text);
            let columns = indent_columns(body, tab);
            if body.trim().is_empty() {
                if columns <= indent {
                    break;
                }
                continue;
            }
            if columns > indent {
                continue;
            }
            let Some(ctx) = ListContext::parse(body, line.range.offset) else {
                break;
            };
            let ListMarker::Ordered { number, .. } = ctx.marker else {
                break;
            };
            if columns < indent {
                break;
            }
            if number != expected {
                edits.push(EditIntent::new(ctx.marker_range, expected.to_string()));
            }
            let Some(next) = expected.checked_add(1) else {
                break;
            };
            expected = next;
        }
        edits
    }

    /// Tab (`outdent == false`) or Shift-Tab over every line the selection
    /// touches.
    pub fn indent_lines(&self, text: &str, selection: TextRange, outdent: bool) -> EditBatch {
        let selection = selection.clamp_to(text);
        let lines = line_spans(text);
        let first = line_index_at(&lines, selection.offset);
        let mut last = line_index_at(&lines, selection.end());
        if !selection.is_empty() && last > first && lines[last].range.offset == selection.end() {
            last -= 1;
        }

        let unit = self.config.unit();
        let mut edits = Vec::new();
        let mut counter = 0u64;
        let mut previous_ordered = false;
        for line in &lines[first..=last] {
            let body = line.text(text);
            if outdent {
                let remove = if body.starts_with('\t') {
                    1
                } else {
                    body.bytes()
                        .take(self.config.tab_width())
                        .take_while(|b| *b == b' ')
                        .count()
                };
                if remove > 0 {
                    edits.push(EditIntent::new(TextRange::new(line.range.offset, remove), ""));
                }
                continue;
            }

            match ListContext::parse(body, line.range.offset) {
                Some(ListContext {
                    marker: ListMarker::Ordered { number, .. },
                    indent,
                    marker_range,
                    ..
                }) => {
                    counter = if previous_ordered { counter + 1 } else { 1 };
                    previous_ordered = true;
                    if number != counter {
                        // One edit from line start through the digits keeps
                        // the batch non-overlapping.
                        edits.push(EditIntent::new(
                            TextRange::from_bounds(line.range.offset, marker_range.end()),
                            format!("{unit}{indent}{counter}"),
                        ));
                        continue;
                    }
                }
                _ => previous_ordered = false,
            }
            edits.push(EditIntent::new(TextRange::caret(line.range.offset), unit.clone()));
        }

        let mut selection_after = selection;
        for edit in edits.iter().rev() {
            selection_after = adjust_selection(selection_after, edit.range.offset, edit.delta());
        }
        debug!(lines = last - first + 1, outdent, "indent lines");
        EditBatch {
            edits,
            selection: selection_after,
        }
    }
}

impl Default for ListEngine {
    fn default() -> Self {
        Self::new(ListConfig::default())
    }
}
