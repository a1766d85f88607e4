//! Markdown highlighting and list editing.

pub mod compositor;
pub mod lists;
pub mod patterns;

pub use compositor::{
    AttributeRun, AttributeSpan, Attributes, FontWeight, Highlight, MarkdownHighlighter,
    SpanSource, HIDDEN_FONT_SIZE, SIZE_GATE_CHARS,
};
pub use lists::{
    adjust_selection, EditBatch, EditIntent, ListContext, ListEngine, ListMarker, ListState,
};
pub use patterns::{PatternRegistry, RuleKind, RuleMatch};
