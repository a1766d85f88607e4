//! Live markdown-aware annotation for text editors.
//!
//! Two engines share this crate. The markdown highlighter re-scans the whole
//! buffer on every edit or selection change and produces layered display
//! attributes, including typewriter focus and list continuation. The prose
//! style analyzer tokenizes the same text and reports redundancy, style,
//! punctuation, typography and vague-reference issues with optional fixes.
//!
//! Everything here is synchronous and pure with respect to its inputs: hosts
//! own the buffer, the scroll view and settings persistence, and hand the core
//! text, a selection and configuration values.

pub mod config;
pub mod error;
pub mod focus;
pub mod linguist;
pub mod markdown;
pub mod range;
pub mod session;
pub mod style;

pub use config::{
    AnalyzerConfig, Color, Config, HeadingScale, HighlightScope, ListConfig, Palette,
    StyleConfig, Theme, TypewriterMode, WordyPhrase,
};
pub use error::{Error, Result};
pub use focus::{active_range, ScrollRequest};
pub use linguist::{BasicLinguist, Linguist, PartOfSpeech, Token};
pub use markdown::{
    AttributeRun, AttributeSpan, Attributes, EditBatch, EditIntent, FontWeight, Highlight,
    ListEngine, MarkdownHighlighter, RuleKind, SpanSource,
};
pub use range::TextRange;
pub use session::{EditorSession, NewlineOutcome, SyncState};
pub use style::{
    apply_fix, shift_issues, Category, Severity, StyleAnalyzer, StyleFix, StyleIssue, StyleReport,
};
