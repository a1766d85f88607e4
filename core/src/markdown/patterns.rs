//! Lexical rules for the markdown dialect and the matcher that runs them.
//!
//! Every rule is a multi-line regex with optional `lead` / `body` / `trail`
//! groups. Rules run over the whole buffer on every pass, in [`RuleKind::ORDER`];
//! fenced code blocks are paired procedurally and applied last.

use std::fmt;

use regex::{Match, Regex};
use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::range::{line_spans, next_char_boundary, TextRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    BoldItalic,
    Bold,
    Italic,
    Mark,
    Delete,
    Strikethrough,
    RawInline,
    InlineComment,
    Annotation,
    Link,
    InlineCode,
    Marker,
    Heading,
    Quote,
    UnorderedList,
    OrderedList,
    Checklist,
    Divider,
    BlockComment,
    CodeBlock,
    RawBlock,
    FencedCode,
}

impl RuleKind {
    /// Application order. Later rules override earlier ones field-wise.
    pub const ORDER: [RuleKind; 22] = [
        RuleKind::BoldItalic,
        RuleKind::Bold,
        RuleKind::Italic,
        RuleKind::Mark,
        RuleKind::Delete,
        RuleKind::Strikethrough,
        RuleKind::RawInline,
        RuleKind::InlineComment,
        RuleKind::Annotation,
        RuleKind::Link,
        RuleKind::InlineCode,
        RuleKind::Marker,
        RuleKind::Heading,
        RuleKind::Quote,
        RuleKind::UnorderedList,
        RuleKind::OrderedList,
        RuleKind::Checklist,
        RuleKind::Divider,
        RuleKind::BlockComment,
        RuleKind::CodeBlock,
        RuleKind::RawBlock,
        RuleKind::FencedCode,
    ];

    /// Whether tokens of this rule disappear outside the active range.
    /// List markers, dividers and footnote markers always stay visible.
    pub fn hides_when_inactive(self) -> bool {
        !matches!(
            self,
            RuleKind::UnorderedList
                | RuleKind::OrderedList
                | RuleKind::Checklist
                | RuleKind::Divider
                | RuleKind::Marker
        )
    }

    /// Block rules style the whole line; inline rules style only the body.
    pub fn is_block(self) -> bool {
        matches!(
            self,
            RuleKind::Heading
                | RuleKind::Quote
                | RuleKind::UnorderedList
                | RuleKind::OrderedList
                | RuleKind::Checklist
                | RuleKind::Divider
                | RuleKind::BlockComment
                | RuleKind::CodeBlock
                | RuleKind::RawBlock
                | RuleKind::FencedCode
        )
    }

    fn name(self) -> &'static str {
        match self {
            RuleKind::BoldItalic => "bold-italic",
            RuleKind::Bold => "bold",
            RuleKind::Italic => "italic",
            RuleKind::Mark => "mark",
            RuleKind::Delete => "delete",
            RuleKind::Strikethrough => "strikethrough",
            RuleKind::RawInline => "raw-inline",
            RuleKind::InlineComment => "inline-comment",
            RuleKind::Annotation => "annotation",
            RuleKind::Link => "link",
            RuleKind::InlineCode => "inline-code",
            RuleKind::Marker => "marker",
            RuleKind::Heading => "heading",
            RuleKind::Quote => "quote",
            RuleKind::UnorderedList => "unordered-list",
            RuleKind::OrderedList => "ordered-list",
            RuleKind::Checklist => "checklist",
            RuleKind::Divider => "divider",
            RuleKind::BlockComment => "block-comment",
            RuleKind::CodeBlock => "code-block",
            RuleKind::RawBlock => "raw-block",
            RuleKind::FencedCode => "fenced-code",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Post-match filter. A rejected match restarts the search one character later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Guard {
    None,
    /// The delimiter char may not sit directly outside the match, so a
    /// shorter delimiter never matches inside a longer one.
    Isolated,
    /// No alphanumeric char directly outside the match.
    WordBounded,
    /// `[ ]` / `[x]` following a list bullet belongs to the checklist rule.
    NotCheckbox,
}

impl Guard {
    fn accepts(self, text: &str, whole: &Match<'_>) -> bool {
        let before = text[..whole.start()].chars().next_back();
        let after = text[whole.end()..].chars().next();
        match self {
            Guard::None => true,
            Guard::Isolated => {
                let matched = whole.as_str();
                before != matched.chars().next() && after != matched.chars().next_back()
            }
            Guard::WordBounded => {
                !before.is_some_and(char::is_alphanumeric)
                    && !after.is_some_and(char::is_alphanumeric)
            }
            Guard::NotCheckbox => {
                let body = &whole.as_str()[1..whole.as_str().len() - 1];
                if !matches!(body, " " | "x" | "X") {
                    return true;
                }
                let line_start = text[..whole.start()].rfind('\n').map_or(0, |idx| idx + 1);
                let prefix = text[line_start..whole.start()].trim();
                !matches!(prefix, "-" | "*" | "+")
            }
        }
    }
}

struct Rule {
    kind: RuleKind,
    patterns: Vec<Regex>,
    guard: Guard,
}

/// Body of a symmetric emphasis span: non-empty, no delimiter char, no
/// whitespace at either edge, single line.
fn emphasis(delim: &str, ch: char) -> String {
    let escaped = regex::escape(delim);
    let class = regex::escape(&ch.to_string());
    format!(
        r"(?P<lead>{escaped})(?P<body>[^{class}\s](?:[^{class}\n]*[^{class}\s])?)(?P<trail>{escaped})"
    )
}

fn enclosed(open: &str, close: &str, body: &str) -> String {
    format!(
        r"(?P<lead>{})(?P<body>{body})(?P<trail>{})",
        regex::escape(open),
        regex::escape(close)
    )
}

fn rule_sources(kind: RuleKind) -> (Vec<String>, Guard) {
    match kind {
        RuleKind::BoldItalic => (
            vec![emphasis("***", '*'), emphasis("___", '_')],
            Guard::Isolated,
        ),
        RuleKind::Bold => (
            vec![emphasis("**", '*'), emphasis("__", '_')],
            Guard::Isolated,
        ),
        RuleKind::Italic => (
            vec![emphasis("*", '*'), emphasis("_", '_')],
            Guard::Isolated,
        ),
        RuleKind::Mark => (vec![enclosed("::", "::", r"[^\n]+?")], Guard::None),
        RuleKind::Delete => (vec![enclosed("||", "||", r"[^\n]+?")], Guard::None),
        RuleKind::Strikethrough => (vec![enclosed("~~", "~~", r"[^\s~][^\n]*?")], Guard::None),
        RuleKind::RawInline => (vec![emphasis("~", '~')], Guard::Isolated),
        RuleKind::InlineComment => (vec![enclosed("++", "++", r"[^\n]+?")], Guard::None),
        RuleKind::Annotation => (vec![enclosed("{", "}", r"[^}\n]+")], Guard::None),
        RuleKind::Link => (vec![enclosed("[", "]", r"[^\]\n]+")], Guard::NotCheckbox),
        RuleKind::InlineCode => (
            vec![enclosed("'", "'", r"[^'\n]+"), enclosed("`", "`", r"[^`\n]+")],
            Guard::WordBounded,
        ),
        RuleKind::Marker => (vec![r"(?P<lead>\((?:fn|img)\))".into()], Guard::None),
        RuleKind::Heading => (
            vec![r"(?m)^(?P<lead>#{1,6}[ \t]+)(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::Quote => (
            vec![r"(?m)^(?P<lead>>[ \t]?)(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::UnorderedList => (
            vec![r"(?m)^(?P<lead>[ \t]*[-*+][ \t]+)(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::OrderedList => (
            vec![r"(?m)^(?P<lead>[ \t]*\d+[.)][ \t]+)(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::Checklist => (
            vec![
                r"(?m)^(?P<lead>[ \t]*[-*+][ \t]+\[[ xX]\](?:[ \t]+|$))(?P<body>[^\n]*)$".into(),
            ],
            Guard::None,
        ),
        RuleKind::Divider => (vec![r"(?m)^(?P<lead>-{4,})[ \t]*$".into()], Guard::None),
        RuleKind::BlockComment => (
            vec![r"(?m)^(?P<lead>%%(?:[ \t]+|$))(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::CodeBlock => (
            vec![r"(?m)^(?P<lead>''(?:[ \t]+|$))(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        RuleKind::RawBlock => (
            vec![r"(?m)^(?P<lead>~~(?:[ \t]+|$))(?P<body>[^\n]*)$".into()],
            Guard::None,
        ),
        // Paired procedurally in `fenced_blocks`.
        RuleKind::FencedCode => (Vec::new(), Guard::None),
    }
}

fn compile(kind: RuleKind, source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|source| Error::InvalidPattern {
        rule: kind.to_string(),
        source,
    })
}

/// One rule match with its sub-ranges, all absolute byte ranges.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleMatch {
    pub kind: RuleKind,
    pub whole: TextRange,
    pub lead: Option<TextRange>,
    pub body: Option<TextRange>,
    pub trail: Option<TextRange>,
    /// Heading level (hash count); zero for other rules.
    pub level: u8,
    /// Checklist items marked `[x]`.
    pub checked: bool,
}

impl RuleMatch {
    /// Decorative token ranges: the leading and trailing delimiters.
    pub fn tokens(&self) -> impl Iterator<Item = TextRange> + '_ {
        self.lead
            .into_iter()
            .chain(self.trail)
            .filter(|range| !range.is_empty())
    }

    /// Range that receives the rule's content attributes.
    pub fn content(&self) -> TextRange {
        if self.kind.is_block() {
            return self.whole;
        }
        self.body.unwrap_or(self.whole)
    }
}

fn group_range(caps: &regex::Captures<'_>, name: &str) -> Option<TextRange> {
    caps.name(name)
        .map(|m| TextRange::from_bounds(m.start(), m.end()))
}

/// Compiled rule table; build once, scan many times.
pub struct PatternRegistry {
    rules: Vec<Rule>,
}

impl PatternRegistry {
    pub fn new() -> Result<Self> {
        let mut rules = Vec::with_capacity(RuleKind::ORDER.len());
        for kind in RuleKind::ORDER {
            let (sources, guard) = rule_sources(kind);
            let patterns = sources
                .iter()
                .map(|source| compile(kind, source))
                .collect::<Result<Vec<_>>>()?;
            rules.push(Rule {
                kind,
                patterns,
                guard,
            });
        }
        Ok(Self { rules })
    }

    /// All matches, grouped by rule in application order and sorted by offset
    /// within a rule.
    pub fn scan(&self, text: &str) -> Vec<RuleMatch> {
        let fenced = fenced_blocks(text);
        let mut matches = Vec::new();
        for rule in &self.rules {
            let mut found = Vec::new();
            for regex in &rule.patterns {
                collect_matches(rule, regex, text, &mut found);
            }
            found.sort_by_key(|m: &RuleMatch| (m.whole.offset, m.whole.length));
            found.retain(|m| !fenced.iter().any(|block| block.whole.intersects(&m.whole)));
            matches.extend(found);
        }
        matches.extend(fenced);
        trace!(matches = matches.len(), "pattern scan");
        matches
    }
}

fn collect_matches(rule: &Rule, regex: &Regex, text: &str, out: &mut Vec<RuleMatch>) {
    let mut start = 0usize;
    while start <= text.len() {
        let Some(caps) = regex.captures_at(text, start) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        if whole.start() == whole.end() || !rule.guard.accepts(text, &whole) {
            start = next_char_boundary(text, whole.start());
            continue;
        }
        let lead = group_range(&caps, "lead");
        let level = match rule.kind {
            RuleKind::Heading => lead.map_or(0, |range| {
                range.slice(text).chars().take_while(|c| *c == '#').count() as u8
            }),
            _ => 0,
        };
        let checked = rule.kind == RuleKind::Checklist
            && lead.is_some_and(|range| {
                let token = range.slice(text);
                token.contains("[x]") || token.contains("[X]")
            });
        out.push(RuleMatch {
            kind: rule.kind,
            whole: TextRange::from_bounds(whole.start(), whole.end()),
            lead,
            body: group_range(&caps, "body"),
            trail: group_range(&caps, "trail"),
            level,
            checked,
        });
        start = whole.end();
    }
}

/// Pairs lines starting with three backticks. An opening fence without a
/// closing partner is not a block.
fn fenced_blocks(text: &str) -> Vec<RuleMatch> {
    let mut blocks = Vec::new();
    let mut open: Option<TextRange> = None;
    for line in line_spans(text) {
        if !line.text(text).starts_with("```") {
            continue;
        }
        match open.take() {
            None => open = Some(line.range),
            Some(opening) => {
                let body_start = (opening.end() + 1).min(line.range.offset);
                blocks.push(RuleMatch {
                    kind: RuleKind::FencedCode,
                    whole: TextRange::from_bounds(opening.offset, line.range.end()),
                    lead: Some(opening),
                    body: Some(TextRange::from_bounds(body_start, line.range.offset)),
                    trail: Some(line.range),
                    level: 0,
                    checked: false,
                });
            }
        }
    }
    blocks
}
