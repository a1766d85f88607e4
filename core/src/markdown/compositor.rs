//! Turns rule matches, focus and configuration into layered attribute spans.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, trace};

use super::patterns::{PatternRegistry, RuleKind, RuleMatch};
use crate::config::{Color, Palette, StyleConfig};
use crate::error::Result;
use crate::focus::{self, ScrollRequest};
use crate::linguist::{BasicLinguist, Linguist};
use crate::range::TextRange;

/// Buffers longer than this (in chars) get base styling only.
pub const SIZE_GATE_CHARS: usize = 20_000;

/// Font size used to collapse hidden tokens.
pub const HIDDEN_FONT_SIZE: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Display attributes; `None` leaves whatever an earlier span set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraph_indent: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f32>,
}

impl Attributes {
    /// Field-wise override: every field set in `other` replaces ours.
    pub fn overlay(&mut self, other: &Attributes) {
        fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        take(&mut self.font_family, &other.font_family);
        take(&mut self.font_size, &other.font_size);
        take(&mut self.weight, &other.weight);
        take(&mut self.italic, &other.italic);
        take(&mut self.foreground, &other.foreground);
        take(&mut self.background, &other.background);
        take(&mut self.underline, &other.underline);
        take(&mut self.strikethrough, &other.strikethrough);
        take(&mut self.paragraph_indent, &other.paragraph_indent);
        take(&mut self.line_spacing, &other.line_spacing);
    }

    fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }
}

/// Pass that produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "pass", content = "rule")]
pub enum SpanSource {
    Base,
    Fade,
    Focus,
    CurrentLine,
    Content(RuleKind),
    Token(RuleKind),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeSpan {
    pub range: TextRange,
    pub attributes: Attributes,
    pub source: SpanSource,
}

/// Non-overlapping, fully resolved slice of the buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeRun {
    pub range: TextRange,
    pub attributes: Attributes,
}

/// Result of one highlight pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    /// Spans in application order.
    pub spans: Vec<AttributeSpan>,
    pub active_range: TextRange,
    pub scroll: Option<ScrollRequest>,
    /// Set when the size gate skipped everything but the base pass.
    pub gated: bool,
}

impl Highlight {
    /// Flatten the layered spans into runs; later spans win field-wise and
    /// adjacent runs with equal attributes are merged.
    pub fn runs(&self) -> Vec<AttributeRun> {
        let mut bounds: Vec<usize> = self
            .spans
            .iter()
            .filter(|span| !span.range.is_empty())
            .flat_map(|span| [span.range.offset, span.range.end()])
            .collect();
        bounds.sort_unstable();
        bounds.dedup();

        let mut starts: Vec<(usize, usize)> = Vec::new();
        let mut ends: Vec<(usize, usize)> = Vec::new();
        for (idx, span) in self.spans.iter().enumerate() {
            if !span.range.is_empty() {
                starts.push((span.range.offset, idx));
                ends.push((span.range.end(), idx));
            }
        }
        starts.sort_unstable();
        ends.sort_unstable();

        let mut runs: Vec<AttributeRun> = Vec::new();
        let mut active = BTreeSet::new();
        let (mut next_start, mut next_end) = (0usize, 0usize);
        for window in bounds.windows(2) {
            let (from, to) = (window[0], window[1]);
            while next_end < ends.len() && ends[next_end].0 <= from {
                active.remove(&ends[next_end].1);
                next_end += 1;
            }
            while next_start < starts.len() && starts[next_start].0 <= from {
                active.insert(starts[next_start].1);
                next_start += 1;
            }
            if active.is_empty() {
                continue;
            }
            let mut attributes = Attributes::default();
            for idx in &active {
                attributes.overlay(&self.spans[*idx].attributes);
            }
            match runs.last_mut() {
                Some(last) if last.range.end() == from && last.attributes == attributes => {
                    last.range = TextRange::from_bounds(last.range.offset, to);
                }
                _ => runs.push(AttributeRun {
                    range: TextRange::from_bounds(from, to),
                    attributes,
                }),
            }
        }
        runs
    }

    pub fn spans_from(&self, source: SpanSource) -> impl Iterator<Item = &AttributeSpan> + '_ {
        self.spans.iter().filter(move |span| span.source == source)
    }
}

/// The markdown highlighter: pattern table plus the current style config.
pub struct MarkdownHighlighter {
    config: StyleConfig,
    palette: Palette,
    registry: PatternRegistry,
    linguist: Box<dyn Linguist>,
}

impl MarkdownHighlighter {
    pub fn new(config: StyleConfig) -> Result<Self> {
        Self::with_linguist(config, Box::new(BasicLinguist))
    }

    pub fn with_linguist(config: StyleConfig, linguist: Box<dyn Linguist>) -> Result<Self> {
        Ok(Self {
            palette: Palette::resolve(&config),
            config,
            registry: PatternRegistry::new()?,
            linguist,
        })
    }

    pub fn config(&self) -> &StyleConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replace the configuration wholesale; takes effect on the next pass.
    pub fn set_config(&mut self, config: StyleConfig) {
        self.palette = Palette::resolve(&config);
        self.config = config;
    }

    pub fn highlight(&self, text: &str, selection: TextRange) -> Highlight {
        let selection = selection.clamp_to(text);
        let active_range =
            focus::active_range(text, selection, self.config.scope, self.linguist.as_ref());
        let mut spans = vec![AttributeSpan {
            range: TextRange::new(0, text.len()),
            attributes: self.base_attributes(),
            source: SpanSource::Base,
        }];

        let chars = text.chars().count();
        if chars > SIZE_GATE_CHARS {
            debug!(chars, limit = SIZE_GATE_CHARS, "buffer over size gate; base styling only");
            return Highlight {
                spans,
                active_range,
                scroll: None,
                gated: true,
            };
        }

        let typewriter = self.config.is_typewriter();
        if typewriter {
            spans.push(AttributeSpan {
                range: TextRange::new(0, text.len()),
                attributes: Attributes::foreground(self.palette.faded),
                source: SpanSource::Fade,
            });
            spans.push(AttributeSpan {
                range: active_range,
                attributes: Attributes::foreground(self.palette.text),
                source: SpanSource::Focus,
            });
        }

        if self.config.mark_current_line {
            spans.push(AttributeSpan {
                range: focus::line_range(text, selection.offset),
                attributes: Attributes {
                    background: Some(self.palette.current_line),
                    ..Attributes::default()
                },
                source: SpanSource::CurrentLine,
            });
        }

        let matches = self.registry.scan(text);
        for m in &matches {
            let inactive = !m.whole.intersects(&active_range);
            for (range, mut attributes) in self.content_spans(m) {
                if typewriter && inactive && attributes.foreground.is_some() {
                    attributes.foreground = Some(self.palette.faded);
                }
                spans.push(AttributeSpan {
                    range,
                    attributes,
                    source: SpanSource::Content(m.kind),
                });
            }
        }
        let shown = Attributes::foreground(self.palette.token);
        let hidden = Attributes {
            foreground: Some(self.palette.background),
            font_size: Some(HIDDEN_FONT_SIZE),
            ..Attributes::default()
        };
        for m in &matches {
            for range in m.tokens() {
                let visible = range.intersects(&active_range) || !m.kind.hides_when_inactive();
                spans.push(AttributeSpan {
                    range,
                    attributes: if visible { shown.clone() } else { hidden.clone() },
                    source: SpanSource::Token(m.kind),
                });
            }
        }

        let scroll = (typewriter && self.config.fixed_scroll).then(|| ScrollRequest {
            line: focus::line_index(text, selection.offset),
            active: active_range,
        });
        trace!(
            matches = matches.len(),
            spans = spans.len(),
            "highlight pass"
        );
        Highlight {
            spans,
            active_range,
            scroll,
            gated: false,
        }
    }

    fn base_attributes(&self) -> Attributes {
        Attributes {
            font_family: Some(self.config.font_family.clone()),
            font_size: Some(self.config.font_size),
            weight: Some(FontWeight::Regular),
            italic: Some(false),
            foreground: Some(self.palette.text),
            background: Some(self.palette.background),
            underline: Some(false),
            strikethrough: Some(false),
            paragraph_indent: Some(0.0),
            line_spacing: Some(self.config.line_spacing),
        }
    }

    fn content_spans(&self, m: &RuleMatch) -> Vec<(TextRange, Attributes)> {
        let palette = &self.palette;
        let indent = self.config.font_size * 1.5;
        let code = || Attributes {
            font_family: Some(self.config.code_font_family.clone()),
            background: Some(palette.code_background),
            ..Attributes::default()
        };
        let attributes = match m.kind {
            RuleKind::BoldItalic => Attributes {
                weight: Some(FontWeight::Bold),
                italic: Some(true),
                ..Attributes::default()
            },
            RuleKind::Bold => Attributes {
                weight: Some(FontWeight::Bold),
                ..Attributes::default()
            },
            RuleKind::Italic => Attributes {
                italic: Some(true),
                ..Attributes::default()
            },
            RuleKind::Mark => Attributes {
                background: Some(palette.mark),
                ..Attributes::default()
            },
            RuleKind::Delete | RuleKind::Strikethrough => Attributes {
                strikethrough: Some(true),
                ..Attributes::default()
            },
            RuleKind::InlineComment | RuleKind::BlockComment => Attributes {
                foreground: Some(palette.comment),
                italic: Some(true),
                ..Attributes::default()
            },
            RuleKind::Annotation => Attributes::foreground(palette.annotation),
            RuleKind::Link => Attributes {
                foreground: Some(palette.link),
                underline: Some(true),
                ..Attributes::default()
            },
            RuleKind::InlineCode | RuleKind::CodeBlock | RuleKind::FencedCode => code(),
            RuleKind::RawInline | RuleKind::RawBlock => Attributes::foreground(palette.code),
            RuleKind::Marker => Attributes {
                foreground: Some(palette.annotation),
                weight: Some(FontWeight::Bold),
                ..Attributes::default()
            },
            RuleKind::Heading => Attributes {
                weight: Some(FontWeight::Bold),
                font_size: Some(
                    self.config.font_size * self.config.heading_scale.multiplier(m.level),
                ),
                ..Attributes::default()
            },
            RuleKind::Quote => Attributes {
                foreground: Some(palette.quote),
                italic: Some(true),
                paragraph_indent: Some(indent),
                ..Attributes::default()
            },
            RuleKind::UnorderedList | RuleKind::OrderedList | RuleKind::Checklist => Attributes {
                paragraph_indent: Some(indent),
                ..Attributes::default()
            },
            RuleKind::Divider => return Vec::new(),
        };
        let mut spans = vec![(m.content(), attributes)];
        if m.kind == RuleKind::Checklist && m.checked {
            if let Some(body) = m.body.filter(|body| !body.is_empty()) {
                spans.push((
                    body,
                    Attributes {
                        strikethrough: Some(true),
                        ..Attributes::default()
                    },
                ));
            }
        }
        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeadingScale, HighlightScope, TypewriterMode};

    fn highlighter(config: StyleConfig) -> MarkdownHighlighter {
        MarkdownHighlighter::new(config).unwrap()
    }

    fn tokens(h: &Highlight, kind: RuleKind) -> Vec<&AttributeSpan> {
        h.spans_from(SpanSource::Token(kind)).collect()
    }

    #[test]
    fn tokens_hide_outside_active_line() {
        let hl = highlighter(StyleConfig::default());
        let text = "**a**\n**b**";
        let h = hl.highlight(text, TextRange::caret(0));
        let bold = tokens(&h, RuleKind::Bold);
        assert_eq!(bold.len(), 4);
        let palette = hl.palette();
        assert_eq!(bold[0].attributes.foreground, Some(palette.token));
        assert_eq!(bold[0].attributes.font_size, None);
        assert_eq!(bold[2].attributes.foreground, Some(palette.background));
        assert_eq!(bold[2].attributes.font_size, Some(HIDDEN_FONT_SIZE));
    }

    #[test]
    fn fence_lines_hide_when_caret_is_inside_block() {
        let hl = highlighter(StyleConfig::default());
        let text = "```\ncode\n```";
        let palette = hl.palette();

        let inside = hl.highlight(text, TextRange::caret(5));
        let fences = tokens(&inside, RuleKind::FencedCode);
        assert_eq!(fences.len(), 2);
        for fence in &fences {
            assert_eq!(fence.attributes.foreground, Some(palette.background));
            assert_eq!(fence.attributes.font_size, Some(HIDDEN_FONT_SIZE));
        }

        let on_opening = hl.highlight(text, TextRange::caret(1));
        let fences = tokens(&on_opening, RuleKind::FencedCode);
        assert_eq!(fences[0].range, TextRange::new(0, 3));
        assert_eq!(fences[0].attributes.font_size, None);
        assert_eq!(fences[1].attributes.font_size, Some(HIDDEN_FONT_SIZE));
    }

    #[test]
    fn list_tokens_stay_visible() {
        let hl = highlighter(StyleConfig::default());
        let h = hl.highlight("x\n- item", TextRange::caret(0));
        let list = tokens(&h, RuleKind::UnorderedList);
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].attributes.foreground, Some(hl.palette().token));
    }

    #[test]
    fn typewriter_fades_outside_active_range() {
        let cfg = StyleConfig {
            typewriter: TypewriterMode::Typewriter,
            fixed_scroll: true,
            ..StyleConfig::default()
        };
        let hl = highlighter(cfg);
        let text = "[one]\n[two]";
        let h = hl.highlight(text, TextRange::caret(7));
        assert_eq!(h.active_range, TextRange::new(6, 5));
        let focus: Vec<_> = h.spans_from(SpanSource::Focus).collect();
        assert_eq!(focus[0].range, h.active_range);
        let links: Vec<_> = h.spans_from(SpanSource::Content(RuleKind::Link)).collect();
        assert_eq!(links[0].attributes.foreground, Some(hl.palette().faded));
        assert_eq!(links[1].attributes.foreground, Some(hl.palette().link));
        assert_eq!(h.scroll.map(|s| s.line), Some(1));
    }

    #[test]
    fn no_scroll_request_without_fixed_scroll() {
        let cfg = StyleConfig {
            typewriter: TypewriterMode::Typewriter,
            ..StyleConfig::default()
        };
        let h = highlighter(cfg).highlight("text", TextRange::caret(0));
        assert!(h.scroll.is_none());
    }

    #[test]
    fn heading_size_follows_scale() {
        let hl = highlighter(StyleConfig {
            heading_scale: HeadingScale::Compact,
            ..StyleConfig::default()
        });
        let h = hl.highlight("###### deep", TextRange::caret(0));
        let heading: Vec<_> = h.spans_from(SpanSource::Content(RuleKind::Heading)).collect();
        assert_eq!(heading[0].attributes.font_size, Some(16.0));
        assert_eq!(heading[0].range, TextRange::new(0, 11));
    }

    #[test]
    fn current_line_mark() {
        let hl = highlighter(StyleConfig {
            mark_current_line: true,
            scope: HighlightScope::Paragraph,
            ..StyleConfig::default()
        });
        let h = hl.highlight("a\nb\nc", TextRange::caret(2));
        let marks: Vec<_> = h.spans_from(SpanSource::CurrentLine).collect();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].range, TextRange::new(2, 2));
    }

    #[test]
    fn checked_item_is_struck_through() {
        let hl = highlighter(StyleConfig::default());
        let h = hl.highlight("- [x] done", TextRange::caret(0));
        let content: Vec<_> = h
            .spans_from(SpanSource::Content(RuleKind::Checklist))
            .collect();
        assert_eq!(content.len(), 2);
        assert_eq!(content[1].range, TextRange::new(6, 4));
        assert_eq!(content[1].attributes.strikethrough, Some(true));
    }

    #[test]
    fn runs_cover_buffer_without_overlap() {
        let hl = highlighter(StyleConfig::default());
        let text = "plain **bold** end";
        let runs = hl.highlight(text, TextRange::caret(0)).runs();
        assert_eq!(runs.first().unwrap().range.offset, 0);
        assert_eq!(runs.last().unwrap().range.end(), text.len());
        for pair in runs.windows(2) {
            assert_eq!(pair[0].range.end(), pair[1].range.offset);
            assert_ne!(pair[0].attributes, pair[1].attributes);
        }
        let bold = runs
            .iter()
            .find(|r| r.range == TextRange::new(8, 4))
            .unwrap();
        assert_eq!(bold.attributes.weight, Some(FontWeight::Bold));
        assert_eq!(bold.attributes.foreground, Some(hl.palette().text));
    }

    #[test]
    fn set_config_swaps_palette() {
        let mut hl = highlighter(StyleConfig::default());
        let before = *hl.palette();
        hl.set_config(StyleConfig {
            theme: crate::config::Theme::Dark,
            ..StyleConfig::default()
        });
        assert_ne!(before.background, hl.palette().background);
    }
}
