use penwise_core::markdown::SIZE_GATE_CHARS;
use penwise_core::{
    Config, EditorSession, Highlight, HighlightScope, MarkdownHighlighter, RuleKind, SpanSource,
    StyleConfig, TextRange, TypewriterMode,
};

fn highlight_with(cfg: StyleConfig, text: &str, caret: usize) -> (MarkdownHighlighter, Highlight) {
    let hl = MarkdownHighlighter::new(cfg).unwrap();
    let h = hl.highlight(text, TextRange::caret(caret));
    (hl, h)
}

fn content_kinds(h: &Highlight) -> Vec<RuleKind> {
    h.spans
        .iter()
        .filter_map(|span| match span.source {
            SpanSource::Content(kind) => Some(kind),
            _ => None,
        })
        .collect()
}

#[test]
fn oversized_buffer_gets_base_spans_only() {
    let text = "**bold** ".repeat(SIZE_GATE_CHARS / 9 + 10);
    assert!(text.chars().count() > SIZE_GATE_CHARS);
    let (_, h) = highlight_with(StyleConfig::default(), &text, 0);
    assert!(h.gated);
    assert_eq!(h.spans.len(), 1);
    assert_eq!(h.spans[0].source, SpanSource::Base);
    assert_eq!(h.spans[0].range, TextRange::new(0, text.len()));
}

#[test]
fn buffer_at_gate_is_still_styled() {
    let mut text = "**b**".to_string();
    text.push_str(&"x".repeat(SIZE_GATE_CHARS - text.len()));
    let (_, h) = highlight_with(StyleConfig::default(), &text, 0);
    assert!(!h.gated);
    assert!(content_kinds(&h).contains(&RuleKind::Bold));
}

#[test]
fn gate_counts_chars_not_bytes() {
    let text = "é".repeat(SIZE_GATE_CHARS);
    let (_, h) = highlight_with(StyleConfig::default(), &text, 0);
    assert!(!h.gated);
}

#[test]
fn fenced_block_contents_are_not_styled() {
    let text = "```\n**bold** ::mark::\n```";
    let (_, h) = highlight_with(StyleConfig::default(), text, 0);
    assert_eq!(content_kinds(&h), vec![RuleKind::FencedCode]);
}

#[test]
fn token_is_either_visible_or_hidden() {
    let text = "# Title\n\nSome **bold** and [link] text.\n\n- item (fn)";
    let (hl, h) = highlight_with(StyleConfig::default(), text, 0);
    let palette = hl.palette();
    let mut seen = 0;
    for span in h.spans.iter().filter(|s| matches!(s.source, SpanSource::Token(_))) {
        seen += 1;
        let visible = span.attributes.foreground == Some(palette.token)
            && span.attributes.font_size.is_none();
        let hidden = span.attributes.foreground == Some(palette.background)
            && span.attributes.font_size == Some(0.01);
        assert!(visible ^ hidden, "token span {span:?}");
    }
    assert!(seen >= 7);
}

#[test]
fn runs_never_overlap_and_cover_styled_text() {
    let text = "# Title\n> quote with *em*\n1. one\n2. two";
    let (_, h) = highlight_with(StyleConfig::default(), text, 10);
    let runs = h.runs();
    let mut cursor = 0;
    for run in &runs {
        assert_eq!(run.range.offset, cursor);
        assert!(!run.range.is_empty());
        cursor = run.range.end();
    }
    assert_eq!(cursor, text.len());
}

#[test]
fn typewriter_sentence_scope_unfades_current_sentence() {
    let cfg = StyleConfig {
        typewriter: TypewriterMode::Typewriter,
        scope: HighlightScope::Sentence,
        ..StyleConfig::default()
    };
    let text = "First thought. Second thought.";
    let (hl, h) = highlight_with(cfg, text, 20);
    assert_eq!(h.active_range.slice(text), "Second thought.");
    let runs = h.runs();
    let at = |pos: usize| {
        runs.iter()
            .find(|r| r.range.contains(pos))
            .and_then(|r| r.attributes.foreground)
    };
    assert_eq!(at(0), Some(hl.palette().faded));
    assert_eq!(at(20), Some(hl.palette().text));
}

#[test]
fn highlight_is_idempotent() {
    let text = "## Head\n\n- [ ] task\n- [x] done\n\n::hi:: ++note++ {aside}";
    let hl = MarkdownHighlighter::new(StyleConfig::default()).unwrap();
    let a = hl.highlight(text, TextRange::new(3, 9));
    let b = hl.highlight(text, TextRange::new(3, 9));
    assert_eq!(a, b);
    assert_eq!(a.runs(), b.runs());
}

#[test]
fn spans_serialize_with_rule_names() {
    let (_, h) = highlight_with(StyleConfig::default(), "**a**", 0);
    let json = serde_json::to_value(&h.spans).unwrap();
    let sources: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|span| span["source"].clone())
        .collect();
    assert!(sources.contains(&serde_json::json!({"pass": "content", "rule": "bold"})));
    assert!(sources.contains(&serde_json::json!({"pass": "base"})));
}

#[test]
fn session_drives_highlighter() {
    let mut session = EditorSession::new(&Config::default()).unwrap();
    let h = session
        .text_did_change("**a**\n**b**", TextRange::caret(8))
        .unwrap()
        .unwrap();
    assert_eq!(h.active_range, TextRange::new(6, 5));
}
