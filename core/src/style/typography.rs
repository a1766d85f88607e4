//! Typewriter habits: hyphen runs standing in for em dashes and dot runs
//! standing in for an ellipsis.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Category, Document, IssueSink, Severity, StyleAnalyzer, StyleFix};
use crate::range::{line_index_at, line_spans, TextRange};

static DASH_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-{2,}").expect("valid dash regex"));
static DOT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}").expect("valid ellipsis regex"));

fn is_divider(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.chars().all(|c| c == '-')
}

impl StyleAnalyzer {
    /// Hyphen runs (`--`, `---`, ...) standing in for an em dash.
    pub(super) fn detect_dashes(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let text = doc.text;
        let lines = line_spans(text);
        for mat in DASH_RUN.find_iter(text) {
            let before = text[..mat.start()].chars().next_back();
            let after = text[mat.end()..].chars().next();
            // HTML comment delimiters and arrows.
            if matches!(before, Some('<' | '!')) || after == Some('>') {
                continue;
            }
            let line = lines[line_index_at(&lines, mat.start())];
            if is_divider(line.text(text)) {
                continue;
            }
            let range = TextRange::from_bounds(mat.start(), mat.end());
            sink.push(
                Category::Typography,
                Severity::Info,
                range,
                format!("Use an em dash instead of `{}`.", mat.as_str()),
                Some(StyleFix::replace(range, "—")),
                Some("em-dash".into()),
            );
        }
    }

    pub(super) fn detect_ellipses(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for mat in DOT_RUN.find_iter(doc.text) {
            let range = TextRange::from_bounds(mat.start(), mat.end());
            sink.push(
                Category::Typography,
                Severity::Info,
                range,
                "Use an ellipsis character.".into(),
                Some(StyleFix::replace(range, "…")),
                Some("ellipsis".into()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::range::TextRange;
    use crate::style::{Category, StyleAnalyzer, StyleIssue};

    fn typography(text: &str) -> Vec<StyleIssue> {
        StyleAnalyzer::default()
            .analyze(text)
            .into_iter()
            .filter(|i| i.category == Category::Typography)
            .collect()
    }

    #[test]
    fn double_hyphen_becomes_em_dash() {
        let text = "wait--really";
        let issues = typography(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].fix.as_ref().unwrap().apply(text).unwrap(),
            "wait—really"
        );
        assert_eq!(typography("wait---really").len(), 1);
    }

    #[test]
    fn hyphen_runs_at_buffer_edges_and_long_runs() {
        let issues = typography("--start and end--");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].range, TextRange::new(0, 2));
        assert_eq!(issues[1].range, TextRange::new(15, 2));
        let text = "a----b";
        let issues = typography(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].fix.as_ref().unwrap().apply(text).unwrap(), "a—b");
    }

    #[test]
    fn dividers_and_comments_are_left_alone() {
        assert!(typography("above\n----\nbelow").is_empty());
        assert!(typography("above\n--- \nbelow").is_empty());
        assert!(typography("<!-- note -->").is_empty());
        assert!(typography("a ---> b").is_empty());
    }

    #[test]
    fn dot_runs_become_ellipsis() {
        let text = "Well.... maybe";
        let issues = typography(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].fix.as_ref().unwrap().apply(text).unwrap(),
            "Well… maybe"
        );
    }
}
