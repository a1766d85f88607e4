//! Spacing, punctuation runs, sentence capitalization and unbalanced delimiters.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Category, Document, IssueSink, Severity, StyleAnalyzer, StyleFix};
use crate::range::TextRange;

static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("space run regex"));
static SPACE_BEFORE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\s]([ \t]+)[,.;:!?]").expect("space before punctuation regex"));
static PUNCT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[!?]{2,}").expect("punctuation run regex"));
static LOWERCASE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]\s+\p{Ll}").expect("lowercase start regex"));

const ABBREVIATIONS: &[&str] = &[
    "e.g", "i.e", "etc", "vs", "cf", "mr", "mrs", "ms", "dr", "st", "approx", "no", "fig", "al",
];

fn char_before(text: &str, pos: usize) -> Option<char> {
    text.get(..pos).and_then(|head| head.chars().next_back())
}

fn char_at(text: &str, pos: usize) -> Option<char> {
    text.get(pos..).and_then(|tail| tail.chars().next())
}

/// Whether the `.` at `dot` ends an abbreviation, a number or an ellipsis
/// rather than a sentence.
fn is_false_sentence_end(text: &str, dot: usize) -> bool {
    if char_at(text, dot) != Some('.') {
        return false;
    }
    match char_before(text, dot) {
        Some('.') | Some('…') => return true,
        Some(c) if c.is_ascii_digit() => return true,
        _ => {}
    }
    let head = &text[..dot];
    let word_start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| c.is_whitespace() || c == '(')
        .map_or(0, |(idx, c)| idx + c.len_utf8());
    let word = head[word_start..].to_lowercase();
    ABBREVIATIONS.contains(&word.as_str()) || (word.chars().count() == 1 && word != "i")
}

impl StyleAnalyzer {
    pub(super) fn detect_spacing(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let text = doc.text;
        for mat in SPACE_RUN.find_iter(text) {
            let before = char_before(text, mat.start());
            let after = char_at(text, mat.end());
            let between_words = before.is_some_and(|c| !c.is_whitespace())
                && after.is_some_and(|c| !c.is_whitespace() && !",.;:!?".contains(c));
            if !between_words {
                continue;
            }
            let range = TextRange::from_bounds(mat.start(), mat.end());
            sink.push(
                Category::Punctuation,
                Severity::Info,
                range,
                "Multiple spaces between words.".into(),
                Some(StyleFix::replace(range, " ")),
                Some("double-space".into()),
            );
        }

        for caps in SPACE_BEFORE_PUNCT.captures_iter(text) {
            let (Some(whole), Some(spaces)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let after = char_at(text, whole.end());
            if after.is_some_and(|c| !c.is_whitespace()) {
                continue;
            }
            let range = TextRange::from_bounds(spaces.start(), spaces.end());
            let mark = &text[spaces.end()..whole.end()];
            sink.push(
                Category::Punctuation,
                Severity::Info,
                range,
                format!("Space before `{mark}`."),
                Some(StyleFix::delete(range)),
                Some("space-before-punctuation".into()),
            );
        }
    }

    pub(super) fn detect_punctuation_runs(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for mat in PUNCT_RUN.find_iter(doc.text) {
            let range = TextRange::from_bounds(mat.start(), mat.end());
            let first = &mat.as_str()[..1];
            sink.push(
                Category::Punctuation,
                Severity::Info,
                range,
                format!("Repeated punctuation `{}`.", mat.as_str()),
                Some(StyleFix::replace(range, first)),
                Some("punctuation-run".into()),
            );
        }
    }

    pub(super) fn detect_lowercase_sentence_start(
        &self,
        doc: &Document<'_>,
        sink: &mut IssueSink,
    ) {
        let text = doc.text;
        for mat in LOWERCASE_START.find_iter(text) {
            if is_false_sentence_end(text, mat.start()) {
                continue;
            }
            let matched = mat.as_str();
            let Some(letter) = matched.chars().next_back() else {
                continue;
            };
            let letter_start = mat.end() - letter.len_utf8();
            let prefix = &matched[..matched.len() - letter.len_utf8()];
            let capitalized: String = letter.to_uppercase().collect();
            sink.push(
                Category::Punctuation,
                Severity::Info,
                TextRange::new(letter_start, letter.len_utf8()),
                "Sentence should start with a capital letter.".into(),
                Some(StyleFix::replace(
                    TextRange::from_bounds(mat.start(), mat.end()),
                    format!("{prefix}{capitalized}"),
                )),
                Some("sentence-case".into()),
            );
        }
    }

    pub(super) fn detect_unmatched_delimiters(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let text = doc.text;
        let quotes: Vec<usize> = text.match_indices('"').map(|(idx, _)| idx).collect();
        if quotes.len() % 2 == 1 {
            if let Some(&last) = quotes.last() {
                sink.push(
                    Category::Punctuation,
                    Severity::Info,
                    TextRange::new(last, 1),
                    "Unmatched quotation mark.".into(),
                    None,
                    Some("unmatched-quote".into()),
                );
            }
        }

        let opens = text.matches('(').count();
        let closes = text.matches(')').count();
        let excess = match opens.cmp(&closes) {
            std::cmp::Ordering::Greater => Some('('),
            std::cmp::Ordering::Less => Some(')'),
            std::cmp::Ordering::Equal => None,
        };
        if let Some(paren) = excess {
            if let Some(idx) = text.rfind(paren) {
                sink.push(
                    Category::Punctuation,
                    Severity::Info,
                    TextRange::new(idx, 1),
                    format!("Unmatched parenthesis `{paren}`."),
                    None,
                    Some("unmatched-parenthesis".into()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::range::TextRange;
    use crate::style::{Category, StyleAnalyzer, StyleIssue};

    fn punctuation(text: &str) -> Vec<StyleIssue> {
        StyleAnalyzer::default()
            .analyze(text)
            .into_iter()
            .filter(|i| i.category == Category::Punctuation)
            .collect()
    }

    fn fixed(text: &str, issue: &StyleIssue) -> String {
        issue.fix.as_ref().unwrap().apply(text).unwrap()
    }

    #[test]
    fn collapses_double_space() {
        let issues = punctuation("Hello  world");
        assert_eq!(issues.len(), 1);
        let fix = issues[0].fix.as_ref().unwrap();
        assert_eq!(fix.range, TextRange::new(5, 2));
        assert_eq!(fix.replacement.as_deref(), Some(" "));
    }

    #[test]
    fn leading_indentation_is_not_double_spacing() {
        assert!(punctuation("    Indented text.").is_empty());
    }

    #[test]
    fn removes_space_before_punctuation() {
        let text = "Wait , what ?";
        let issues = punctuation(text);
        assert_eq!(issues.len(), 2);
        assert_eq!(fixed(text, &issues[0]), "Wait, what ?");
        assert_eq!(fixed(text, &issues[1]), "Wait , what?");
    }

    #[test]
    fn collapses_punctuation_runs() {
        let text = "Really?!?";
        let issues = punctuation(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(fixed(text, &issues[0]), "Really?");
    }

    #[test]
    fn capitalizes_sentence_start() {
        let text = "It rained. then it stopped.";
        let issues = punctuation(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].range, TextRange::new(11, 1));
        assert_eq!(fixed(text, &issues[0]), "It rained. Then it stopped.");
    }

    #[test]
    fn skips_abbreviations_and_numbers() {
        assert!(punctuation("Bring fruit, e.g. apples and pears.").is_empty());
        assert!(punctuation("1. first item").is_empty());
        assert!(punctuation("Wait... and see.").is_empty());
    }

    #[test]
    fn sentence_end_after_wide_whitespace() {
        let text = "It was the word\u{a0}end. then more";
        let issues = punctuation(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].range, TextRange::new(22, 1));
        assert!(punctuation("Point\u{3000}b. then on").is_empty());
    }

    #[test]
    fn flags_last_unmatched_quote_and_paren() {
        let text = "She said \"hi\" and \"bye (later.";
        let issues = punctuation(text);
        let quote = issues
            .iter()
            .find(|i| i.ignored_key.as_deref() == Some("unmatched-quote"))
            .unwrap();
        assert_eq!(quote.range, TextRange::new(18, 1));
        let paren = issues
            .iter()
            .find(|i| i.ignored_key.as_deref() == Some("unmatched-parenthesis"))
            .unwrap();
        assert_eq!(paren.range, TextRange::new(23, 1));
    }
}
