//! Vagueness: paragraphs opening on a pronoun with nothing to point at, and
//! filler nouns used across the whole buffer.

use super::{Category, Document, IssueSink, Severity, StyleAnalyzer};
use crate::linguist::PartOfSpeech;
use crate::range::paragraph_ranges;

impl StyleAnalyzer {
    /// Paragraphs that open on a vague pronoun with no noun close behind it.
    pub(super) fn detect_unclear_references(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let reach = self.config.vague_reference_chars;
        for paragraph in paragraph_ranges(doc.text) {
            let mut words = doc
                .tokens
                .iter()
                .filter(|t| paragraph.contains(t.range.offset) && t.is_word());
            let Some(first) = words.next() else {
                continue;
            };
            if !self.vague_pronouns.contains(&first.text.to_lowercase()) {
                continue;
            }
            let limit = paragraph.offset + reach;
            let has_noun = words
                .take_while(|t| t.range.offset < limit)
                .any(|t| t.is(PartOfSpeech::Noun));
            if has_noun {
                continue;
            }
            sink.push(
                Category::Semantics,
                Severity::Info,
                first.range,
                format!(
                    "Unclear reference: `{}` does not point at anything nearby.",
                    first.text
                ),
                None,
                Some("unclear-reference".into()),
            );
        }
    }

    /// Buffer-wide overuse of filler nouns; only the first use is flagged.
    pub(super) fn detect_frequent_fillers(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let limit = self.config.filler_noun_limit;
        if limit == 0 {
            return;
        }
        let mut fillers = doc
            .tokens
            .iter()
            .filter(|t| self.filler_nouns.contains(&t.lemma));
        let Some(first) = fillers.next() else {
            return;
        };
        let total = 1 + fillers.count();
        if total >= limit {
            sink.push(
                Category::Semantics,
                Severity::Info,
                first.range,
                format!("Frequent vague nouns ({total} uses)."),
                None,
                Some("frequent-vague-nouns".into()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::range::TextRange;
    use crate::style::{Category, StyleAnalyzer, StyleIssue};

    fn semantics(text: &str) -> Vec<StyleIssue> {
        StyleAnalyzer::default()
            .analyze(text)
            .into_iter()
            .filter(|i| i.category == Category::Semantics)
            .collect()
    }

    #[test]
    fn flags_vague_paragraph_opener() {
        let text = "The plan failed.\n\nThis is it.";
        let issues = semantics(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].range, TextRange::new(18, 4));
    }

    #[test]
    fn noun_nearby_clears_reference() {
        assert!(semantics("This plan is good.").is_empty());
    }

    #[test]
    fn flags_first_of_frequent_fillers() {
        let text = "One thing led to another thing, and then some stuff happened.";
        let issues = semantics(text);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].range, TextRange::new(4, 5));
        assert!(semantics("One thing at a time.").is_empty());
    }
}
