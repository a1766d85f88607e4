//! Weak style: adverb-heavy or overlong sentences, intensifiers, hedges,
//! expletive openers, wordy phrases, filler nouns and repeated openings.

use super::{
    is_word_bounded, with_trailing_space, Category, Document, IssueSink, Severity, StyleAnalyzer,
    StyleFix,
};
use crate::linguist::PartOfSpeech;
use crate::range::TextRange;

/// Keep the capitalization of the first letter of `original`.
fn match_leading_case(original: &str, replacement: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl StyleAnalyzer {
    pub(super) fn detect_adverb_density(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for sentence in &doc.sentences {
            let tokens = doc.sentence_tokens(sentence);
            let words = tokens.iter().filter(|t| t.is_word()).count();
            if words == 0 {
                continue;
            }
            let adverbs = tokens
                .iter()
                .filter(|t| t.is(PartOfSpeech::Adverb))
                .count();
            let ratio = adverbs as f32 / words as f32;
            if adverbs >= self.config.adverb_limit || ratio > self.config.adverb_ratio {
                sink.push(
                    Category::Style,
                    Severity::Info,
                    sentence.range,
                    format!("Sentence leans on adverbs ({adverbs} of {words} words)."),
                    None,
                    Some("adverb-density".into()),
                );
            }
        }
    }

    pub(super) fn detect_intensifiers(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for token in &doc.tokens {
            if !self.intensifiers.contains(&token.lemma) {
                continue;
            }
            sink.push(
                Category::Style,
                Severity::Info,
                token.range,
                format!("Weak intensifier `{}`.", token.text),
                Some(StyleFix::delete(with_trailing_space(doc.text, token.range))),
                Some(token.lemma.clone()),
            );
        }
    }

    pub(super) fn detect_expletive_openers(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for sentence in &doc.sentences {
            let body = sentence.range.slice(doc.text);
            let lower = body.to_lowercase();
            for expletive in &self.config.expletives {
                let expletive = expletive.trim().to_lowercase();
                if expletive.is_empty() || !lower.starts_with(&expletive) {
                    continue;
                }
                let range = TextRange::new(sentence.range.offset, expletive.len());
                if !is_word_bounded(doc.text, range) {
                    continue;
                }
                sink.push(
                    Category::Style,
                    Severity::Info,
                    range,
                    format!(
                        "Sentence opens with `{}`; lead with the subject.",
                        range.slice(doc.text)
                    ),
                    Some(StyleFix::flag(range)),
                    Some(format!("expletive:{expletive}")),
                );
                break;
            }
        }
    }

    pub(super) fn detect_wordy_phrases(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let Some(matcher) = &self.wordy_matcher else {
            return;
        };
        for mat in matcher.find_iter(doc.text.as_bytes()) {
            let range = TextRange::from_bounds(mat.start(), mat.end());
            if !is_word_bounded(doc.text, range) {
                continue;
            }
            let Some(entry) = self.config.wordy_phrases.get(mat.pattern()) else {
                continue;
            };
            let snippet = range.slice(doc.text);
            let replacement = match_leading_case(snippet, &entry.replacement);
            sink.push(
                Category::Style,
                Severity::Info,
                range,
                format!("Wordy phrase `{snippet}`; consider `{replacement}`."),
                Some(StyleFix::replace(range, replacement)),
                Some(entry.phrase.trim().to_lowercase()),
            );
        }
    }

    /// Third and later sentences in a run sharing the same first content word.
    pub(super) fn detect_repeated_starts(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let limit = self.config.repeated_start_run.max(2);
        let mut previous: Option<&str> = None;
        let mut streak = 0usize;

        for sentence in &doc.sentences {
            let opener = doc
                .sentence_tokens(sentence)
                .iter()
                .find(|t| t.is_word() && !self.is_stopword(t));
            let Some(opener) = opener else {
                previous = None;
                streak = 0;
                continue;
            };
            if previous == Some(opener.lemma.as_str()) {
                streak += 1;
            } else {
                previous = Some(opener.lemma.as_str());
                streak = 1;
            }
            if streak >= limit {
                sink.push(
                    Category::Style,
                    Severity::Info,
                    opener.range,
                    format!(
                        "{streak} sentences in a row start with `{}`.",
                        opener.lemma
                    ),
                    None,
                    Some(format!("start:{}", opener.lemma)),
                );
            }
        }
    }

    pub(super) fn detect_long_sentences(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let limit = self.config.long_sentence_words;
        for sentence in &doc.sentences {
            let words = doc
                .sentence_tokens(sentence)
                .iter()
                .filter(|t| t.is_word())
                .count();
            if words > limit {
                sink.push(
                    Category::Style,
                    Severity::Warning,
                    sentence.range,
                    format!("Sentence length {words} exceeds limit of {limit} words."),
                    None,
                    Some("long-sentence".into()),
                );
            }
        }
    }

    pub(super) fn detect_hedges(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let Some(matcher) = &self.hedge_matcher else {
            return;
        };
        for mat in matcher.find_iter(doc.text.as_bytes()) {
            let range = TextRange::from_bounds(mat.start(), mat.end());
            if !is_word_bounded(doc.text, range) {
                continue;
            }
            let snippet = range.slice(doc.text);
            sink.push(
                Category::Style,
                Severity::Info,
                range,
                format!("Hedging phrase `{snippet}`."),
                Some(StyleFix::delete(with_trailing_space(doc.text, range))),
                Some(snippet.to_lowercase()),
            );
        }
    }

    pub(super) fn detect_filler_nouns(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        for token in &doc.tokens {
            if !self.filler_nouns.contains(&token.lemma) {
                continue;
            }
            sink.push(
                Category::Style,
                Severity::Info,
                token.range,
                format!("Vague noun `{}`; name the thing itself.", token.text),
                None,
                Some(token.lemma.clone()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::match_leading_case;
    use crate::config::AnalyzerConfig;
    use crate::range::TextRange;
    use crate::style::{Category, Severity, StyleAnalyzer, StyleIssue};

    fn style(text: &str) -> Vec<StyleIssue> {
        StyleAnalyzer::default()
            .analyze(text)
            .into_iter()
            .filter(|i| i.category == Category::Style)
            .collect()
    }

    fn keyed<'a>(issues: &'a [StyleIssue], key: &str) -> Vec<&'a StyleIssue> {
        issues
            .iter()
            .filter(|i| i.ignored_key.as_deref() == Some(key))
            .collect()
    }

    #[test]
    fn leading_case_is_preserved() {
        assert_eq!(match_leading_case("In order to", "to"), "To");
        assert_eq!(match_leading_case("in order to", "to"), "to");
    }

    #[test]
    fn intensifier_fix_removes_word_and_space() {
        let text = "It was very cold.";
        let issues = style(text);
        let very = keyed(&issues, "very");
        assert_eq!(very.len(), 1);
        assert_eq!(very[0].range, TextRange::new(7, 4));
        let fixed = very[0].fix.as_ref().unwrap().apply(text).unwrap();
        assert_eq!(fixed, "It was cold.");
    }

    #[test]
    fn wordy_phrase_gets_replacement() {
        let text = "In order to win, we practice.";
        let issues = style(text);
        let wordy = keyed(&issues, "in order to");
        assert_eq!(wordy.len(), 1);
        let fixed = wordy[0].fix.as_ref().unwrap().apply(text).unwrap();
        assert_eq!(fixed, "To win, we practice.");
    }

    #[test]
    fn intensifiers_match_by_lemma() {
        assert_eq!(keyed(&style("Very well. It was VERY cold."), "very").len(), 2);
        let cfg = AnalyzerConfig {
            weak_intensifiers: vec!["freaking".into()],
            ..AnalyzerConfig::default()
        };
        let issues = StyleAnalyzer::new(cfg).analyze("It was freaking cold and we freaked.");
        assert_eq!(keyed(&issues, "freak").len(), 2);
    }

    #[test]
    fn hedges_must_be_word_bounded() {
        assert_eq!(keyed(&style("Maybe we go."), "maybe").len(), 1);
        assert!(keyed(&style("The kind offer stood."), "kind of").is_empty());
        assert!(keyed(&style("Unmaybe is not a word."), "maybe").is_empty());
    }

    #[test]
    fn flags_expletive_opener() {
        let issues = style("There are three cats here.");
        assert_eq!(keyed(&issues, "expletive:there are").len(), 1);
        assert!(keyed(&style("Therefore we left."), "expletive:there is").is_empty());
    }

    #[test]
    fn long_sentence_is_a_warning() {
        let long = format!("{}.", vec!["word"; 45].join(" "));
        let issues = style(&long);
        let flagged = keyed(&issues, "long-sentence");
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].severity, Severity::Warning);

        let short = format!("{}.", vec!["word"; 10].join(" "));
        assert!(keyed(&style(&short), "long-sentence").is_empty());
    }

    #[test]
    fn third_repeated_opening_is_flagged() {
        let text = "Cats nap. Cats eat. Cats play. Dogs bark.";
        let issues = style(text);
        let starts = keyed(&issues, "start:cat");
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].range, TextRange::new(20, 4));
    }

    #[test]
    fn adverb_heavy_sentence_is_flagged() {
        let issues = style("He quickly and quietly and carefully and slowly left.");
        assert_eq!(keyed(&issues, "adverb-density").len(), 1);
        assert!(keyed(&style("He left the old house early."), "adverb-density").is_empty());
    }

    #[test]
    fn empty_tables_disable_matchers() {
        let cfg = AnalyzerConfig {
            hedges: Vec::new(),
            wordy_phrases: Vec::new(),
            ..AnalyzerConfig::default()
        };
        let issues = StyleAnalyzer::new(cfg).analyze("Maybe in order to go.");
        assert!(issues.iter().all(|i| i.ignored_key.as_deref() != Some("maybe")));
    }
}
