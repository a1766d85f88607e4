//! Repeated words, repeated phrases and echoing sentences.

use std::collections::{HashMap, HashSet};

use super::{Category, Document, IssueSink, Severity, StyleAnalyzer};
use crate::linguist::{PartOfSpeech, Token};
use crate::range::TextRange;

impl StyleAnalyzer {
    fn is_content_lemma(&self, token: &Token) -> bool {
        token.is_word()
            && !token.is(PartOfSpeech::Number)
            && token.lemma.chars().count() >= 3
            && !self.is_stopword(token)
    }

    /// Same lemma seen again within the lookback window.
    pub(super) fn detect_repeated_lemmas(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let window = self.config.repetition_window;
        if window == 0 {
            return;
        }
        let mut last_seen: HashMap<&str, usize> = HashMap::new();
        for (idx, token) in doc.tokens.iter().enumerate() {
            if !self.is_content_lemma(token) {
                continue;
            }
            if let Some(prev) = last_seen.insert(token.lemma.as_str(), idx) {
                let distance = idx - prev;
                if distance <= window {
                    sink.push(
                        Category::Redundancy,
                        Severity::Info,
                        token.range,
                        format!(
                            "Repeated word `{}` within {} words.",
                            token.text, distance
                        ),
                        None,
                        Some(token.lemma.clone()),
                    );
                }
            }
        }
    }

    /// The same run of lemmas recurring a few sentences later.
    pub(super) fn detect_repeated_ngrams(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let size = self.config.ngram_size;
        if size < 2 {
            return;
        }
        let max_distance = self.config.ngram_sentence_distance;
        // key -> (sentence index, token index one past the window)
        let mut seen: HashMap<Vec<&str>, (usize, usize)> = HashMap::new();

        for (sentence_idx, sentence) in doc.sentences.iter().enumerate() {
            let words: Vec<(usize, &Token)> = sentence
                .tokens
                .clone()
                .map(|idx| (idx, &doc.tokens[idx]))
                .filter(|(_, token)| token.is_word())
                .collect();
            if words.len() < size {
                continue;
            }
            let mut flagged_until = 0usize;
            for window in words.windows(size) {
                if window.iter().all(|(_, token)| self.is_stopword(token)) {
                    continue;
                }
                let key: Vec<&str> = window.iter().map(|(_, t)| t.lemma.as_str()).collect();
                let first_idx = window[0].0;
                let last_idx = window[size - 1].0;
                let previous = seen.insert(key.clone(), (sentence_idx, last_idx + 1));
                let Some((prev_sentence, prev_end)) = previous else {
                    continue;
                };
                if sentence_idx - prev_sentence > max_distance || first_idx < prev_end {
                    continue;
                }
                if first_idx < flagged_until {
                    continue;
                }
                flagged_until = last_idx + 1;
                let range = TextRange::from_bounds(
                    window[0].1.range.offset,
                    window[size - 1].1.range.end(),
                );
                sink.push(
                    Category::Redundancy,
                    Severity::Info,
                    range,
                    format!("Repeated phrase `{}`.", range.slice(doc.text)),
                    None,
                    Some(format!("phrase:{}", key.join(" "))),
                );
            }
        }
    }

    /// Adjacent sentences built from mostly the same content words.
    pub(super) fn detect_sentence_echo(&self, doc: &Document<'_>, sink: &mut IssueSink) {
        let lemma_sets: Vec<HashSet<&str>> = doc
            .sentences
            .iter()
            .map(|sentence| {
                doc.sentence_tokens(sentence)
                    .iter()
                    .filter(|token| token.is_word() && !self.is_stopword(token))
                    .map(|token| token.lemma.as_str())
                    .collect()
            })
            .collect();

        for idx in 1..lemma_sets.len() {
            let (prev, current) = (&lemma_sets[idx - 1], &lemma_sets[idx]);
            let overlap = prev.intersection(current).count();
            if overlap < self.config.echo_min_overlap {
                continue;
            }
            let union = prev.union(current).count();
            let jaccard = overlap as f32 / union.max(1) as f32;
            if jaccard >= self.config.echo_min_jaccard {
                sink.push(
                    Category::Redundancy,
                    Severity::Info,
                    doc.sentences[idx].range,
                    format!(
                        "Sentence echoes the previous one ({overlap} shared words)."
                    ),
                    None,
                    Some("sentence-echo".into()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::style::{Category, StyleAnalyzer, StyleIssue};

    fn redundancy(text: &str) -> Vec<StyleIssue> {
        StyleAnalyzer::default()
            .analyze(text)
            .into_iter()
            .filter(|i| i.category == Category::Redundancy)
            .collect()
    }

    #[test]
    fn flags_repeated_lemma_in_second_sentence() {
        let text = "The cat sat. The cat sat.";
        let issues = redundancy(text);
        assert!(issues
            .iter()
            .any(|i| i.range.offset >= 13 && i.ignored_key.as_deref() == Some("cat")));
        assert!(issues.iter().all(|i| i.range.offset >= 13));
    }

    #[test]
    fn lemmas_match_across_inflections() {
        let issues = redundancy("She runs home. Running helps.");
        assert!(issues
            .iter()
            .any(|i| i.ignored_key.as_deref() == Some("run")));
    }

    #[test]
    fn stopwords_and_short_words_are_ignored() {
        assert!(redundancy("It is what it is. We go to go.").is_empty());
    }

    #[test]
    fn distant_repeats_are_not_flagged() {
        let filler = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november oscar papa quebec romeo sierra tango uniform victor whiskey xray yankee zulu north south east west river ocean mountain valley forest meadow";
        let text = format!("Garden {filler} garden.");
        assert!(redundancy(&text)
            .iter()
            .all(|i| i.ignored_key.as_deref() != Some("garden")));
    }

    #[test]
    fn flags_repeated_phrase_once() {
        let text = "We shipped the new build today. Then we shipped the new build again.";
        let phrases: Vec<_> = redundancy(text)
            .into_iter()
            .filter(|i| {
                i.ignored_key
                    .as_deref()
                    .is_some_and(|k| k.starts_with("phrase:"))
            })
            .collect();
        assert_eq!(phrases.len(), 1);
        assert!(phrases[0].range.offset > 32);
    }

    #[test]
    fn flags_echoing_sentence() {
        let text = "Quarterly revenue growth exceeded analyst expectations. Analyst expectations for quarterly revenue growth were exceeded.";
        let echo: Vec<_> = redundancy(text)
            .into_iter()
            .filter(|i| i.ignored_key.as_deref() == Some("sentence-echo"))
            .collect();
        assert_eq!(echo.len(), 1);
        assert_eq!(echo[0].range.offset, 56);
    }
}
