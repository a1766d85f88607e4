//! Word and sentence segmentation with lemma / part-of-speech tagging.
//!
//! The analyzer and the sentence-scoped focus talk to a [`Linguist`]; hosts with
//! a real NLP service plug it in there. [`BasicLinguist`] is the built-in
//! fallback: UAX #29 segmentation plus lexicon and suffix heuristics.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::range::TextRange;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PartOfSpeech {
    Noun,
    Pronoun,
    Verb,
    Adjective,
    Adverb,
    Determiner,
    Preposition,
    Conjunction,
    Number,
}

/// A word as seen by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    /// Lowercased canonical form.
    pub lemma: String,
    pub pos: Option<PartOfSpeech>,
    pub range: TextRange,
}

impl Token {
    pub fn is_word(&self) -> bool {
        self.text.chars().any(char::is_alphabetic)
    }

    pub fn is(&self, pos: PartOfSpeech) -> bool {
        self.pos == Some(pos)
    }
}

/// Tokenization and sentence segmentation service.
pub trait Linguist: Send + Sync {
    /// Word tokens in buffer order.
    fn tokens(&self, text: &str) -> Vec<Token>;

    /// Sentence ranges in buffer order, trimmed of surrounding whitespace.
    fn sentences(&self, text: &str) -> Vec<TextRange>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicLinguist;

impl Linguist for BasicLinguist {
    fn tokens(&self, text: &str) -> Vec<Token> {
        text.unicode_word_indices()
            .map(|(offset, word)| {
                let lower = word.to_lowercase();
                let lemma = lemmatize(&lower);
                let pos = tag(&lower, &lemma);
                Token {
                    text: word.to_string(),
                    lemma,
                    pos: Some(pos),
                    range: TextRange::new(offset, word.len()),
                }
            })
            .collect()
    }

    fn sentences(&self, text: &str) -> Vec<TextRange> {
        text.split_sentence_bound_indices()
            .filter_map(|(offset, sentence)| {
                let leading = sentence.len() - sentence.trim_start().len();
                let trimmed = sentence.trim();
                if trimmed.is_empty() {
                    return None;
                }
                Some(TextRange::new(offset + leading, trimmed.len()))
            })
            .collect()
    }
}

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("being", "be"),
        ("has", "have"),
        ("had", "have"),
        ("having", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("went", "go"),
        ("gone", "go"),
        ("goes", "go"),
        ("said", "say"),
        ("made", "make"),
        ("making", "make"),
        ("sat", "sit"),
        ("ate", "eat"),
        ("eaten", "eat"),
        ("ran", "run"),
        ("saw", "see"),
        ("seen", "see"),
        ("took", "take"),
        ("taken", "take"),
        ("taking", "take"),
        ("got", "get"),
        ("gotten", "get"),
        ("knew", "know"),
        ("known", "know"),
        ("thought", "think"),
        ("came", "come"),
        ("coming", "come"),
        ("gave", "give"),
        ("given", "give"),
        ("found", "find"),
        ("told", "tell"),
        ("felt", "feel"),
        ("left", "leave"),
        ("kept", "keep"),
        ("began", "begin"),
        ("begun", "begin"),
        ("wrote", "write"),
        ("written", "write"),
        ("writing", "write"),
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("people", "person"),
        ("mice", "mouse"),
        ("feet", "foot"),
        ("better", "good"),
        ("best", "good"),
        ("worse", "bad"),
        ("worst", "bad"),
    ]
    .into_iter()
    .collect()
});

/// Lowercased canonical form: irregular table first, then suffix stripping.
pub fn lemmatize(lower: &str) -> String {
    if let Some(base) = IRREGULAR.get(lower) {
        return (*base).to_string();
    }
    if lower.chars().count() <= 3 || !lower.chars().all(char::is_alphabetic) {
        return lower.to_string();
    }
    if let Some(stem) = lower.strip_suffix("ies") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = lower.strip_suffix("ied") {
        if stem.len() >= 2 {
            return format!("{stem}y");
        }
    }
    if let Some(stem) = lower.strip_suffix("ing") {
        if stem.len() >= 3 {
            return undouble(stem);
        }
    }
    if let Some(stem) = lower.strip_suffix("ed") {
        if stem.len() >= 3 {
            return undouble(stem);
        }
    }
    for suffix in ["sses", "ches", "shes", "xes"] {
        if lower.ends_with(suffix) {
            return lower[..lower.len() - 2].to_string();
        }
    }
    if lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && !lower.ends_with("is")
    {
        return lower[..lower.len() - 1].to_string();
    }
    lower.to_string()
}

/// Drops a doubled final ASCII consonant ("stopp" -> "stop").
fn undouble(stem: &str) -> String {
    let mut tail = stem.chars().rev();
    if let (Some(last), Some(prev)) = (tail.next(), tail.next()) {
        if last == prev && last.is_ascii_alphabetic() && !"aeioulsz".contains(last) {
            return stem[..stem.len() - 1].to_string();
        }
    }
    stem.to_string()
}

fn word_set(words: &'static [&'static str]) -> HashSet<&'static str> {
    words.iter().copied().collect()
}

static DETERMINERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "a", "an", "the", "these", "those", "every", "each", "either", "neither", "some", "any",
        "no", "all", "both", "many", "much", "few", "several", "another", "such",
    ])
});

static PRONOUNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "you", "your", "yours",
        "he", "him", "his", "she", "her", "hers", "it", "its", "itself", "they", "them",
        "their", "theirs", "this", "that", "there", "who", "whom", "whose", "which", "what",
        "something", "anything", "nothing", "everything", "someone", "anyone", "everyone",
    ])
});

static PREPOSITIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "of", "in", "on", "at", "to", "from", "by", "with", "about", "into", "onto", "over",
        "under", "after", "before", "between", "through", "during", "without", "within",
        "against", "among", "around", "behind", "beyond", "for", "toward", "towards", "upon",
        "across", "along",
    ])
});

static CONJUNCTIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "and", "or", "but", "nor", "yet", "so", "because", "although", "though", "while",
        "if", "unless", "whereas", "since", "than", "as",
    ])
});

static VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "be", "have", "do", "go", "say", "make", "sit", "run", "see", "take", "get", "know",
        "think", "come", "give", "find", "tell", "feel", "leave", "keep", "begin", "write",
        "can", "could", "will", "would", "shall", "should", "may", "might", "must", "seem",
        "appear", "become", "want", "need", "use", "work", "try", "ask", "call", "look",
        "help", "show", "hear", "play", "move", "live", "believe", "hold", "bring", "happen",
        "let", "put", "mean", "ship", "build", "read", "set", "eat",
    ])
});

static ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "very", "quite", "rather", "too", "so", "just", "almost", "always", "never", "often",
        "sometimes", "soon", "still", "already", "again", "also", "even", "here", "now",
        "then", "perhaps", "maybe", "somewhat", "well", "fast", "hard", "later", "once",
        "together", "yesterday", "today", "tomorrow", "not", "anyway", "instead", "indeed",
    ])
});

/// `-ly` words that are not adverbs.
static LY_NOT_ADVERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "family", "supply", "apply", "reply", "ally", "rally", "belly", "jelly", "bully",
        "italy", "july", "assembly", "anomaly", "friendly", "lovely", "lonely", "silly",
        "ugly", "holy", "likely", "elderly", "costly", "early", "only", "fly", "lily",
    ])
});

static ADJECTIVES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    word_set(&[
        "good", "bad", "new", "old", "big", "small", "great", "little", "long", "short",
        "high", "low", "large", "young", "important", "different", "same", "easy", "hard",
        "clear", "nice", "true", "false", "real", "best", "better", "right", "wrong", "sure",
        "free", "full", "simple", "strong", "whole", "certain", "possible", "likely", "early",
        "late", "happy", "sad", "friendly", "lovely", "fine", "interesting", "obvious",
        "unclear", "vague", "common", "available", "ready", "hot", "cold", "red", "blue",
        "green", "black", "white",
    ])
});

fn tag(lower: &str, lemma: &str) -> PartOfSpeech {
    if lower.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return PartOfSpeech::Number;
    }
    if DETERMINERS.contains(lower) {
        return PartOfSpeech::Determiner;
    }
    if PRONOUNS.contains(lower) {
        return PartOfSpeech::Pronoun;
    }
    if PREPOSITIONS.contains(lower) {
        return PartOfSpeech::Preposition;
    }
    if CONJUNCTIONS.contains(lower) {
        return PartOfSpeech::Conjunction;
    }
    if VERBS.contains(lemma) || VERBS.contains(lower) {
        return PartOfSpeech::Verb;
    }
    if ADVERBS.contains(lower)
        || (lower.len() > 4 && lower.ends_with("ly") && !LY_NOT_ADVERBS.contains(lower))
    {
        return PartOfSpeech::Adverb;
    }
    if ADJECTIVES.contains(lower) || ADJECTIVES.contains(lemma) {
        return PartOfSpeech::Adjective;
    }
    if ["ful", "ous", "ive", "able", "ible", "less"]
        .iter()
        .any(|suffix| lower.len() > suffix.len() + 2 && lower.ends_with(suffix))
    {
        return PartOfSpeech::Adjective;
    }
    if lower.len() > 4 && (lower.ends_with("ing") || lower.ends_with("ed")) {
        return PartOfSpeech::Verb;
    }
    PartOfSpeech::Noun
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lemmatizes_common_forms() {
        assert_eq!(lemmatize("running"), "run");
        assert_eq!(lemmatize("cats"), "cat");
        assert_eq!(lemmatize("stories"), "story");
        assert_eq!(lemmatize("was"), "be");
        assert_eq!(lemmatize("sat"), "sit");
        assert_eq!(lemmatize("this"), "this");
        assert_eq!(lemmatize("glass"), "glass");
        assert_eq!(lemmatize("boxes"), "box");
    }

    #[test]
    fn lemmatizes_non_ascii_stems_without_splitting_chars() {
        assert_eq!(lemmatize("\u{924}ing"), "\u{924}");
        assert_eq!(lemmatize("\u{924}\u{924}ed"), "\u{924}\u{924}");
        assert_eq!(lemmatize("stopped"), "stop");
    }

    #[test]
    fn tags_parts_of_speech() {
        let tokens = BasicLinguist.tokens("The cat quickly ate 3 big apples.");
        let pos: Vec<_> = tokens.iter().map(|t| t.pos.unwrap()).collect();
        assert_eq!(
            pos,
            vec![
                PartOfSpeech::Determiner,
                PartOfSpeech::Noun,
                PartOfSpeech::Adverb,
                PartOfSpeech::Verb,
                PartOfSpeech::Number,
                PartOfSpeech::Adjective,
                PartOfSpeech::Noun,
            ]
        );
        assert_eq!(tokens[6].lemma, "apple");
        assert_eq!(tokens[6].range, TextRange::new(26, 6));
    }

    #[test]
    fn sentences_are_trimmed() {
        let text = "One here.  Two there!\nThree";
        let sentences = BasicLinguist.sentences(text);
        let slices: Vec<_> = sentences.iter().map(|r| r.slice(text)).collect();
        assert_eq!(slices, vec!["One here.", "Two there!", "Three"]);
    }
}
