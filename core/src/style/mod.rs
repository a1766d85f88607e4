//! Prose style analyzer.
//!
//! [`StyleAnalyzer::analyze`] is a pure function of its input text: it builds a
//! tokenized [`Document`], runs each enabled rule engine over it, and returns
//! the issues sorted by position with ids assigned in that order.

mod punctuation;
mod redundancy;
mod semantics;
mod typography;
mod wording;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::AnalyzerConfig;
use crate::linguist::{BasicLinguist, Linguist, Token};
use crate::range::TextRange;

/// Issue category identifiers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Redundancy,
    Style,
    Punctuation,
    Typography,
    Semantics,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Redundancy,
        Category::Style,
        Category::Punctuation,
        Category::Typography,
        Category::Semantics,
    ];

    pub fn parse(name: &str) -> Option<Category> {
        match name.trim().to_lowercase().as_str() {
            "redundancy" | "repetition" => Some(Category::Redundancy),
            "style" => Some(Category::Style),
            "punctuation" => Some(Category::Punctuation),
            "typography" => Some(Category::Typography),
            "semantics" => Some(Category::Semantics),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Redundancy => "redundancy",
            Category::Style => "style",
            Category::Punctuation => "punctuation",
            Category::Typography => "typography",
            Category::Semantics => "semantics",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Info,
    Warning,
}

/// Suggested edit. `replacement: Some("")` deletes, `None` only flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFix {
    pub range: TextRange,
    pub replacement: Option<String>,
}

impl StyleFix {
    pub fn replace(range: TextRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: Some(replacement.into()),
        }
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }

    pub fn flag(range: TextRange) -> Self {
        Self {
            range,
            replacement: None,
        }
    }

    /// Text with the fix applied, or `None` for flag-only fixes and stale ranges.
    pub fn apply(&self, text: &str) -> Option<String> {
        let replacement = self.replacement.as_deref()?;
        let head = text.get(..self.range.offset)?;
        let tail = text.get(self.range.end()..)?;
        Some(format!("{head}{replacement}{tail}"))
    }

    /// Change in buffer length once applied.
    pub fn delta(&self) -> isize {
        self.replacement
            .as_ref()
            .map_or(0, |r| r.len() as isize - self.range.length as isize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleIssue {
    /// Opaque; stable within one analysis pass.
    pub id: usize,
    pub category: Category,
    pub severity: Severity,
    pub range: TextRange,
    pub message: String,
    pub fix: Option<StyleFix>,
    /// Shared identity for "ignore similar".
    pub ignored_key: Option<String>,
}

/// `text` with `fix` applied; unchanged when the fix only flags or is stale.
pub fn apply_fix(text: &str, fix: &StyleFix) -> String {
    fix.apply(text).unwrap_or_else(|| text.to_string())
}

/// Re-base the remaining issues after `applied` was written into the buffer.
/// Issues overlapping the edited range are dropped.
pub fn shift_issues(issues: &mut Vec<StyleIssue>, applied: &StyleFix) {
    let delta = applied.delta();
    let edited = applied.range;
    let shift = |range: &mut TextRange| {
        if range.offset >= edited.end() {
            range.offset = (range.offset as isize + delta).max(0) as usize;
        }
    };
    issues.retain(|issue| issue.range.end() <= edited.offset || issue.range.offset >= edited.end());
    for issue in issues.iter_mut() {
        shift(&mut issue.range);
        if let Some(fix) = issue.fix.as_mut() {
            shift(&mut fix.range);
        }
    }
}

/// Per-document summary, mirroring what hosts show in a status bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleReport {
    pub word_count: usize,
    pub issues: Vec<StyleIssue>,
    pub category_counts: BTreeMap<Category, usize>,
}

impl StyleReport {
    /// Issues per 100 words.
    pub fn density_per_100_words(&self) -> f32 {
        if self.word_count == 0 {
            return self.issues.len() as f32;
        }
        (self.issues.len() as f32) * 100.0 / (self.word_count as f32)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Warning)
    }
}

pub(crate) struct Sentence {
    pub range: TextRange,
    /// Indices into `Document::tokens`.
    pub tokens: Range<usize>,
}

/// Tokenized view of one text snapshot; lives for one pass.
pub(crate) struct Document<'a> {
    pub text: &'a str,
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
}

impl<'a> Document<'a> {
    fn new(text: &'a str, linguist: &dyn Linguist) -> Self {
        let tokens = linguist.tokens(text);
        let mut sentences = Vec::new();
        let mut cursor = 0usize;
        for range in linguist.sentences(text) {
            while cursor < tokens.len() && tokens[cursor].range.offset < range.offset {
                cursor += 1;
            }
            let start = cursor;
            while cursor < tokens.len() && tokens[cursor].range.offset < range.end() {
                cursor += 1;
            }
            sentences.push(Sentence {
                range,
                tokens: start..cursor,
            });
        }
        Self {
            text,
            tokens,
            sentences,
        }
    }

    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        &self.tokens[sentence.tokens.clone()]
    }

    pub fn word_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_word()).count()
    }
}

/// Collects issues from the rule engines.
#[derive(Default)]
pub(crate) struct IssueSink {
    issues: Vec<StyleIssue>,
}

impl IssueSink {
    pub fn push(
        &mut self,
        category: Category,
        severity: Severity,
        range: TextRange,
        message: String,
        fix: Option<StyleFix>,
        ignored_key: Option<String>,
    ) {
        self.issues.push(StyleIssue {
            id: 0,
            category,
            severity,
            range,
            message,
            fix,
            ignored_key,
        });
    }

    fn finish(mut self, ignored: &HashSet<String>) -> Vec<StyleIssue> {
        self.issues.retain(|issue| {
            issue
                .ignored_key
                .as_ref()
                .map_or(true, |key| !ignored.contains(&key.to_lowercase()))
        });
        self.issues
            .sort_by_key(|i| (i.range.offset, i.category, i.range.length));
        for (id, issue) in self.issues.iter_mut().enumerate() {
            issue.id = id;
        }
        self.issues
    }
}

/// Analyzer with its phrase tables compiled once.
pub struct StyleAnalyzer {
    config: AnalyzerConfig,
    linguist: Box<dyn Linguist>,
    stopwords: HashSet<String>,
    intensifiers: HashSet<String>,
    filler_nouns: HashSet<String>,
    vague_pronouns: HashSet<String>,
    hedge_matcher: Option<AhoCorasick>,
    wordy_matcher: Option<AhoCorasick>,
    ignored: HashSet<String>,
    disabled: HashSet<Category>,
}

fn lowercase_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|w| w.trim().to_lowercase()).collect()
}

/// Lemmas of single-word list entries, as `linguist` would tag them in text.
fn lemma_set(linguist: &dyn Linguist, words: &[String]) -> HashSet<String> {
    words
        .iter()
        .flat_map(|w| linguist.tokens(w.trim()))
        .filter(|t| t.is_word())
        .map(|t| t.lemma)
        .collect()
}

fn phrase_matcher<I, P>(phrases: I) -> Option<AhoCorasick>
where
    I: IntoIterator<Item = P>,
    P: AsRef<[u8]>,
{
    let phrases: Vec<P> = phrases.into_iter().collect();
    if phrases.is_empty() {
        return None;
    }
    Some(
        AhoCorasickBuilder::new()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostLongest)
            .build(phrases),
    )
}

impl StyleAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self::with_linguist(config, Box::new(BasicLinguist))
    }

    pub fn with_linguist(config: AnalyzerConfig, linguist: Box<dyn Linguist>) -> Self {
        let hedge_matcher = phrase_matcher(config.hedges.iter().map(|h| h.trim().to_string()));
        let wordy_matcher =
            phrase_matcher(config.wordy_phrases.iter().map(|w| w.phrase.trim().to_string()));
        let intensifiers = lemma_set(linguist.as_ref(), &config.weak_intensifiers);
        Self {
            stopwords: lowercase_set(&config.stopwords),
            intensifiers,
            filler_nouns: lowercase_set(&config.filler_nouns),
            vague_pronouns: lowercase_set(&config.vague_pronouns),
            ignored: lowercase_set(&config.ignored_keys),
            disabled: config.disabled_categories.iter().copied().collect(),
            hedge_matcher,
            wordy_matcher,
            linguist,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn analyze(&self, text: &str) -> Vec<StyleIssue> {
        let doc = Document::new(text, self.linguist.as_ref());
        self.run(&doc)
    }

    pub fn report(&self, text: &str) -> StyleReport {
        let doc = Document::new(text, self.linguist.as_ref());
        let issues = self.run(&doc);
        let mut category_counts = BTreeMap::new();
        for issue in &issues {
            *category_counts.entry(issue.category).or_default() += 1;
        }
        StyleReport {
            word_count: doc.word_count(),
            issues,
            category_counts,
        }
    }

    fn run(&self, doc: &Document<'_>) -> Vec<StyleIssue> {
        let mut sink = IssueSink::default();

        if self.enabled(Category::Redundancy) {
            self.detect_repeated_lemmas(doc, &mut sink);
            self.detect_repeated_ngrams(doc, &mut sink);
            self.detect_sentence_echo(doc, &mut sink);
        }
        if self.enabled(Category::Style) {
            self.detect_adverb_density(doc, &mut sink);
            self.detect_intensifiers(doc, &mut sink);
            self.detect_expletive_openers(doc, &mut sink);
            self.detect_wordy_phrases(doc, &mut sink);
            self.detect_repeated_starts(doc, &mut sink);
            self.detect_long_sentences(doc, &mut sink);
            self.detect_hedges(doc, &mut sink);
            self.detect_filler_nouns(doc, &mut sink);
        }
        if self.enabled(Category::Punctuation) {
            self.detect_spacing(doc, &mut sink);
            self.detect_punctuation_runs(doc, &mut sink);
            self.detect_lowercase_sentence_start(doc, &mut sink);
            self.detect_unmatched_delimiters(doc, &mut sink);
        }
        if self.enabled(Category::Typography) {
            self.detect_dashes(doc, &mut sink);
            self.detect_ellipses(doc, &mut sink);
        }
        if self.enabled(Category::Semantics) {
            self.detect_unclear_references(doc, &mut sink);
            self.detect_frequent_fillers(doc, &mut sink);
        }

        let issues = sink.finish(&self.ignored);
        trace!(
            tokens = doc.tokens.len(),
            sentences = doc.sentences.len(),
            issues = issues.len(),
            "style analysis pass"
        );
        issues
    }

    fn enabled(&self, category: Category) -> bool {
        !self.disabled.contains(&category)
    }

    pub(crate) fn is_stopword(&self, token: &Token) -> bool {
        self.stopwords.contains(&token.lemma) || self.stopwords.contains(&token.text.to_lowercase())
    }
}

impl Default for StyleAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

/// True when `range` in `text` is not glued to alphanumeric characters.
pub(crate) fn is_word_bounded(text: &str, range: TextRange) -> bool {
    let before = text
        .get(..range.offset)
        .and_then(|head| head.chars().next_back());
    let after = text.get(range.end()..).and_then(|tail| tail.chars().next());
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Extend `range` over the whitespace that follows it, so deleting the
/// phrase does not leave a double space behind.
pub(crate) fn with_trailing_space(text: &str, range: TextRange) -> TextRange {
    let tail = text.get(range.end()..).unwrap_or("");
    let spaces = tail.len() - tail.trim_start_matches([' ', '\t']).len();
    TextRange::new(range.offset, range.length + spaces)
}
