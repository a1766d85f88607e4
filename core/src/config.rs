//! Configuration value objects.
//!
//! Every struct is a plain immutable value: hosts build one (usually from YAML),
//! hand it to an engine, and replace it wholesale when settings change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::style::Category;

/// 8-bit RGBA color, serialized as `#rrggbb` / `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |idx: usize| u8::from_str_radix(hex.get(idx..idx + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Linear blend toward `other`; `t = 0` keeps `self`.
    pub fn lerp(self, other: Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color `{value}`"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TypewriterMode {
    #[default]
    Normal,
    Typewriter,
}

/// Unit of text treated as "active" around the caret.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HighlightScope {
    #[default]
    Line,
    Sentence,
    Paragraph,
}

/// Heading size ladder: six levels, or the compact four-level variant.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HeadingScale {
    #[default]
    Full,
    Compact,
}

impl HeadingScale {
    pub fn max_level(self) -> u8 {
        match self {
            HeadingScale::Full => 6,
            HeadingScale::Compact => 4,
        }
    }

    /// Font size multiplier; monotonically decreasing with the level.
    pub fn multiplier(self, level: u8) -> f32 {
        const FULL: [f32; 6] = [1.8, 1.55, 1.35, 1.2, 1.1, 1.0];
        const COMPACT: [f32; 4] = [1.6, 1.35, 1.15, 1.0];
        let level = level.clamp(1, self.max_level()) as usize;
        match self {
            HeadingScale::Full => FULL[level - 1],
            HeadingScale::Compact => COMPACT[level - 1],
        }
    }
}

/// Per-pass style settings for the highlighter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub font_family: String,
    pub code_font_family: String,
    pub font_size: f32,
    /// Overrides the theme's text color.
    pub text_color: Option<Color>,
    /// Overrides the theme's background color.
    pub background_color: Option<Color>,
    pub theme: Theme,
    pub line_spacing: f32,
    pub typewriter: TypewriterMode,
    pub scope: HighlightScope,
    pub mark_current_line: bool,
    pub fixed_scroll: bool,
    pub heading_scale: HeadingScale,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Iowan Old Style".into(),
            code_font_family: "Menlo".into(),
            font_size: 16.0,
            text_color: None,
            background_color: None,
            theme: Theme::Light,
            line_spacing: 1.4,
            typewriter: TypewriterMode::Normal,
            scope: HighlightScope::Line,
            mark_current_line: false,
            fixed_scroll: false,
            heading_scale: HeadingScale::Full,
        }
    }
}

impl StyleConfig {
    pub fn is_typewriter(&self) -> bool {
        self.typewriter == TypewriterMode::Typewriter
    }
}

/// Concrete colors for one pass, resolved from the theme and overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub background: Color,
    pub token: Color,
    pub faded: Color,
    pub current_line: Color,
    pub mark: Color,
    pub comment: Color,
    pub annotation: Color,
    pub link: Color,
    pub quote: Color,
    pub code: Color,
    pub code_background: Color,
}

impl Palette {
    pub fn resolve(config: &StyleConfig) -> Self {
        let (text, background) = match config.theme {
            Theme::Light => (Color::rgb(0x2b, 0x2b, 0x2b), Color::rgb(0xfd, 0xfc, 0xf9)),
            Theme::Dark => (Color::rgb(0xe4, 0xe2, 0xdc), Color::rgb(0x1e, 0x1f, 0x22)),
        };
        let text = config.text_color.unwrap_or(text);
        let background = config.background_color.unwrap_or(background);
        let base = Self {
            text,
            background,
            token: text.lerp(background, 0.55),
            faded: text.lerp(background, 0.7),
            current_line: text.lerp(background, 0.94),
            mark: Color::rgb(0xff, 0xe8, 0x8c),
            comment: Color::rgb(0x6f, 0x8f, 0x6a),
            annotation: Color::rgb(0x94, 0x5c, 0xb8),
            link: Color::rgb(0x2f, 0x6f, 0xc4),
            quote: text.lerp(background, 0.35),
            code: Color::rgb(0xb0, 0x4a, 0x3a),
            code_background: text.lerp(background, 0.92),
        };
        match config.theme {
            Theme::Light => base,
            Theme::Dark => Self {
                mark: Color::rgb(0x6b, 0x5a, 0x16),
                comment: Color::rgb(0x8f, 0xb5, 0x88),
                annotation: Color::rgb(0xc3, 0x95, 0xe6),
                link: Color::rgb(0x7d, 0xae, 0xf2),
                code: Color::rgb(0xe6, 0x8a, 0x74),
                ..base
            },
        }
    }
}

/// Indentation used by list continuation and Tab / Shift-Tab.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ListConfig {
    pub indent_width: usize,
    pub use_tabs: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            use_tabs: false,
        }
    }
}

impl ListConfig {
    /// Text inserted for one indent level.
    pub fn unit(&self) -> String {
        if self.use_tabs {
            "\t".into()
        } else {
            " ".repeat(self.indent_width.max(1))
        }
    }

    pub fn tab_width(&self) -> usize {
        self.indent_width.max(1)
    }
}

/// Wordy phrase with its suggested replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordyPhrase {
    pub phrase: String,
    pub replacement: String,
}

impl WordyPhrase {
    fn new(phrase: &str, replacement: &str) -> Self {
        Self {
            phrase: phrase.into(),
            replacement: replacement.into(),
        }
    }
}

/// Thresholds and phrase tables for the prose style analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub repetition_window: usize,
    pub ngram_size: usize,
    pub ngram_sentence_distance: usize,
    pub echo_min_jaccard: f32,
    pub echo_min_overlap: usize,
    pub adverb_limit: usize,
    pub adverb_ratio: f32,
    pub repeated_start_run: usize,
    pub long_sentence_words: usize,
    pub vague_reference_chars: usize,
    pub filler_noun_limit: usize,
    pub stopwords: Vec<String>,
    pub weak_intensifiers: Vec<String>,
    pub hedges: Vec<String>,
    pub expletives: Vec<String>,
    pub wordy_phrases: Vec<WordyPhrase>,
    pub filler_nouns: Vec<String>,
    pub vague_pronouns: Vec<String>,
    /// Issues whose `ignored_key` matches one of these are dropped.
    pub ignored_keys: Vec<String>,
    pub disabled_categories: Vec<Category>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            repetition_window: 35,
            ngram_size: 3,
            ngram_sentence_distance: 4,
            echo_min_jaccard: 0.5,
            echo_min_overlap: 4,
            adverb_limit: 4,
            adverb_ratio: 0.28,
            repeated_start_run: 3,
            long_sentence_words: 40,
            vague_reference_chars: 120,
            filler_noun_limit: 3,
            stopwords: [
                "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "for", "of", "in",
                "on", "at", "to", "from", "by", "with", "about", "as", "into", "onto", "over",
                "under", "than", "then", "that", "this", "these", "those", "there", "here",
                "it", "its", "i", "me", "my", "mine", "we", "us", "our", "you", "your", "he",
                "him", "his", "she", "her", "they", "them", "their", "who", "whom", "which",
                "what", "when", "where", "why", "how", "be", "is", "am", "are", "was", "were",
                "been", "being", "have", "has", "had", "do", "does", "did", "not", "no", "if",
                "all", "any", "some", "each", "up", "out", "off", "can", "could", "will",
                "would", "shall", "should", "may", "might", "must", "just", "also", "very",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            weak_intensifiers: vec![
                "very".into(),
                "really".into(),
                "quite".into(),
                "rather".into(),
                "extremely".into(),
                "totally".into(),
                "absolutely".into(),
                "literally".into(),
                "actually".into(),
                "basically".into(),
                "truly".into(),
                "incredibly".into(),
            ],
            hedges: vec![
                "i think".into(),
                "i believe".into(),
                "i feel like".into(),
                "i guess".into(),
                "sort of".into(),
                "kind of".into(),
                "in my opinion".into(),
                "it seems to me".into(),
                "perhaps".into(),
                "maybe".into(),
                "somewhat".into(),
                "arguably".into(),
                "to some extent".into(),
                "more or less".into(),
            ],
            expletives: vec![
                "there is".into(),
                "there are".into(),
                "there was".into(),
                "there were".into(),
                "there will be".into(),
                "it is".into(),
                "it was".into(),
                "it seems".into(),
                "it appears".into(),
            ],
            wordy_phrases: vec![
                WordyPhrase::new("in order to", "to"),
                WordyPhrase::new("due to the fact that", "because"),
                WordyPhrase::new("owing to the fact that", "because"),
                WordyPhrase::new("in spite of the fact that", "although"),
                WordyPhrase::new("at this point in time", "now"),
                WordyPhrase::new("at the present time", "now"),
                WordyPhrase::new("in the event that", "if"),
                WordyPhrase::new("a large number of", "many"),
                WordyPhrase::new("the majority of", "most"),
                WordyPhrase::new("has the ability to", "can"),
                WordyPhrase::new("is able to", "can"),
                WordyPhrase::new("for the purpose of", "for"),
                WordyPhrase::new("with regard to", "about"),
                WordyPhrase::new("in the near future", "soon"),
                WordyPhrase::new("prior to", "before"),
                WordyPhrase::new("make a decision", "decide"),
                WordyPhrase::new("in close proximity to", "near"),
                WordyPhrase::new("each and every", "each"),
                WordyPhrase::new("first and foremost", "first"),
                WordyPhrase::new("until such time as", "until"),
            ],
            filler_nouns: vec![
                "thing".into(),
                "stuff".into(),
                "aspect".into(),
                "factor".into(),
            ],
            vague_pronouns: vec!["this".into(), "that".into(), "it".into(), "there".into()],
            ignored_keys: Vec::new(),
            disabled_categories: Vec::new(),
        }
    }
}

/// Top-level configuration document, as loaded from `penwise.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub style: StyleConfig,
    pub lists: ListConfig,
    pub analyzer: AnalyzerConfig,
}

impl Config {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_yaml_over_defaults() {
        let cfg = Config::from_yaml_str(
            "style:\n  theme: dark\n  typewriter: typewriter\n  scope: sentence\n  text_color: '#ffffff'\nanalyzer:\n  long_sentence_words: 25\n  disabled_categories: [typography]\n",
        )
        .unwrap();
        assert_eq!(cfg.style.theme, Theme::Dark);
        assert_eq!(cfg.style.scope, HighlightScope::Sentence);
        assert!(cfg.style.is_typewriter());
        assert_eq!(cfg.style.text_color, Some(Color::rgb(255, 255, 255)));
        assert_eq!(cfg.analyzer.long_sentence_words, 25);
        assert_eq!(cfg.analyzer.repetition_window, 35);
        assert_eq!(cfg.analyzer.disabled_categories, vec![Category::Typography]);
        assert_eq!(cfg.lists.indent_width, 4);
    }

    #[test]
    fn rejects_bad_color() {
        assert!(Config::from_yaml_str("style:\n  text_color: 'nope'\n").is_err());
    }

    #[test]
    fn heading_scale_decreases_and_clamps() {
        let full = HeadingScale::Full;
        for level in 1..6 {
            assert!(full.multiplier(level) > full.multiplier(level + 1));
        }
        assert_eq!(full.multiplier(9), full.multiplier(6));
        assert_eq!(HeadingScale::Compact.multiplier(6), HeadingScale::Compact.multiplier(4));
        assert_eq!(full.multiplier(0), full.multiplier(1));
    }

    #[test]
    fn palette_respects_overrides() {
        let cfg = StyleConfig {
            background_color: Some(Color::rgb(0, 0, 0)),
            ..StyleConfig::default()
        };
        let palette = Palette::resolve(&cfg);
        assert_eq!(palette.background, Color::rgb(0, 0, 0));
        assert_ne!(palette.faded, palette.text);
    }
}
