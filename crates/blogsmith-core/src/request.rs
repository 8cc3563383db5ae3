//! The parameters of a single blog generation.
//!
//! A `GenerationRequest` is built fresh from the form on every generate
//! action and dropped once the resulting text has been stored.

use serde::{Deserialize, Serialize};

pub const TEMPERATURE_MIN: f32 = 0.0;
pub const TEMPERATURE_MAX: f32 = 1.0;
pub const TEMPERATURE_STEP: f32 = 0.1;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const WORD_COUNT_MIN: u32 = 500;
pub const WORD_COUNT_MAX: u32 = 2000;
pub const WORD_COUNT_STEP: u32 = 100;
pub const DEFAULT_WORD_COUNT: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Inspirational,
    Funny,
    Persuasive,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Inspirational => "Inspirational",
            Tone::Funny => "Funny",
            Tone::Persuasive => "Persuasive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> Vec<Tone> {
        vec![
            Tone::Professional,
            Tone::Casual,
            Tone::Inspirational,
            Tone::Funny,
            Tone::Persuasive,
        ]
    }

    pub fn next(self) -> Self {
        cycle(&Self::all(), self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::all(), self, -1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
    German,
    Urdu,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Urdu => "Urdu",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> Vec<Language> {
        vec![
            Language::English,
            Language::Spanish,
            Language::French,
            Language::German,
            Language::Urdu,
        ]
    }

    pub fn next(self) -> Self {
        cycle(&Self::all(), self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::all(), self, -1)
    }
}

/// How heavily the post should use emojis. The lowercase value is
/// interpolated straight into the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmojiIntensity {
    #[default]
    Light,
    Moderate,
    Heavy,
}

impl EmojiIntensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmojiIntensity::Light => "light",
            EmojiIntensity::Moderate => "moderate",
            EmojiIntensity::Heavy => "heavy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn all() -> Vec<EmojiIntensity> {
        vec![
            EmojiIntensity::Light,
            EmojiIntensity::Moderate,
            EmojiIntensity::Heavy,
        ]
    }

    pub fn next(self) -> Self {
        cycle(&Self::all(), self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::all(), self, -1)
    }
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, step: isize) -> T {
    let len = options.len() as isize;
    let idx = options.iter().position(|o| *o == current).unwrap_or(0) as isize;
    options[(idx + step).rem_euclid(len) as usize]
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub temperature: f32,
    /// Value of the "Target Word Count" control. The prompt asks for
    /// twice this many words.
    pub target_word_count: u32,
    pub tone: Tone,
    pub language: Language,
    pub include_tldr: bool,
    pub emoji_intensity: EmojiIntensity,
}

impl GenerationRequest {
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            target_word_count: DEFAULT_WORD_COUNT,
            tone: Tone::default(),
            language: Language::default(),
            include_tldr: true,
            emoji_intensity: EmojiIntensity::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = clamp_temperature(temperature);
        self
    }

    pub fn with_word_count(mut self, words: u32) -> Self {
        self.target_word_count = words.max(1);
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_tldr(mut self, include_tldr: bool) -> Self {
        self.include_tldr = include_tldr;
        self
    }

    pub fn with_emoji(mut self, emoji_intensity: EmojiIntensity) -> Self {
        self.emoji_intensity = emoji_intensity;
        self
    }

    /// True when the topic is missing or whitespace only.
    pub fn has_blank_topic(&self) -> bool {
        self.topic.trim().is_empty()
    }
}

/// Clamp into [0.0, 1.0] and round to one decimal, the slider's resolution.
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        return DEFAULT_TEMPERATURE;
    }
    let clamped = value.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
    (clamped * 10.0).round() / 10.0
}

pub fn clamp_word_count(value: u32) -> u32 {
    let stepped = (value / WORD_COUNT_STEP) * WORD_COUNT_STEP;
    stepped.clamp(WORD_COUNT_MIN, WORD_COUNT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_parsing_is_case_insensitive() {
        assert_eq!(Tone::from_str("funny"), Some(Tone::Funny));
        assert_eq!(Language::from_str(" URDU "), Some(Language::Urdu));
        assert_eq!(EmojiIntensity::from_str("Heavy"), Some(EmojiIntensity::Heavy));
        assert_eq!(Tone::from_str("sarcastic"), None);
    }

    #[test]
    fn test_cycle_wraps_both_directions() {
        assert_eq!(Tone::Persuasive.next(), Tone::Professional);
        assert_eq!(Tone::Professional.prev(), Tone::Persuasive);
        assert_eq!(Language::English.next(), Language::Spanish);
        assert_eq!(EmojiIntensity::Light.prev(), EmojiIntensity::Heavy);
    }

    #[test]
    fn test_clamp_temperature() {
        assert_eq!(clamp_temperature(1.7), 1.0);
        assert_eq!(clamp_temperature(-0.2), 0.0);
        assert_eq!(clamp_temperature(0.74), 0.7);
        assert_eq!(clamp_temperature(f32::NAN), DEFAULT_TEMPERATURE);
    }

    #[test]
    fn test_clamp_word_count() {
        assert_eq!(clamp_word_count(120), WORD_COUNT_MIN);
        assert_eq!(clamp_word_count(1250), 1200);
        assert_eq!(clamp_word_count(9000), WORD_COUNT_MAX);
    }

    #[test]
    fn test_blank_topic() {
        assert!(GenerationRequest::new("   \t").has_blank_topic());
        assert!(!GenerationRequest::new("Rust").has_blank_topic());
    }

    #[test]
    fn test_emoji_serializes_lowercase() {
        let json = serde_json::to_string(&EmojiIntensity::Moderate).unwrap();
        assert_eq!(json, "\"moderate\"");
    }
}
