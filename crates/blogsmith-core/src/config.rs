use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ai::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::request::{
    clamp_temperature, clamp_word_count, EmojiIntensity, Language, Tone, DEFAULT_TEMPERATURE,
    DEFAULT_WORD_COUNT,
};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    Config,
}

impl ApiKeySource {
    pub fn description(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => "environment variable",
            ApiKeySource::Config => "config file",
        }
    }
}

/// Initial values of the form controls.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FormDefaults {
    pub temperature: f32,
    pub word_count: u32,
    pub tone: Tone,
    pub language: Language,
    pub include_tldr: bool,
    pub emoji: EmojiIntensity,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            word_count: DEFAULT_WORD_COUNT,
            tone: Tone::default(),
            language: Language::default(),
            include_tldr: true,
            emoji: EmojiIntensity::default(),
        }
    }
}

impl FormDefaults {
    /// Pull hand-edited values back into the ranges the form allows.
    pub fn normalized(mut self) -> Self {
        self.temperature = clamp_temperature(self.temperature);
        self.word_count = clamp_word_count(self.word_count);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub defaults: FormDefaults,
}

impl Config {
    pub fn new() -> Self {
        Self {
            gemini_api_key: None,
            model: None,
            base_url: None,
            output_dir: None,
            defaults: FormDefaults::default(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_reset() -> Result<Self> {
        Ok(Self::load_or_reset_from(&Self::get_config_path()?))
    }

    /// Load for commands that rewrite the file anyway: an unreadable
    /// config is logged and replaced with defaults instead of failing.
    pub fn load_or_reset_from(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            tracing::warn!("{e:#}; starting from a fresh config");
            Self::new()
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Environment first, then the config file. Blank values count as unset.
    pub fn resolve_api_key(&self) -> Option<(String, ApiKeySource)> {
        if let Some(env_key) = load_env_api_key() {
            return Some((env_key, ApiKeySource::Environment));
        }

        self.gemini_api_key
            .as_ref()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(|k| (k.to_string(), ApiKeySource::Config))
    }

    pub fn set_api_key(&mut self, api_key: &str) -> Result<()> {
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            bail!("Cannot store an empty API key");
        }
        self.gemini_api_key = Some(trimmed.to_string());
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("blogsmith").join("config.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn load_env_api_key() -> Option<String> {
    match std::env::var(API_KEY_ENV) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Tests that touch GEMINI_API_KEY share the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env_key<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let previous = std::env::var(API_KEY_ENV).ok();
        match value {
            Some(v) => std::env::set_var(API_KEY_ENV, v),
            None => std::env::remove_var(API_KEY_ENV),
        }
        let result = f();
        match previous {
            Some(v) => std::env::set_var(API_KEY_ENV, v),
            None => std::env::remove_var(API_KEY_ENV),
        }
        result
    }

    fn config_with_key(key: &str) -> Config {
        Config {
            gemini_api_key: Some(key.to_string()),
            ..Config::new()
        }
    }

    #[test]
    fn test_env_key_wins_over_config() {
        let resolved = with_env_key(Some(" env-key "), || {
            config_with_key("stored-key").resolve_api_key()
        });
        assert_eq!(
            resolved,
            Some(("env-key".to_string(), ApiKeySource::Environment))
        );
    }

    #[test]
    fn test_blank_env_key_falls_back_to_config() {
        let resolved = with_env_key(Some("   "), || {
            config_with_key(" stored-key ").resolve_api_key()
        });
        assert_eq!(
            resolved,
            Some(("stored-key".to_string(), ApiKeySource::Config))
        );
    }

    #[test]
    fn test_blank_config_key_without_env_is_none() {
        let resolved = with_env_key(None, || config_with_key("  ").resolve_api_key());
        assert_eq!(resolved, None);

        let resolved = with_env_key(None, || Config::new().resolve_api_key());
        assert_eq!(resolved, None);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.output_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.set_api_key("  abc123 ").unwrap();
        config.model = Some("gemini-1.5-pro".to_string());
        config.defaults.tone = Tone::Funny;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gemini_api_key.as_deref(), Some("abc123"));
        assert_eq!(loaded.model(), "gemini-1.5-pro");
        assert_eq!(loaded.defaults.tone, Tone::Funny);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"defaults": {"emoji": "heavy"}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.gemini_api_key, None);
        assert_eq!(config.defaults.emoji, EmojiIntensity::Heavy);
        assert_eq!(config.defaults.word_count, DEFAULT_WORD_COUNT);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_invalid_file_can_be_reset() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ broken").unwrap();

        let mut config = Config::load_or_reset_from(&path);
        assert_eq!(config, Config::new());

        config.set_api_key("fresh").unwrap();
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.gemini_api_key.as_deref(), Some("fresh"));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = Config::new();
        assert!(config.set_api_key("   ").is_err());
        assert_eq!(config.gemini_api_key, None);
    }

    #[test]
    fn test_defaults_normalized() {
        let defaults = FormDefaults {
            temperature: 3.0,
            word_count: 40,
            ..FormDefaults::default()
        }
        .normalized();
        assert_eq!(defaults.temperature, 1.0);
        assert_eq!(defaults.word_count, 500);
    }
}
