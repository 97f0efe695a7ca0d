//! # Postsmith Models
//!
//! Centralized model and run configuration types, shared by the crew
//! definitions, the orchestrator, and the server.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model used for every agent. The fast/cheap tier is deliberate; the
/// pipeline makes three calls per run.
pub const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

/// Topic pre-filled in the UI form.
pub const DEFAULT_TOPIC: &str = "AI Agents in UX Design";

/// Settings shared by every agent in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Anthropic model name
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion cap per stage
    pub max_tokens: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

impl ModelConfig {
    /// Create a config for a specific model, keeping the default sampling
    /// settings.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Target language of the generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Hebrew,
    English,
}

impl Language {
    pub fn all() -> Vec<Language> {
        vec![Language::Hebrew, Language::English]
    }
}

impl fmt::Display for Language {
    /// English name of the language, as substituted into agent goals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Language::Hebrew => "Hebrew",
            Language::English => "English",
        };
        f.write_str(name)
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hebrew" | "he" => Ok(Language::Hebrew),
            "english" | "en" => Ok(Language::English),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

/// Per-invocation parameters, substituted into agent goals and task
/// descriptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    pub topic: String,
    pub language: Language,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            topic: DEFAULT_TOPIC.to_string(),
            language: Language::default(),
        }
    }
}

impl RunParams {
    pub fn new(topic: impl Into<String>, language: Language) -> Self {
        Self {
            topic: topic.into(),
            language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert!(config.model.contains("haiku"));
        assert_eq!(config.temperature, 0.7);
    }

    #[test]
    fn test_config_builders() {
        let config = ModelConfig::new("claude-sonnet-4-20250514")
            .with_temperature(0.2)
            .with_max_tokens(2048);
        assert_eq!(config.model, "claude-sonnet-4-20250514");
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 2048);
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::Hebrew.to_string(), "Hebrew");
        assert_eq!(Language::English.to_string(), "English");
    }

    #[test]
    fn test_language_from_str() {
        assert_eq!("hebrew".parse::<Language>().unwrap(), Language::Hebrew);
        assert_eq!("English".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::English);
        assert!("klingon".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_serialization() {
        let json = serde_json::to_string(&Language::Hebrew).unwrap();
        assert_eq!(json, "\"hebrew\"");
        let back: Language = serde_json::from_str("\"english\"").unwrap();
        assert_eq!(back, Language::English);
    }

    #[test]
    fn test_default_run_params() {
        let params = RunParams::default();
        assert_eq!(params.topic, DEFAULT_TOPIC);
        assert_eq!(params.language, Language::Hebrew);
    }
}
