use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{defaults, endpoints, limits, models};
use crate::error::DeckError;
use crate::reflection::ReflectionStrategy;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmSettings,
    pub reflection: ReflectionSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReflectionSettings {
    pub max_rounds: usize,
    pub strategy: ReflectionStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub prompt_file: PathBuf,
    pub session_id: String,
    pub max_messages: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_MODEL.to_string(),
            api_key_env: defaults::API_KEY_ENV.to_string(),
            base_url: None,
            temperature: defaults::TEMPERATURE,
            max_tokens: defaults::MAX_TOKENS,
            timeout_secs: defaults::TIMEOUT_SECS,
        }
    }
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            max_rounds: defaults::MAX_ROUNDS,
            strategy: ReflectionStrategy::default(),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            prompt_file: PathBuf::from(defaults::PROMPT_FILE),
            session_id: defaults::SESSION_ID.to_string(),
            max_messages: defaults::MAX_MESSAGES,
        }
    }
}

/// Everything the generation client needs, resolved once at startup.
/// The client never consults the process environment itself.
#[derive(Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatdeck")
            .join("config.toml")
    }

    /// Load from the default location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = Self::config_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(settings) => return settings,
                Err(e) => tracing::warn!("Ignoring config at {}: {}", config_path.display(), e),
            }
        }
        Self::default()
    }

    /// Strict load: a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, DeckError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeckError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| DeckError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<(), DeckError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), DeckError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| DeckError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DeckError> {
        if self.reflection.max_rounds == 0 {
            return Err(DeckError::Config("reflection.max_rounds must be at least 1".into()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(DeckError::Config("llm.timeout_secs must be at least 1".into()));
        }
        if self.llm.model.trim().is_empty() {
            return Err(DeckError::Config("llm.model must not be empty".into()));
        }
        if !(0.0..=limits::MAX_TEMPERATURE).contains(&self.llm.temperature) {
            return Err(DeckError::Config(format!(
                "llm.temperature must be within 0.0..={}, got {}",
                limits::MAX_TEMPERATURE,
                self.llm.temperature
            )));
        }
        Ok(())
    }

    /// Get the API key from the environment variable specified in settings.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn generation_config(&self) -> Result<GenerationConfig, DeckError> {
        let api_key = self.api_key().ok_or_else(|| {
            DeckError::Config(format!(
                "Please set the {} environment variable",
                self.llm.api_key_env
            ))
        })?;
        Ok(self.generation_config_with_key(api_key))
    }

    pub fn generation_config_with_key(&self, api_key: impl Into<String>) -> GenerationConfig {
        GenerationConfig {
            api_key: api_key.into(),
            model: self.llm.model.clone(),
            base_url: self
                .llm
                .base_url
                .clone()
                .unwrap_or_else(|| endpoints::OPENAI_BASE_URL.to_string()),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            timeout: Duration::from_secs(self.llm.timeout_secs),
        }
    }

    /// Build an LLM client from the current settings.
    pub fn build_llm_client(&self) -> Result<crate::llm::OpenAIClient, DeckError> {
        crate::llm::OpenAIClient::new(self.generation_config()?)
    }
}
