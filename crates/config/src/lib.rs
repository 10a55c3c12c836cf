//! Configuration loading, validation, and management for taoloop.
//!
//! Loads configuration from `~/.taoloop/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! [`AppConfig`] is handed to the provider factory and the agent loop;
//! nothing in the workspace reads configuration from globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taoloop_core::provider::GenerationOptions;

/// The root configuration structure.
///
/// Maps directly to `~/.taoloop/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Display name of the configured provider
    #[serde(default = "default_provider_name")]
    pub provider_name: String,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling parameters
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Tool-use loop settings
    #[serde(default)]
    pub agent: AgentConfig,
}

fn default_provider_name() -> String {
    "github-models".into()
}
fn default_endpoint() -> String {
    "https://models.github.ai/inference".into()
}
fn default_model() -> String {
    "openai/gpt-4o".into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider_name", &self.provider_name)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("generation", &self.generation)
            .field("agent", &self.agent)
            .finish()
    }
}

/// How action requests are recognised in model output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionFormat {
    /// A fenced block holding `{"action": ..., "action_input": {...}}`
    Json,
    /// A call expression such as `book_lookup(title="1984")`
    Call,
    /// Try the fenced JSON form first, then the call form
    #[default]
    Auto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum model rounds per question
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default)]
    pub action_format: ActionFormat,

    /// Stop sequence that keeps the model from inventing tool results
    #[serde(default = "default_stop_sequence")]
    pub stop_sequence: String,
}

fn default_max_iterations() -> u32 {
    3
}
fn default_stop_sequence() -> String {
    "Observation:".into()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            action_format: ActionFormat::default(),
            stop_sequence: default_stop_sequence(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.taoloop/config.toml).
    ///
    /// Also checks environment variables:
    /// - `TAOLOOP_API_KEY`, `OPEN_API_GITHUB_MODEL_TOKEN`, `GITHUB_TOKEN`,
    ///   `OPENAI_API_KEY` (first found wins, only if the file has no key)
    /// - `TAOLOOP_ENDPOINT`, `OPEN_API_GITHUB_MODEL_ENDPOINT`
    /// - `TAOLOOP_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and re-validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using the given variable lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("TAOLOOP_API_KEY")
                .or_else(|| non_empty("OPEN_API_GITHUB_MODEL_TOKEN"))
                .or_else(|| non_empty("GITHUB_TOKEN"))
                .or_else(|| non_empty("OPENAI_API_KEY"));
        }

        if let Some(endpoint) =
            non_empty("TAOLOOP_ENDPOINT").or_else(|| non_empty("OPEN_API_GITHUB_MODEL_ENDPOINT"))
        {
            self.endpoint = endpoint;
        }

        if let Some(model) = non_empty("TAOLOOP_MODEL") {
            self.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".taoloop")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let temperature = self.generation.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        let top_p = self.generation.top_p;
        if top_p <= 0.0 || top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be in (0.0, 1.0]".into(),
            ));
        }

        if self.agent.max_iterations == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_iterations must be at least 1".into(),
            ));
        }

        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError("endpoint must not be empty".into()));
        }

        if self.agent.stop_sequence.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "agent.stop_sequence must not be blank".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_name: default_provider_name(),
            endpoint: default_endpoint(),
            model: default_model(),
            generation: GenerationOptions::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
