//! Configuration loading from switchboard.toml and the environment.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const CONFIG_FILE: &str = "switchboard.toml";

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "SWITCHBOARD_MODEL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Model endpoint configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Tool execution settings.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Model endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,

    /// Gemini API key. Falls back to `GEMINI_API_KEY`.
    pub api_key: Option<String>,

    /// Override for the API base URL.
    pub base_url: Option<String>,

    /// System instruction sent with every request.
    pub system: Option<String>,

    pub temperature: Option<f32>,

    pub max_output_tokens: Option<u32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: None,
            system: None,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Tool execution settings.
#[derive(Debug, Default, Deserialize)]
pub struct ToolsConfig {
    /// Per-call timeout in seconds. Unset means no timeout.
    pub call_timeout_secs: Option<u64>,

    /// Extra environment variables for the tool server process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_model() -> String {
    "gemini-2.0-flash-001".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load an explicit config file, or `switchboard.toml` if present, or defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// The API key from the config file, else from the environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key_or(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_or(&self, from_env: Option<String>) -> Result<String, ConfigError> {
        self.backend
            .api_key
            .clone()
            .or(from_env)
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    /// The model name: command line, then environment, then config file.
    pub fn model(&self, cli_override: Option<&str>) -> String {
        self.model_or(cli_override, std::env::var(MODEL_ENV).ok())
    }

    fn model_or(&self, cli_override: Option<&str>, from_env: Option<String>) -> String {
        cli_override
            .map(str::to_string)
            .or(from_env)
            .unwrap_or_else(|| self.backend.model.clone())
    }

    pub fn call_timeout(&self) -> Option<Duration> {
        self.tools.call_timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key or GEMINI_API_KEY")]
    MissingApiKey,
}
