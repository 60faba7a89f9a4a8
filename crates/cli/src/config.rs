//! # Application Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. Programmatic defaults.
//! 2. An optional YAML file (`--config`, else `config.yml` in the working
//!    directory). `${VAR}` placeholders in it are replaced from the environment.
//! 3. `GEOLENS_`-prefixed environment variables, with `__` separating nested
//!    keys (e.g. `GEOLENS_LLM__MODEL`, `GEOLENS_GDELT__MAX_EVENTS`).
//!
//! Command-line flags are applied on top by `main`.

use clap::ValueEnum;
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use geolens::constants::{DEBUG_DIR, DEFAULT_NOMINATIM_URL, USER_AGENT};
use geolens::providers::ai::GenerationOptions;
use geolens::providers::factory::ProviderConfig;
use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Environment variable holding the X API bearer token.
pub const X_BEARER_TOKEN_VAR: &str = "X_BEARER_TOKEN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    General(String),
    #[error("Config file not found at '{0}'")]
    NotFound(String),
    #[error("Missing credential: {0}")]
    MissingCredential(String),
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// Which event source to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Feed {
    #[default]
    Gdelt,
    X,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GdeltConfig {
    pub base_url: String,
    pub max_days_back: u32,
    pub max_events: usize,
}

impl Default for GdeltConfig {
    fn default() -> Self {
        Self {
            base_url: geolens_gdelt::DEFAULT_BASE_URL.to_string(),
            max_days_back: geolens_gdelt::DEFAULT_MAX_DAYS_BACK,
            max_events: geolens_gdelt::DEFAULT_MAX_EVENTS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct XConfig {
    pub base_url: String,
    /// Falls back to the `X_BEARER_TOKEN` environment variable.
    pub bearer_token: Option<String>,
    pub query: Option<String>,
    pub max_results: u32,
    pub post_delay_ms: u64,
}

impl Default for XConfig {
    fn default() -> Self {
        Self {
            base_url: geolens_x::DEFAULT_BASE_URL.to_string(),
            bearer_token: None,
            query: None,
            max_results: geolens_x::DEFAULT_MAX_RESULTS,
            post_delay_ms: geolens_x::DEFAULT_POST_DELAY.as_millis() as u64,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout_secs: 10,
            min_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EnrichConfig {
    pub enabled: bool,
    pub excerpt_chars: usize,
    pub timeout_secs: u64,
    pub min_interval_ms: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            excerpt_chars: 500,
            timeout_secs: 10,
            min_interval_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LlmConfig {
    /// `local`, `ollama` or `gemini`.
    pub provider: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let options = GenerationOptions::default();
        Self {
            provider: "local".to_string(),
            api_url: Some("http://localhost:8080/v1/chat/completions".to_string()),
            api_key: None,
            model: None,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_k: options.top_k,
            top_p: options.top_p,
        }
    }
}

impl LlmConfig {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_k: self.top_k,
            top_p: self.top_p,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from(DEBUG_DIR),
        }
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub feed: Feed,
    /// Output path. When unset, a feed-specific default is used.
    pub output: Option<PathBuf>,
    pub gdelt: GdeltConfig,
    pub x: XConfig,
    pub geocoder: GeocoderConfig,
    pub enrich: EnrichConfig,
    pub llm: LlmConfig,
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Checks values that can only be judged once all layers are merged.
    ///
    /// Runs before any network activity so that a missing credential stops the
    /// run immediately.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed == Feed::X
            && self
                .x
                .bearer_token
                .as_deref()
                .map_or(true, |t| t.trim().is_empty())
        {
            return Err(ConfigError::MissingCredential(format!(
                "{X_BEARER_TOKEN_VAR} must be set to use the 'x' feed"
            )));
        }
        if self.gdelt.max_days_back == 0 {
            return Err(ConfigError::Invalid {
                key: "gdelt.max_days_back".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.gdelt.max_events == 0 {
            return Err(ConfigError::Invalid {
                key: "gdelt.max_events".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

// Helper to read a file and substitute `${VAR}` placeholders from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &Path) -> Result<Option<String>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).map_err(|e| {
        ConfigError::General(format!(
            "Failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(format!("Regex compilation failed: {e}")))?;
    let expanded = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(Some(expanded.to_string()))
}

/// Loads the configuration from the optional file and the environment.
///
/// An explicit `config_path_override` must exist; the default `config.yml` is
/// optional.
pub fn get_config(config_path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();

    let path = config_path_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    match read_and_substitute(&path)? {
        Some(content) => {
            info!("Loading configuration from '{}'.", path.display());
            builder = builder.add_source(File::from_str(&content, FileFormat::Yaml));
        }
        None if config_path_override.is_some() => {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        None => {}
    }

    let settings = builder
        .add_source(
            Environment::with_prefix("GEOLENS")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    let mut config: AppConfig = settings.try_deserialize()?;

    if config.x.bearer_token.is_none() {
        if let Ok(token) = env::var(X_BEARER_TOKEN_VAR) {
            if !token.is_empty() {
                config.x.bearer_token = Some(token);
            }
        }
    }

    Ok(config)
}
