//! # AI Provider Factory
//!
//! This module centralizes the logic for creating AI provider instances from
//! configuration, so any consumer (the CLI, tests, other tools) builds providers
//! the same way.

use crate::{
    errors::PromptError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, ollama::OllamaProvider, AiProvider},
};
use serde::Deserialize;
use tracing::info;

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    /// The type of provider: `local`, `ollama` or `gemini`.
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    #[serde(default)]
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Creates an AI provider instance from its configuration.
///
/// - `local` requires `api_url` (an OpenAI-compatible chat completions endpoint).
/// - `ollama` requires `api_url` and `model`.
/// - `gemini` requires `api_key` and `model`; `api_url` defaults to the public endpoint.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    let provider: Box<dyn AiProvider> = match config.provider.as_str() {
        "local" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm.api_url must be set for the 'local' provider.".to_string(),
                )
            })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url,
                config.api_key.clone(),
                config.model.clone(),
            )?)
        }
        "ollama" => {
            let api_url = config.api_url.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm.api_url must be set for the 'ollama' provider.".to_string(),
                )
            })?;
            let model = config.model.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm.model must be set for the 'ollama' provider.".to_string(),
                )
            })?;
            info!("Configuring Ollama provider with URL: {}", api_url);
            Box::new(OllamaProvider::new(api_url, model)?)
        }
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                PromptError::MissingAiProvider(
                    "llm.api_key must be set for the 'gemini' provider.".to_string(),
                )
            })?;
            let model = config.model.as_deref().unwrap_or("gemini-2.0-flash");
            let api_url = config.api_url.clone().unwrap_or_else(|| {
                format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
                )
            });
            info!("Configuring Gemini provider with URL: {}", api_url);
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        other => {
            return Err(PromptError::MissingAiProvider(format!(
                "Unknown AI provider '{other}'. Expected one of: local, ollama, gemini."
            )))
        }
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str) -> ProviderConfig {
        ProviderConfig {
            provider: provider.to_string(),
            api_url: None,
            api_key: None,
            model: None,
        }
    }

    #[test]
    fn local_requires_api_url() {
        let err = create_provider(&config("local")).unwrap_err();
        assert!(matches!(err, PromptError::MissingAiProvider(_)));

        let mut cfg = config("local");
        cfg.api_url = Some("http://localhost:8080/v1/chat/completions".into());
        assert!(create_provider(&cfg).is_ok());
    }

    #[test]
    fn ollama_requires_model() {
        let mut cfg = config("ollama");
        cfg.api_url = Some("http://localhost:11434".into());
        assert!(create_provider(&cfg).is_err());
        cfg.model = Some("llama3".into());
        assert!(create_provider(&cfg).is_ok());
    }

    #[test]
    fn gemini_requires_key() {
        assert!(create_provider(&config("gemini")).is_err());
        let mut cfg = config("gemini");
        cfg.api_key = Some("secret".into());
        assert!(create_provider(&cfg).is_ok());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = create_provider(&config("llamafile")).unwrap_err();
        assert!(err.to_string().contains("llamafile"));
    }
}
