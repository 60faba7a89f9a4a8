use crate::{
    constants::USER_AGENT,
    errors::PromptError,
    providers::ai::{AiProvider, GenerationOptions},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

// --- Ollama /api/generate structures ---

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    num_predict: u32,
    temperature: f32,
    top_k: u32,
    top_p: f32,
}

#[derive(Deserialize, Debug)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

/// A provider for a model served by Ollama's completion endpoint.
#[derive(Clone, Debug)]
pub struct OllamaProvider {
    client: ReqwestClient,
    api_url: String,
    model: String,
}

impl OllamaProvider {
    /// Creates a new `OllamaProvider`.
    ///
    /// `api_url` is the server root (e.g. `http://localhost:11434`); the
    /// `/api/generate` path is appended when missing.
    pub fn new(api_url: String, model: String) -> Result<Self, PromptError> {
        let client = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(PromptError::ReqwestClientBuild)?;
        let api_url = if api_url.ends_with("/api/generate") {
            api_url
        } else {
            format!("{}/api/generate", api_url.trim_end_matches('/'))
        };
        Ok(Self {
            client,
            api_url,
            model,
        })
    }
}

#[async_trait]
impl AiProvider for OllamaProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt: user_prompt,
            system: (!system_prompt.is_empty()).then_some(system_prompt),
            stream: false,
            options: OllamaOptions {
                num_predict: options.max_tokens,
                temperature: options.temperature,
                top_k: options.top_k,
                top_p: options.top_p,
            },
        };

        let response = self
            .client
            .post(&self.api_url)
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PromptError::AiApi(error_text));
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        Ok(ollama_response.response)
    }
}
