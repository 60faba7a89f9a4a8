pub mod gemini;
pub mod local;
pub mod ollama;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Sampling settings passed with every generation request.
///
/// Providers map these onto their own option names (`max_tokens`,
/// `num_predict`, `maxOutputTokens`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    pub temperature: f32,
    /// Size of the candidate pool considered at each step.
    pub top_k: u32,
    /// Nucleus-sampling probability mass.
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 128,
            temperature: 0.1,
            top_k: 40,
            top_p: 0.9,
        }
    }
}

/// A trait for interacting with an AI provider.
///
/// This trait defines a common interface for text generation across different
/// Large Language Model backends (local OpenAI-compatible servers, Ollama, Gemini).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be a string containing the AI's response.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, PromptError>;
}

dyn_clone::clone_trait_object!(AiProvider);
