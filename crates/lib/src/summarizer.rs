//! # Event Summarization
//!
//! Turns [`RawEvent`]s into [`SummaryRecord`]s by asking a language model for a
//! short summary of each event. Events are processed one at a time; a failure on
//! one event is logged and that event is left out, the batch carries on.

use crate::{
    errors::PromptError,
    interrupt::Interrupt,
    prompts::{render_summary_prompt, SUMMARY_SYSTEM_PROMPT, SUMMARY_USER_PROMPT},
    providers::ai::{AiProvider, GenerationOptions},
    types::{RawEvent, SummaryRecord},
};
use tracing::{debug, error, info, warn};

const UNKNOWN_LOCATION: &str = "Unknown location";

#[derive(Debug, Clone)]
pub struct EventSummarizer {
    ai_provider: Box<dyn AiProvider>,
    options: GenerationOptions,
    system_prompt: String,
    user_prompt: String,
}

impl EventSummarizer {
    /// Creates a summarizer using the built-in prompts.
    pub fn new(ai_provider: Box<dyn AiProvider>, options: GenerationOptions) -> Self {
        Self {
            ai_provider,
            options,
            system_prompt: SUMMARY_SYSTEM_PROMPT.to_string(),
            user_prompt: SUMMARY_USER_PROMPT.to_string(),
        }
    }

    /// Overrides the prompts. The user template may use `{description}`,
    /// `{location}` and `{date}`.
    pub fn with_prompts(mut self, system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self.user_prompt = user_prompt.into();
        self
    }

    /// Summarizes `events` in order.
    ///
    /// Events whose summary fails are logged and omitted. If `interrupt` fires,
    /// the summaries produced so far are returned.
    pub async fn summarize(&self, events: &[RawEvent], interrupt: &Interrupt) -> Vec<SummaryRecord> {
        let mut summaries = Vec::with_capacity(events.len());
        let mut failed = 0usize;

        for (index, event) in events.iter().enumerate() {
            if interrupt.is_triggered() {
                warn!(
                    done = index,
                    total = events.len(),
                    "Summarization interrupted; keeping partial results"
                );
                break;
            }

            let outcome = tokio::select! {
                result = self.summarize_event(event) => result,
                _ = interrupt.triggered() => {
                    warn!(
                        done = index,
                        total = events.len(),
                        "Summarization interrupted; keeping partial results"
                    );
                    break;
                }
            };

            match outcome {
                Ok(record) => summaries.push(record),
                Err(e) => {
                    failed += 1;
                    error!(event_id = %event.id, "Failed to summarize event: {e}");
                }
            }
        }

        info!(
            summarized = summaries.len(),
            failed,
            total = events.len(),
            "Summarization finished"
        );
        summaries
    }

    /// Generates the summary record for a single event.
    pub async fn summarize_event(&self, event: &RawEvent) -> Result<SummaryRecord, PromptError> {
        let user_prompt = render_summary_prompt(
            &self.user_prompt,
            &event.description,
            event.location.as_deref().unwrap_or(UNKNOWN_LOCATION),
            &event.date,
        );

        debug!(event_id = %event.id, user_prompt = %user_prompt, "--> Sending prompt to AI Provider");
        let raw_response = self
            .ai_provider
            .generate(&self.system_prompt, &user_prompt, &self.options)
            .await?;

        let summary = raw_response.trim();
        if summary.is_empty() {
            return Err(PromptError::EmptyResponse);
        }

        Ok(SummaryRecord {
            summary: summary.to_string(),
            location: event.coordinates(),
            timestamp: event.date.clone(),
            tone: event.tone.unwrap_or(0.0),
        })
    }
}
