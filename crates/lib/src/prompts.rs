//! # Prompt Templates
//!
//! Prompts used by the event summarizer. Placeholders in `{braces}` are replaced
//! with event fields before the prompt is sent.

/// The system prompt for event summarization.
pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a news analyst. Summarize the given geopolitical event in one or two short, factual sentences. Do not speculate beyond the information provided and do not add any introductory text.";

/// The user prompt for event summarization.
///
/// Placeholders: `{description}`, `{location}`, `{date}`.
pub const SUMMARY_USER_PROMPT: &str =
    "Summarize this event.\n\n# Event\n{description}\n\n# Location\n{location}\n\n# Date\n{date}";

/// Fills a template's `{description}`, `{location}` and `{date}` placeholders.
pub fn render_summary_prompt(template: &str, description: &str, location: &str, date: &str) -> String {
    template
        .replace("{description}", description)
        .replace("{location}", location)
        .replace("{date}", date)
}
