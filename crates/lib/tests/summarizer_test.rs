//! # Summarizer Tests
//!
//! Verifies per-event failure isolation, ordering, record normalization and
//! interruption of the event summarizer.

mod common;

use async_trait::async_trait;
use common::{capture_logs, ScriptedAiProvider};
use geolens::providers::ai::{AiProvider, GenerationOptions};
use geolens::types::Location;
use geolens::{EventSummarizer, Interrupt, PromptError};
use geolens_test_utils::raw_event;
use std::time::Duration;

#[tokio::test]
async fn test_one_failure_drops_only_that_event() {
    // --- 1. Arrange ---
    let (logs, _guard) = capture_logs();
    let outcomes = (0..10)
        .map(|i| {
            if i == 3 {
                Err("model overloaded".to_string())
            } else {
                Ok(format!("  Summary {i}.\n"))
            }
        })
        .collect();
    let provider = ScriptedAiProvider::new(outcomes);
    let summarizer = EventSummarizer::new(Box::new(provider.clone()), GenerationOptions::default());
    let events: Vec<_> = (0..10)
        .map(|i| raw_event(&i.to_string(), Some(10.0 + i as f64), Some(20.0)))
        .collect();

    // --- 2. Act ---
    let summaries = summarizer.summarize(&events, &Interrupt::new()).await;

    // --- 3. Assert ---
    assert_eq!(summaries.len(), 9);
    assert_eq!(provider.calls().len(), 10);
    let texts: Vec<_> = summaries.iter().map(|s| s.summary.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Summary 0.", "Summary 1.", "Summary 2.", "Summary 4.", "Summary 5.", "Summary 6.",
            "Summary 7.", "Summary 8.", "Summary 9."
        ]
    );
    assert_eq!(logs.contents().matches("Failed to summarize event").count(), 1);
}

#[tokio::test]
async fn test_record_fields_are_normalized() {
    let provider = ScriptedAiProvider::new(vec![Ok("A.".into()), Ok("B.".into())]);
    let summarizer = EventSummarizer::new(Box::new(provider.clone()), GenerationOptions::default());

    let located = raw_event("1", Some(48.85), Some(2.35));
    let mut unlocated = raw_event("2", Some(48.85), None);
    unlocated.tone = None;

    let summaries = summarizer
        .summarize(&[located, unlocated], &Interrupt::new())
        .await;

    assert_eq!(
        summaries[0].location,
        Some(Location {
            lat: 48.85,
            lon: 2.35
        })
    );
    assert_eq!(summaries[0].timestamp, "20240103");
    assert_eq!(summaries[0].tone, -1.25);
    assert_eq!(summaries[1].location, None);
    assert_eq!(summaries[1].tone, 0.0);
}

#[tokio::test]
async fn test_prompt_embeds_event_fields() {
    let provider = ScriptedAiProvider::new(vec![Ok("ok".into())]);
    let summarizer = EventSummarizer::new(Box::new(provider.clone()), GenerationOptions::default());

    let mut ev = raw_event("7", None, None);
    ev.location = None;
    summarizer.summarize(&[ev], &Interrupt::new()).await;

    let calls = provider.calls();
    let (_, user_prompt) = &calls[0];
    assert!(user_prompt.contains("Event 7 description"));
    assert!(user_prompt.contains("Unknown location"));
    assert!(user_prompt.contains("20240103"));
}

#[tokio::test]
async fn test_blank_response_is_a_failure() {
    let provider = ScriptedAiProvider::new(vec![Ok("   \n".into()), Ok("Kept.".into())]);
    let summarizer = EventSummarizer::new(Box::new(provider), GenerationOptions::default());

    let summaries = summarizer
        .summarize(
            &[raw_event("1", None, None), raw_event("2", None, None)],
            &Interrupt::new(),
        )
        .await;

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].summary, "Kept.");
}

#[tokio::test]
async fn test_interrupt_before_start_returns_nothing() {
    let provider = ScriptedAiProvider::new(vec![]);
    let summarizer = EventSummarizer::new(Box::new(provider.clone()), GenerationOptions::default());
    let interrupt = Interrupt::new();
    interrupt.trigger();

    let summaries = summarizer.summarize(&[raw_event("1", None, None)], &interrupt).await;

    assert!(summaries.is_empty());
    assert!(provider.calls().is_empty());
}

/// Answers the first call at once, then hangs until cancelled.
#[derive(Clone, Debug)]
struct StallingProvider {
    interrupt: Interrupt,
}

#[async_trait]
impl AiProvider for StallingProvider {
    async fn generate(
        &self,
        _system_prompt: &str,
        user_prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        if user_prompt.contains("Event 1 ") {
            return Ok("First.".to_string());
        }
        // Simulate the operator pressing Ctrl-C while this call is in flight.
        self.interrupt.trigger();
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("never".to_string())
    }
}

#[tokio::test]
async fn test_interrupt_mid_batch_keeps_partial_results() {
    let interrupt = Interrupt::new();
    let provider = StallingProvider {
        interrupt: interrupt.clone(),
    };
    let summarizer = EventSummarizer::new(Box::new(provider), GenerationOptions::default());
    let events = vec![
        raw_event("1", None, None),
        raw_event("2", None, None),
        raw_event("3", None, None),
    ];

    let summaries = tokio::time::timeout(
        Duration::from_secs(5),
        summarizer.summarize(&events, &interrupt),
    )
    .await
    .expect("summarize should return promptly after an interrupt");

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].summary, "First.");
}
