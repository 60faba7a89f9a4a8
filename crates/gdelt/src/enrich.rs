//! Article enrichment for GDELT events.
//!
//! GDELT rows only carry actor names and CAMEO codes. The article each row was
//! coded from usually has a far better description, so it is fetched and its
//! details replace the generated one.

use crate::GdeltError;
use geolens::{constants::USER_AGENT, pacing::Pacer, types::RawEvent, Interrupt, MetaValue};
use geolens_html::{fetch_details, title_from_url, ArticleDetails, DEFAULT_EXCERPT_CHARS};
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches article pages for events, one at a time.
#[derive(Debug)]
pub struct ArticleEnricher {
    client: ReqwestClient,
    excerpt_chars: usize,
    pacer: Pacer,
}

impl ArticleEnricher {
    pub fn new(timeout: Duration, min_interval: Duration) -> Result<Self, GdeltError> {
        let client = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GdeltError::Client(e.to_string()))?;
        Ok(Self {
            client,
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            pacer: Pacer::new(min_interval),
        })
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    /// Fetches the details of the article behind `event`, if it has one.
    pub async fn details_for(&self, event: &RawEvent) -> Option<ArticleDetails> {
        let url = event.source_url()?;
        self.pacer.wait().await;
        Some(fetch_details(&self.client, url, self.excerpt_chars).await)
    }
}

/// Applies fetched article details to an event.
///
/// The description becomes the first of: page description, page title, the
/// title derived from the URL. Found fields are also kept as `article_*`
/// metadata.
pub fn apply_details(mut event: RawEvent, details: &ArticleDetails) -> RawEvent {
    let url_title = event.source_url().and_then(title_from_url);
    if let Some(description) = details
        .description
        .clone()
        .or_else(|| details.title.clone())
        .or(url_title)
    {
        event.description = description;
    }

    let fields = [
        ("article_title", &details.title),
        ("article_description", &details.description),
        ("article_published", &details.published_date),
        ("article_excerpt", &details.content_excerpt),
    ];
    for (key, value) in fields {
        if let Some(value) = value {
            event
                .metadata
                .insert(key.to_string(), MetaValue::from(value.as_str()));
        }
    }
    event
}

/// Enriches `events` in order. Events without a source URL pass through
/// unchanged.
///
/// When `interrupt` fires, the events enriched so far are returned followed by
/// the rest untouched.
pub async fn enrich_events(
    events: Vec<RawEvent>,
    enricher: &ArticleEnricher,
    interrupt: &Interrupt,
) -> Vec<RawEvent> {
    let total = events.len();
    let mut enriched = Vec::with_capacity(total);
    let mut fetched = 0usize;
    let mut pending = events.into_iter();

    while let Some(event) = pending.next() {
        if interrupt.is_triggered() {
            info!("Enrichment interrupted after {fetched} of {total} events");
            enriched.push(event);
            enriched.extend(pending);
            return enriched;
        }

        let outcome = tokio::select! {
            details = enricher.details_for(&event) => Some(details),
            _ = interrupt.triggered() => None,
        };
        let Some(details) = outcome else {
            info!("Enrichment interrupted after {fetched} of {total} events");
            enriched.push(event);
            enriched.extend(pending);
            return enriched;
        };

        match details {
            Some(details) => {
                fetched += 1;
                debug!(event_id = %event.id, found = !details.is_empty(), "Fetched article details");
                enriched.push(apply_details(event, &details));
            }
            None => enriched.push(event),
        }
    }

    info!("Enriched {fetched} of {total} events with article details");
    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use geolens::types::{Metadata, SOURCE_URL_KEY};

    fn event(url: Option<&str>) -> RawEvent {
        let mut metadata = Metadata::new();
        if let Some(url) = url {
            metadata.insert(SOURCE_URL_KEY.into(), url.into());
        }
        RawEvent {
            id: "1".into(),
            date: "20240103".into(),
            description: "POLICE (event 145) in Paris, France".into(),
            location: Some("Paris, France".into()),
            latitude: None,
            longitude: None,
            tone: None,
            metadata,
        }
    }

    #[test]
    fn description_prefers_page_description() {
        let details = ArticleDetails {
            title: Some("Title".into()),
            description: Some("Description".into()),
            ..Default::default()
        };
        let ev = apply_details(event(Some("https://ex.com/a-b")), &details);
        assert_eq!(ev.description, "Description");
        assert_eq!(ev.metadata["article_title"], MetaValue::from("Title"));
        assert!(!ev.metadata.contains_key("article_published"));
    }

    #[test]
    fn description_falls_back_to_title_then_url() {
        let titled = ArticleDetails {
            title: Some("Only Title".into()),
            ..Default::default()
        };
        assert_eq!(
            apply_details(event(Some("https://ex.com/a-b")), &titled).description,
            "Only Title"
        );

        let empty = ArticleDetails::default();
        assert_eq!(
            apply_details(event(Some("https://ex.com/breaking-news-event")), &empty).description,
            "Breaking News Event"
        );
    }

    #[test]
    fn description_kept_without_url() {
        let ev = apply_details(event(None), &ArticleDetails::default());
        assert_eq!(ev.description, "POLICE (event 145) in Paris, France");
    }
}
