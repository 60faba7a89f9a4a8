//! # Pipeline Driver
//!
//! Wires one feed plugin, the optional article enricher, the summarizer and the
//! GeoJSON writer into a single run. Phases run strictly one after another and
//! the operator interrupt is checked between them.

use crate::config::{AppConfig, Feed};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use geolens::constants::{DEFAULT_OUTPUT_FILE, GDELT_DEBUG_SUBDIR, X_DEBUG_SUBDIR};
use geolens::debug::DebugArtifacts;
use geolens::providers::factory::create_provider;
use geolens::providers::geo::NominatimGeocoder;
use geolens::{geojson, EventFetcher, EventSummarizer, FetchCriteria, Interrupt};
use geolens_gdelt::enrich::{enrich_events, ArticleEnricher};
use geolens_gdelt::GdeltFetcher;
use geolens_x::XFetcher;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub feed: &'static str,
    pub fetched: usize,
    pub summarized: usize,
    pub features: usize,
    /// `None` when the run was interrupted before anything could be written.
    pub output: Option<PathBuf>,
    pub interrupted: bool,
}

impl RunReport {
    fn new(feed: &'static str) -> Self {
        Self {
            feed,
            fetched: 0,
            summarized: 0,
            features: 0,
            output: None,
            interrupted: false,
        }
    }
}

/// The default output path: `events.geojson` for GDELT, a timestamped file for X.
pub fn default_output(feed: Feed, now: DateTime<Local>) -> PathBuf {
    match feed {
        Feed::Gdelt => PathBuf::from(DEFAULT_OUTPUT_FILE),
        Feed::X => PathBuf::from(format!("x_events_{}.geojson", now.format("%Y%m%d_%H%M%S"))),
    }
}

pub struct Pipeline {
    fetcher: Box<dyn EventFetcher>,
    enricher: Option<ArticleEnricher>,
    summarizer: EventSummarizer,
}

impl Pipeline {
    pub fn new(fetcher: Box<dyn EventFetcher>, summarizer: EventSummarizer) -> Self {
        Self {
            fetcher,
            enricher: None,
            summarizer,
        }
    }

    pub fn with_enricher(mut self, enricher: ArticleEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    /// Builds the pipeline selected by `config.feed`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let provider = create_provider(&config.llm.provider_config())
            .context("Failed to configure the language model provider")?;
        let summarizer = EventSummarizer::new(provider, config.llm.generation_options());
        let debug_dir = config.debug.enabled.then(|| config.debug.dir.clone());

        let pipeline = match config.feed {
            Feed::Gdelt => {
                let mut fetcher = GdeltFetcher::new(&config.gdelt.base_url)
                    .context("Failed to create the GDELT fetcher")?
                    .with_max_days_back(config.gdelt.max_days_back)
                    .with_max_events(config.gdelt.max_events);
                if let Some(dir) = &debug_dir {
                    fetcher = fetcher.with_debug(DebugArtifacts::new(dir.join(GDELT_DEBUG_SUBDIR)));
                }
                let pipeline = Pipeline::new(Box::new(fetcher), summarizer);
                if config.enrich.enabled {
                    let enricher = ArticleEnricher::new(
                        Duration::from_secs(config.enrich.timeout_secs),
                        Duration::from_millis(config.enrich.min_interval_ms),
                    )
                    .context("Failed to create the article enricher")?
                    .with_excerpt_chars(config.enrich.excerpt_chars);
                    pipeline.with_enricher(enricher)
                } else {
                    pipeline
                }
            }
            Feed::X => {
                let token = config
                    .x
                    .bearer_token
                    .clone()
                    .context("The X bearer token is not configured")?;
                let geocoder = NominatimGeocoder::new(
                    config.geocoder.base_url.clone(),
                    Some(&config.geocoder.user_agent),
                    Duration::from_secs(config.geocoder.timeout_secs),
                    Duration::from_millis(config.geocoder.min_interval_ms),
                )
                .context("Failed to create the geocoder")?;
                let mut fetcher = XFetcher::new(&config.x.base_url, token, Box::new(geocoder))
                    .context("Failed to create the X fetcher")?
                    .with_max_results(config.x.max_results)
                    .with_post_delay(Duration::from_millis(config.x.post_delay_ms));
                if let Some(dir) = &debug_dir {
                    fetcher = fetcher.with_debug(DebugArtifacts::new(dir.join(X_DEBUG_SUBDIR)));
                }
                Pipeline::new(Box::new(fetcher), summarizer)
            }
        };
        Ok(pipeline)
    }

    /// Fetches, enriches, summarizes and writes the collection to `output`.
    ///
    /// On interrupt, whatever was summarized so far is still written. If the
    /// interrupt comes before any summary exists, `output` is left untouched.
    pub async fn run(
        &self,
        criteria: &FetchCriteria,
        output: &Path,
        interrupt: &Interrupt,
    ) -> Result<RunReport> {
        let feed = self.fetcher.name();
        let mut report = RunReport::new(feed);

        info!(feed, "Fetching events...");
        let outcome = tokio::select! {
            result = self.fetcher.fetch(criteria) => Some(result),
            _ = interrupt.triggered() => None,
        };
        let Some(result) = outcome else {
            warn!("Interrupted while fetching; nothing will be written");
            report.interrupted = true;
            return Ok(report);
        };
        let mut events =
            result.with_context(|| format!("Failed to fetch events from the {feed} feed"))?;
        report.fetched = events.len();
        info!("Fetched {} events", events.len());

        if let Some(enricher) = &self.enricher {
            if !interrupt.is_triggered() {
                info!("Enriching events with article details...");
                events = enrich_events(events, enricher, interrupt).await;
            }
        }

        info!("Summarizing events...");
        let summaries = self.summarizer.summarize(&events, interrupt).await;
        report.summarized = summaries.len();
        report.interrupted = interrupt.is_triggered();

        if report.interrupted && summaries.is_empty() {
            warn!("Interrupted before any event was summarized; nothing will be written");
            return Ok(report);
        }

        info!("Generating GeoJSON...");
        let collection = geojson::generate(&summaries);
        report.features = collection.len();
        geojson::save(&collection, output)
            .with_context(|| format!("Failed to write GeoJSON to '{}'", output.display()))?;
        report.output = Some(output.to_path_buf());

        info!(
            feed,
            fetched = report.fetched,
            summarized = report.summarized,
            features = report.features,
            interrupted = report.interrupted,
            "GeoJSON saved to {}",
            output.display()
        );
        Ok(report)
    }
}
