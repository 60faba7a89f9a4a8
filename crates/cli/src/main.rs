//! # geolens: Daily Events to GeoJSON
//!
//! Fetches the day's events from GDELT or X, summarizes each one with a
//! language model and writes the result as a GeoJSON feature collection.

mod config;
mod pipeline;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use config::{get_config, AppConfig, Feed};
use geolens::{FetchCriteria, Interrupt};
use pipeline::{default_output, Pipeline};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The event source to use
    #[arg(long, value_enum)]
    feed: Option<Feed>,
    /// The report date to start from (YYYY-MM-DD). Defaults to today (UTC)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Where to write the GeoJSON output
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// How many days to look back for a published GDELT export
    #[arg(long)]
    days_back: Option<u32>,
    /// How many of the most recent GDELT events to keep
    #[arg(long)]
    max_events: Option<usize>,
    /// Search query for the X feed
    #[arg(long)]
    query: Option<String>,
    /// Posts to request from the X feed (10-100)
    #[arg(long)]
    max_results: Option<u32>,
    /// Skip fetching article pages for GDELT events
    #[arg(long)]
    no_enrich: bool,
    /// Save raw downloads and intermediate data under the debug directory
    #[arg(long)]
    debug: bool,
    /// Path to a YAML configuration file
    #[arg(short, long, env = "GEOLENS_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(feed) = self.feed {
            config.feed = feed;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(days) = self.days_back {
            config.gdelt.max_days_back = days;
        }
        if let Some(max_events) = self.max_events {
            config.gdelt.max_events = max_events;
        }
        if let Some(query) = &self.query {
            config.x.query = Some(query.clone());
        }
        if let Some(max_results) = self.max_results {
            config.x.max_results = max_results;
        }
        if self.no_enrich {
            config.enrich.enabled = false;
        }
        if self.debug {
            config.debug.enabled = true;
        }
    }
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = get_config(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let interrupt = Interrupt::new();
    let handler = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; finishing with partial results");
            handler.trigger();
        }
    });

    let pipeline = Pipeline::from_config(&config)?;
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| default_output(config.feed, Local::now()));
    let criteria = FetchCriteria {
        start_date: cli.date.unwrap_or_else(|| Utc::now().date_naive()),
        query: config.x.query.clone(),
    };

    let report = pipeline.run(&criteria, &output, &interrupt).await?;
    match &report.output {
        Some(path) => info!(
            "Done: {} events fetched, {} summarized, {} features written to {}",
            report.fetched,
            report.summarized,
            report.features,
            path.display()
        ),
        None => info!("Stopped before any output was written"),
    }
    Ok(())
}
