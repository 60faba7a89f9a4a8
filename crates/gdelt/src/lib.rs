//! # `geolens-gdelt`: GDELT Daily Event Export Plugin
//!
//! Fetches the GDELT 1.0 daily event export (`{YYYYMMDD}.export.CSV.zip`) for a
//! requested date, walking backwards one day at a time while the export has not
//! been published yet. The archive is decompressed and parsed in memory, the
//! most recently added events are kept, and each row is mapped to a
//! [`RawEvent`]. It implements the [`EventFetcher`] trait from the core
//! `geolens` library.

pub mod enrich;
pub mod schema;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use geolens::{
    constants::USER_AGENT,
    debug::DebugArtifacts,
    fetch::{EventFetcher, FetchCriteria, FetchError},
    types::RawEvent,
};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::Serialize;
use std::borrow::Cow;
use std::io::{Cursor, Read};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use zip::ZipArchive;

pub use schema::EVENT_COLUMNS;

pub const DEFAULT_BASE_URL: &str = "http://data.gdeltproject.org/events";
pub const DEFAULT_MAX_DAYS_BACK: u32 = 7;
pub const DEFAULT_MAX_EVENTS: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum GdeltError {
    #[error("No GDELT export found within {days} day(s) back from {start_date}")]
    NotFound { start_date: NaiveDate, days: u32 },
    #[error("Failed to download GDELT export: {0}")]
    Download(String),
    #[error("Failed to open GDELT archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("Failed to read GDELT table: {0}")]
    Table(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for GdeltError {
    fn from(err: reqwest::Error) -> Self {
        GdeltError::Download(err.to_string())
    }
}

/// A helper to convert the specific `GdeltError` into the generic `geolens::FetchError`.
impl From<GdeltError> for FetchError {
    fn from(err: GdeltError) -> Self {
        match err {
            GdeltError::NotFound { start_date, days } => {
                FetchError::NotFoundExhausted { start_date, days }
            }
            GdeltError::Download(msg) => FetchError::Transport(msg),
            GdeltError::Archive(e) => FetchError::Parse(e.to_string()),
            GdeltError::Table(msg) => FetchError::Parse(msg),
            GdeltError::Client(msg) => FetchError::Config(msg),
        }
    }
}

// --- Public Types ---

/// The export that was found and the events sampled from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    /// The date whose export was used. May be earlier than the requested date.
    pub date: NaiveDate,
    pub source_url: String,
    pub events: Vec<RawEvent>,
}

/// Builds the export URL for `date`.
pub fn export_url(base_url: &str, date: NaiveDate) -> String {
    format!(
        "{}/{}.export.CSV.zip",
        base_url.trim_end_matches('/'),
        date.format("%Y%m%d")
    )
}

/// Decompresses an export archive and parses its first entry.
///
/// Malformed rows are skipped with a warning. The result is sorted by
/// `DATEADDED`, newest first, and cut to `max_events`.
pub fn parse_export(bytes: &[u8], max_events: usize) -> Result<Vec<RawEvent>, GdeltError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entry = archive.by_index(0)?;
    let mut table = Vec::new();
    entry
        .read_to_end(&mut table)
        .map_err(|e| GdeltError::Table(e.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(table.as_slice());

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in reader.byte_records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                skipped += 1;
                warn!(line = line + 1, "Skipping unreadable GDELT row: {e}");
                continue;
            }
        };
        // Exports are not guaranteed to be valid UTF-8.
        let decoded: Vec<Cow<'_, str>> = record.iter().map(String::from_utf8_lossy).collect();
        let fields: Vec<&str> = decoded.iter().map(|f| f.as_ref()).collect();
        match schema::parse_row(&fields) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                skipped += 1;
                warn!(line = line + 1, "Skipping malformed GDELT row: {reason}");
            }
        }
    }

    let total = rows.len();
    // Stable sort: rows added in the same batch keep their file order.
    rows.sort_by(|a, b| b.date_added.cmp(&a.date_added));
    rows.truncate(max_events);
    info!(
        "Parsed {total} GDELT events ({skipped} skipped), keeping the {} most recent",
        rows.len()
    );
    Ok(rows.into_iter().map(|row| row.event).collect())
}

// --- Fetcher ---

/// Downloads and samples GDELT daily event exports.
#[derive(Debug, Clone)]
pub struct GdeltFetcher {
    client: ReqwestClient,
    base_url: String,
    max_days_back: u32,
    max_events: usize,
    debug: Option<DebugArtifacts>,
}

impl GdeltFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GdeltError> {
        let client = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GdeltError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            max_days_back: DEFAULT_MAX_DAYS_BACK,
            max_events: DEFAULT_MAX_EVENTS,
            debug: None,
        })
    }

    /// How many dates, starting with the requested one, are probed.
    pub fn with_max_days_back(mut self, days: u32) -> Self {
        self.max_days_back = days;
        self
    }

    /// How many of the most recently added events are kept.
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Saves the raw archive, a provenance note and the parsed events.
    pub fn with_debug(mut self, debug: DebugArtifacts) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Finds the newest export at or before `start_date` and parses it.
    pub async fn fetch_daily_report(&self, start_date: NaiveDate) -> Result<DailyReport, FetchError> {
        for days_back in 0..self.max_days_back {
            let Some(date) = start_date.checked_sub_days(Days::new(u64::from(days_back))) else {
                break;
            };
            let url = export_url(&self.base_url, date);
            info!(date = %date, "Fetching GDELT export from: {url}");

            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(GdeltError::from)?;

            if response.status() == StatusCode::NOT_FOUND {
                info!(date = %date, "No GDELT export published, trying the previous day");
                continue;
            }
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                return Err(GdeltError::Download(format!(
                    "Request for {url} failed with status {status}: {body}"
                ))
                .into());
            }

            let bytes = response.bytes().await.map_err(GdeltError::from)?;
            self.save_archive(&url, date, &bytes);
            let events = parse_export(&bytes, self.max_events)?;
            if let Some(debug) = &self.debug {
                debug.write_json(&format!("gdelt_events_{}.json", date.format("%Y%m%d")), &events);
            }

            return Ok(DailyReport {
                date,
                source_url: url,
                events,
            });
        }

        Err(GdeltError::NotFound {
            start_date,
            days: self.max_days_back,
        }
        .into())
    }

    fn save_archive(&self, url: &str, date: NaiveDate, bytes: &[u8]) {
        let Some(debug) = &self.debug else {
            return;
        };
        let stem = date.format("%Y%m%d").to_string();
        debug.write_bytes(&format!("{stem}.export.CSV.zip"), bytes);
        debug.write_text(
            &format!("{stem}.source.txt"),
            &format!(
                "url: {url}\nfetched_at: {}\nbytes: {}\n",
                Utc::now().to_rfc3339(),
                bytes.len()
            ),
        );
    }
}

#[async_trait]
impl EventFetcher for GdeltFetcher {
    async fn fetch(&self, criteria: &FetchCriteria) -> Result<Vec<RawEvent>, FetchError> {
        let report = self.fetch_daily_report(criteria.start_date).await?;
        info!(
            date = %report.date,
            "Fetched {} events from {}",
            report.events.len(),
            report.source_url
        );
        Ok(report.events)
    }

    fn name(&self) -> &'static str {
        "gdelt"
    }
}
