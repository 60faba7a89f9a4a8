//! # `geolens-x`: X (Twitter) Recent Search Plugin
//!
//! Pulls recent posts from the X API v2 search endpoint and keeps those whose
//! location can be established, either from the post's own geo data or from a
//! place name mentioned in its text. It implements the [`EventFetcher`] trait
//! from the core `geolens` library.

pub mod location;
pub mod models;

use async_trait::async_trait;
use chrono::Local;
use geolens::{
    constants::USER_AGENT,
    debug::DebugArtifacts,
    fetch::{EventFetcher, FetchCriteria, FetchError},
    pacing::Pacer,
    providers::geo::{GeocodeError, Geocoder},
    types::{MetaValue, Metadata, RawEvent, SOURCE_URL_KEY},
};
use location::LocationExtractor;
use models::{Place, Post, SearchResponse};
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2";
pub const DEFAULT_QUERY: &str =
    "lang:en (breaking OR news OR event) (in OR at OR near OR from) -is:retweet";
pub const DEFAULT_MAX_RESULTS: u32 = 10;
pub const DEFAULT_POST_DELAY: Duration = Duration::from_secs(1);

const TWEET_FIELDS: &str = "created_at,geo,context_annotations,entities";
const EXPANSIONS: &str = "geo.place_id";
const PLACE_FIELDS: &str = "contained_within,country,country_code,full_name,geo,id,name,place_type";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum XError {
    #[error("Missing X API bearer token")]
    MissingCredential,
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    #[error("X API request failed: {0}")]
    Request(String),
    #[error("X API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse X API response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for XError {
    fn from(err: reqwest::Error) -> Self {
        XError::Request(err.to_string())
    }
}

/// A helper to convert the specific `XError` into the generic `geolens::FetchError`.
impl From<XError> for FetchError {
    fn from(err: XError) -> Self {
        match err {
            XError::MissingCredential | XError::Client(_) => FetchError::Config(err.to_string()),
            XError::Request(msg) => FetchError::Transport(msg),
            XError::Status { .. } => FetchError::Transport(err.to_string()),
            XError::Parse(msg) => FetchError::Parse(msg),
        }
    }
}

// --- Location Resolution ---

/// Where a post's coordinates came from, with its display name and country.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// `coordinates`, the place type reported by X, or `extracted_from_text`.
    pub location_type: String,
    pub country: Option<String>,
}

// --- Fetcher ---

/// Fetches recent posts and geolocates them.
#[derive(Debug)]
pub struct XFetcher {
    client: ReqwestClient,
    base_url: String,
    bearer_token: String,
    max_results: u32,
    post_pacer: Pacer,
    geocoder: Box<dyn Geocoder>,
    locations: LocationExtractor,
    debug: Option<DebugArtifacts>,
}

impl XFetcher {
    /// Creates a fetcher. Fails before any network activity when the bearer
    /// token is empty.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        geocoder: Box<dyn Geocoder>,
    ) -> Result<Self, XError> {
        let bearer_token = bearer_token.into();
        if bearer_token.trim().is_empty() {
            return Err(XError::MissingCredential);
        }
        let client = ReqwestClient::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| XError::Client(e.to_string()))?;
        let locations = LocationExtractor::new().map_err(|e| XError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
            max_results: DEFAULT_MAX_RESULTS,
            post_pacer: Pacer::new(DEFAULT_POST_DELAY),
            geocoder,
            locations,
            debug: None,
        })
    }

    /// Results per request, clamped to the API's accepted 10..=100.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.clamp(10, 100);
        self
    }

    /// Minimum spacing between processing consecutive posts.
    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_pacer = Pacer::new(delay);
        self
    }

    pub fn with_debug(mut self, debug: DebugArtifacts) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn max_results(&self) -> u32 {
        self.max_results
    }

    /// Searches recent posts and returns the ones that could be located.
    pub async fn fetch_latest_posts(&self, query: Option<&str>) -> Result<Vec<RawEvent>, FetchError> {
        let query = query.filter(|q| !q.trim().is_empty()).unwrap_or(DEFAULT_QUERY);
        let url = format!("{}/tweets/search/recent", self.base_url);
        info!(max_results = self.max_results, "Searching X posts with query: {query}");

        let max_results = self.max_results.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", TWEET_FIELDS),
                ("expansions", EXPANSIONS),
                ("place.fields", PLACE_FIELDS),
            ])
            .send()
            .await
            .map_err(XError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(XError::from)?;
        if !status.is_success() {
            return Err(XError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let raw: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| XError::Parse(e.to_string()))?;
        if let Some(debug) = &self.debug {
            let name = format!("x_response_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
            debug.write_json(&name, &raw);
        }
        let response: SearchResponse =
            serde_json::from_value(raw).map_err(|e| XError::Parse(e.to_string()))?;

        Ok(self.process_posts(&response).await)
    }

    async fn process_posts(&self, response: &SearchResponse) -> Vec<RawEvent> {
        info!("Processing {} posts", response.data.len());
        let mut events = Vec::new();

        for post in &response.data {
            self.post_pacer.wait().await;
            match self.resolve_location(post, &response.includes.places).await {
                Ok(Some(location)) => {
                    info!(post_id = %post.id, "Located post: {}", location.name.as_deref().unwrap_or("coordinates"));
                    events.push(post_to_event(post, location));
                }
                Ok(None) => debug!(post_id = %post.id, "No location found, dropping post"),
                Err(e) => warn!(post_id = %post.id, "Failed to process post: {e}"),
            }
        }

        info!("Kept {} of {} posts with location data", events.len(), response.data.len());
        events
    }

    /// Determines where a post was made or what place it talks about.
    ///
    /// Tried in order: the post's exact coordinates, its tagged place, then each
    /// place name mentioned in the text. A geocoder timeout moves on to the next
    /// name; any other geocoder error is returned.
    pub async fn resolve_location(
        &self,
        post: &Post,
        places: &[Place],
    ) -> Result<Option<ResolvedLocation>, GeocodeError> {
        let geo = post.geo.as_ref();
        let place = geo
            .and_then(|g| g.place_id.as_deref())
            .and_then(|id| places.iter().find(|p| p.id == id));

        if let Some((latitude, longitude)) = geo
            .and_then(|g| g.coordinates.as_ref())
            .and_then(|point| point.lat_lon())
        {
            return Ok(Some(ResolvedLocation {
                name: place.and_then(|p| p.display_name()).map(str::to_string),
                latitude,
                longitude,
                location_type: "coordinates".to_string(),
                country: place.and_then(|p| p.country.clone()),
            }));
        }

        if let Some(place) = place {
            if let Some((latitude, longitude)) = place.centroid() {
                return Ok(Some(ResolvedLocation {
                    name: place.display_name().map(str::to_string),
                    latitude,
                    longitude,
                    location_type: place
                        .place_type
                        .clone()
                        .unwrap_or_else(|| "place".to_string()),
                    country: place.country.clone(),
                }));
            }
        }

        for candidate in self.locations.candidates(&post.text) {
            match self.geocoder.geocode(&candidate).await {
                Ok(Some(found)) => {
                    return Ok(Some(ResolvedLocation {
                        name: Some(candidate),
                        latitude: found.latitude,
                        longitude: found.longitude,
                        location_type: "extracted_from_text".to_string(),
                        country: None,
                    }));
                }
                Ok(None) => debug!("No geocoding match for '{candidate}'"),
                Err(GeocodeError::Timeout(_)) => {
                    warn!("Geocoding timed out for location: {candidate}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}

fn post_to_event(post: &Post, location: ResolvedLocation) -> RawEvent {
    let mut metadata = Metadata::new();
    metadata.insert(
        SOURCE_URL_KEY.to_string(),
        MetaValue::from(format!("https://twitter.com/i/web/status/{}", post.id)),
    );
    metadata.insert(
        "location_type".to_string(),
        MetaValue::from(location.location_type),
    );
    if let Some(country) = location.country {
        metadata.insert("country".to_string(), MetaValue::from(country));
    }

    RawEvent {
        id: post.id.clone(),
        date: post.created_at.clone().unwrap_or_default(),
        description: post.text.clone(),
        location: location.name,
        latitude: Some(location.latitude),
        longitude: Some(location.longitude),
        tone: None,
        metadata,
    }
}

#[async_trait]
impl EventFetcher for XFetcher {
    async fn fetch(&self, criteria: &FetchCriteria) -> Result<Vec<RawEvent>, FetchError> {
        self.fetch_latest_posts(criteria.query.as_deref()).await
    }

    fn name(&self) -> &'static str {
        "x"
    }
}
