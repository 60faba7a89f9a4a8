//! Shared test doubles for the GeoLens crates: a scripted language model, a
//! scripted geocoder and a raw event builder.

use async_trait::async_trait;
use geolens::errors::PromptError;
use geolens::providers::ai::{AiProvider, GenerationOptions};
use geolens::providers::geo::{GeocodeError, GeocodedPlace, Geocoder};
use geolens::types::{Metadata, RawEvent};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for any user prompt containing `key`.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded `(system, user)` prompt pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for user prompt. Got: '{user_prompt}'"
        )))
    }
}

// --- Mock Geocoder ---

/// What [`MockGeocoder`] answers for a query.
#[derive(Clone, Debug)]
pub enum MockGeocode {
    Found { lat: f64, lon: f64 },
    NoMatch,
    Timeout,
    Fail(String),
}

/// A geocoder with per-query scripted answers. Unscripted queries have no match.
#[derive(Clone, Debug, Default)]
pub struct MockGeocoder {
    answers: Arc<Mutex<HashMap<String, MockGeocode>>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, query: &str, answer: MockGeocode) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(query.to_string(), answer);
        self
    }

    /// The queries received so far, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Geocoder for MockGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        self.queries.lock().unwrap().push(query.to_string());
        let answer = self.answers.lock().unwrap().get(query).cloned();
        match answer.unwrap_or(MockGeocode::NoMatch) {
            MockGeocode::Found { lat, lon } => Ok(Some(GeocodedPlace {
                latitude: lat,
                longitude: lon,
                display_name: query.to_string(),
                raw: serde_json::json!({"lat": lat.to_string(), "lon": lon.to_string()}),
            })),
            MockGeocode::NoMatch => Ok(None),
            MockGeocode::Timeout => Err(GeocodeError::Timeout(query.to_string())),
            MockGeocode::Fail(message) => Err(GeocodeError::Request(message)),
        }
    }
}

// --- Builders ---

/// A raw event dated 2024-01-03 with a located description.
pub fn raw_event(id: &str, lat: Option<f64>, lon: Option<f64>) -> RawEvent {
    RawEvent {
        id: id.to_string(),
        date: "20240103".to_string(),
        description: format!("Event {id} description"),
        location: Some("Springfield".to_string()),
        latitude: lat,
        longitude: lon,
        tone: Some(-1.25),
        metadata: Metadata::new(),
    }
}
