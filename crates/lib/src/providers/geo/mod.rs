//! # Geocoding Providers
//!
//! Forward geocoding of free-text place names. Callers need to tell a timeout
//! apart from other failures, because a timeout on one candidate name only means
//! "try the next one".

pub mod nominatim;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoding timed out for '{0}'")]
    Timeout(String),
    #[error("Geocoding request failed: {0}")]
    Request(String),
    #[error("Failed to parse geocoder response: {0}")]
    Parse(String),
}

/// A resolved place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    /// The provider's normalized address.
    pub display_name: String,
    /// The provider's full result object.
    pub raw: serde_json::Value,
}

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Resolves `query` to a place. `Ok(None)` means the provider had no match.
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}
