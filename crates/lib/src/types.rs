//! # Pipeline Data Types
//!
//! The records that flow between pipeline stages. Each stage receives an
//! immutable snapshot from the previous one and produces new values; nothing
//! here is mutated after it has been handed on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar value carried in an event's provider-specific metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetaValue {
    /// Returns the value as a string slice if it is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{b}"),
            MetaValue::Integer(i) => write!(f, "{i}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Integer(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

/// Provider-specific auxiliary fields, keyed by name.
pub type Metadata = BTreeMap<String, MetaValue>;

/// Metadata key holding the URL of the article or post an event came from.
pub const SOURCE_URL_KEY: &str = "source_url";

/// One unprocessed record as received from a feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    pub id: String,
    /// Date or timestamp in the feed's native format.
    pub date: String,
    pub description: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Average tone of the coverage. Only the tabular feed provides one.
    pub tone: Option<f64>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RawEvent {
    /// The event's coordinates, if both latitude and longitude are known.
    pub fn coordinates(&self) -> Option<Location> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Location { lat, lon }),
            _ => None,
        }
    }

    /// The URL of the page or post this event was derived from.
    pub fn source_url(&self) -> Option<&str> {
        self.metadata
            .get(SOURCE_URL_KEY)
            .and_then(MetaValue::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// A model-generated summary of one event plus its normalized location, time and tone.
///
/// `location` is `None` when the event carried no coordinates. The `(0.0, 0.0)`
/// placeholder only appears once a record is written out as GeoJSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub summary: String,
    pub location: Option<Location>,
    pub timestamp: String,
    #[serde(default)]
    pub tone: f64,
}
