use crate::{
    constants::{DEFAULT_NOMINATIM_URL, USER_AGENT},
    pacing::Pacer,
    providers::geo::{GeocodeError, GeocodedPlace, Geocoder},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::debug;

/// Nominatim limits free use to about one request per second.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A geocoder backed by an OpenStreetMap Nominatim `/search` endpoint.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: ReqwestClient,
    base_url: String,
    pacer: Pacer,
}

impl NominatimGeocoder {
    /// Creates a geocoder for `base_url` with a per-request `timeout`. Calls are
    /// spaced at least `min_interval` apart.
    pub fn new(
        base_url: impl Into<String>,
        user_agent: Option<&str>,
        timeout: Duration,
        min_interval: Duration,
    ) -> Result<Self, GeocodeError> {
        let client = ReqwestClient::builder()
            .user_agent(user_agent.unwrap_or(USER_AGENT))
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            pacer: Pacer::new(min_interval),
        })
    }

    /// The public OpenStreetMap instance with its usage-policy defaults.
    pub fn public() -> Result<Self, GeocodeError> {
        Self::new(
            DEFAULT_NOMINATIM_URL,
            None,
            DEFAULT_TIMEOUT,
            DEFAULT_MIN_INTERVAL,
        )
    }
}

fn parse_coordinate(raw: &serde_json::Value, key: &str) -> Result<f64, GeocodeError> {
    // Nominatim returns coordinates as strings.
    match raw.get(key) {
        Some(serde_json::Value::String(s)) => s
            .parse()
            .map_err(|e| GeocodeError::Parse(format!("invalid {key} '{s}': {e}"))),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| GeocodeError::Parse(format!("invalid {key}: {n}"))),
        _ => Err(GeocodeError::Parse(format!("missing {key}"))),
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        self.pacer.wait().await;
        debug!(query, "Geocoding");

        let url = format!("{}/search", self.base_url);
        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                GeocodeError::Timeout(query.to_string())
            } else {
                GeocodeError::Request(e.to_string())
            }
        };

        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(map_err)?;

        if !response.status().is_success() {
            return Err(GeocodeError::Request(format!(
                "Request failed with status: {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(map_err)?;
        let results: Vec<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        let Some(first) = results.into_iter().next() else {
            return Ok(None);
        };

        let latitude = parse_coordinate(&first, "lat")?;
        let longitude = parse_coordinate(&first, "lon")?;
        let display_name = first
            .get("display_name")
            .and_then(|v| v.as_str())
            .unwrap_or(query)
            .to_string();

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            display_name,
            raw: first,
        }))
    }
}
