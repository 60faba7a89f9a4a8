//! # GeoJSON Output
//!
//! Converts [`SummaryRecord`]s into a GeoJSON `FeatureCollection` of points and
//! writes it to disk.
//!
//! Records without a location are written at `[0.0, 0.0]`. Consumers of the file
//! must treat that coordinate as "unknown".

use crate::types::SummaryRecord;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum GeoJsonError {
    #[error("Cannot convert record to a feature: {0}")]
    Conversion(String),
    #[error("Failed to serialize GeoJSON: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write GeoJSON to '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read GeoJSON from '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    FeatureCollection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub kind: FeatureCollectionType,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            kind: FeatureCollectionType::FeatureCollection,
            features,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: FeatureType,
    pub geometry: Point,
    pub properties: Properties,
}

/// A point geometry. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub summary: String,
    pub timestamp: String,
    pub tone: f64,
}

impl TryFrom<&SummaryRecord> for Feature {
    type Error = GeoJsonError;

    fn try_from(record: &SummaryRecord) -> Result<Self, Self::Error> {
        if record.summary.trim().is_empty() {
            return Err(GeoJsonError::Conversion("summary is empty".to_string()));
        }
        let (lat, lon) = record
            .location
            .map(|l| (l.lat, l.lon))
            .unwrap_or((0.0, 0.0));
        if !lat.is_finite() || !lon.is_finite() {
            return Err(GeoJsonError::Conversion(format!(
                "coordinates are not finite: lat={lat}, lon={lon}"
            )));
        }
        if !record.tone.is_finite() {
            return Err(GeoJsonError::Conversion(format!(
                "tone is not finite: {}",
                record.tone
            )));
        }

        Ok(Feature {
            kind: FeatureType::Feature,
            geometry: Point {
                kind: GeometryType::Point,
                coordinates: [lon, lat],
            },
            properties: Properties {
                summary: record.summary.clone(),
                timestamp: record.timestamp.clone(),
                tone: record.tone,
            },
        })
    }
}

/// Builds a feature collection from `summaries`, skipping records that cannot
/// be converted. Order is preserved.
pub fn generate(summaries: &[SummaryRecord]) -> FeatureCollection {
    let mut features = Vec::with_capacity(summaries.len());
    for (index, record) in summaries.iter().enumerate() {
        match Feature::try_from(record) {
            Ok(feature) => features.push(feature),
            Err(e) => error!(index, "Failed to create feature for event: {e}"),
        }
    }
    FeatureCollection::new(features)
}

/// Writes `collection` to `path` as indented JSON, replacing any existing file.
pub fn save(collection: &FeatureCollection, path: impl AsRef<Path>) -> Result<(), GeoJsonError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(collection)?;
    std::fs::write(path, json).map_err(|source| GeoJsonError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        features = collection.len(),
        "GeoJSON saved to {}",
        path.display()
    );
    Ok(())
}

/// Reads a feature collection previously written by [`save`].
pub fn load(path: impl AsRef<Path>) -> Result<FeatureCollection, GeoJsonError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| GeoJsonError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Location;
    use serde_json::json;

    fn record(summary: &str, location: Option<Location>) -> SummaryRecord {
        SummaryRecord {
            summary: summary.to_string(),
            location,
            timestamp: "20240103".to_string(),
            tone: -2.5,
        }
    }

    #[test]
    fn feature_serializes_to_geojson_shape() {
        let feature = Feature::try_from(&record(
            "Talks resumed.",
            Some(Location {
                lat: 48.85,
                lon: 2.35,
            }),
        ))
        .unwrap();
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [2.35, 48.85]},
                "properties": {"summary": "Talks resumed.", "timestamp": "20240103", "tone": -2.5}
            })
        );
    }

    #[test]
    fn missing_location_becomes_origin() {
        let feature = Feature::try_from(&record("No place.", None)).unwrap();
        assert_eq!(feature.geometry.coordinates, [0.0, 0.0]);
    }

    #[test]
    fn unconvertible_records_are_skipped_in_order() {
        let records = vec![
            record("first", None),
            record("   ", None),
            record(
                "bad coords",
                Some(Location {
                    lat: f64::NAN,
                    lon: 1.0,
                }),
            ),
            record("last", None),
        ];
        let collection = generate(&records);
        let summaries: Vec<_> = collection
            .features
            .iter()
            .map(|f| f.properties.summary.as_str())
            .collect();
        assert_eq!(summaries, vec!["first", "last"]);
    }

    #[test]
    fn collection_type_tag_is_serialized() {
        let value = serde_json::to_value(FeatureCollection::new(vec![])).unwrap();
        assert_eq!(value, json!({"type": "FeatureCollection", "features": []}));
    }
}
