//! Response types for the v2 recent search endpoint. Only the fields the
//! fetcher reads are modelled; everything else is ignored.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Post>,
    #[serde(default)]
    pub includes: Includes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub text: String,
    pub created_at: Option<String>,
    pub geo: Option<PostGeo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostGeo {
    pub place_id: Option<String>,
    pub coordinates: Option<PointGeometry>,
}

/// A GeoJSON point: `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

impl PointGeometry {
    /// Returns `(latitude, longitude)`.
    pub fn lat_lon(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Includes {
    #[serde(default)]
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub id: String,
    pub full_name: Option<String>,
    pub name: Option<String>,
    pub country: Option<String>,
    pub place_type: Option<String>,
    pub geo: Option<PlaceGeo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceGeo {
    /// `[west, south, east, north]`.
    #[serde(default)]
    pub bbox: Vec<f64>,
}

impl Place {
    pub fn display_name(&self) -> Option<&str> {
        self.full_name.as_deref().or(self.name.as_deref())
    }

    /// The centre of the place's bounding box as `(latitude, longitude)`.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        match self.geo.as_ref()?.bbox.as_slice() {
            [west, south, east, north] => Some(((south + north) / 2.0, (west + east) / 2.0)),
            _ => None,
        }
    }
}
