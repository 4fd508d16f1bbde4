use std::sync::Arc;

use foundation::{GeoBounds, LatLng, location_key};

/// A geocoding candidate; also the descriptor handed to statistics and
/// geometry lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    pub country: String,
    pub bounds: Option<GeoBounds>,
    pub id: Option<String>,
}

impl SearchResult {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            description: String::new(),
            country: String::new(),
            bounds: None,
            id: None,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn location_key(&self) -> String {
        location_key(self.id.as_deref(), &self.name, self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationStats {
    pub population: Option<f64>,
    /// Square kilometers.
    pub area: Option<f64>,
    pub label: String,
}

/// A GeoJSON `Feature`, shared between everyone who asked for it.
pub type Feature = Arc<serde_json::Value>;

/// Region outline for a location; `None` when neither a polygon nor a
/// bounding box is known.
pub type RegionGeometry = Option<Feature>;
