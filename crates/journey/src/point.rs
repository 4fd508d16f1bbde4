use foundation::{GeoBounds, LatLng, location_key};

/// Population and area attached to a stop by statistics hydration.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStats {
    pub population: Option<f64>,
    /// Square kilometers.
    pub area: Option<f64>,
    pub label: String,
}

/// Asynchronous enrichment state, tracked per point so one failure never
/// leaks into another stop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum EnrichmentStatus {
    #[default]
    Idle,
    Loading,
    Failed(String),
}

impl EnrichmentStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, EnrichmentStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            EnrichmentStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Reference to cached region geometry (the location key it is stored under).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionRef(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub country: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub bounds: Option<GeoBounds>,
    pub stats: Option<PointStats>,
    pub region: Option<RegionRef>,
    pub status: EnrichmentStatus,
}

impl GeoPoint {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            country: None,
            description: None,
            id: None,
            bounds: None,
            stats: None,
            region: None,
            status: EnrichmentStatus::Idle,
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_bounds(mut self, bounds: GeoBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// A point with non-finite coordinates is still waiting for a location.
    pub fn is_pending(&self) -> bool {
        !self.position().is_finite()
    }

    pub fn location_key(&self) -> String {
        location_key(self.id.as_deref(), &self.name, self.lat, self.lng)
    }
}
