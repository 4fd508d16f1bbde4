use journey::{GeoPoint, PointStats};
use services::{LocationStats, LookupError, RegionGeometry, SearchResult};

/// Build a journey stop from a geocoding candidate.
pub fn point_from_result(result: &SearchResult) -> GeoPoint {
    let mut point = GeoPoint::new(result.name.clone(), result.lat, result.lng);
    if !result.country.trim().is_empty() {
        point.country = Some(result.country.clone());
    }
    if !result.description.is_empty() {
        point.description = Some(result.description.clone());
    }
    point.id = result.id.clone();
    point.bounds = result.bounds;
    point
}

/// Lookup descriptor for an existing stop.
pub fn descriptor(point: &GeoPoint) -> SearchResult {
    SearchResult {
        name: point.name.clone(),
        lat: point.lat,
        lng: point.lng,
        description: point.description.clone().unwrap_or_default(),
        country: point.country.clone().unwrap_or_default(),
        bounds: point.bounds,
        id: point.id.clone(),
    }
}

pub fn point_stats(stats: LocationStats) -> PointStats {
    PointStats {
        population: stats.population,
        area: stats.area,
        label: stats.label,
    }
}

/// Lookups owed to one stop.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationRequest {
    /// Index at request time; informational only.
    pub index: usize,
    /// Location key of the stop; outcomes are matched back by this.
    pub key: String,
    pub location: SearchResult,
    pub statistics: bool,
    pub geometry: bool,
}

impl HydrationRequest {
    pub fn for_point(index: usize, point: &GeoPoint, statistics: bool, geometry: bool) -> Self {
        Self {
            index,
            key: point.location_key(),
            location: descriptor(point),
            statistics,
            geometry,
        }
    }
}

/// What came back for a [`HydrationRequest`]; `None` where nothing was asked.
#[derive(Debug, Clone, PartialEq)]
pub struct HydrationOutcome {
    pub index: usize,
    pub key: String,
    pub statistics: Option<Result<LocationStats, LookupError>>,
    pub geometry: Option<Result<RegionGeometry, LookupError>>,
}

impl HydrationOutcome {
    /// First failure, as shown to the user.
    pub fn error_message(&self) -> Option<String> {
        let stats_err = self.statistics.as_ref().and_then(|r| r.as_ref().err());
        let geometry_err = self.geometry.as_ref().and_then(|r| r.as_ref().err());
        stats_err.or(geometry_err).map(LookupError::user_message)
    }
}

#[cfg(test)]
mod tests {
    use foundation::GeoBounds;
    use pretty_assertions::assert_eq;
    use services::{LookupError, RATE_LIMIT_MESSAGE, SearchResult};

    use super::{HydrationOutcome, descriptor, point_from_result};

    #[test]
    fn result_to_point_and_back() {
        let result = SearchResult {
            name: "Lyon".into(),
            lat: 45.76,
            lng: 4.84,
            description: "city • Auvergne-Rhône-Alpes • France".into(),
            country: "France".into(),
            bounds: Some(GeoBounds::new(45.7, 45.8, 4.7, 4.9)),
            id: Some("42".into()),
        };
        let point = point_from_result(&result);
        assert_eq!(point.country.as_deref(), Some("France"));
        assert_eq!(point.location_key(), "42");
        assert_eq!(descriptor(&point), result);
    }

    #[test]
    fn blank_country_stays_unknown() {
        let point = point_from_result(&SearchResult::new("Somewhere", 1.0, 2.0));
        assert_eq!(point.country, None);
        assert_eq!(point.description, None);
    }

    #[test]
    fn statistics_error_wins() {
        let outcome = HydrationOutcome {
            index: 0,
            key: "k".into(),
            statistics: Some(Err(LookupError::RateLimited)),
            geometry: Some(Err(LookupError::Network("reset".into()))),
        };
        assert_eq!(outcome.error_message().as_deref(), Some(RATE_LIMIT_MESSAGE));

        let quiet = HydrationOutcome {
            statistics: None,
            geometry: Some(Ok(None)),
            ..outcome
        };
        assert_eq!(quiet.error_message(), None);
    }
}
