use std::sync::Arc;

use foundation::GeoBounds;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ServicesConfig;
use crate::error::LookupError;
use crate::http::{BoxFuture, HttpClient, HttpRequest};
use crate::model::SearchResult;

/// Free-text place search.
pub trait Geocoder: Send + Sync {
    /// Candidates for `query`, best first. Queries shorter than the minimum
    /// length fail with `QueryTooShort` and never reach the network.
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>, LookupError>>;
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    suburb: Option<String>,
    road: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: Option<u64>,
    display_name: String,
    lat: String,
    lon: String,
    #[serde(rename = "type")]
    place_type: Option<String>,
    #[serde(rename = "boundingbox")]
    bounding_box: Option<Vec<String>>,
    #[serde(default)]
    address: NominatimAddress,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Nominatim orders the box as `[south, north, west, east]`.
fn parse_bounds(raw: &[String]) -> Option<GeoBounds> {
    let [s, n, w, e] = raw else {
        return None;
    };
    let bounds = GeoBounds::new(
        s.parse().ok()?,
        n.parse().ok()?,
        w.parse().ok()?,
        e.parse().ok()?,
    );
    bounds.is_finite().then_some(bounds)
}

fn normalize(place: NominatimPlace) -> SearchResult {
    let addr = &place.address;
    let name = [
        &addr.city,
        &addr.town,
        &addr.village,
        &addr.hamlet,
        &addr.suburb,
        &addr.road,
    ]
    .into_iter()
    .find_map(non_empty)
    .unwrap_or(place.display_name.as_str())
    .to_string();

    let country = non_empty(&addr.country).unwrap_or_default().to_string();
    let region = non_empty(&addr.state)
        .or_else(|| non_empty(&addr.county))
        .unwrap_or_default();
    let place_type = place
        .place_type
        .as_deref()
        .map(|t| t.replace('_', " "))
        .unwrap_or_default();

    let parts: Vec<&str> = [place_type.trim(), region, country.as_str()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    let description = if parts.is_empty() {
        place.display_name.clone()
    } else {
        parts.join(" • ")
    };

    SearchResult {
        name,
        // Unparseable coordinates stay NaN: the stop is kept as pending.
        lat: place.lat.trim().parse().unwrap_or(f64::NAN),
        lng: place.lon.trim().parse().unwrap_or(f64::NAN),
        description,
        country,
        bounds: place.bounding_box.as_deref().and_then(parse_bounds),
        id: place.place_id.map(|id| id.to_string()),
    }
}

/// Geocoder backed by the Nominatim `/search` endpoint.
pub struct NominatimGeocoder {
    http: Arc<dyn HttpClient>,
    base_url: String,
    limit: u32,
    min_query_len: usize,
}

impl NominatimGeocoder {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let defaults = ServicesConfig::default();
        Self {
            http,
            base_url: base_url.into(),
            limit: defaults.search_limit,
            min_query_len: defaults.min_query_len,
        }
    }

    pub fn from_config(http: Arc<dyn HttpClient>, config: &ServicesConfig) -> Self {
        Self {
            http,
            base_url: config.nominatim_url.clone(),
            limit: config.search_limit,
            min_query_len: config.min_query_len,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.base_url.trim_end_matches('/'))
    }
}

impl Geocoder for NominatimGeocoder {
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchResult>, LookupError>> {
        Box::pin(async move {
            let trimmed = query.trim();
            if trimmed.chars().count() < self.min_query_len {
                return Err(LookupError::QueryTooShort {
                    min: self.min_query_len,
                });
            }

            let request = HttpRequest::get(self.search_url())
                .query("format", "json")
                .query("q", trimmed)
                .query("addressdetails", "1")
                .query("limit", self.limit.to_string());

            let resp = self.http.get(request).await?;
            if let Err(err) = resp.check("geocoding") {
                warn!("geocoding {trimmed:?} failed: {err}");
                return Err(err);
            }

            let places: Vec<NominatimPlace> = resp.json()?;
            debug!(query = trimmed, hits = places.len(), "geocoding results");
            Ok(places.into_iter().map(normalize).collect())
        })
    }
}
