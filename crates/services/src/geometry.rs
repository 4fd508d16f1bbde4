use std::sync::Arc;

use foundation::GeoBounds;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::coalesce::CoalescingCache;
use crate::config::ServicesConfig;
use crate::error::LookupError;
use crate::http::{BoxFuture, HttpClient, HttpRequest};
use crate::model::{Feature, RegionGeometry, SearchResult};

/// Outline of the administrative region a location belongs to.
pub trait GeometrySource: Send + Sync {
    fn region_geometry(
        &self,
        location: &SearchResult,
    ) -> BoxFuture<'_, Result<RegionGeometry, LookupError>>;
}

/// Rectangle feature spanning `bounds`, tagged `source: "bbox"`.
pub fn bounding_box_feature(bounds: &GeoBounds, name: &str) -> Feature {
    let ring: Vec<[f64; 2]> = bounds.ring().to_vec();
    Arc::new(json!({
        "type": "Feature",
        "properties": { "name": name, "source": "bbox" },
        "geometry": { "type": "Polygon", "coordinates": [ring] },
    }))
}

fn first_feature(payload: Value) -> Option<Feature> {
    match payload {
        Value::Object(mut map) => match map.remove("features")? {
            Value::Array(features) => features.into_iter().next().map(Arc::new),
            _ => None,
        },
        _ => None,
    }
}

fn region_query(location: &SearchResult) -> String {
    [location.name.trim(), location.country.trim()]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Region polygons from Nominatim's GeoJSON search, memoized per location key.
pub struct NominatimGeometry {
    http: Arc<dyn HttpClient>,
    base_url: String,
    cache: CoalescingCache<String, RegionGeometry, LookupError>,
}

impl NominatimGeometry {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            cache: CoalescingCache::new(),
        }
    }

    pub fn from_config(http: Arc<dyn HttpClient>, config: &ServicesConfig) -> Self {
        Self::new(http, config.nominatim_url.clone())
    }

    pub fn cache(&self) -> &CoalescingCache<String, RegionGeometry, LookupError> {
        &self.cache
    }
}

impl GeometrySource for NominatimGeometry {
    fn region_geometry(
        &self,
        location: &SearchResult,
    ) -> BoxFuture<'_, Result<RegionGeometry, LookupError>> {
        let key = location.location_key();
        let query = region_query(location);
        let fallback = location
            .bounds
            .filter(GeoBounds::is_finite)
            .map(|b| bounding_box_feature(&b, &location.name));
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let http = Arc::clone(&self.http);

        Box::pin(async move {
            self.cache
                .get_or_fetch(key, move || async move {
                    let request = HttpRequest::get(url)
                        .accept("application/geo+json, application/json")
                        .query("format", "geojson")
                        .query("polygon_geojson", "1")
                        .query("limit", "1")
                        .query("q", query.as_str());
                    let resp = http.get(request).await?;
                    if let Err(err) = resp.check("geometry") {
                        warn!("geometry for {query:?} failed: {err}");
                        return Err(err);
                    }
                    let payload: Value = resp.json()?;
                    let geometry = first_feature(payload).or(fallback);
                    info!(query = %query, found = geometry.is_some(), "region geometry loaded");
                    Ok(geometry)
                })
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use foundation::GeoBounds;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{GeometrySource, NominatimGeometry, bounding_box_feature};
    use crate::error::LookupError;
    use crate::http::scripted::ScriptedHttp;
    use crate::model::SearchResult;

    const POLYGON: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"name":"Paris"},
         "geometry":{"type":"Polygon","coordinates":[[[2.2,48.8],[2.4,48.8],[2.4,48.9],[2.2,48.8]]]}}
    ]}"#;

    fn paris() -> SearchResult {
        let mut r = SearchResult::new("Paris", 48.8566, 2.3522);
        r.country = "France".into();
        r.bounds = Some(GeoBounds::new(48.8, 48.9, 2.2, 2.5));
        r
    }

    fn source(http: &ScriptedHttp) -> NominatimGeometry {
        NominatimGeometry::new(Arc::new(http.clone()), "https://nominatim.test")
    }

    #[test]
    fn bbox_feature_is_a_closed_ring() {
        let feature = bounding_box_feature(&GeoBounds::new(1.0, 2.0, 3.0, 4.0), "Box");
        assert_eq!(
            *feature,
            json!({
                "type": "Feature",
                "properties": {"name": "Box", "source": "bbox"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[3.0, 1.0], [4.0, 1.0], [4.0, 2.0], [3.0, 2.0], [3.0, 1.0]]],
                },
            })
        );
    }

    #[tokio::test]
    async fn returns_the_first_feature() {
        let http = ScriptedHttp::ok(POLYGON);
        let geometry = source(&http).region_geometry(&paris()).await.expect("geometry");

        let feature = geometry.expect("feature");
        assert_eq!(feature["properties"]["name"], "Paris");
        assert_eq!(feature["geometry"]["type"], "Polygon");

        let requests = http.requests();
        let req = &requests[0];
        assert_eq!(req.url, "https://nominatim.test/search");
        assert_eq!(req.accept, "application/geo+json, application/json");
        assert_eq!(req.query_value("format"), Some("geojson"));
        assert_eq!(req.query_value("polygon_geojson"), Some("1"));
        assert_eq!(req.query_value("limit"), Some("1"));
        assert_eq!(req.query_value("q"), Some("Paris, France"));
    }

    #[tokio::test]
    async fn falls_back_to_the_bounding_box() {
        let http = ScriptedHttp::ok(r#"{"type":"FeatureCollection","features":[]}"#);
        let geometry = source(&http).region_geometry(&paris()).await.expect("geometry");

        let feature = geometry.expect("bbox feature");
        assert_eq!(feature["properties"]["source"], "bbox");
        assert_eq!(feature["properties"]["name"], "Paris");
    }

    #[tokio::test]
    async fn nothing_known_yields_none() {
        let http = ScriptedHttp::ok("{}");
        let geometry = source(&http)
            .region_geometry(&SearchResult::new("Atlantis", 0.0, 0.0))
            .await
            .expect("geometry");
        assert_eq!(geometry, None);
        assert_eq!(http.requests()[0].query_value("q"), Some("Atlantis"));
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_and_memoizes() {
        let http = ScriptedHttp::ok(POLYGON).with_delay(Duration::from_millis(80));
        let geometry = source(&http);
        let location = paris();

        let (a, b) = tokio::join!(
            geometry.region_geometry(&location),
            geometry.region_geometry(&location),
        );
        assert_eq!(a, b);
        assert_eq!(http.request_count(), 1);
        assert!(geometry.cache().peek(&location.location_key()).is_some());
    }

    #[tokio::test]
    async fn rate_limit_is_reported_and_retried_later() {
        let http = ScriptedHttp::new(vec![(429, ""), (200, POLYGON)]);
        let geometry = source(&http);

        assert_eq!(
            geometry.region_geometry(&paris()).await,
            Err(LookupError::RateLimited)
        );
        assert!(geometry.region_geometry(&paris()).await.expect("retry").is_some());
    }
}
