use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;
use tracing::{info, warn};

use crate::coalesce::CoalescingCache;
use crate::config::ServicesConfig;
use crate::error::LookupError;
use crate::http::{BoxFuture, HttpClient, HttpRequest};
use crate::model::{LocationStats, SearchResult};

/// Population and area for a resolved location.
pub trait StatisticsSource: Send + Sync {
    fn population_and_area(
        &self,
        location: &SearchResult,
    ) -> BoxFuture<'_, Result<LocationStats, LookupError>>;
}

/// Accepts JSON numbers and numeric strings; anything non-finite is unknown.
fn normalize_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn parse_stats(payload: &Value, fallback_label: &str) -> LocationStats {
    let first = match payload {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    let label = first
        .and_then(|v| v.pointer("/name/common"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback_label)
        .to_string();

    LocationStats {
        population: normalize_number(first.and_then(|v| v.get("population"))),
        area: normalize_number(first.and_then(|v| v.get("area"))),
        label,
    }
}

/// Country statistics from the REST Countries API, memoized per location key.
///
/// Lookups go by the location's country (falling back to its name), so all
/// stops inside one country resolve to the same figures.
pub struct RestCountriesStatistics {
    http: Arc<dyn HttpClient>,
    base_url: String,
    cache: CoalescingCache<String, LocationStats, LookupError>,
}

impl RestCountriesStatistics {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            cache: CoalescingCache::new(),
        }
    }

    pub fn from_config(http: Arc<dyn HttpClient>, config: &ServicesConfig) -> Self {
        Self::new(http, config.restcountries_url.clone())
    }

    pub fn cache(&self) -> &CoalescingCache<String, LocationStats, LookupError> {
        &self.cache
    }

    fn country_url(&self, query: &str) -> Result<String, LookupError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| LookupError::Network(format!("invalid statistics url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| LookupError::Network("statistics url cannot be a base".to_string()))?
            .pop_if_empty()
            .push("name")
            .push(query);
        Ok(url.to_string())
    }
}

impl StatisticsSource for RestCountriesStatistics {
    fn population_and_area(
        &self,
        location: &SearchResult,
    ) -> BoxFuture<'_, Result<LocationStats, LookupError>> {
        let key = location.location_key();
        let query = if location.country.trim().is_empty() {
            location.name.trim().to_string()
        } else {
            location.country.trim().to_string()
        };
        let fallback_label = location.name.clone();
        let url = self.country_url(&query);
        let http = Arc::clone(&self.http);

        Box::pin(async move {
            self.cache
                .get_or_fetch(key, move || async move {
                    let request = HttpRequest::get(url?)
                        .query("fullText", "true")
                        .query("fields", "name,population,area");
                    let resp = http.get(request).await?;
                    if let Err(err) = resp.check("statistics") {
                        warn!("statistics for {query:?} failed: {err}");
                        return Err(err);
                    }
                    let payload: Value = resp.json()?;
                    let stats = parse_stats(&payload, &fallback_label);
                    info!(
                        query = %query,
                        population = ?stats.population,
                        area = ?stats.area,
                        "statistics loaded"
                    );
                    Ok(stats)
                })
                .await
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{RestCountriesStatistics, StatisticsSource, parse_stats};
    use crate::error::LookupError;
    use crate::http::scripted::ScriptedHttp;
    use crate::model::{LocationStats, SearchResult};

    const DENMARK: &str = r#"[{"name":{"common":"Denmark","official":"Kingdom of Denmark"},"population":5831404,"area":43094.0}]"#;

    fn copenhagen() -> SearchResult {
        let mut r = SearchResult::new("Copenhagen", 55.6761, 12.5683);
        r.country = "Denmark".into();
        r
    }

    #[test]
    fn parses_lenient_numbers() {
        let stats = parse_stats(
            &json!({"name": {"common": ""}, "population": "12", "area": null}),
            "Somewhere",
        );
        assert_eq!(
            stats,
            LocationStats {
                population: Some(12.0),
                area: None,
                label: "Somewhere".into(),
            }
        );
    }

    #[tokio::test]
    async fn fetches_country_statistics() {
        let http = ScriptedHttp::ok(DENMARK);
        let source = RestCountriesStatistics::new(Arc::new(http.clone()), "https://rc.test/v3.1");

        let stats = source.population_and_area(&copenhagen()).await.expect("stats");
        assert_eq!(
            stats,
            LocationStats {
                population: Some(5_831_404.0),
                area: Some(43_094.0),
                label: "Denmark".into(),
            }
        );

        let requests = http.requests();
        assert_eq!(requests[0].url, "https://rc.test/v3.1/name/Denmark");
        assert_eq!(requests[0].query_value("fullText"), Some("true"));
        assert_eq!(requests[0].query_value("fields"), Some("name,population,area"));
    }

    #[tokio::test]
    async fn encodes_the_lookup_name() {
        let http = ScriptedHttp::ok("[]");
        let source = RestCountriesStatistics::new(Arc::new(http.clone()), "https://rc.test/v3.1/");

        let stats = source
            .population_and_area(&SearchResult::new("Côte d'Ivoire", 7.5, -5.5))
            .await
            .expect("stats");
        assert_eq!(stats.label, "Côte d'Ivoire");
        assert_eq!(stats.population, None);
        assert_eq!(
            http.requests()[0].url,
            "https://rc.test/v3.1/name/C%C3%B4te%20d'Ivoire"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_lookups_share_one_request() {
        let http = ScriptedHttp::ok(DENMARK).with_delay(Duration::from_millis(100));
        let source = RestCountriesStatistics::new(Arc::new(http.clone()), "https://rc.test/v3.1");
        let location = copenhagen();

        let (a, b) = tokio::join!(
            source.population_and_area(&location),
            source.population_and_area(&location),
        );
        assert_eq!(a, b);
        assert!(a.is_ok());
        assert_eq!(http.request_count(), 1);

        source.population_and_area(&location).await.expect("cached");
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_memoized() {
        let http = ScriptedHttp::new(vec![(429, ""), (200, DENMARK)]);
        let source = RestCountriesStatistics::new(Arc::new(http.clone()), "https://rc.test/v3.1");

        assert_eq!(
            source.population_and_area(&copenhagen()).await,
            Err(LookupError::RateLimited)
        );
        let stats = source.population_and_area(&copenhagen()).await.expect("retry");
        assert_eq!(stats.label, "Denmark");
        assert_eq!(http.request_count(), 2);
    }
}
