use std::sync::Arc;

use futures_util::future::join_all;
use services::{
    GeolocationOptions, Geolocator, GeometrySource, HttpClient, NominatimGeocoder,
    NominatimGeometry, RestCountriesStatistics, SearchDebouncer, ServicesConfig,
    StatisticsSource, geolocation_options, geolocator_from_config,
};
use tracing::debug;

use crate::hydration::{HydrationOutcome, HydrationRequest};

/// The enrichment capabilities a planner talks to. Cheap to clone.
#[derive(Clone)]
pub struct Services {
    pub search: Arc<SearchDebouncer>,
    pub statistics: Arc<dyn StatisticsSource>,
    pub geometry: Arc<dyn GeometrySource>,
    pub geolocator: Arc<dyn Geolocator>,
    pub geolocation: GeolocationOptions,
}

impl Services {
    /// Production wiring: Nominatim, REST Countries and the configured
    /// geolocation provider, all over `http`.
    pub fn from_config(http: Arc<dyn HttpClient>, config: &ServicesConfig) -> Self {
        let geocoder = Arc::new(NominatimGeocoder::from_config(Arc::clone(&http), config));
        Self {
            search: Arc::new(SearchDebouncer::from_config(geocoder, config)),
            statistics: Arc::new(RestCountriesStatistics::from_config(
                Arc::clone(&http),
                config,
            )),
            geometry: Arc::new(NominatimGeometry::from_config(http, config)),
            geolocator: geolocator_from_config(config),
            geolocation: geolocation_options(config),
        }
    }

    /// Run the lookups of `request` concurrently.
    pub async fn hydrate(&self, request: HydrationRequest) -> HydrationOutcome {
        let HydrationRequest {
            index,
            key,
            location,
            statistics,
            geometry,
        } = request;
        debug!(index, key = %key, statistics, geometry, "hydrating stop");

        let stats = async {
            if statistics {
                Some(self.statistics.population_and_area(&location).await)
            } else {
                None
            }
        };
        let region = async {
            if geometry {
                Some(self.geometry.region_geometry(&location).await)
            } else {
                None
            }
        };
        let (statistics, geometry) = tokio::join!(stats, region);

        HydrationOutcome {
            index,
            key,
            statistics,
            geometry,
        }
    }

    /// Hydrate every request concurrently; outcomes come back in order.
    pub async fn hydrate_all(&self, requests: Vec<HydrationRequest>) -> Vec<HydrationOutcome> {
        join_all(requests.into_iter().map(|r| self.hydrate(r))).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use services::{
        BoxFuture, GENERIC_FAILURE_MESSAGE, HttpClient, HttpRequest, HttpResponse, LookupError,
        SearchResult, ServicesConfig, UnsupportedGeolocator,
    };

    use super::Services;
    use super::fakes::{FakeGeocoder, FakeStatistics, Fakes};
    use crate::hydration::HydrationRequest;

    struct Offline;

    impl HttpClient for Offline {
        fn get(&self, _request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, LookupError>> {
            Box::pin(async { Err(LookupError::Network("offline".into())) })
        }
    }

    fn request(name: &str, country: &str, statistics: bool, geometry: bool) -> HydrationRequest {
        let mut location = SearchResult::new(name, 10.0, 20.0);
        location.country = country.into();
        HydrationRequest {
            index: 0,
            key: location.location_key(),
            location,
            statistics,
            geometry,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hydrates_only_what_was_asked() {
        let fakes = Fakes::new(
            FakeStatistics::default().with("France", 68e6, 551_695.0),
            FakeGeocoder::default(),
        );
        let services = fakes.services(Arc::new(UnsupportedGeolocator));

        let outcome = services.hydrate(request("Paris", "France", true, false)).await;
        assert_eq!(outcome.key, "Paris_10.000_20.000");
        assert_eq!(
            outcome.statistics.and_then(Result::ok).and_then(|s| s.population),
            Some(68e6)
        );
        assert_eq!(outcome.geometry, None);
        assert_eq!(fakes.geometry.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hydrate_all_keeps_order() {
        let fakes = Fakes::new(FakeStatistics::default(), FakeGeocoder::default());
        let services = fakes.services(Arc::new(UnsupportedGeolocator));

        let outcomes = services
            .hydrate_all(vec![
                request("Atlantis", "", false, true),
                request("Lyon", "", false, true),
            ])
            .await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].geometry, Some(Ok(None)));
        assert!(matches!(&outcomes[1].geometry, Some(Ok(Some(_)))));
    }

    #[tokio::test]
    async fn production_wiring_reports_network_failures() {
        let services = Services::from_config(Arc::new(Offline), &ServicesConfig::default());
        let outcome = services.hydrate(request("Paris", "France", true, true)).await;

        assert_eq!(
            outcome.statistics,
            Some(Err(LookupError::Network("offline".into())))
        );
        assert_eq!(
            outcome.error_message().as_deref(),
            Some(GENERIC_FAILURE_MESSAGE)
        );
    }
}
