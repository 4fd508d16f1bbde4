use std::collections::HashMap;

use foundation::DistanceUnit;
use journey::{
    CURRENT_LOCATION_NAME, ComparisonMode, EnrichmentStatus, GeoPoint, Journey, JourneyError,
    JourneySummary, RegionRef, Segment, StatComparison,
};
use services::{Feature, GeolocationError, SearchOutcome, SearchResult};
use tracing::{debug, info, warn};

use crate::enrichment::Services;
use crate::hydration::{HydrationOutcome, HydrationRequest, point_from_result, point_stats};
use crate::view::GlobeView;

/// Drives one journey-planning session.
///
/// All state changes go through `&mut self`. Lookups are split so the
/// planner is never borrowed while the network is busy: a mutation returns
/// [`HydrationRequest`]s, [`Services::hydrate`] resolves them, and
/// [`Planner::apply_hydration`] folds the outcome back in, dropping it when
/// the stop it was meant for is gone.
pub struct Planner<V> {
    journey: Journey,
    unit: DistanceUnit,
    mode: ComparisonMode,
    location_error: Option<String>,
    regions: HashMap<RegionRef, Feature>,
    in_flight: HashMap<String, InFlight>,
    services: Services,
    view: V,
}

/// Lookups still out for one location key.
#[derive(Debug, Default)]
struct InFlight {
    lookups: usize,
    statistics: bool,
    error: Option<String>,
}

impl<V: GlobeView> Planner<V> {
    pub fn new(services: Services, view: V) -> Self {
        Self::with_journey(Journey::new(), services, view)
    }

    pub fn with_journey(journey: Journey, services: Services, view: V) -> Self {
        Self {
            journey,
            unit: DistanceUnit::default(),
            mode: ComparisonMode::default(),
            location_error: None,
            regions: HashMap::new(),
            in_flight: HashMap::new(),
            services,
            view,
        }
    }

    pub fn journey(&self) -> &Journey {
        &self.journey
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    pub fn comparison_mode(&self) -> ComparisonMode {
        self.mode
    }

    /// Message from the last failed current-location request.
    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Region outline attached to stop `index`, if one was loaded.
    pub fn region(&self, index: usize) -> Option<&Feature> {
        let region = self.journey.get(index)?.region.as_ref()?;
        self.regions.get(region)
    }

    pub fn summary(&self) -> JourneySummary {
        self.journey.summary(self.unit)
    }

    pub fn segments(&self) -> Vec<Segment> {
        self.journey.segments(self.unit)
    }

    pub fn comparisons(&self) -> Vec<StatComparison> {
        self.journey.comparisons(self.mode)
    }

    /// Put a search result at stop `index`.
    pub fn select(
        &mut self,
        index: usize,
        result: &SearchResult,
    ) -> Result<Vec<HydrationRequest>, JourneyError> {
        self.journey.select(index, point_from_result(result))?;
        info!(index, name = %result.name, "stop selected");

        let statistics = self.mode.requires_statistics();
        Ok(self.request(index, statistics, true).into_iter().collect())
    }

    pub fn append(&mut self) -> usize {
        self.journey.append()
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.journey.remove(index)
    }

    pub fn reverse(&mut self) {
        self.journey.reverse();
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), JourneyError> {
        self.journey.set_active(index)
    }

    pub fn clear_active(&mut self) {
        self.journey.clear_active();
    }

    /// A click on the globe drops a custom pin at the active stop.
    pub fn handle_map_click(&mut self, lat: f64, lng: f64) -> bool {
        self.journey.move_active(lat, lng)
    }

    pub fn set_unit(&mut self, unit: DistanceUnit) {
        debug!(unit = %unit, "unit changed");
        self.unit = unit;
    }

    /// Switch comparison mode; statistics-based modes request figures for
    /// every stop that lacks them and has none on the way.
    pub fn set_comparison_mode(&mut self, mode: ComparisonMode) -> Vec<HydrationRequest> {
        debug!(mode = %mode, "comparison mode changed");
        self.mode = mode;
        if !mode.requires_statistics() {
            return Vec::new();
        }

        let missing: Vec<usize> = self
            .journey
            .points()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.stats.is_none())
            .map(|(i, _)| i)
            .collect();
        missing
            .into_iter()
            .filter_map(|index| self.request(index, true, false))
            .collect()
    }

    fn request(
        &mut self,
        index: usize,
        statistics: bool,
        geometry: bool,
    ) -> Option<HydrationRequest> {
        let point = self.journey.get(index)?;
        if point.is_pending() {
            return None;
        }
        let key = point.location_key();
        let statistics = statistics
            && point.country.as_deref().is_some_and(|c| !c.is_empty())
            && !self.in_flight.get(&key).is_some_and(|f| f.statistics);
        if !statistics && !geometry {
            return None;
        }

        let request = HydrationRequest::for_point(index, point, statistics, geometry);
        let entry = self.in_flight.entry(key).or_default();
        entry.lookups += 1;
        entry.statistics |= statistics;
        self.journey
            .update(index, |p| p.status = EnrichmentStatus::Loading)
            .ok()?;
        Some(request)
    }

    /// Fold a lookup outcome into every stop still carrying its location key.
    ///
    /// Stops stay `Loading` until the last lookup for their key lands.
    /// Returns `false` when no such stop is left.
    pub fn apply_hydration(&mut self, outcome: HydrationOutcome) -> bool {
        let error = outcome.error_message();
        if let Some(msg) = &error {
            warn!(key = %outcome.key, "hydration failed: {msg}");
        }
        let status = match self.in_flight.get_mut(&outcome.key) {
            Some(entry) => {
                entry.lookups = entry.lookups.saturating_sub(1);
                if outcome.statistics.is_some() {
                    entry.statistics = false;
                }
                if entry.error.is_none() {
                    entry.error = error;
                }
                if entry.lookups > 0 {
                    None
                } else {
                    self.in_flight.remove(&outcome.key).map(|e| settled(e.error))
                }
            }
            None => Some(settled(error)),
        };

        let targets: Vec<usize> = self
            .journey
            .points()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.location_key() == outcome.key)
            .map(|(i, _)| i)
            .collect();
        if targets.is_empty() {
            debug!(key = %outcome.key, "discarding stale hydration");
            return false;
        }

        let stats = match outcome.statistics {
            Some(Ok(stats)) => Some(point_stats(stats)),
            _ => None,
        };
        let region = match outcome.geometry {
            Some(Ok(Some(feature))) => {
                let region = RegionRef(outcome.key.clone());
                self.regions.insert(region.clone(), feature);
                Some(region)
            }
            _ => None,
        };

        let mut applied = false;
        for index in targets {
            applied |= self
                .journey
                .update(index, |p| {
                    if let Some(stats) = &stats {
                        p.stats = Some(stats.clone());
                    }
                    if let Some(region) = &region {
                        p.region = Some(region.clone());
                    }
                    if let Some(status) = &status {
                        p.status = status.clone();
                    }
                })
                .is_ok();
        }
        applied
    }

    /// Resolve and apply `requests`; returns how many outcomes landed.
    pub async fn hydrate(&mut self, requests: Vec<HydrationRequest>) -> usize {
        if requests.is_empty() {
            return 0;
        }
        let outcomes = self.services.hydrate_all(requests).await;
        let mut applied = 0;
        for outcome in outcomes {
            if self.apply_hydration(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Replace the first stop with the device position.
    ///
    /// On failure the journey is left alone and the message is kept for
    /// [`Planner::location_error`].
    pub async fn use_current_location(&mut self) -> Result<(), GeolocationError> {
        let position = self
            .services
            .geolocator
            .current_position(self.services.geolocation)
            .await;

        let result = position.and_then(|pos| {
            let point = GeoPoint::new(CURRENT_LOCATION_NAME, pos.lat, pos.lng);
            self.journey
                .replace(0, point)
                .map_err(|e| GeolocationError::Unavailable(e.to_string()))
        });
        match &result {
            Ok(()) => {
                info!("first stop set to the current location");
                self.location_error = None;
                self.view.reset_view();
            }
            Err(err) => {
                warn!("current location unavailable: {err}");
                self.location_error = Some(err.user_message());
            }
        }
        result
    }

    /// Back to the default journey and camera.
    pub fn reset_all(&mut self) {
        self.journey.reset();
        self.regions.clear();
        self.location_error = None;
        self.view.reset_view();
    }

    pub fn reset_view(&mut self) {
        self.view.reset_view();
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    /// Search for stop `index`. Typing the stop's current name is not a
    /// search; it only cancels whatever was pending.
    pub async fn search(&self, index: usize, query: &str) -> SearchOutcome {
        let unchanged = self
            .journey
            .get(index)
            .is_some_and(|p| p.name == query.trim());
        if unchanged {
            self.services.search.cancel();
            return SearchOutcome::Idle;
        }
        self.services.search.search(query).await
    }
}

fn settled(error: Option<String>) -> EnrichmentStatus {
    match error {
        Some(msg) => EnrichmentStatus::Failed(msg),
        None => EnrichmentStatus::Idle,
    }
}
