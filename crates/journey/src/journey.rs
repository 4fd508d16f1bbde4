use std::sync::Arc;

use foundation::{DistanceUnit, stop_label};
use tracing::debug;

use crate::comparison::{ComparisonMode, StatComparison, compare_stats};
use crate::point::{EnrichmentStatus, GeoPoint};
use crate::segments::{JourneySummary, Segment, segments, summarize, total_distance};

/// A journey never shrinks below this many stops.
pub const MIN_POINTS: usize = 2;

pub const CUSTOM_PIN_PREFIX: &str = "Custom Pin";
pub const CURRENT_LOCATION_NAME: &str = "Current Location";

pub fn default_points() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new("Copenhagen", 55.6761, 12.5683).with_country("Denmark"),
        GeoPoint::new("Moscow", 55.7558, 37.6173).with_country("Russia"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyError {
    IndexOutOfRange { index: usize, len: usize },
    TooFewPoints { len: usize },
}

impl std::fmt::Display for JourneyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JourneyError::IndexOutOfRange { index, len } => {
                write!(f, "stop index {index} out of range (journey has {len} stops)")
            }
            JourneyError::TooFewPoints { len } => {
                write!(f, "a journey needs at least {MIN_POINTS} stops, got {len}")
            }
        }
    }
}

impl std::error::Error for JourneyError {}

/// Ordered stops plus the index awaiting a map click.
///
/// The stop list is copy-on-write: `snapshot()` hands out a shared list that
/// later mutations never touch, so a renderer can hold on to it freely.
#[derive(Debug, Clone)]
pub struct Journey {
    points: Arc<Vec<GeoPoint>>,
    active: Option<usize>,
    revision: u64,
}

impl Default for Journey {
    fn default() -> Self {
        Self {
            points: Arc::new(default_points()),
            active: None,
            revision: 0,
        }
    }
}

impl Journey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<GeoPoint>) -> Result<Self, JourneyError> {
        if points.len() < MIN_POINTS {
            return Err(JourneyError::TooFewPoints { len: points.len() });
        }
        Ok(Self {
            points: Arc::new(points),
            active: None,
            revision: 0,
        })
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn snapshot(&self) -> Arc<Vec<GeoPoint>> {
        Arc::clone(&self.points)
    }

    pub fn get(&self, index: usize) -> Option<&GeoPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Never true: a journey keeps at least [`MIN_POINTS`] stops.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Increases on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn check_index(&self, index: usize) -> Result<(), JourneyError> {
        if index < self.points.len() {
            Ok(())
        } else {
            Err(JourneyError::IndexOutOfRange {
                index,
                len: self.points.len(),
            })
        }
    }

    fn points_mut(&mut self) -> &mut Vec<GeoPoint> {
        self.revision += 1;
        Arc::make_mut(&mut self.points)
    }

    /// Replace stop `index` with a resolved location and leave edit mode.
    pub fn select(&mut self, index: usize, point: GeoPoint) -> Result<(), JourneyError> {
        self.replace(index, point)?;
        self.active = None;
        Ok(())
    }

    /// Replace stop `index` without touching the active index.
    pub fn replace(&mut self, index: usize, point: GeoPoint) -> Result<(), JourneyError> {
        self.check_index(index)?;
        debug!(index, name = %point.name, "journey: replace stop");
        self.points_mut()[index] = point;
        Ok(())
    }

    /// Edit a stop in place (hydration results, status flags).
    pub fn update<F>(&mut self, index: usize, f: F) -> Result<(), JourneyError>
    where
        F: FnOnce(&mut GeoPoint),
    {
        self.check_index(index)?;
        f(&mut self.points_mut()[index]);
        Ok(())
    }

    /// Append a placeholder copied from the last stop and make it active.
    ///
    /// Returns the new stop's index.
    pub fn append(&mut self) -> usize {
        let len = self.points.len();
        let mut point = self.points[len - 1].clone();
        point.name = format!("Stop {}", len + 1);
        point.status = EnrichmentStatus::Idle;

        self.points_mut().push(point);
        self.active = Some(len);
        debug!(index = len, "journey: appended stop");
        len
    }

    /// Remove stop `index`. A no-op at the minimum length or for an unknown
    /// index; returns whether anything was removed.
    pub fn remove(&mut self, index: usize) -> bool {
        let len = self.points.len();
        if len <= MIN_POINTS || index >= len {
            return false;
        }

        self.points_mut().remove(index);
        self.active = match self.active {
            Some(a) if a == index => None,
            Some(a) if a > index => Some(a - 1),
            other => other,
        };
        debug!(index, active = ?self.active, "journey: removed stop");
        true
    }

    pub fn reverse(&mut self) {
        let len = self.points.len();
        self.points_mut().reverse();
        self.active = self.active.map(|a| len - 1 - a);
        debug!(active = ?self.active, "journey: reversed");
    }

    pub fn set_active(&mut self, index: usize) -> Result<(), JourneyError> {
        self.check_index(index)?;
        self.active = Some(index);
        Ok(())
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Drop a custom pin at the active stop.
    ///
    /// Ignored without an active index or with non-finite coordinates.
    pub fn move_active(&mut self, lat: f64, lng: f64) -> bool {
        let Some(index) = self.active else {
            return false;
        };
        if !lat.is_finite() || !lng.is_finite() {
            return false;
        }

        let name = format!("{CUSTOM_PIN_PREFIX} {}", stop_label(index));
        debug!(index, lat, lng, "journey: custom pin");
        self.points_mut()[index] = GeoPoint::new(name, lat, lng);
        true
    }

    /// Back to the two default stops with nothing active.
    pub fn reset(&mut self) {
        self.revision += 1;
        self.points = Arc::new(default_points());
        self.active = None;
        debug!("journey: reset");
    }

    pub fn total_distance(&self, unit: DistanceUnit) -> f64 {
        total_distance(&self.points, unit)
    }

    pub fn segments(&self, unit: DistanceUnit) -> Vec<Segment> {
        segments(&self.points, unit)
    }

    pub fn summary(&self, unit: DistanceUnit) -> JourneySummary {
        summarize(&self.points, unit)
    }

    pub fn comparisons(&self, mode: ComparisonMode) -> Vec<StatComparison> {
        compare_stats(&self.points, mode)
    }
}
