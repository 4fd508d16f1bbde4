use foundation::{DistanceUnit, LatLng, distance_between, format_distance, midpoint_between};

use crate::point::GeoPoint;

/// One drawable leg between consecutive stops.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub from: usize,
    pub to: usize,
    pub start: LatLng,
    pub end: LatLng,
    pub distance: f64,
    /// Anchor for the leg's distance label.
    pub midpoint: LatLng,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JourneySummary {
    pub total: f64,
    pub unit: DistanceUnit,
    pub formatted: String,
    pub route: Vec<String>,
}

/// Sum of leg distances in stop order. Recomputed from scratch every call.
pub fn total_distance(points: &[GeoPoint], unit: DistanceUnit) -> f64 {
    points
        .windows(2)
        .map(|pair| distance_between(pair[0].position(), pair[1].position(), unit))
        .sum()
}

/// Legs whose endpoints both have a location; pending stops produce no arc.
pub fn segments(points: &[GeoPoint], unit: DistanceUnit) -> Vec<Segment> {
    points
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| !pair[0].is_pending() && !pair[1].is_pending())
        .map(|(i, pair)| {
            let start = pair[0].position();
            let end = pair[1].position();
            let distance = distance_between(start, end, unit);
            Segment {
                from: i,
                to: i + 1,
                start,
                end,
                distance,
                midpoint: midpoint_between(start, end),
                label: format_distance(distance, unit),
            }
        })
        .collect()
}

pub fn summarize(points: &[GeoPoint], unit: DistanceUnit) -> JourneySummary {
    let total = total_distance(points, unit);
    JourneySummary {
        total,
        unit,
        formatted: format_distance(total, unit),
        route: points.iter().map(|p| p.name.clone()).collect(),
    }
}
