use std::fmt;
use std::str::FromStr;

use crate::point::GeoPoint;

/// What the journey panel compares between consecutive stops.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ComparisonMode {
    #[default]
    Distance,
    Population,
    Area,
}

impl ComparisonMode {
    /// Population and area need statistics hydration; distance does not.
    pub fn requires_statistics(self) -> bool {
        !matches!(self, ComparisonMode::Distance)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonMode::Distance => "distance",
            ComparisonMode::Population => "population",
            ComparisonMode::Area => "area",
        }
    }
}

impl fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownComparisonMode(pub String);

impl fmt::Display for UnknownComparisonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown comparison mode: {:?} (expected distance, population or area)",
            self.0
        )
    }
}

impl std::error::Error for UnknownComparisonMode {}

impl FromStr for ComparisonMode {
    type Err = UnknownComparisonMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distance" => Ok(ComparisonMode::Distance),
            "population" | "pop" => Ok(ComparisonMode::Population),
            "area" => Ok(ComparisonMode::Area),
            _ => Err(UnknownComparisonMode(s.to_string())),
        }
    }
}

/// Population or area of one leg's endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct StatComparison {
    pub from: usize,
    pub to: usize,
    pub from_value: Option<f64>,
    pub to_value: Option<f64>,
    /// `to / from`; `None` when either side is unknown or `from` is zero.
    pub ratio: Option<f64>,
    /// `to - from`; `None` when either side is unknown.
    pub difference: Option<f64>,
}

fn stat_value(point: &GeoPoint, mode: ComparisonMode) -> Option<f64> {
    let stats = point.stats.as_ref()?;
    match mode {
        ComparisonMode::Population => stats.population,
        ComparisonMode::Area => stats.area,
        ComparisonMode::Distance => None,
    }
}

/// One entry per consecutive pair. Empty for `ComparisonMode::Distance`.
pub fn compare_stats(points: &[GeoPoint], mode: ComparisonMode) -> Vec<StatComparison> {
    if !mode.requires_statistics() {
        return Vec::new();
    }

    points
        .windows(2)
        .enumerate()
        .map(|(i, pair)| {
            let from_value = stat_value(&pair[0], mode);
            let to_value = stat_value(&pair[1], mode);
            let (ratio, difference) = match (from_value, to_value) {
                (Some(a), Some(b)) => ((a != 0.0).then(|| b / a), Some(b - a)),
                _ => (None, None),
            };
            StatComparison {
                from: i,
                to: i + 1,
                from_value,
                to_value,
                ratio,
                difference,
            }
        })
        .collect()
}
