//! Spherical geodesy.
//!
//! Distances use a mean-radius sphere, not the WGS84 ellipsoid; expect up to
//! ~0.5% deviation from ellipsoidal results.

use std::fmt;
use std::str::FromStr;

/// Mean Earth radius (kilometers).
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Statute miles per kilometer.
pub const MILES_PER_KM: f64 = 0.621371;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Finite and inside `[-90, 90] x [-180, 180]`.
    pub fn is_valid(self) -> bool {
        self.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    /// Short code shown next to formatted values.
    pub fn code(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles => "mi",
        }
    }

    pub fn from_km(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::Miles => km * MILES_PER_KM,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownUnit(pub String);

impl fmt::Display for UnknownUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown distance unit: {:?} (expected km or mi)", self.0)
    }
}

impl std::error::Error for UnknownUnit {}

impl FromStr for DistanceUnit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" | "kilometer" | "kilometers" | "kilometre" | "kilometres" => {
                Ok(DistanceUnit::Kilometers)
            }
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            _ => Err(UnknownUnit(s.to_string())),
        }
    }
}

/// Great-circle distance between two positions (haversine).
///
/// Returns `0.0` when any input is non-finite: pending points contribute
/// nothing to a journey total.
pub fn distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64, unit: DistanceUnit) -> f64 {
    if ![lat1, lng1, lat2, lng2].iter().all(|v| v.is_finite()) {
        return 0.0;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push `a` past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    unit.from_km(EARTH_RADIUS_KM * c)
}

pub fn distance_between(a: LatLng, b: LatLng, unit: DistanceUnit) -> f64 {
    distance(a.lat, a.lng, b.lat, b.lng, unit)
}

/// Great-circle midpoint.
///
/// Antipodal inputs have no unique midpoint; the result there is whatever
/// the bearing vectors produce.
pub fn midpoint(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> LatLng {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let lng1_rad = lng1.to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let bx = lat2.cos() * d_lng.cos();
    let by = lat2.cos() * d_lng.sin();

    let mid_lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let mid_lng = lng1_rad + by.atan2(lat1.cos() + bx);

    LatLng::new(mid_lat.to_degrees(), mid_lng.to_degrees())
}

pub fn midpoint_between(a: LatLng, b: LatLng) -> LatLng {
    midpoint(a.lat, a.lng, b.lat, b.lng)
}

/// Render a distance with at most one fractional digit, grouped thousands
/// and the unit code: `1,599.9 km`, `12 mi`.
pub fn format_distance(value: f64, unit: DistanceUnit) -> String {
    format!("{} {}", format_number(value), unit.code())
}

/// Grouped thousands, at most one fractional digit (half away from zero).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    let tenths = (value.abs() * 10.0).round();
    let negative = value < 0.0 && tenths > 0.0;
    let whole = (tenths / 10.0).trunc();
    let frac = (tenths - whole * 10.0) as u8;

    let digits = format!("{whole:.0}");
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    if negative {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if frac > 0 {
        out.push('.');
        out.push(char::from(b'0' + frac));
    }
    out
}
