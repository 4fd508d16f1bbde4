use crate::math::LatLng;

/// Geographic bounding box in degrees.
///
/// `west > east` is allowed and means the box crosses the antimeridian.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        GeoBounds {
            south,
            north,
            west,
            east,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.south, self.north, self.west, self.east]
            .iter()
            .all(|v| v.is_finite())
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    pub fn contains(&self, p: LatLng) -> bool {
        if !p.is_finite() || p.lat < self.south || p.lat > self.north {
            return false;
        }
        if self.crosses_antimeridian() {
            p.lng >= self.west || p.lng <= self.east
        } else {
            p.lng >= self.west && p.lng <= self.east
        }
    }

    /// Closed exterior ring in GeoJSON `[lng, lat]` order, counter-clockwise.
    pub fn ring(&self) -> [[f64; 2]; 5] {
        [
            [self.west, self.south],
            [self.east, self.south],
            [self.east, self.north],
            [self.west, self.north],
            [self.west, self.south],
        ]
    }
}
