//! Geographic and pixel coordinate types.

use serde::{Deserialize, Serialize};

/// Latitude limit for the map centre
pub const VIEW_LATITUDE_LIMIT: f64 = 85.0;

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Clamp latitude to [`VIEW_LATITUDE_LIMIT`] and wrap longitude into
    /// [-180, 180], keeping the map on one copy of the world
    pub fn clamp_to_world(self) -> LatLng {
        let lat = self.lat.clamp(-VIEW_LATITUDE_LIMIT, VIEW_LATITUDE_LIMIT);
        let lng = if (-180.0..=180.0).contains(&self.lng) {
            self.lng
        } else {
            (self.lng + 180.0).rem_euclid(360.0) - 180.0
        };
        LatLng::new(lat, lng)
    }

    /// Arithmetic mean of a set of coordinates, `None` when empty
    pub fn mean<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<LatLng> {
        let mut lat = 0.0;
        let mut lng = 0.0;
        let mut count = 0usize;
        for p in points {
            lat += p.lat;
            lng += p.lng;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(LatLng::new(lat / count as f64, lng / count as f64))
    }
}

/// A point in the map's projected pixel frame (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn scale(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// Rotate about the origin by `rad` (counter-clockwise in a y-up frame)
    pub fn rotate(self, rad: f64) -> Point {
        let (sin, cos) = rad.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(self, other: Point) -> f64 {
        self.sub(other).length()
    }

    /// `atan2` angle of this point as seen from `center`
    pub fn angle_from(self, center: Point) -> f64 {
        (self.y - center.y).atan2(self.x - center.x)
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

/// Geographic bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    /// Degenerate box at a single point
    pub fn at(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    /// Envelope of a set of coordinates, `None` when empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::at(*first);
        for p in iter {
            bounds.extend(*p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lng);
        self.east = self.east.max(p.lng);
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south, self.east)
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    /// Corners clockwise from the north-west
    pub fn corners(&self) -> [LatLng; 4] {
        [
            self.north_west(),
            self.north_east(),
            self.south_east(),
            self.south_west(),
        ]
    }

    pub fn center(&self) -> LatLng {
        LatLng::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }
}
