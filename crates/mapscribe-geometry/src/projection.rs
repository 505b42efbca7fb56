//! Conversion between geographic coordinates and the map's pixel frame.
//!
//! Transforms run in pixel space of the current view, so results are planar
//! approximations that are only meaningful near the current zoom and viewport.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::coords::{LatLng, Point};

/// Web Mercator earth radius in metres
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude limit of the square Web Mercator world
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Metres per degree of latitude (used for circle extents)
pub const METRES_PER_DEGREE: f64 = 111_319.49;

/// Tile size at zoom 0
const TILE_SIZE: f64 = 256.0;

/// Maps geographic coordinates to pixels and back
pub trait Projection {
    fn project(&self, ll: LatLng) -> Point;
    fn unproject(&self, p: Point) -> LatLng;
}

/// Spherical Web Mercator at a given zoom, offset by a pixel origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WebMercatorView {
    pub zoom: f64,
    pub pixel_origin: Point,
}

impl WebMercatorView {
    /// View whose pixel origin sits at the world origin
    pub fn new(zoom: f64) -> Self {
        Self {
            zoom,
            pixel_origin: Point::default(),
        }
    }

    /// View of `size` pixels centred on `center`
    pub fn centered(center: LatLng, zoom: f64, size: Point) -> Self {
        let world = Self::new(zoom).project(center);
        Self {
            zoom,
            pixel_origin: world.sub(size.scale(0.5)),
        }
    }

    fn scale(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }
}

impl Default for WebMercatorView {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Projection for WebMercatorView {
    fn project(&self, ll: LatLng) -> Point {
        let d = PI / 180.0;
        let lat = ll.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin = (lat * d).sin();
        let mx = EARTH_RADIUS * ll.lng * d;
        let my = EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;

        // EPSG:3857 transformation onto the unit square, then scaled by zoom
        let k = 0.5 / (PI * EARTH_RADIUS);
        let s = self.scale();
        let x = s * (k * mx + 0.5);
        let y = s * (-k * my + 0.5);
        Point::new(x, y).sub(self.pixel_origin)
    }

    fn unproject(&self, p: Point) -> LatLng {
        let world = p.add(self.pixel_origin);
        let k = 0.5 / (PI * EARTH_RADIUS);
        let s = self.scale();
        let mx = (world.x / s - 0.5) / k;
        let my = (world.y / s - 0.5) / -k;

        let d = 180.0 / PI;
        let lat = (2.0 * (my / EARTH_RADIUS).exp().atan() - PI / 2.0) * d;
        let lng = mx * d / EARTH_RADIUS;
        LatLng::new(lat, lng)
    }
}

/// Pixel length of a north-pointing radius of `metres` from `center`
pub fn radius_to_pixels<P: Projection + ?Sized>(proj: &P, center: LatLng, metres: f64) -> f64 {
    let top = LatLng::new(center.lat + metres / METRES_PER_DEGREE, center.lng);
    proj.project(center).distance_to(proj.project(top))
}
