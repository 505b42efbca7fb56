//! Move, scale and rotate for shape geometry.
//!
//! Every operation is pure: it takes the geometry captured when a gesture
//! started (the origin) and returns the geometry for the current pointer
//! position. Callers recompute from the origin on each move, never from the
//! previous frame.

use serde::{Deserialize, Serialize};

use crate::coords::{LatLng, LatLngBounds, Point};
use crate::projection::{Projection, METRES_PER_DEGREE};

/// Smallest pixel distance the farthest vertex may shrink to during a scale
pub const MIN_EXTENT_PX: f64 = 2.0;

/// Smallest circle radius in metres
pub const MIN_RADIUS: f64 = 2.0;

/// One ring of vertices
pub type Ring = Vec<LatLng>;

/// The geometric part of a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// Single anchor (markers)
    Point(LatLng),
    /// Centre plus radius in metres
    Circle { center: LatLng, radius: f64 },
    /// Ordered rings (polylines, polygons, rectangles)
    Path(Vec<Ring>),
}

impl Geometry {
    /// Number of vertices, counting a circle's centre
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) | Geometry::Circle { .. } => 1,
            Geometry::Path(rings) => rings.iter().map(Vec::len).sum(),
        }
    }

    /// Iterate over every vertex in ring order
    pub fn vertices(&self) -> Box<dyn Iterator<Item = &LatLng> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::Circle { center, .. } => Box::new(std::iter::once(center)),
            Geometry::Path(rings) => Box::new(rings.iter().flatten()),
        }
    }

    /// Pivot for scale and rotate: anchor, centre, or vertex mean
    pub fn pivot(&self) -> Option<LatLng> {
        match self {
            Geometry::Point(p) => Some(*p),
            Geometry::Circle { center, .. } => Some(*center),
            Geometry::Path(rings) => LatLng::mean(rings.iter().flatten()),
        }
    }

    /// Geographic bounding box
    pub fn bounds(&self) -> Option<LatLngBounds> {
        match self {
            Geometry::Point(p) => Some(LatLngBounds::at(*p)),
            Geometry::Circle { center, radius } => Some(circle_bounds(*center, *radius)),
            Geometry::Path(rings) => LatLngBounds::from_points(rings.iter().flatten()),
        }
    }

    /// Whether scale gestures apply (markers have no extent)
    pub fn can_scale(&self) -> bool {
        !matches!(self, Geometry::Point(_))
    }

    /// Whether rotate gestures apply (only paths)
    pub fn can_rotate(&self) -> bool {
        matches!(self, Geometry::Path(_))
    }
}

/// Bounding box of a circle of `radius` metres
pub fn circle_bounds(center: LatLng, radius: f64) -> LatLngBounds {
    let lat_r = radius / METRES_PER_DEGREE;
    let cos = center.lat.to_radians().cos().abs().max(1e-9);
    let lng_r = lat_r / cos;
    LatLngBounds {
        south: center.lat - lat_r,
        west: center.lng - lng_r,
        north: center.lat + lat_r,
        east: center.lng + lng_r,
    }
}

fn map_rings(rings: &[Ring], mut f: impl FnMut(LatLng) -> LatLng) -> Vec<Ring> {
    rings
        .iter()
        .map(|ring| ring.iter().map(|ll| f(*ll)).collect())
        .collect()
}

/// Offset the origin geometry by `(dx, dy)` pixels
///
/// Circles move their centre only; the radius is untouched.
pub fn translate<P: Projection + ?Sized>(proj: &P, origin: &Geometry, dx: f64, dy: f64) -> Geometry {
    let delta = Point::new(dx, dy);
    let shift = |ll: LatLng| proj.unproject(proj.project(ll).add(delta));
    match origin {
        Geometry::Point(p) => Geometry::Point(shift(*p)),
        Geometry::Circle { center, radius } => Geometry::Circle {
            center: shift(*center),
            radius: *radius,
        },
        Geometry::Path(rings) => Geometry::Path(map_rings(rings, shift)),
    }
}

/// Clamp a scale factor so the origin path never collapses below
/// [`MIN_EXTENT_PX`] around `center`
pub fn clamp_scale_factor<P: Projection + ?Sized>(
    proj: &P,
    origin: &Geometry,
    center: LatLng,
    factor: f64,
) -> f64 {
    let factor = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
    let Geometry::Path(rings) = origin else {
        return factor;
    };
    let c = proj.project(center);
    let reach = rings
        .iter()
        .flatten()
        .map(|ll| proj.project(*ll).distance_to(c))
        .fold(0.0_f64, f64::max);
    if reach <= 0.0 {
        return factor;
    }
    factor.max((MIN_EXTENT_PX / reach).min(1.0))
}

/// Scale the origin geometry about `center` along the shape's own axes
///
/// Each vertex is un-rotated by `base_angle`, scaled, then re-rotated, so a
/// rotated rectangle keeps its right angles. Circles scale their radius,
/// floored at [`MIN_RADIUS`]. Markers are returned unchanged.
pub fn scale<P: Projection + ?Sized>(
    proj: &P,
    origin: &Geometry,
    center: LatLng,
    factor: f64,
    base_angle: f64,
) -> Geometry {
    match origin {
        Geometry::Point(p) => Geometry::Point(*p),
        Geometry::Circle { center: c, radius } => {
            let factor = if factor.is_finite() { factor } else { 1.0 };
            Geometry::Circle {
                center: *c,
                radius: (radius * factor).max(MIN_RADIUS),
            }
        }
        Geometry::Path(rings) => {
            let factor = clamp_scale_factor(proj, origin, center, factor);
            let c = proj.project(center);
            Geometry::Path(map_rings(rings, |ll| {
                let v = proj.project(ll).sub(c);
                let local = v.rotate(-base_angle).scale(factor);
                proj.unproject(local.rotate(base_angle).add(c))
            }))
        }
    }
}

/// Rotate the origin geometry about `center` by `delta` radians in pixel space
///
/// Markers and circles are returned unchanged.
pub fn rotate<P: Projection + ?Sized>(proj: &P, origin: &Geometry, center: LatLng, delta: f64) -> Geometry {
    match origin {
        Geometry::Point(_) | Geometry::Circle { .. } => origin.clone(),
        Geometry::Path(rings) => {
            let c = proj.project(center);
            Geometry::Path(map_rings(rings, |ll| {
                let v = proj.project(ll).sub(c).rotate(delta);
                proj.unproject(v.add(c))
            }))
        }
    }
}
