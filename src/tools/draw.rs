//! Shapes produced by the drawing toolbar.

use serde::{Deserialize, Serialize};

use mapscribe_core::{PathKind, Shape, Style};
use mapscribe_geometry::transform::MIN_RADIUS;
use mapscribe_geometry::{LatLng, LatLngBounds, Ring};

/// Raw toolbar output, before it becomes a scene shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawnShape {
    Marker {
        at: LatLng,
        #[serde(default)]
        label: Option<String>,
    },
    Circle {
        center: LatLng,
        /// Metres
        radius: f64,
    },
    Polyline {
        points: Vec<LatLng>,
    },
    Polygon {
        rings: Vec<Ring>,
    },
    Rectangle {
        bounds: LatLngBounds,
    },
    /// Fixed-pixel-radius dot; not supported and dropped
    CircleMarker {
        center: LatLng,
    },
}

impl DrawnShape {
    pub fn name(&self) -> &'static str {
        match self {
            DrawnShape::Marker { .. } => "marker",
            DrawnShape::Circle { .. } => "circle",
            DrawnShape::Polyline { .. } => "polyline",
            DrawnShape::Polygon { .. } => "polygon",
            DrawnShape::Rectangle { .. } => "rectangle",
            DrawnShape::CircleMarker { .. } => "circle_marker",
        }
    }

    /// Build a scene shape styled from the style panel. Returns `None` for
    /// circle markers and for paths without vertices.
    pub fn into_shape(self, style: &Style) -> Option<Shape> {
        let shape = match self {
            DrawnShape::Marker { at, label } => Shape::marker(at, label, style.color.clone(), style.opacity),
            DrawnShape::Circle { center, radius } => {
                let radius = if radius.is_finite() { radius.max(MIN_RADIUS) } else { MIN_RADIUS };
                Shape::circle(center, radius, style.clone())
            }
            DrawnShape::Polyline { points } => {
                if points.is_empty() {
                    return None;
                }
                Shape::path(PathKind::Polyline, vec![points], style.clone())
            }
            DrawnShape::Polygon { rings } => {
                let rings: Vec<Ring> = rings.into_iter().filter(|r| !r.is_empty()).collect();
                if rings.is_empty() {
                    return None;
                }
                Shape::path(PathKind::Polygon, rings, style.clone())
            }
            DrawnShape::Rectangle { bounds } => {
                Shape::path(PathKind::Rectangle, vec![bounds.corners().to_vec()], style.clone())
            }
            DrawnShape::CircleMarker { .. } => return None,
        };
        Some(shape)
    }
}
