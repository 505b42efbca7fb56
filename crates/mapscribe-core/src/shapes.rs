//! Shape types for mapscribe.
//!
//! ShapeKind is the tagged union over markers, circles and paths. Each variant
//! owns its geometry so transforms and serialization match exhaustively on it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mapscribe_geometry::hit::{near_polyline, near_ring, point_in_ring};
use mapscribe_geometry::{radius_to_pixels, Geometry, LatLng, LatLngBounds, Point, Projection, Ring};

/// Pixel radius around a marker anchor that counts as a hit
pub const MARKER_HIT_RADIUS: f64 = 14.0;

/// Extra pixels around a stroke that still count as a hit
pub const STROKE_HIT_SLOP: f64 = 4.0;

/// Shape identifier - UUID for global uniqueness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stroke and fill style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Stroke colour as a CSS colour string
    pub color: String,
    /// Stroke width in pixels
    pub weight: f64,
    pub opacity: f64,
    pub fill: bool,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            color: "#ff0000".to_string(),
            weight: 3.0,
            opacity: 1.0,
            fill: true,
            fill_color: "#ff0000".to_string(),
            fill_opacity: 0.2,
        }
    }
}

/// Which drawing tool produced a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    #[default]
    Polyline,
    Polygon,
    Rectangle,
}

impl PathKind {
    /// Whether the rings are closed (filled) areas
    pub fn is_closed(self) -> bool {
        !matches!(self, PathKind::Polyline)
    }

    pub fn name(self) -> &'static str {
        match self {
            PathKind::Polyline => "Polyline",
            PathKind::Polygon => "Polygon",
            PathKind::Rectangle => "Rectangle",
        }
    }
}

/// Different kinds of annotation on the map
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// Pin marker with an optional permanent label
    Marker {
        at: LatLng,
        label: Option<String>,
        color: String,
        opacity: f64,
    },
    /// Circle with radius in metres
    Circle {
        center: LatLng,
        radius: f64,
        style: Style,
    },
    /// Polyline, polygon or rectangle, carrying its accumulated rotation
    Path {
        path: PathKind,
        rings: Vec<Ring>,
        style: Style,
        rotation: f64,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Marker { .. } => "Marker",
            ShapeKind::Circle { .. } => "Circle",
            ShapeKind::Path { path, .. } => path.name(),
        }
    }
}

/// A live annotation: identity plus kind
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ShapeId::new(),
            kind,
        }
    }

    pub fn with_id(id: ShapeId, kind: ShapeKind) -> Self {
        Self { id, kind }
    }

    pub fn marker(at: LatLng, label: Option<String>, color: impl Into<String>, opacity: f64) -> Self {
        Self::new(ShapeKind::Marker {
            at,
            label: normalize_label(label),
            color: color.into(),
            opacity,
        })
    }

    pub fn circle(center: LatLng, radius: f64, style: Style) -> Self {
        Self::new(ShapeKind::Circle { center, radius, style })
    }

    pub fn path(path: PathKind, rings: Vec<Ring>, style: Style) -> Self {
        Self::new(ShapeKind::Path {
            path,
            rings,
            style,
            rotation: 0.0,
        })
    }

    /// Accumulated rotation in radians (always 0 for markers and circles)
    pub fn rotation(&self) -> f64 {
        match &self.kind {
            ShapeKind::Path { rotation, .. } => *rotation,
            ShapeKind::Marker { .. } | ShapeKind::Circle { .. } => 0.0,
        }
    }

    /// Store a rotation angle; ignored for markers and circles
    pub fn set_rotation(&mut self, angle: f64) {
        if let ShapeKind::Path { rotation, .. } = &mut self.kind {
            *rotation = angle;
        }
    }

    /// Copy of the current geometry
    pub fn geometry(&self) -> Geometry {
        match &self.kind {
            ShapeKind::Marker { at, .. } => Geometry::Point(*at),
            ShapeKind::Circle { center, radius, .. } => Geometry::Circle {
                center: *center,
                radius: *radius,
            },
            ShapeKind::Path { rings, .. } => Geometry::Path(rings.clone()),
        }
    }

    /// Replace the geometry in place. Returns false when the geometry variant
    /// does not match the shape kind, leaving the shape untouched.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        match (&mut self.kind, geometry) {
            (ShapeKind::Marker { at, .. }, Geometry::Point(p)) => *at = p,
            (ShapeKind::Circle { center, radius, .. }, Geometry::Circle { center: c, radius: r }) => {
                *center = c;
                *radius = r;
            }
            (ShapeKind::Path { rings, .. }, Geometry::Path(r)) => *rings = r,
            _ => return false,
        }
        true
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        self.geometry().bounds()
    }

    pub fn pivot(&self) -> Option<LatLng> {
        self.geometry().pivot()
    }

    /// Stroke/fill style; markers report their icon colour as the stroke
    pub fn style(&self) -> Style {
        match &self.kind {
            ShapeKind::Marker { color, opacity, .. } => Style {
                color: color.clone(),
                opacity: *opacity,
                ..Style::default()
            },
            ShapeKind::Circle { style, .. } | ShapeKind::Path { style, .. } => style.clone(),
        }
    }

    /// Apply a style; markers only take the stroke colour and opacity
    pub fn apply_style(&mut self, new_style: &Style) {
        match &mut self.kind {
            ShapeKind::Marker { color, opacity, .. } => {
                *color = new_style.color.clone();
                *opacity = new_style.opacity;
            }
            ShapeKind::Circle { style, .. } | ShapeKind::Path { style, .. } => {
                *style = new_style.clone();
            }
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::Marker { label, .. } => label.as_deref(),
            _ => None,
        }
    }

    pub fn supports_label(&self) -> bool {
        matches!(self.kind, ShapeKind::Marker { .. })
    }

    /// Set a marker label (trimmed, empty clears it). Returns false for other kinds.
    pub fn set_label(&mut self, text: Option<String>) -> bool {
        match &mut self.kind {
            ShapeKind::Marker { label, .. } => {
                *label = normalize_label(text);
                true
            }
            _ => false,
        }
    }

    /// Whether the pixel point `p` hits this shape in the given view
    pub fn contains<P: Projection + ?Sized>(&self, proj: &P, p: Point) -> bool {
        match &self.kind {
            ShapeKind::Marker { at, .. } => proj.project(*at).distance_to(p) <= MARKER_HIT_RADIUS,
            ShapeKind::Circle { center, radius, style } => {
                let r = radius_to_pixels(proj, *center, *radius);
                proj.project(*center).distance_to(p) <= r + style.weight / 2.0 + STROKE_HIT_SLOP
            }
            ShapeKind::Path { path, rings, style, .. } => {
                let tolerance = style.weight / 2.0 + STROKE_HIT_SLOP;
                let mut inside = false;
                for ring in rings {
                    let pts: Vec<Point> = ring.iter().map(|ll| proj.project(*ll)).collect();
                    if path.is_closed() {
                        if near_ring(p, &pts, tolerance) {
                            return true;
                        }
                        if point_in_ring(p, &pts) {
                            inside = !inside;
                        }
                    } else if near_polyline(p, &pts, tolerance) {
                        return true;
                    }
                }
                inside
            }
        }
    }
}

fn normalize_label(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
