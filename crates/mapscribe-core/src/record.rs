//! Plain data records for shapes.
//!
//! A record is self-contained: it owns a full copy of the geometry and style
//! and refers to nothing outside itself, so scenes can be snapshotted and
//! restored. Coordinates are stored as `[lat, lng]` pairs.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use mapscribe_geometry::{LatLng, Ring};

use crate::scene::Scene;
use crate::shapes::{PathKind, Shape, ShapeId, ShapeKind, Style};

/// Serialized form of one shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeRecord {
    Marker {
        id: String,
        position: [f64; 2],
        #[serde(default)]
        label: Option<String>,
        color: String,
        opacity: f64,
    },
    Circle {
        id: String,
        center: [f64; 2],
        radius: f64,
        style: Style,
    },
    Path {
        id: String,
        path: PathKind,
        rings: Vec<Vec<[f64; 2]>>,
        style: Style,
        #[serde(default)]
        rotation: f64,
    },
}

impl ShapeRecord {
    pub fn id(&self) -> &str {
        match self {
            ShapeRecord::Marker { id, .. } | ShapeRecord::Circle { id, .. } | ShapeRecord::Path { id, .. } => id,
        }
    }
}

fn pair(ll: &LatLng) -> [f64; 2] {
    [ll.lat, ll.lng]
}

fn latlng(p: &[f64; 2]) -> LatLng {
    LatLng::new(p[0], p[1])
}

/// Capture a shape as a record
pub fn to_record(shape: &Shape) -> ShapeRecord {
    let id = shape.id.to_string();
    match &shape.kind {
        ShapeKind::Marker {
            at,
            label,
            color,
            opacity,
        } => ShapeRecord::Marker {
            id,
            position: pair(at),
            label: label.clone(),
            color: color.clone(),
            opacity: *opacity,
        },
        ShapeKind::Circle { center, radius, style } => ShapeRecord::Circle {
            id,
            center: pair(center),
            radius: *radius,
            style: style.clone(),
        },
        ShapeKind::Path {
            path,
            rings,
            style,
            rotation,
        } => ShapeRecord::Path {
            id,
            path: *path,
            rings: rings.iter().map(|ring| ring.iter().map(pair).collect()).collect(),
            style: style.clone(),
            rotation: *rotation,
        },
    }
}

/// Rebuild a live shape from a record
pub fn from_record(record: &ShapeRecord) -> Result<Shape> {
    let id = ShapeId::parse(record.id())?;
    let kind = match record {
        ShapeRecord::Marker {
            position,
            label,
            color,
            opacity,
            ..
        } => ShapeKind::Marker {
            at: latlng(position),
            label: label.clone(),
            color: color.clone(),
            opacity: *opacity,
        },
        ShapeRecord::Circle {
            center, radius, style, ..
        } => ShapeKind::Circle {
            center: latlng(center),
            radius: *radius,
            style: style.clone(),
        },
        ShapeRecord::Path {
            path,
            rings,
            style,
            rotation,
            ..
        } => {
            let rings: Vec<Ring> = rings
                .iter()
                .map(|ring| ring.iter().map(latlng).collect())
                .collect();
            if rings.iter().all(Vec::is_empty) {
                bail!("path record {} has no vertices", record.id());
            }
            ShapeKind::Path {
                path: *path,
                rings,
                style: style.clone(),
                rotation: *rotation,
            }
        }
    };
    Ok(Shape::with_id(id, kind))
}

/// Records for every shape, bottom to top
pub fn scene_to_records(scene: &Scene) -> Vec<ShapeRecord> {
    scene.iter().map(to_record).collect()
}

/// Rebuild a scene, preserving record order as z-order
pub fn scene_from_records(records: &[ShapeRecord]) -> Result<Scene> {
    let shapes = records.iter().map(from_record).collect::<Result<Vec<_>>>()?;
    Ok(Scene::from_shapes(shapes))
}
