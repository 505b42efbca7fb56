//! Bounding box and transform handles drawn over the selected shape.

use mapscribe_core::{Shape, ShapeId};
use mapscribe_geometry::{LatLng, Point, Projection};

/// Share of the box height added to the rotation handle offset
const ROTATE_HANDLE_LIFT: f64 = 0.15;

/// Corner of the bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    NorthWest,
    NorthEast,
    SouthEast,
    SouthWest,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
    ];
}

/// What a handle does when dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Scale(Corner),
    Rotate,
}

/// A handle with its position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub at: LatLng,
}

/// Ephemeral overlay for one selected shape
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub shape_id: ShapeId,
    /// Box outline, clockwise from the north-west corner
    pub outline: [LatLng; 4],
    pub handles: Vec<Handle>,
}

impl Overlay {
    /// Build the overlay for a shape in the current view. Only the handles
    /// the shape kind supports are created, so a marker gets a bare outline.
    pub fn build<P: Projection + ?Sized>(shape: &Shape, proj: &P, rotate_offset: f64) -> Option<Self> {
        let geometry = shape.geometry();
        let bounds = geometry.bounds()?;
        let outline = bounds.corners();

        let mut handles = Vec::with_capacity(5);
        if geometry.can_scale() {
            handles.extend(Corner::ALL.iter().zip(outline.iter()).map(|(corner, at)| Handle {
                kind: HandleKind::Scale(*corner),
                at: *at,
            }));
        }

        // Rotation handle sits above the north-east corner
        if geometry.can_rotate() {
            let ne = proj.project(bounds.north_east());
            let sw = proj.project(bounds.south_west());
            let lift = (sw.y - ne.y).abs() * ROTATE_HANDLE_LIFT + rotate_offset;
            handles.push(Handle {
                kind: HandleKind::Rotate,
                at: proj.unproject(Point::new(ne.x, ne.y - lift)),
            });
        }

        Some(Self {
            shape_id: shape.id,
            outline,
            handles,
        })
    }

    /// Nearest handle within `radius` pixels of `pos`
    pub fn handle_at<P: Projection + ?Sized>(&self, proj: &P, pos: Point, radius: f64) -> Option<HandleKind> {
        self.handles
            .iter()
            .map(|h| (h.kind, proj.project(h.at).distance_to(pos)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(kind, _)| kind)
    }
}
