//! Map geometry for mapscribe.
//!
//! Coordinates, the Web Mercator view used to move between geographic and
//! pixel space, planar transforms for shape gestures, and hit testing.

pub mod coords;
pub mod hit;
pub mod projection;
pub mod transform;

pub use coords::{LatLng, LatLngBounds, Point};
pub use projection::{radius_to_pixels, Projection, WebMercatorView};
pub use transform::{Geometry, Ring};
