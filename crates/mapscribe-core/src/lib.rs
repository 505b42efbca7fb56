//! Core types for mapscribe: shapes, the scene, shape records and the intel store.

pub mod intel;
pub mod record;
pub mod scene;
pub mod shapes;

pub use record::{from_record, scene_from_records, scene_to_records, to_record, ShapeRecord};
pub use scene::Scene;
pub use shapes::{PathKind, Shape, ShapeId, ShapeKind, Style};
