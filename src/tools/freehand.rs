use mapscribe_core::ShapeId;
use mapscribe_geometry::Point;

use crate::app::App;
use crate::tools::{PointerEvent, PointerKind};

/// In-progress free-draw stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreehandState {
    pub shape_id: ShapeId,
    /// Last vertex appended, in layer pixels
    pub last: Point,
}

/// Handle pointer events while a free-draw stroke is active
pub fn handle_freehand_event(app: &mut App, event: PointerEvent) {
    match event.kind {
        PointerKind::Down => app.start_freehand(event.pos),
        PointerKind::Move => app.continue_freehand(event.pos),
        PointerKind::Up | PointerKind::Cancel => app.finish_freehand(),
    }
}
