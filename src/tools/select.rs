use crate::app::App;
use crate::tools::{PointerEvent, PointerKind};

/// Handle pointer events for selection and transform gestures
pub fn handle_select_event(app: &mut App, event: PointerEvent) {
    match event.kind {
        PointerKind::Down => {
            let pos = event.pos;

            // Handles of the selected shape win over shape bodies
            if app.try_start_handle(pos) {
                return;
            }

            if let Some(id) = app.scene.shape_at(&app.view, pos) {
                app.select(id);
                if app.transform_mode {
                    app.start_move(pos);
                }
            } else {
                app.clear_selection();
            }
        }
        PointerKind::Move => app.continue_gesture(event.pos),
        PointerKind::Up | PointerKind::Cancel => app.finish_gesture(),
    }
}
