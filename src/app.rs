use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use mapscribe_core::intel::{IntelStore, NoteEntry};
use mapscribe_core::{PathKind, Scene, Shape, ShapeId, ShapeKind, Style};
use mapscribe_geometry::{LatLng, Point, Projection, WebMercatorView};
use mapscribe_session::{History, Snapshot};
use uuid::Uuid;

use crate::config::Config;
use crate::gesture::Gesture;
use crate::keymap::{self, Command};
use crate::overlay::{HandleKind, Overlay};
use crate::tools::draw::DrawnShape;
use crate::tools::freehand::{handle_freehand_event, FreehandState};
use crate::tools::select::handle_select_event;
use crate::tools::{PointerEvent, PointerKind};

/// Application state: the one controller every input handler goes through
pub struct App {
    pub config: Config,
    /// Live shapes
    pub scene: Scene,
    /// Undo/redo snapshots of the scene
    pub history: History,
    pub selected: Option<ShapeId>,
    /// Whether move/scale/rotate gestures are enabled
    pub transform_mode: bool,
    /// Whether presses on the map start a free-draw stroke
    pub free_draw: bool,
    pub view: WebMercatorView,
    /// Style panel; applied to new shapes and to the selection
    pub style: Style,
    pub overlay: Option<Overlay>,
    pub gesture: Option<Gesture>,
    pub stroke: Option<FreehandState>,
    pub intel: IntelStore,
    /// Status message to display
    pub status: Option<String>,
    /// Shape and time of the last style edit, for debouncing history
    last_style_edit: Option<(ShapeId, Instant)>,
}

impl App {
    pub fn new(config: Config, view: WebMercatorView, intel: IntelStore) -> Self {
        let history = History::new(config.history_limit);
        let mut app = Self {
            config,
            scene: Scene::new(),
            history,
            selected: None,
            transform_mode: false,
            free_draw: false,
            view,
            style: Style::default(),
            overlay: None,
            gesture: None,
            stroke: None,
            intel,
            status: None,
            last_style_edit: None,
        };
        app.save_undo_state();
        app
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Record the scene before an edit. The edit starts a new branch, so any
    /// redo snapshots are dropped and style debouncing starts over.
    fn save_undo_state(&mut self) {
        self.record_live_scene();
        self.history.discard_redo();
        self.last_style_edit = None;
    }

    /// Push the live scene without touching the redo branch
    fn record_live_scene(&mut self) {
        match Snapshot::capture(&self.scene) {
            Ok(snapshot) => {
                self.history.push(snapshot);
            }
            Err(e) => tracing::warn!(error = %e, "failed to capture scene snapshot"),
        }
    }

    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selected.and_then(|id| self.scene.get(id))
    }

    /// Add a shape from the drawing toolbar and select it
    pub fn create_shape(&mut self, drawn: DrawnShape) -> Option<ShapeId> {
        let kind = drawn.name();
        let Some(shape) = drawn.into_shape(&self.style) else {
            tracing::debug!(kind, "ignoring toolbar output");
            return None;
        };
        self.save_undo_state();
        let id = self.scene.add(shape);
        tracing::debug!(%id, kind, "shape created");
        self.select(id);
        Some(id)
    }

    /// Set or clear the selected marker's label
    pub fn set_marker_label(&mut self, text: Option<String>) {
        let Some(id) = self.selected else {
            return;
        };
        if !self.scene.get(id).is_some_and(Shape::supports_label) {
            return;
        }
        self.save_undo_state();
        if let Some(shape) = self.scene.get_mut(id) {
            shape.set_label(text);
        }
    }

    /// Update the style panel and restyle the selection. Consecutive edits to
    /// the same shape closer together than the debounce window share one undo
    /// step; any other edit in between ends the run.
    pub fn apply_style(&mut self, style: Style, now: Instant) {
        self.style = style;
        let Some(id) = self.selected.filter(|id| self.scene.contains(*id)) else {
            return;
        };

        let window = Duration::from_millis(self.config.style_debounce_ms);
        let debounced = matches!(
            self.last_style_edit,
            Some((last_id, at)) if last_id == id && now.saturating_duration_since(at) < window
        );
        if !debounced {
            self.save_undo_state();
        }
        self.last_style_edit = Some((id, now));

        if let Some(shape) = self.scene.get_mut(id) {
            shape.apply_style(&self.style);
        }
        self.rebuild_overlay();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected else {
            return;
        };
        if !self.scene.contains(id) {
            self.clear_selection();
            return;
        }
        self.save_undo_state();
        self.scene.remove(id);
        self.gesture = None;
        self.stroke = None;
        self.clear_selection();
        tracing::debug!(%id, "shape deleted");
        self.set_status("Deleted");
    }

    /// Select a shape and sync the style panel to it
    pub fn select(&mut self, id: ShapeId) {
        let Some(shape) = self.scene.get(id) else {
            return;
        };
        self.style = shape.style();
        self.selected = Some(id);
        self.rebuild_overlay();
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.overlay = None;
    }

    /// Recreate the handle overlay from scratch for the current selection
    pub fn rebuild_overlay(&mut self) {
        self.overlay = if self.transform_mode {
            self.selected_shape()
                .and_then(|shape| Overlay::build(shape, &self.view, self.config.rotate_handle_offset))
        } else {
            None
        };
    }

    pub fn set_transform_mode(&mut self, on: bool) {
        self.transform_mode = on;
        if !on {
            self.gesture = None;
        }
        self.rebuild_overlay();
    }

    pub fn set_free_draw(&mut self, on: bool) {
        if !on {
            self.finish_freehand();
        }
        self.free_draw = on;
    }

    pub fn toggle_free_draw(&mut self) {
        self.set_free_draw(!self.free_draw);
    }

    /// Replace the map view (pan or zoom)
    pub fn set_view(&mut self, view: WebMercatorView) {
        self.view = view;
        self.rebuild_overlay();
    }

    /// Centre a `size` pixel view on `center`, clamped to one world copy
    pub fn center_on(&mut self, center: LatLng, zoom: f64, size: Point) {
        let center = center.clamp_to_world();
        self.set_view(WebMercatorView::centered(center, zoom, size));
    }

    /// Route a pointer event to the active tool
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        // One interaction at a time: presses during a gesture or stroke are dropped
        if event.kind == PointerKind::Down && (self.gesture.is_some() || self.stroke.is_some()) {
            tracing::debug!("ignoring press during an active interaction");
            return;
        }
        if self.stroke.is_some() || (self.free_draw && event.kind == PointerKind::Down) {
            handle_freehand_event(self, event);
        } else {
            handle_select_event(self, event);
        }
    }

    /// Returns true if a key was consumed
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        match keymap::command_for(key) {
            Some(Command::Undo) => self.undo(),
            Some(Command::Redo) => self.redo(),
            None => return false,
        }
        true
    }

    /// Start a scale or rotate gesture if `pos` is on a handle
    pub fn try_start_handle(&mut self, pos: Point) -> bool {
        if !self.transform_mode || self.gesture.is_some() {
            return false;
        }
        let Some(overlay) = &self.overlay else {
            return false;
        };
        let Some(kind) = overlay.handle_at(&self.view, pos, self.config.handle_hit_radius) else {
            return false;
        };
        let Some(shape) = self.scene.get(overlay.shape_id) else {
            return false;
        };

        let gesture = match kind {
            HandleKind::Scale(_) => Gesture::begin_scale(shape, &self.view, pos),
            HandleKind::Rotate => Gesture::begin_rotate(shape, &self.view, pos),
        };
        let Some(gesture) = gesture else {
            return false;
        };

        self.save_undo_state();
        tracing::debug!(gesture = gesture.name(), shape = %gesture.shape_id(), "gesture started");
        self.gesture = Some(gesture);
        true
    }

    /// Start dragging the selected shape's body
    pub fn start_move(&mut self, pos: Point) {
        if !self.transform_mode || self.gesture.is_some() {
            return;
        }
        let Some(shape) = self.selected_shape() else {
            return;
        };
        let gesture = Gesture::begin_move(shape, pos);

        self.save_undo_state();
        tracing::debug!(gesture = gesture.name(), shape = %gesture.shape_id(), "gesture started");
        self.gesture = Some(gesture);
    }

    /// Apply the active gesture for a pointer move
    pub fn continue_gesture(&mut self, pos: Point) {
        let Some(gesture) = self.gesture.as_ref() else {
            return;
        };
        let Some(shape) = self.scene.get_mut(gesture.shape_id()) else {
            self.gesture = None;
            return;
        };
        gesture.update(shape, &self.view, pos);
        self.rebuild_overlay();
    }

    pub fn finish_gesture(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            tracing::debug!(gesture = gesture.name(), shape = %gesture.shape_id(), "gesture finished");
        }
    }

    /// Begin a free-draw polyline at `pos`
    pub fn start_freehand(&mut self, pos: Point) {
        if self.stroke.is_some() {
            return;
        }
        self.save_undo_state();

        let mut style = self.style.clone();
        style.weight = style.weight.max(self.config.free_draw_min_weight);
        let shape = Shape::path(PathKind::Polyline, vec![vec![self.view.unproject(pos)]], style);
        let id = self.scene.add(shape);
        self.stroke = Some(FreehandState { shape_id: id, last: pos });
        self.select(id);
        tracing::debug!(%id, "free-draw stroke started");
    }

    /// Extend the stroke when the pointer moved far enough
    pub fn continue_freehand(&mut self, pos: Point) {
        let Some(stroke) = self.stroke else {
            return;
        };
        if pos.distance_to(stroke.last) < self.config.free_draw_min_distance {
            return;
        }
        let point = self.view.unproject(pos);
        let Some(shape) = self.scene.get_mut(stroke.shape_id) else {
            self.stroke = None;
            return;
        };
        if let ShapeKind::Path { rings, .. } = &mut shape.kind
            && let Some(line) = rings.first_mut()
        {
            line.push(point);
        }
        self.stroke = Some(FreehandState { last: pos, ..stroke });
        self.rebuild_overlay();
    }

    pub fn finish_freehand(&mut self) {
        if let Some(stroke) = self.stroke.take() {
            let vertices = self
                .scene
                .get(stroke.shape_id)
                .map(|s| s.geometry().vertex_count())
                .unwrap_or(0);
            tracing::debug!(id = %stroke.shape_id, vertices, "free-draw stroke finished");
        }
    }

    /// Undo the last action
    pub fn undo(&mut self) {
        self.gesture = None;
        self.stroke = None;
        // The live scene becomes the redo target
        self.record_live_scene();
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(&snapshot);
                self.set_status("Undo");
            }
            None => self.set_status("Nothing to undo"),
        }
    }

    /// Redo the last undone action
    pub fn redo(&mut self) {
        self.gesture = None;
        self.stroke = None;
        // Coalesced unless the scene changed since the last undo or redo
        self.record_live_scene();
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(&snapshot);
                self.set_status("Redo");
            }
            None => self.set_status("Nothing to redo"),
        }
    }

    /// Replace the scene from a snapshot, keeping the selection if it survives
    fn restore(&mut self, snapshot: &Snapshot) {
        let scene = match snapshot.restore() {
            Ok(scene) => scene,
            Err(e) => {
                tracing::warn!(error = %e, "failed to restore snapshot");
                return;
            }
        };
        self.scene = scene;
        self.last_style_edit = None;
        if let Some(id) = self.selected.filter(|id| self.scene.contains(*id)) {
            self.select(id);
        } else {
            self.clear_selection();
        }
    }

    /// Notes linked to the selected shape
    pub fn selected_notes(&self) -> &[NoteEntry] {
        self.selected.map(|id| self.intel.notes_for(id)).unwrap_or(&[])
    }

    /// Attach a note to the selected shape and persist the store
    pub fn add_note(&mut self, text: impl Into<String>) -> Option<Uuid> {
        let id = self.selected?;
        let note = self.intel.add_note(id, text);
        if let Err(e) = self.intel.save() {
            tracing::warn!(error = %e, "failed to save notes");
        }
        Some(note)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use crossterm::event::{KeyCode, KeyModifiers};
    use mapscribe_geometry::LatLngBounds;

    use super::*;

    fn app() -> App {
        let view = WebMercatorView::centered(LatLng::new(0.0, 0.0), 10.0, Point::new(800.0, 600.0));
        App::new(Config::default(), view, IntelStore::in_memory())
    }

    fn rectangle(app: &App, a: (f64, f64), b: (f64, f64)) -> DrawnShape {
        let corners = [
            app.view.unproject(Point::new(a.0, a.1)),
            app.view.unproject(Point::new(b.0, b.1)),
        ];
        DrawnShape::Rectangle {
            bounds: LatLngBounds::from_points(&corners).unwrap(),
        }
    }

    fn marker(app: &App, x: f64, y: f64) -> DrawnShape {
        DrawnShape::Marker {
            at: app.view.unproject(Point::new(x, y)),
            label: None,
        }
    }

    fn drag(app: &mut App, from: Point, to: Point) {
        app.handle_pointer(PointerEvent::down(from.x, from.y));
        app.handle_pointer(PointerEvent::moved(to.x, to.y));
        app.handle_pointer(PointerEvent::up(to.x, to.y));
    }

    fn pixels(app: &App, id: ShapeId) -> Vec<Point> {
        let shape = app.scene.get(id).unwrap();
        shape.geometry().vertices().map(|ll| app.view.project(*ll)).collect()
    }

    fn pivot_px(app: &App, id: ShapeId) -> Point {
        app.view.project(app.scene.get(id).unwrap().pivot().unwrap())
    }

    fn handle_px(app: &App, kind: HandleKind) -> Point {
        let overlay = app.overlay.as_ref().unwrap();
        app.view.project(overlay.handles.iter().find(|h| h.kind == kind).unwrap().at)
    }

    #[test]
    fn rotate_then_scale_keeps_right_angles() {
        use crate::overlay::Corner;

        let mut app = app();
        let id = app.create_shape(rectangle(&app, (300.0, 200.0), (500.0, 300.0))).unwrap();
        app.set_transform_mode(true);

        // Rotate a quarter turn with the rotation handle
        let center = pivot_px(&app, id);
        let handle = handle_px(&app, HandleKind::Rotate);
        let target = center.add(handle.sub(center).rotate(FRAC_PI_2));
        drag(&mut app, handle, target);
        assert!((app.scene.get(id).unwrap().rotation() - FRAC_PI_2).abs() < 1e-9);

        // Double the size with a corner handle
        let center = pivot_px(&app, id);
        let corner = handle_px(&app, HandleKind::Scale(Corner::SouthEast));
        let target = center.add(corner.sub(center).scale(2.0));
        drag(&mut app, corner, target);

        let shape = app.scene.get(id).unwrap();
        assert!((shape.rotation() - FRAC_PI_2).abs() < 1e-9);
        let pts = pixels(&app, id);
        for i in 0..4 {
            let a = pts[(i + 1) % 4].sub(pts[i]);
            let b = pts[(i + 2) % 4].sub(pts[(i + 1) % 4]);
            assert!(a.dot(b).abs() / (a.length() * b.length()) < 1e-6, "sheared at corner {i}");
        }
        let mut sides = [pts[0].distance_to(pts[1]), pts[1].distance_to(pts[2])];
        sides.sort_by(f64::total_cmp);
        assert!((sides[0] - 200.0).abs() < 1e-6 && (sides[1] - 400.0).abs() < 1e-6);

        // One undo reverts the whole scale gesture, the next the rotation
        app.undo();
        let shape = app.scene.get(id).unwrap();
        assert!((shape.rotation() - FRAC_PI_2).abs() < 1e-9);
        let pts = pixels(&app, id);
        assert!((pts[0].distance_to(pts[1]) - 200.0).abs() < 1e-6);
        app.undo();
        assert_eq!(app.scene.get(id).unwrap().rotation(), 0.0);
        assert_eq!(app.selected, Some(id));
    }

    #[test]
    fn move_drag_translates_and_undoes() {
        let mut app = app();
        let id = app.create_shape(rectangle(&app, (300.0, 200.0), (500.0, 300.0))).unwrap();
        app.set_transform_mode(true);

        // Several moves within one gesture still make one undo step
        app.handle_pointer(PointerEvent::down(400.0, 250.0));
        for step in 1..=5 {
            app.handle_pointer(PointerEvent::moved(400.0 + 10.0 * step as f64, 250.0));
        }
        app.handle_pointer(PointerEvent::up(450.0, 250.0));
        assert!(app.gesture.is_none());
        let first = pixels(&app, id)[0];
        assert!((first.x - 350.0).abs() < 1e-6 && (first.y - 200.0).abs() < 1e-6);

        app.undo();
        let first = pixels(&app, id)[0];
        assert!((first.x - 300.0).abs() < 1e-6);
        app.undo();
        assert!(app.scene.is_empty());
        assert_eq!(app.selected, None);
        assert!(app.overlay.is_none());
    }

    #[test]
    fn body_press_without_transform_mode_only_selects() {
        let mut app = app();
        let id = app.create_shape(rectangle(&app, (300.0, 200.0), (500.0, 300.0))).unwrap();
        app.clear_selection();
        drag(&mut app, Point::new(400.0, 250.0), Point::new(450.0, 250.0));
        assert_eq!(app.selected, Some(id));
        assert!(app.overlay.is_none());
        assert!((pixels(&app, id)[0].x - 300.0).abs() < 1e-6);

        // Background click clears the selection
        app.handle_pointer(PointerEvent::down(50.0, 50.0));
        assert_eq!(app.selected, None);
    }

    #[test]
    fn delete_clears_selection_and_overlay() {
        let mut app = app();
        app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        app.set_transform_mode(true);
        assert!(app.overlay.is_some());

        app.delete_selected();
        assert_eq!(app.selected, None);
        assert!(app.overlay.is_none());
        assert!(app.scene.is_empty());

        app.undo();
        assert_eq!(app.scene.len(), 1);
    }

    #[test]
    fn new_edit_after_undo_prunes_redo() {
        let mut app = app();
        let a = app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        let b = app.create_shape(marker(&app, 200.0, 100.0)).unwrap();
        app.undo();
        assert!(!app.scene.contains(b));
        assert!(app.history.can_redo());

        let c = app.create_shape(marker(&app, 300.0, 100.0)).unwrap();
        assert!(!app.history.can_redo());
        app.redo();
        assert!(app.scene.contains(a) && app.scene.contains(c));
        assert!(!app.scene.contains(b));
        assert!(!app.history.can_redo());
    }

    #[test]
    fn redo_restores_last_undone_edit() {
        let mut app = app();
        let id = app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        app.undo();
        assert!(app.scene.is_empty());
        app.redo();
        assert!(app.scene.contains(id));
        app.redo();
        assert_eq!(app.status.as_deref(), Some("Nothing to redo"));
    }

    #[test]
    fn style_run_ends_at_other_edits() {
        let mut app = app();
        let circle = DrawnShape::Circle {
            center: app.view.unproject(Point::new(400.0, 300.0)),
            radius: 3000.0,
        };
        let id = app.create_shape(circle).unwrap();
        app.set_transform_mode(true);
        let t0 = Instant::now();
        let with_color = |c: &str| Style {
            color: c.to_string(),
            ..Style::default()
        };

        app.apply_style(with_color("#000001"), t0);
        drag(&mut app, Point::new(400.0, 300.0), Point::new(450.0, 300.0));
        app.apply_style(with_color("#000002"), t0 + Duration::from_millis(10));

        // Only the second colour change is reverted; the move stays
        app.undo();
        let shape = app.scene.get(id).unwrap();
        assert_eq!(shape.style().color, "#000001");
        assert!((app.view.project(shape.pivot().unwrap()).x - 450.0).abs() < 1e-6);

        app.undo();
        let shape = app.scene.get(id).unwrap();
        assert!((app.view.project(shape.pivot().unwrap()).x - 400.0).abs() < 1e-6);
    }

    #[test]
    fn presses_during_a_gesture_are_ignored() {
        let mut app = app();
        let a = app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        app.create_shape(marker(&app, 300.0, 100.0)).unwrap();
        app.set_transform_mode(true);

        app.handle_pointer(PointerEvent::down(100.0, 100.0));
        assert_eq!(app.selected, Some(a));
        let pushes = app.history.len();

        app.handle_pointer(PointerEvent::down(300.0, 100.0));
        app.handle_pointer(PointerEvent::moved(130.0, 100.0));
        assert_eq!(app.selected, Some(a));
        assert_eq!(app.overlay.as_ref().unwrap().shape_id, a);
        assert_eq!(app.gesture.as_ref().unwrap().shape_id(), a);
        assert_eq!(app.history.len(), pushes);
        assert!((pixels(&app, a)[0].x - 130.0).abs() < 1e-6);

        // A background press does not drop the selection mid-gesture
        app.handle_pointer(PointerEvent::down(600.0, 500.0));
        assert_eq!(app.selected, Some(a));
        assert!(app.gesture.is_some());

        app.handle_pointer(PointerEvent::up(130.0, 100.0));
        assert!(app.gesture.is_none());
        app.handle_pointer(PointerEvent::down(600.0, 500.0));
        assert_eq!(app.selected, None);
    }

    #[test]
    fn free_draw_ignores_second_press() {
        let mut app = app();
        app.toggle_free_draw();
        app.handle_pointer(PointerEvent::down(100.0, 100.0));
        app.handle_pointer(PointerEvent::down(300.0, 300.0));
        app.handle_pointer(PointerEvent::moved(120.0, 100.0));
        app.handle_pointer(PointerEvent::up(120.0, 100.0));
        assert_eq!(app.scene.len(), 1);
        let id = app.selected.unwrap();
        assert_eq!(app.scene.get(id).unwrap().geometry().vertex_count(), 2);
    }

    #[test]
    fn view_centre_is_kept_on_the_world() {
        let mut app = app();
        app.center_on(LatLng::new(88.0, 200.0), 3.0, Point::new(800.0, 600.0));
        let center = app.view.unproject(Point::new(400.0, 300.0));
        assert!((center.lat - 85.0).abs() < 1e-9);
        assert!((center.lng + 160.0).abs() < 1e-9);
    }

    #[test]
    fn capped_history_limits_undo_depth() {
        let config = Config {
            history_limit: 3,
            ..Config::default()
        };
        let view = WebMercatorView::centered(LatLng::new(0.0, 0.0), 10.0, Point::new(800.0, 600.0));
        let mut app = App::new(config, view, IntelStore::in_memory());
        for i in 0..5 {
            app.create_shape(marker(&app, 50.0 + 40.0 * i as f64, 100.0));
        }
        for _ in 0..10 {
            app.undo();
        }
        assert_eq!(app.scene.len(), 3);
        assert_eq!(app.history.len(), 3);
    }

    #[test]
    fn free_draw_respects_min_distance() {
        let mut app = app();
        app.toggle_free_draw();
        app.handle_pointer(PointerEvent::down(100.0, 100.0));
        for x in [105.0, 112.0, 115.0, 122.0] {
            app.handle_pointer(PointerEvent::moved(x, 100.0));
        }
        app.handle_pointer(PointerEvent::up(122.0, 100.0));
        assert!(app.stroke.is_none());

        let id = app.selected.unwrap();
        let shape = app.scene.get(id).unwrap();
        assert_eq!(shape.geometry().vertex_count(), 3);
        assert_eq!(shape.style().weight, 4.0);

        app.undo();
        assert!(app.scene.is_empty());
    }

    #[test]
    fn style_edits_are_debounced_per_shape() {
        let mut app = app();
        let id = app.create_shape(rectangle(&app, (300.0, 200.0), (500.0, 300.0))).unwrap();
        let t0 = Instant::now();
        let with_color = |c: &str| Style {
            color: c.to_string(),
            ..Style::default()
        };

        app.apply_style(with_color("#000001"), t0);
        app.apply_style(with_color("#000002"), t0 + Duration::from_millis(30));
        assert_eq!(app.history.len(), 2);
        app.apply_style(with_color("#000003"), t0 + Duration::from_millis(200));
        assert_eq!(app.history.len(), 3);

        app.undo();
        assert_eq!(app.scene.get(id).unwrap().style().color, "#000002");
        app.undo();
        assert_eq!(app.scene.get(id).unwrap().style().color, Style::default().color);
    }

    #[test]
    fn marker_and_circle_refuse_unsupported_gestures() {
        let mut app = app();
        let id = app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        app.set_transform_mode(true);
        assert!(app.overlay.as_ref().unwrap().handles.is_empty());

        // Dragging a marker moves it
        drag(&mut app, Point::new(100.0, 100.0), Point::new(130.0, 100.0));
        assert!((pixels(&app, id)[0].x - 130.0).abs() < 1e-6);

        let circle = DrawnShape::Circle {
            center: app.view.unproject(Point::new(400.0, 300.0)),
            radius: 1000.0,
        };
        app.create_shape(circle).unwrap();
        let overlay = app.overlay.as_ref().unwrap();
        assert!(overlay.handles.iter().all(|h| h.kind != HandleKind::Rotate));
        assert!(!app.try_start_handle(Point::new(600.0, 50.0)));
        assert!(app.gesture.is_none());
    }

    #[test]
    fn circle_marker_output_is_ignored() {
        let mut app = app();
        let drawn = DrawnShape::CircleMarker {
            center: LatLng::new(0.0, 0.0),
        };
        assert!(app.create_shape(drawn).is_none());
        assert!(app.scene.is_empty());
        assert_eq!(app.history.len(), 1);
    }

    #[test]
    fn marker_label_is_undoable() {
        let mut app = app();
        let id = app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        app.set_marker_label(Some("  camp  ".to_string()));
        assert_eq!(app.scene.get(id).unwrap().label(), Some("camp"));
        app.undo();
        assert_eq!(app.scene.get(id).unwrap().label(), None);
    }

    #[test]
    fn keyboard_shortcuts_drive_history() {
        let mut app = app();
        app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        let m = keymap::primary_modifier();

        assert!(app.handle_key(&KeyEvent::new(KeyCode::Char('z'), m)));
        assert!(app.scene.is_empty());
        assert!(app.handle_key(&KeyEvent::new(KeyCode::Char('z'), m | KeyModifiers::SHIFT)));
        assert_eq!(app.scene.len(), 1);
        assert!(!app.handle_key(&KeyEvent::new(KeyCode::Char('x'), m)));
    }

    #[test]
    fn notes_follow_the_selection() {
        let mut app = app();
        app.create_shape(marker(&app, 100.0, 100.0)).unwrap();
        assert!(app.add_note("seen at dawn").is_some());
        assert_eq!(app.selected_notes().len(), 1);
        app.clear_selection();
        assert!(app.selected_notes().is_empty());
        assert!(app.add_note("orphan").is_none());
    }

    #[test]
    fn overlay_tracks_view_changes() {
        let mut app = app();
        let id = app.create_shape(rectangle(&app, (300.0, 200.0), (500.0, 300.0))).unwrap();
        app.set_transform_mode(true);
        let before = app.overlay.clone();
        app.rebuild_overlay();
        assert_eq!(app.overlay, before);

        let mut view = app.view;
        view.zoom += 1.0;
        app.set_view(view);
        assert_eq!(app.overlay.as_ref().unwrap().shape_id, id);
        assert_eq!(app.overlay.as_ref().unwrap().handles.len(), 5);

        app.set_transform_mode(false);
        assert!(app.overlay.is_none());
    }
}
