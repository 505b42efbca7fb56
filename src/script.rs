//! Recorded interaction scripts.
//!
//! A script is a JSON array of steps replayed against an [`App`]. Time only
//! advances through explicit `wait` steps, so style debouncing replays the
//! same way every run.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use mapscribe_core::Style;
use mapscribe_geometry::{LatLng, Point};

use crate::app::App;
use crate::keymap;
use crate::tools::draw::DrawnShape;
use crate::tools::{PointerEvent, PointerKind};

fn default_size() -> f64 {
    800.0
}

fn default_steps() -> u32 {
    1
}

/// One replayable interaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Centre the map on a coordinate
    View {
        center: LatLng,
        zoom: f64,
        #[serde(default = "default_size")]
        width: f64,
        #[serde(default = "default_size")]
        height: f64,
    },
    /// Toolbar output
    Draw { shape: DrawnShape },
    Pointer { kind: PointerKind, x: f64, y: f64 },
    /// Press at `from`, move to `to` in `steps` increments, release
    Drag {
        from: Point,
        to: Point,
        #[serde(default = "default_steps")]
        steps: u32,
    },
    /// Key chord such as `mod+z` or `mod+shift+z`
    Key { chord: String },
    TransformMode { on: bool },
    FreeDraw { on: bool },
    ToggleFreeDraw,
    Style { style: Style },
    Label { text: Option<String> },
    Delete,
    Undo,
    Redo,
    /// Attach a note to the selected shape
    Note { text: String },
    Wait { ms: u64 },
}

/// Read a script file
pub fn load(path: &Path) -> Result<Vec<Step>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read script {:?}", path))?;
    let steps = serde_json::from_str(&content).with_context(|| format!("Failed to parse script {:?}", path))?;
    Ok(steps)
}

/// Replay steps in order
pub fn run(app: &mut App, steps: &[Step]) -> Result<()> {
    let mut clock = Instant::now();
    for (i, step) in steps.iter().enumerate() {
        apply(app, step, &mut clock).with_context(|| format!("step {i}"))?;
        if let Some(status) = app.status.take() {
            tracing::debug!(step = i, status, "status");
        }
    }
    tracing::info!(
        steps = steps.len(),
        shapes = app.scene.len(),
        selected = ?app.selected.map(|id| id.to_string()),
        notes = app.selected_notes().len(),
        "script replayed"
    );
    Ok(())
}

fn apply(app: &mut App, step: &Step, clock: &mut Instant) -> Result<()> {
    match step {
        Step::View {
            center,
            zoom,
            width,
            height,
        } => app.center_on(*center, *zoom, Point::new(*width, *height)),
        Step::Draw { shape } => {
            app.create_shape(shape.clone());
        }
        Step::Pointer { kind, x, y } => app.handle_pointer(PointerEvent::new(*kind, *x, *y)),
        Step::Drag { from, to, steps } => {
            app.handle_pointer(PointerEvent::down(from.x, from.y));
            let steps = (*steps).max(1);
            for i in 1..=steps {
                let p = from.add(to.sub(*from).scale(f64::from(i) / f64::from(steps)));
                app.handle_pointer(PointerEvent::moved(p.x, p.y));
            }
            app.handle_pointer(PointerEvent::up(to.x, to.y));
        }
        Step::Key { chord } => {
            let key = parse_chord(chord)?;
            if !app.handle_key(&key) {
                tracing::debug!(chord, "unbound key");
            }
        }
        Step::TransformMode { on } => app.set_transform_mode(*on),
        Step::FreeDraw { on } => app.set_free_draw(*on),
        Step::ToggleFreeDraw => app.toggle_free_draw(),
        Step::Style { style } => app.apply_style(style.clone(), *clock),
        Step::Label { text } => app.set_marker_label(text.clone()),
        Step::Delete => app.delete_selected(),
        Step::Undo => app.undo(),
        Step::Redo => app.redo(),
        Step::Note { text } => {
            if app.add_note(text.clone()).is_none() {
                tracing::warn!("note ignored: nothing selected");
            }
        }
        Step::Wait { ms } => *clock += Duration::from_millis(*ms),
    }
    Ok(())
}

/// Parse `mod+shift+z` style chords; `mod` is the platform command key
pub fn parse_chord(chord: &str) -> Result<KeyEvent> {
    let mut modifiers = KeyModifiers::NONE;
    let mut code = None;
    for part in chord.split('+').map(str::trim) {
        match part.to_ascii_lowercase().as_str() {
            "mod" => modifiers |= keymap::primary_modifier(),
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "cmd" | "super" => modifiers |= KeyModifiers::SUPER,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => {
                let mut chars = part.chars();
                match (chars.next(), chars.next(), code) {
                    (Some(c), None, None) => code = Some(KeyCode::Char(c)),
                    _ => bail!("invalid key chord {chord:?}"),
                }
            }
        }
    }
    let Some(code) = code else {
        bail!("key chord {chord:?} has no key");
    };
    Ok(KeyEvent::new(code, modifiers))
}

#[cfg(test)]
mod tests {
    use mapscribe_core::intel::IntelStore;
    use mapscribe_geometry::WebMercatorView;

    use super::*;
    use crate::config::Config;
    use crate::keymap::Command;

    fn app() -> App {
        App::new(Config::default(), WebMercatorView::default(), IntelStore::in_memory())
    }

    #[test]
    fn chords_map_to_commands() {
        let undo = parse_chord("mod+z").unwrap();
        assert_eq!(keymap::command_for(&undo), Some(Command::Undo));
        let redo = parse_chord("mod+shift+z").unwrap();
        assert_eq!(keymap::command_for(&redo), Some(Command::Redo));
        assert!(parse_chord("mod+shift").is_err());
        assert!(parse_chord("mod+zz").is_err());
    }

    #[test]
    fn replays_draw_move_and_undo() {
        let script = r#"[
            {"op": "view", "center": {"lat": 0.0, "lng": 0.0}, "zoom": 10},
            {"op": "draw", "shape": {"type": "marker", "at": {"lat": 0.0, "lng": 0.0}, "label": "hq"}},
            {"op": "transform_mode", "on": true},
            {"op": "drag", "from": {"x": 400.0, "y": 400.0}, "to": {"x": 450.0, "y": 400.0}, "steps": 5},
            {"op": "note", "text": "moved east"},
            {"op": "key", "chord": "mod+z"}
        ]"#;
        let steps: Vec<Step> = serde_json::from_str(script).unwrap();
        let mut app = app();
        run(&mut app, &steps).unwrap();

        assert_eq!(app.scene.len(), 1);
        let marker = app.scene.iter().next().unwrap();
        assert_eq!(marker.label(), Some("hq"));
        let at = marker.pivot().unwrap();
        assert!(at.lat.abs() < 1e-9 && at.lng.abs() < 1e-9);
        assert_eq!(app.selected_notes().len(), 1);
    }

    #[test]
    fn wait_steps_split_style_edits() {
        let script = r##"[
            {"op": "draw", "shape": {"type": "circle", "center": {"lat": 10.0, "lng": 10.0}, "radius": 500.0}},
            {"op": "style", "style": {"color": "#000001"}},
            {"op": "style", "style": {"color": "#000002"}},
            {"op": "wait", "ms": 100},
            {"op": "style", "style": {"color": "#000003"}},
            {"op": "undo"}
        ]"##;
        let steps: Vec<Step> = serde_json::from_str(script).unwrap();
        let mut app = app();
        run(&mut app, &steps).unwrap();

        let circle = app.scene.iter().next().unwrap();
        assert_eq!(circle.style().color, "#000002");
    }

    #[test]
    fn load_reports_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        assert!(load(&path).is_err());
        fs::write(&path, r#"[{"op": "undo"}, {"op": "redo"}]"#).unwrap();
        assert_eq!(load(&path).unwrap(), vec![Step::Undo, Step::Redo]);
        fs::write(&path, r#"[{"op": "teleport"}]"#).unwrap();
        assert!(load(&path).is_err());
    }
}
