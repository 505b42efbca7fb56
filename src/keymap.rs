//! Keyboard shortcuts for undo and redo.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Action bound to a shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
}

/// Command modifier for the current platform (Cmd on macOS, Ctrl elsewhere)
pub fn primary_modifier() -> KeyModifiers {
    if cfg!(target_os = "macos") {
        KeyModifiers::SUPER
    } else {
        KeyModifiers::CONTROL
    }
}

/// Map a key event to a command
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release || !key.modifiers.contains(primary_modifier()) {
        return None;
    }
    match key.code {
        KeyCode::Char('z') if key.modifiers.contains(KeyModifiers::SHIFT) => Some(Command::Redo),
        KeyCode::Char('z') => Some(Command::Undo),
        KeyCode::Char('Z') => Some(Command::Redo),
        _ => None,
    }
}
