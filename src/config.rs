//! Configuration for mapscribe
//!
//! Loaded from a JSON file in the config directory. Every field has a
//! default, and an unreadable file falls back to the defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mapscribe_core::intel::default_data_dir;
use mapscribe_session::DEFAULT_HISTORY_LIMIT;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of snapshots kept for undo
    pub history_limit: usize,
    /// Style edits on the same shape within this window share one undo step
    pub style_debounce_ms: u64,
    /// Minimum pixel distance between free-draw vertices
    pub free_draw_min_distance: f64,
    /// Minimum stroke width for free-draw lines
    pub free_draw_min_weight: f64,
    /// Pixel radius for grabbing a handle
    pub handle_hit_radius: f64,
    /// Pixel offset of the rotation handle above the bounding box
    pub rotate_handle_offset: f64,
    /// Directory for the intel feed and notes
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            style_debounce_ms: 80,
            free_draw_min_distance: 10.0,
            free_draw_min_weight: 4.0,
            handle_hit_radius: 8.0,
            rotate_handle_offset: 24.0,
            data_dir: None,
        }
    }
}

impl Config {
    /// Load from an explicit path or the default config location
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Get the config file path
    fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".config")
            });
        config_dir.join("mapscribe").join("config.json")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}
