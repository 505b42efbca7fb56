//! Intel feed and per-shape notes, persisted as JSON in the data directory.
//!
//! The feed and the notes map are two independent records. A missing or
//! corrupt file loads as empty state rather than failing.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::shapes::ShapeId;

const FEED_FILE: &str = "feed.json";
const NOTES_FILE: &str = "notes.json";

/// Get the default data directory for the intel store
pub fn default_data_dir() -> PathBuf {
    // Use XDG data directory if available, otherwise fallback to ~/.local/share
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local/share")
        });
    data_dir.join("mapscribe")
}

/// Where an intel entry happened
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub country: String,
    pub region: String,
    pub place: String,
}

/// One entry in the intel feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub text: String,
    /// Shape this entry is linked to, if any
    #[serde(default)]
    pub shape_id: Option<ShapeId>,
}

impl FeedEntry {
    pub fn new(date: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            date,
            title: title.into(),
            category: String::new(),
            location: Location::default(),
            tags: Vec::new(),
            text: String::new(),
            shape_id: None,
        }
    }
}

/// A note attached to a shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub id: Uuid,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Feed plus notes, backed by two JSON files
#[derive(Debug, Default)]
pub struct IntelStore {
    feed: Vec<FeedEntry>,
    notes: HashMap<ShapeId, Vec<NoteEntry>>,
    dir: Option<PathBuf>,
}

impl IntelStore {
    /// Store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load both records from `dir`, treating unreadable state as empty
    pub fn load(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let feed = read_or_default(&dir.join(FEED_FILE));
        let notes = read_or_default(&dir.join(NOTES_FILE));
        Self {
            feed,
            notes,
            dir: Some(dir),
        }
    }

    /// Write both records; a no-op for in-memory stores
    pub fn save(&self) -> Result<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        write_json(&dir.join(FEED_FILE), &self.feed)?;
        write_json(&dir.join(NOTES_FILE), &self.notes)?;
        Ok(())
    }

    /// Add an entry at the front of the feed
    pub fn add_entry(&mut self, entry: FeedEntry) -> Uuid {
        let id = entry.id;
        self.feed.insert(0, entry);
        id
    }

    pub fn remove_entry(&mut self, id: Uuid) -> Option<FeedEntry> {
        let idx = self.feed.iter().position(|e| e.id == id)?;
        Some(self.feed.remove(idx))
    }

    /// All feed entries, newest first
    pub fn feed(&self) -> &[FeedEntry] {
        &self.feed
    }

    pub fn entries_on(&self, date: NaiveDate) -> impl Iterator<Item = &FeedEntry> {
        self.feed.iter().filter(move |e| e.date == date)
    }

    pub fn entries_for_shape(&self, shape: ShapeId) -> impl Iterator<Item = &FeedEntry> {
        self.feed.iter().filter(move |e| e.shape_id == Some(shape))
    }

    pub fn add_note(&mut self, shape: ShapeId, text: impl Into<String>) -> Uuid {
        let note = NoteEntry {
            id: Uuid::new_v4(),
            text: text.into(),
            timestamp: Utc::now(),
        };
        let id = note.id;
        self.notes.entry(shape).or_default().push(note);
        id
    }

    pub fn remove_note(&mut self, shape: ShapeId, note: Uuid) -> bool {
        let Some(notes) = self.notes.get_mut(&shape) else {
            return false;
        };
        let before = notes.len();
        notes.retain(|n| n.id != note);
        let removed = notes.len() != before;
        if notes.is_empty() {
            self.notes.remove(&shape);
        }
        removed
    }

    pub fn notes_for(&self, shape: ShapeId) -> &[NoteEntry] {
        self.notes.get(&shape).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    let Ok(content) = fs::read_to_string(path) else {
        return T::default();
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt intel store file");
            T::default()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).with_context(|| format!("Failed to save to {:?}", path))?;
    Ok(())
}
