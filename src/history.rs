//! Bounded search history.
//!
//! The history is an explicit data structure owned by the caller: the engine
//! completes an analysis and hands back the identifiers; whoever drove the
//! request decides whether to record them. Entries are unique per artist,
//! newest first, and capped at [`HISTORY_CAPACITY`] with deterministic
//! oldest-out eviction.

use crate::{AnalysisResult, EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

/// Maximum number of retained history entries.
pub const HISTORY_CAPACITY: usize = 20;

/// One recorded search.
///
/// Serializes with the documented client contract:
/// `{"artistId": ..., "artistName": ..., "timestamp": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Catalog identifier of the artist
    pub artist_id: String,
    /// Display name at the time of the search
    pub artist_name: String,
    /// When the analysis completed
    pub timestamp: DateTime<Utc>,
}

/// Newest-first bounded log of analyzed artists.
///
/// # Examples
///
/// ```rust
/// use artist_lens::HistoryLog;
/// use chrono::Utc;
///
/// let mut log = HistoryLog::new();
/// log.record("id-1", "Radiohead", Utc::now());
/// log.record("id-2", "Portishead", Utc::now());
/// log.record("id-1", "Radiohead", Utc::now()); // moves back to the front
///
/// let names: Vec<&str> = log.iter().map(|e| e.artist_name.as_str()).collect();
/// assert_eq!(names, ["Radiohead", "Portishead"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed analysis.
    ///
    /// If the artist is already present its entry moves to the front with a
    /// refreshed timestamp; otherwise a new entry is prepended and anything
    /// beyond [`HISTORY_CAPACITY`] falls off the back.
    pub fn record(&mut self, artist_id: &str, artist_name: &str, timestamp: DateTime<Utc>) {
        if let Some(pos) = self.entries.iter().position(|e| e.artist_id == artist_id) {
            self.entries.remove(pos);
        }
        self.entries.push_front(HistoryEntry {
            artist_id: artist_id.to_string(),
            artist_name: artist_name.to_string(),
            timestamp,
        });
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Record straight from an analysis result.
    pub fn record_result(&mut self, result: &AnalysisResult) {
        self.record(&result.artist.id, &result.artist.name, result.analyzed_at);
    }

    /// Entries, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// File persistence for the history log.
///
/// Stores the log as JSON under the XDG data directory:
/// `~/.local/share/artist-lens/history.json`. The engine never touches
/// this; it exists for callers (like the bundled CLI) that want history to
/// survive between invocations.
pub struct HistoryStore;

impl HistoryStore {
    /// Path of the history file inside the XDG data directory.
    pub fn history_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "cannot determine XDG data directory",
            ))
        })?;
        Ok(data_dir.join("artist-lens").join("history.json"))
    }

    /// Load the saved history, treating a missing or corrupt file as empty.
    pub fn load() -> HistoryLog {
        match Self::try_load() {
            Ok(log) => log,
            Err(e) => {
                log::debug!("Starting with empty history: {e}");
                HistoryLog::new()
            }
        }
    }

    /// Load the saved history, surfacing any I/O or parse problem.
    pub fn try_load() -> Result<HistoryLog> {
        let path = Self::history_path()?;
        let json = fs::read_to_string(&path)?;
        let log = serde_json::from_str(&json)
            .map_err(|e| EngineError::Parse(format!("history file: {e}")))?;
        log::debug!("History loaded from: {}", path.display());
        Ok(log)
    }

    /// Save the history, creating the data directory if needed.
    pub fn save(log: &HistoryLog) -> Result<()> {
        let path = Self::history_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(log)
            .map_err(|e| EngineError::Parse(format!("failed to serialize history: {e}")))?;
        fs::write(&path, json)?;
        log::debug!("History saved to: {}", path.display());
        Ok(())
    }

    /// Delete the history file if present.
    pub fn clear() -> Result<()> {
        let path = Self::history_path()?;
        if path.exists() {
            fs::remove_file(&path)?;
            log::debug!("History removed from: {}", path.display());
        }
        Ok(())
    }
}
