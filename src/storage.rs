//! Local persistence - the whole client state as one JSON blob
//!
//! Saves are fire-and-forget from the UI's perspective: a failed write is
//! reported but never rolls back the in-memory state. Legacy blobs (missing
//! `auth` fields, missing `savedAt`) load through serde defaults.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::app::AppState;
use crate::constants::{STORAGE_DIR, STORAGE_FILE};
use crate::models::{Collection, RequestTab};

/// Shape of the persisted blob. Field names match the browser-era local
/// storage record so exported/old state stays loadable.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    #[serde(default)]
    collections: Vec<Collection>,
    #[serde(default)]
    active_tabs: Vec<RequestTab>,
    #[serde(default)]
    active_tab_id: Option<String>,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
}

/// Reads and writes the state blob under a config directory
pub struct Storage {
    config_dir: PathBuf,
}

impl Storage {
    pub fn new() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(STORAGE_DIR);
        Storage { config_dir }
    }

    /// Use an explicit directory instead of `~/.quiver` (tests, portable mode)
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Storage {
            config_dir: config_dir.into(),
        }
    }

    fn state_path(&self) -> PathBuf {
        self.config_dir.join(STORAGE_FILE)
    }

    /// Persist collections, open tabs, and the active tab id
    pub fn save(&self, state: &AppState) -> Result<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir)
                .with_context(|| format!("could not create {}", self.config_dir.display()))?;
        }

        let blob = PersistedState {
            collections: state.collections.clone(),
            active_tabs: state.tabs.clone(),
            active_tab_id: state.active_tab_id.clone(),
            saved_at: Some(Utc::now()),
        };
        let content = serde_json::to_string_pretty(&blob)?;

        // Write-then-rename so a crash mid-save never truncates the blob
        let tmp = self.config_dir.join(format!("{STORAGE_FILE}.tmp"));
        fs::write(&tmp, content)?;
        fs::rename(&tmp, self.state_path())?;
        Ok(())
    }

    /// Load the persisted state, or a fresh one when no blob exists yet.
    ///
    /// Restored tabs always come back with `loading=false`: a new session has
    /// no in-flight calls, whatever was true when the blob was written.
    pub fn load(&self) -> Result<AppState> {
        let path = self.state_path();
        if !path.exists() {
            return Ok(AppState::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let blob: PersistedState =
            serde_json::from_str(&content).context("persisted state is not valid JSON")?;

        let mut state = AppState::new();
        state.collections = blob.collections;
        state.tabs = blob.active_tabs;
        for tab in &mut state.tabs {
            tab.loading = false;
        }
        state.active_tab_id = blob
            .active_tab_id
            .filter(|id| state.tabs.iter().any(|t| t.id() == id));
        Ok(state)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
