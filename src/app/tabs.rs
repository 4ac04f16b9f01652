//! Tab manager - working copies of requests opened for editing/execution
//!
//! Invariants:
//! - at most one tab per request id (re-opening activates, never duplicates)
//! - the active tab id always names an existing tab, or is `None`
//! - closing the active tab focuses the tab that slides into its index, or
//!   the previous one if the closed tab was last

use crate::app::AppState;
use crate::models::{ApiRequest, ApiResponse, RequestTab, TabPatch};

impl AppState {
    /// Open a request in a tab. If a tab with this id already exists it is
    /// activated with no state reset; otherwise a fresh working copy is
    /// appended and activated.
    pub fn open_tab(&mut self, request: ApiRequest) {
        if self.tab(&request.id).is_some() {
            self.active_tab_id = Some(request.id);
            return;
        }
        let tab = RequestTab::open(request);
        self.active_tab_id = Some(tab.id().to_string());
        self.tabs.push(tab);
    }

    /// Remove a tab. When the active tab is closed, focus moves to the tab
    /// now occupying the closed index, else the previous index, else nothing.
    pub fn close_tab(&mut self, id: &str) {
        let Some(index) = self.tabs.iter().position(|t| t.id() == id) else {
            return;
        };
        self.tabs.remove(index);

        if self.active_tab_id.as_deref() == Some(id) {
            self.active_tab_id = self
                .tabs
                .get(index)
                .or_else(|| index.checked_sub(1).and_then(|i| self.tabs.get(i)))
                .map(|t| t.id().to_string());
        }
    }

    /// Pure selection; silently ignores unknown ids
    pub fn set_active_tab(&mut self, id: &str) {
        if self.tab(id).is_some() {
            self.active_tab_id = Some(id.to_string());
        }
    }

    /// Merge fields into the active tab and force `is_dirty`, even when the
    /// new values equal the old ones (no diffing)
    pub fn update_active_tab(&mut self, patch: TabPatch) {
        let Some(active_id) = self.active_tab_id.clone() else {
            return;
        };
        if let Some(tab) = self.tab_mut(&active_id) {
            patch.apply(&mut tab.request);
            tab.is_dirty = true;
        }
    }

    /// Copy the active tab's request into its owning collection (replace by
    /// id or append) and clear the dirty flag. Returns the owning collection
    /// id when a collection was updated, so the caller can trigger a sync.
    ///
    /// The dirty flag clears even when the owning collection is gone; the tab
    /// then simply has nowhere to persist to.
    pub fn save_active_tab(&mut self) -> Option<String> {
        let active_id = self.active_tab_id.clone()?;
        let tab = self.tab_mut(&active_id)?;
        tab.is_dirty = false;
        let request = tab.request.clone();

        let collection = self.collection_mut(&request.collection_id)?;
        match collection.requests.iter_mut().find(|r| r.id == request.id) {
            Some(saved) => *saved = request.clone(),
            None => collection.requests.push(request.clone()),
        }
        Some(request.collection_id)
    }

    // ========================
    // Execution sub-state
    // ========================

    /// A send is leaving: mark loading and drop the previous response
    pub fn request_start(&mut self, tab_id: &str) {
        if let Some(tab) = self.tab_mut(tab_id) {
            tab.loading = true;
            tab.response = None;
        }
    }

    /// A send came back (success, sentinel failure, or cancellation)
    pub fn request_complete(&mut self, tab_id: &str, response: ApiResponse) {
        if let Some(tab) = self.tab_mut(tab_id) {
            tab.loading = false;
            tab.response = Some(response);
        }
    }
}
