//! App state - pure data structure with no I/O logic
//!
//! Every transition is a synchronous method; side effects (network calls,
//! storage writes) happen in the actors and feed results back as events.
//! Operations on unknown ids are no-ops, never panics.

use std::collections::HashSet;

use crate::models::{ApiRequest, Collection, RequestTab, User};

/// Main application state - pure data, mutated only by the app actor
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub collections: Vec<Collection>,
    pub tabs: Vec<RequestTab>,
    pub active_tab_id: Option<String>,
    /// Present while a cloud session cookie is held
    pub user: Option<User>,
}

impl AppState {
    pub fn new() -> Self {
        AppState::default()
    }

    // ========================
    // Lookups
    // ========================

    pub fn tab(&self, id: &str) -> Option<&RequestTab> {
        self.tabs.iter().find(|t| t.id() == id)
    }

    pub fn tab_mut(&mut self, id: &str) -> Option<&mut RequestTab> {
        self.tabs.iter_mut().find(|t| t.id() == id)
    }

    pub fn active_tab(&self) -> Option<&RequestTab> {
        self.active_tab_id.as_deref().and_then(|id| self.tab(id))
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn collection_mut(&mut self, id: &str) -> Option<&mut Collection> {
        self.collections.iter_mut().find(|c| c.id == id)
    }

    /// Find a request by id, preferring the saved copy in a collection and
    /// falling back to an open tab's working copy
    pub fn find_request(&self, request_id: &str) -> Option<ApiRequest> {
        for collection in &self.collections {
            if let Some(request) = collection.requests.iter().find(|r| r.id == request_id) {
                return Some(request.clone());
            }
        }
        self.tab(request_id).map(|tab| tab.request.clone())
    }

    // ========================
    // Cloud session
    // ========================

    pub fn start_session(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Merge the freshly fetched cloud set with the local-only subset.
    ///
    /// Cloud entries are authoritative for any id overlap; previously held
    /// cloud-owned collections are replaced wholesale by the fetch.
    pub fn merge_cloud_collections(&mut self, cloud: Vec<Collection>) {
        let cloud_ids: HashSet<&str> = cloud.iter().map(|c| c.id.as_str()).collect();
        self.collections
            .retain(|c| c.origin.is_local() && !cloud_ids.contains(c.id.as_str()));
        self.collections.extend(cloud);
    }

    /// Drop cloud-owned collections and forget the user; local-only
    /// collections remain usable
    pub fn end_session(&mut self) {
        self.user = None;
        self.collections.retain(|c| c.origin.is_local());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Origin;

    fn cloud(name: &str, id: &str, owner: &str) -> Collection {
        let mut c = Collection::new(name);
        c.id = id.into();
        c.origin = Origin::Cloud {
            owner_ref: owner.into(),
        };
        c
    }

    fn local(name: &str, id: &str) -> Collection {
        let mut c = Collection::new(name);
        c.id = id.into();
        c
    }

    #[test]
    fn test_merge_keeps_local_and_prefers_cloud_on_overlap() {
        let mut state = AppState::new();
        state.collections = vec![local("mine", "a"), local("shared once", "b")];

        state.merge_cloud_collections(vec![cloud("shared once", "b", "u1"), cloud("theirs", "c", "u1")]);

        let ids: Vec<&str> = state.collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(!state.collection("b").unwrap().origin.is_local());
    }

    #[test]
    fn test_merge_replaces_stale_cloud_entries() {
        let mut state = AppState::new();
        state.collections = vec![cloud("old", "x", "u1"), local("keep", "y")];

        state.merge_cloud_collections(vec![cloud("fresh", "z", "u1")]);

        let ids: Vec<&str> = state.collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["y", "z"]);
    }

    #[test]
    fn test_end_session_retains_local_only() {
        let mut state = AppState::new();
        state.user = Some(User {
            id: "u1".into(),
            email: "a@b.c".into(),
        });
        state.collections = vec![local("keep", "a"), cloud("drop", "b", "u1")];

        state.end_session();

        assert!(state.user.is_none());
        assert_eq!(state.collections.len(), 1);
        assert_eq!(state.collections[0].id, "a");
    }
}
