//! Collection store - named groups of saved requests
//!
//! Imports merge by skipping id collisions (local wins, no overwrite) and are
//! all-or-nothing: a single malformed entry rejects the whole batch.

use anyhow::{anyhow, bail, Context, Result};

use crate::app::AppState;
use crate::models::{ApiRequest, Collection};

impl AppState {
    /// Create an empty local collection and return its id (the future access
    /// code, should it ever be shared)
    pub fn create_collection(&mut self, name: impl Into<String>) -> String {
        let collection = Collection::new(name);
        let id = collection.id.clone();
        self.collections.push(collection);
        id
    }

    pub fn rename_collection(&mut self, id: &str, name: impl Into<String>) {
        if let Some(collection) = self.collection_mut(id) {
            collection.name = name.into();
        }
    }

    pub fn delete_collection(&mut self, id: &str) {
        self.collections.retain(|c| c.id != id);
    }

    pub fn add_request(&mut self, collection_id: &str, request: ApiRequest) {
        if let Some(collection) = self.collection_mut(collection_id) {
            collection.requests.push(request);
        }
    }

    /// Remove a saved request; its tab, if open, is closed too
    pub fn remove_request(&mut self, collection_id: &str, request_id: &str) {
        if let Some(collection) = self.collection_mut(collection_id) {
            collection.requests.retain(|r| r.id != request_id);
        }
        self.close_tab(request_id);
    }

    /// Import a single collection object or an array of them from raw JSON.
    ///
    /// Every entry must carry `id`, `name`, and an array-valued `requests`;
    /// otherwise nothing is applied. Returns how many collections the file
    /// contained (skipped duplicates still count, mirroring the import
    /// report the UI shows).
    pub fn import_collections(&mut self, raw_json: &str) -> Result<usize> {
        let value: serde_json::Value =
            serde_json::from_str(raw_json).context("could not parse the file")?;
        let entries = match value {
            serde_json::Value::Array(entries) => entries,
            object => vec![object],
        };

        let mut incoming = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.get("requests").map(|r| r.is_array()).unwrap_or(false) {
                bail!("invalid collection format");
            }
            let collection: Collection =
                serde_json::from_value(entry).map_err(|_| anyhow!("invalid collection format"))?;
            if collection.id.is_empty() || collection.name.is_empty() {
                bail!("invalid collection format");
            }
            incoming.push(collection);
        }

        let count = incoming.len();
        self.merge_imported(incoming);
        Ok(count)
    }

    /// Merge already-validated collections, skipping any id that exists
    pub fn merge_imported(&mut self, incoming: Vec<Collection>) {
        for collection in incoming {
            if self.collection(&collection.id).is_none() {
                self.collections.push(collection);
            }
        }
    }

    /// Serialize one collection for download. Returns the suggested file
    /// name and the pretty-printed JSON.
    pub fn export_collection(&self, id: &str) -> Result<(String, String)> {
        let collection = self.collection(id).ok_or_else(|| anyhow!("Collection not found."))?;
        let json = serde_json::to_string_pretty(collection)?;
        let file_name = format!("{}.json", collection.name.replace(' ', "_"));
        Ok((file_name, json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthKind;

    #[test]
    fn test_create_rename_delete() {
        let mut state = AppState::new();
        let id = state.create_collection("apis");
        assert_eq!(state.collections.len(), 1);

        state.rename_collection(&id, "renamed");
        assert_eq!(state.collection(&id).unwrap().name, "renamed");

        state.delete_collection(&id);
        assert!(state.collections.is_empty());
    }

    #[test]
    fn test_remove_request_closes_its_tab() {
        let mut state = AppState::new();
        let collection_id = state.create_collection("c");
        let request = ApiRequest::new(&collection_id, "r");
        let request_id = request.id.clone();
        state.add_request(&collection_id, request.clone());
        state.open_tab(request);

        state.remove_request(&collection_id, &request_id);

        assert!(state.collection(&collection_id).unwrap().requests.is_empty());
        assert!(state.tab(&request_id).is_none());
        assert_eq!(state.active_tab_id, None);
    }

    #[test]
    fn test_import_single_object_and_array() {
        let mut state = AppState::new();
        let single = r#"{"id":"c1","name":"one","requests":[]}"#;
        assert_eq!(state.import_collections(single).unwrap(), 1);

        let batch = r#"[{"id":"c2","name":"two","requests":[]},
                        {"id":"c3","name":"three","requests":[]}]"#;
        assert_eq!(state.import_collections(batch).unwrap(), 2);
        assert_eq!(state.collections.len(), 3);
    }

    #[test]
    fn test_import_skips_existing_ids() {
        let mut state = AppState::new();
        state
            .import_collections(r#"{"id":"c1","name":"original","requests":[]}"#)
            .unwrap();

        state
            .import_collections(r#"{"id":"c1","name":"impostor","requests":[]}"#)
            .unwrap();

        assert_eq!(state.collections.len(), 1);
        assert_eq!(state.collection("c1").unwrap().name, "original");
    }

    #[test]
    fn test_import_rejects_whole_batch_on_one_bad_entry() {
        let mut state = AppState::new();
        let batch = r#"[{"id":"ok","name":"fine","requests":[]},
                        {"id":"bad","name":"no requests field"}]"#;

        assert!(state.import_collections(batch).is_err());
        assert!(state.collections.is_empty());
    }

    #[test]
    fn test_import_rejects_non_array_requests() {
        let mut state = AppState::new();
        let raw = r#"{"id":"c1","name":"n","requests":"nope"}"#;
        assert!(state.import_collections(raw).is_err());
    }

    #[test]
    fn test_import_defaults_legacy_auth() {
        let mut state = AppState::new();
        let raw = r#"{"id":"c1","name":"legacy","requests":[
            {"id":"r1","name":"old","url":"http://a","method":"GET",
             "headers":[],"params":[],"body":"","collectionId":"c1"}
        ]}"#;

        state.import_collections(raw).unwrap();

        let request = &state.collection("c1").unwrap().requests[0];
        assert_eq!(request.auth.kind, AuthKind::NoAuth);
    }

    #[test]
    fn test_export_unknown_id_fails() {
        let state = AppState::new();
        let err = state.export_collection("ghost").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_export_file_name_replaces_spaces() {
        let mut state = AppState::new();
        let id = state.create_collection("my test apis");

        let (file_name, json) = state.export_collection(&id).unwrap();

        assert_eq!(file_name, "my_test_apis.json");
        let parsed: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, id);
    }
}
