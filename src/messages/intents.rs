//! Intents - messages from the UI layer to the App layer
//!
//! Every user interaction the core cares about is expressed as one of these.
//! Unknown ids are tolerated everywhere: the state machine treats them as
//! no-ops rather than errors.

use crate::models::TabPatch;

/// Events generated by the UI layer
#[derive(Debug, Clone)]
pub enum Intent {
    // Tabs
    /// Open the request with this id in a tab (activates the existing tab
    /// instead of duplicating it)
    OpenTab { request_id: String },
    CloseTab { request_id: String },
    SetActiveTab { request_id: String },
    /// Merge fields into the active tab; always marks it dirty
    UpdateActiveTab(TabPatch),
    /// Copy the active tab back into its owning collection
    SaveActiveTab,

    // Execution
    SendRequest { tab_id: String },
    CancelRequest { tab_id: String },

    // Collections
    CreateCollection { name: String },
    RenameCollection { id: String, name: String },
    DeleteCollection { id: String },
    CreateRequest { collection_id: String, name: String },
    DeleteRequest { collection_id: String, request_id: String },
    /// Import one collection object or an array of them from raw JSON text
    ImportCollections { raw_json: String },
    ExportCollection { id: String },

    // Cloud session and sync
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout,
    /// Push a collection to the cloud service, making it shareable by id
    SyncCollection { id: String },
    /// Fetch a shared collection by its access code and merge it in
    ImportFromCloud { access_code: String },

    // System
    Shutdown,
}
