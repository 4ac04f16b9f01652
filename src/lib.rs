//! # Quiver
//!
//! Request/session orchestration core for a tabbed API testing client.
//!
//! ## Features
//! - Collections of saved HTTP requests, importable/exportable as JSON
//! - Tabbed editing: working copies with dirty tracking and explicit saves
//! - Request execution with per-tab cancellation and normalized responses
//! - Auth helpers (api-key, bearer, basic) applied at send time
//! - Local persistence plus cloud sync against a REST collection service
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (not included) - sends [`Intent`]s, renders [`UiUpdate`]s
//! - App Layer (state machine) - pure synchronous transitions
//! - Network Layer (Tokio) - async HTTP execution and cloud calls
//!
//! A host wires the actors together:
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use quiver::{AppActor, NetworkActor, Storage};
//! use quiver::constants::DEFAULT_CLOUD_URL;
//! use quiver::messages::{Intent, NetworkCommand, NetworkEvent, UiUpdate};
//!
//! # async fn wire() {
//! let (intent_tx, intent_rx) = mpsc::unbounded_channel::<Intent>();
//! let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
//! let (event_tx, event_rx) = mpsc::unbounded_channel::<NetworkEvent>();
//! let (update_tx, mut update_rx) = mpsc::unbounded_channel::<UiUpdate>();
//!
//! tokio::spawn(NetworkActor::new(event_tx, DEFAULT_CLOUD_URL).run(cmd_rx));
//! tokio::spawn(AppActor::new(Storage::new(), cmd_tx, update_tx).run(intent_rx, event_rx));
//!
//! intent_tx.send(Intent::CreateCollection { name: "demo".into() }).unwrap();
//! while let Some(_update) = update_rx.recv().await {
//!     // render state snapshots, toast notices, offer exports for download
//! }
//! # }
//! ```

pub mod app;
pub mod constants;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use messages::{Intent, NetworkCommand, NetworkEvent, Notice, NoticeLevel, UiUpdate};
pub use models::{
    ApiKeyPlacement, ApiRequest, ApiResponse, Auth, AuthKind, Collection, HttpMethod, KeyValue,
    Origin, RequestTab, TabPatch, User,
};
pub use network::{CloudClient, NetworkActor};
pub use storage::Storage;
