//! App layer - central state management and intent processing
//!
//! The App actor receives UI intents and network events, applies pure state
//! transitions, persists the result, and emits network commands plus UI
//! updates.

pub mod actor;
pub mod collections;
pub mod state;
pub mod tabs;

pub use actor::AppActor;
pub use state::AppState;
