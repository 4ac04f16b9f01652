//! Message types for inter-layer communication in the actor-based architecture.
//!
//! - [`Intent`]: UI layer -> App layer
//! - [`NetworkCommand`] / [`NetworkEvent`]: App layer <-> Network layer
//! - [`UiUpdate`]: App layer -> UI layer

pub mod intents;
pub mod network;
pub mod updates;

pub use intents::Intent;
pub use network::{NetworkCommand, NetworkEvent};
pub use updates::{Notice, NoticeLevel, UiUpdate};
