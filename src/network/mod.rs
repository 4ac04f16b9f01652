//! Network layer - request execution and the cloud service client
//!
//! The Network actor receives execution/cloud commands and sends back events.

pub mod actor;
pub mod cloud;
pub mod engine;

pub use actor::NetworkActor;
pub use cloud::CloudClient;
pub use engine::{build_plan, RequestPlan};
