//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Directory under the user's home where local state is persisted
pub const STORAGE_DIR: &str = ".quiver";

/// File name of the persisted state blob
pub const STORAGE_FILE: &str = "state.json";

/// Base URL of the cloud collection/auth service
pub const DEFAULT_CLOUD_URL: &str = "http://localhost:3000/api";

/// Outbound request timeout in seconds (executed requests and cloud calls)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Data payload message for a user-cancelled request
pub const CANCELLED_MESSAGE: &str = "Request was cancelled by the user.";

/// Hint attached to transport failures; browser-hosted clients hit this mostly via CORS
pub const FETCH_ERROR_HINT: &str = "This could be a cross-origin issue. The API server must send \
the 'Access-Control-Allow-Origin' header for browser-based clients.";

/// Application name
#[allow(dead_code)]
pub const APP_NAME: &str = "Quiver";

/// Application version
#[allow(dead_code)]
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
