//! Network messages - communication between App and Network layers

use crate::models::{ApiRequest, ApiResponse, Collection, User};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute an HTTP request on behalf of a tab. A second execute for the
    /// same tab silently supersedes (cancels) the first.
    Execute { tab_id: String, request: ApiRequest },
    /// Abort the in-flight call associated with this tab, if any
    Cancel { tab_id: String },

    // Cloud service
    /// Upsert a collection on the cloud service
    PushCollection(Collection),
    /// Fetch all collections owned by the session user
    FetchCollections,
    /// Fetch a single collection by its public access code
    FetchSharedCollection { access_code: String },
    Register { email: String, password: String },
    Login { email: String, password: String },
    Logout,
    /// Ask the service who the cookie says we are
    CheckSession,

    /// Shutdown the network actor, aborting in-flight calls
    Shutdown,
}

/// What a failed cloud call was trying to do; maps to user-facing notices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudAction {
    Register,
    Login,
    Logout,
    FetchCollections,
    Push,
    ImportByCode,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkEvent {
    /// An executed request finished: real response, sentinel failure, or
    /// cancellation - the tab always leaves its loading state
    RequestCompleted { tab_id: String, response: ApiResponse },

    // Cloud service
    CollectionsFetched(Vec<Collection>),
    SharedCollectionFetched(Collection),
    CollectionPushed { id: String, name: String },
    /// Login or register succeeded and a session cookie is now held
    SessionStarted(User),
    /// Result of a startup session probe
    SessionChecked(Option<User>),
    /// The session was revoked (locally unconditional, see `CloudFailed` for
    /// revocation transport errors)
    SessionEnded,
    CloudFailed { action: CloudAction, message: String },
}
