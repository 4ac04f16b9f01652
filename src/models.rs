use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::{CANCELLED_MESSAGE, FETCH_ERROR_HINT};

/// HTTP Method enum
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }

    /// GET and HEAD requests never carry a body
    pub fn is_bodyless(&self) -> bool {
        matches!(self, HttpMethod::GET | HttpMethod::HEAD)
    }
}

/// A single param/header row. Disabling a row excludes it from execution
/// without deleting it; keys need not be unique.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub id: String,
    pub key: String,
    pub value: String,
    pub enabled: bool,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        KeyValue {
            id: uuid::Uuid::new_v4().to_string(),
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Rows that take part in request construction
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.is_empty()
    }
}

/// Which auth scheme is currently selected
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthKind {
    #[default]
    NoAuth,
    ApiKey,
    Bearer,
    Basic,
}

/// Where an api-key pair is injected
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyPlacement {
    #[default]
    Header,
    Query,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyAuth {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "in", default)]
    pub placement: ApiKeyPlacement,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BearerAuth {
    #[serde(default)]
    pub token: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicAuth {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Auth configuration for a request.
///
/// Exactly one payload branch is meaningful per kind, but the unused branches
/// are retained so switching the kind back restores previously entered values.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    #[serde(rename = "type", default)]
    pub kind: AuthKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<ApiKeyAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer: Option<BearerAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic: Option<BasicAuth>,
}

impl Auth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth {
            kind: AuthKind::Bearer,
            bearer: Some(BearerAuth { token: token.into() }),
            ..Auth::default()
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth {
            kind: AuthKind::Basic,
            basic: Some(BasicAuth {
                username: username.into(),
                password: password.into(),
            }),
            ..Auth::default()
        }
    }

    pub fn api_key(key: impl Into<String>, value: impl Into<String>, placement: ApiKeyPlacement) -> Self {
        Auth {
            kind: AuthKind::ApiKey,
            api_key: Some(ApiKeyAuth {
                key: key.into(),
                value: value.into(),
                placement,
            }),
            ..Auth::default()
        }
    }
}

/// A saved HTTP request definition
///
/// `body` is raw text; the core never validates its content. `auth` defaults
/// to no-auth at load time so legacy records without the field stay readable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub headers: Vec<KeyValue>,
    #[serde(default)]
    pub params: Vec<KeyValue>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub collection_id: String,
}

impl ApiRequest {
    /// Create an empty request inside a collection
    pub fn new(collection_id: impl Into<String>, name: impl Into<String>) -> Self {
        ApiRequest {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            url: String::new(),
            method: HttpMethod::GET,
            auth: Auth::default(),
            headers: Vec::new(),
            params: Vec::new(),
            body: String::new(),
            collection_id: collection_id.into(),
        }
    }
}

/// Where a collection lives.
///
/// Cloud-owned collections are pushed to the remote service after structural
/// changes; local ones exist only in client-side storage. The wire form is an
/// optional `ownerRef` string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Origin {
    #[default]
    Local,
    Cloud { owner_ref: String },
}

impl Origin {
    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Local)
    }
}

impl From<Option<String>> for Origin {
    fn from(owner_ref: Option<String>) -> Self {
        match owner_ref {
            Some(owner_ref) => Origin::Cloud { owner_ref },
            None => Origin::Local,
        }
    }
}

impl From<Origin> for Option<String> {
    fn from(origin: Origin) -> Self {
        match origin {
            Origin::Cloud { owner_ref } => Some(owner_ref),
            Origin::Local => None,
        }
    }
}

/// A named group of saved requests. The id doubles as the shareable access code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub requests: Vec<ApiRequest>,
    #[serde(rename = "ownerRef", default, skip_serializing_if = "Origin::is_local")]
    pub origin: Origin,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Collection {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            requests: Vec::new(),
            origin: Origin::Local,
        }
    }
}

/// Normalized outcome of an executed request.
///
/// `status == 0` marks a response with no real HTTP status; `status_text`
/// distinguishes `Cancelled` from `Fetch Error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: u16,
    pub status_text: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Elapsed wall time in milliseconds
    pub time: u64,
    /// Raw byte size of the response body
    pub size: u64,
}

impl ApiResponse {
    pub fn cancelled(time_ms: u64) -> Self {
        ApiResponse {
            status: 0,
            status_text: String::from("Cancelled"),
            data: serde_json::json!({ "message": CANCELLED_MESSAGE }),
            headers: HashMap::new(),
            time: time_ms,
            size: 0,
        }
    }

    pub fn fetch_error(message: impl Into<String>, time_ms: u64) -> Self {
        let message: String = message.into();
        ApiResponse {
            status: 0,
            status_text: String::from("Fetch Error"),
            data: serde_json::json!({
                "message": message,
                "hint": FETCH_ERROR_HINT,
            }),
            headers: HashMap::new(),
            time: time_ms,
            size: 0,
        }
    }

    /// True for cancelled/failed-transport responses that carry no real status
    pub fn is_sentinel(&self) -> bool {
        self.status == 0
    }
}

/// A working copy of a request opened for editing and execution.
///
/// Edits land on the tab, not the stored request, until an explicit save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTab {
    #[serde(flatten)]
    pub request: ApiRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<ApiResponse>,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub is_dirty: bool,
}

impl RequestTab {
    /// Open a request as a fresh working copy
    pub fn open(request: ApiRequest) -> Self {
        RequestTab {
            request,
            response: None,
            loading: false,
            is_dirty: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.request.id
    }
}

/// Field-wise patch applied to the active tab; `None` leaves a field untouched
#[derive(Clone, Debug, Default)]
pub struct TabPatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub auth: Option<Auth>,
    pub headers: Option<Vec<KeyValue>>,
    pub params: Option<Vec<KeyValue>>,
    pub body: Option<String>,
}

impl TabPatch {
    pub fn url(url: impl Into<String>) -> Self {
        TabPatch {
            url: Some(url.into()),
            ..TabPatch::default()
        }
    }

    pub fn apply(self, request: &mut ApiRequest) {
        if let Some(name) = self.name {
            request.name = name;
        }
        if let Some(url) = self.url {
            request.url = url;
        }
        if let Some(method) = self.method {
            request.method = method;
        }
        if let Some(auth) = self.auth {
            request.auth = auth;
        }
        if let Some(headers) = self.headers {
            request.headers = headers;
        }
        if let Some(params) = self.params {
            request.params = params;
        }
        if let Some(body) = self.body {
            request.body = body;
        }
    }
}

/// An authenticated cloud user (password never reaches the client)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_kind_wire_names() {
        let auth = Auth::bearer("T");
        let json = serde_json::to_value(&auth).unwrap();
        assert_eq!(json["type"], "bearer");
        assert_eq!(json["bearer"]["token"], "T");
    }

    #[test]
    fn test_legacy_request_defaults_to_no_auth() {
        let raw = r#"{"id":"r1","name":"old","url":"http://a/b","method":"GET",
                      "headers":[],"params":[],"body":"","collectionId":"c1"}"#;
        let request: ApiRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.auth.kind, AuthKind::NoAuth);
    }

    #[test]
    fn test_auth_retains_unused_branches() {
        let mut auth = Auth::bearer("secret");
        auth.kind = AuthKind::Basic;
        auth.basic = Some(BasicAuth {
            username: "u".into(),
            password: "p".into(),
        });
        // Switching back to bearer finds the token still in place
        assert_eq!(auth.bearer.as_ref().unwrap().token, "secret");
    }

    #[test]
    fn test_origin_wire_form_is_owner_ref() {
        let mut collection = Collection::new("mine");
        collection.origin = Origin::Cloud {
            owner_ref: "user-1".into(),
        };
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["ownerRef"], "user-1");

        let local = Collection::new("local");
        let json = serde_json::to_value(&local).unwrap();
        assert!(json.get("ownerRef").is_none());

        let parsed: Collection = serde_json::from_value(json).unwrap();
        assert!(parsed.origin.is_local());
    }

    #[test]
    fn test_tab_serializes_flattened() {
        let mut request = ApiRequest::new("c1", "req");
        request.id = "r1".into();
        let tab = RequestTab::open(request);
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["collectionId"], "c1");
        assert_eq!(json["isDirty"], false);
    }
}
