//! Execution engine - builds and runs outbound HTTP calls for tabs
//!
//! Planning is pure: a [`RequestPlan`] is derived from a request snapshot
//! with no I/O. Execution never returns an error to the caller; every
//! failure mode is normalized into a sentinel [`ApiResponse`] with status 0.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::models::{ApiKeyPlacement, ApiRequest, ApiResponse, AuthKind, HttpMethod};

/// The wire-ready form of a request: effective URL, ordered header pairs,
/// and an optional body
#[derive(Clone, Debug, PartialEq)]
pub struct RequestPlan {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Build the effective request from a tab's snapshot.
///
/// Query: existing pairs from the URL survive, enabled non-empty-key params
/// are appended, then the api-key pair when its placement is `query`.
/// Headers: user rows first, auth rows appended after so a same-named user
/// header cannot shadow them; duplicates are allowed by design.
pub fn build_plan(request: &ApiRequest) -> Result<RequestPlan> {
    let mut url = Url::parse(&request.url).map_err(|e| anyhow!("invalid URL: {e}"))?;

    let mut extra_pairs: Vec<(&str, &str)> = request
        .params
        .iter()
        .filter(|p| p.is_active())
        .map(|p| (p.key.as_str(), p.value.as_str()))
        .collect();
    let api_key = request.auth.api_key.as_ref();
    if request.auth.kind == AuthKind::ApiKey {
        if let Some(key) = api_key.filter(|k| k.placement == ApiKeyPlacement::Query) {
            extra_pairs.push((key.key.as_str(), key.value.as_str()));
        }
    }
    if !extra_pairs.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in extra_pairs {
            pairs.append_pair(key, value);
        }
    }

    let mut headers: Vec<(String, String)> = request
        .headers
        .iter()
        .filter(|h| h.is_active())
        .map(|h| (h.key.clone(), h.value.clone()))
        .collect();
    match request.auth.kind {
        AuthKind::ApiKey => {
            if let Some(key) = api_key.filter(|k| k.placement == ApiKeyPlacement::Header) {
                headers.push((key.key.clone(), key.value.clone()));
            }
        }
        AuthKind::Bearer => {
            if let Some(bearer) = request.auth.bearer.as_ref().filter(|b| !b.token.is_empty()) {
                headers.push(("Authorization".into(), format!("Bearer {}", bearer.token)));
            }
        }
        AuthKind::Basic => {
            if let Some(basic) = request.auth.basic.as_ref().filter(|b| !b.username.is_empty()) {
                let credentials = format!("{}:{}", basic.username, basic.password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
                headers.push(("Authorization".into(), format!("Basic {encoded}")));
            }
        }
        AuthKind::NoAuth => {}
    }

    let body = if !request.method.is_bodyless() && !request.body.is_empty() {
        Some(request.body.clone())
    } else {
        None
    };
    if body.is_some()
        && !headers
            .iter()
            .any(|(key, _)| key.eq_ignore_ascii_case("content-type"))
    {
        headers.push(("Content-Type".into(), "application/json".into()));
    }

    Ok(RequestPlan {
        method: request.method,
        url,
        headers,
        body,
    })
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

fn to_header_map(pairs: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in pairs {
        let name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|_| anyhow!("invalid header name: {key:?}"))?;
        let value = HeaderValue::from_str(value).map_err(|_| anyhow!("invalid header value for {key:?}"))?;
        // append, not insert: duplicate names are allowed
        map.append(name, value);
    }
    Ok(map)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Execute a request snapshot and normalize the outcome.
///
/// Transport failures, bad URLs, and unparseable header rows all surface as
/// a `Fetch Error` sentinel; a non-JSON body is kept as a raw string payload.
pub async fn execute(client: &reqwest::Client, request: &ApiRequest) -> ApiResponse {
    let start = Instant::now();

    let plan = match build_plan(request) {
        Ok(plan) => plan,
        Err(e) => return ApiResponse::fetch_error(e.to_string(), elapsed_ms(start)),
    };
    let header_map = match to_header_map(&plan.headers) {
        Ok(map) => map,
        Err(e) => return ApiResponse::fetch_error(e.to_string(), elapsed_ms(start)),
    };

    let mut builder = client
        .request(to_reqwest_method(plan.method), plan.url)
        .headers(header_map);
    if let Some(body) = plan.body {
        builder = builder.body(body);
    }

    let response = match builder.send().await {
        Ok(response) => response,
        Err(e) => {
            let message = if e.is_timeout() {
                format!("Request timed out ({REQUEST_TIMEOUT_SECS}s)")
            } else if e.is_connect() {
                format!("Connection failed: {e}")
            } else {
                format!("Request failed: {e}")
            };
            return ApiResponse::fetch_error(message, elapsed_ms(start));
        }
    };

    let status = response.status().as_u16();
    let status_text = response
        .status()
        .canonical_reason()
        .unwrap_or_default()
        .to_string();
    // flatten the header multimap; later values win on name collisions
    let mut headers = HashMap::new();
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            headers.insert(name.to_string(), value.to_string());
        }
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return ApiResponse::fetch_error(format!("Error reading body: {e}"), elapsed_ms(start)),
    };
    let size = text.len() as u64;
    let data = match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => value,
        Err(_) => serde_json::Value::String(text),
    };

    ApiResponse {
        status,
        status_text,
        data,
        headers,
        time: elapsed_ms(start),
        size,
    }
}

/// Create an HTTP client with the default execution configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Auth, KeyValue};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn get_request(url: &str) -> ApiRequest {
        let mut request = ApiRequest::new("c1", "r");
        request.url = url.into();
        request
    }

    #[test]
    fn test_enabled_param_lands_in_query() {
        let mut request = get_request("http://a/b");
        request.params.push(KeyValue::new("q", "x"));

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.url.as_str(), "http://a/b?q=x");
    }

    #[test]
    fn test_disabled_and_empty_key_rows_are_dropped() {
        let mut request = get_request("http://a/b");
        let mut off = KeyValue::new("skip", "1");
        off.enabled = false;
        request.params.push(off.clone());
        request.params.push(KeyValue::new("", "orphan"));
        request.headers.push(off);
        request.headers.push(KeyValue::new("", "orphan"));

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.url.as_str(), "http://a/b");
        assert!(plan.headers.is_empty());
    }

    #[test]
    fn test_existing_query_survives_appends() {
        let mut request = get_request("http://a/b?keep=1");
        request.params.push(KeyValue::new("q", "x"));

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.url.as_str(), "http://a/b?keep=1&q=x");
    }

    #[test]
    fn test_api_key_in_query_is_appended_last() {
        let mut request = get_request("http://a/b");
        request.params.push(KeyValue::new("q", "x"));
        request.auth = Auth::api_key("token", "secret", ApiKeyPlacement::Query);

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.url.as_str(), "http://a/b?q=x&token=secret");
    }

    #[test]
    fn test_bearer_token_becomes_authorization_header() {
        let mut request = get_request("http://a/b");
        request.auth = Auth::bearer("T");

        let plan = build_plan(&request).unwrap();

        assert!(plan
            .headers
            .contains(&("Authorization".into(), "Bearer T".into())));
    }

    #[test]
    fn test_empty_bearer_token_adds_nothing() {
        let mut request = get_request("http://a/b");
        request.auth = Auth::bearer("");

        let plan = build_plan(&request).unwrap();

        assert!(plan.headers.is_empty());
    }

    #[test]
    fn test_basic_auth_is_base64_of_user_colon_pass() {
        let mut request = get_request("http://a/b");
        request.auth = Auth::basic("user", "pass");

        let plan = build_plan(&request).unwrap();

        // base64("user:pass")
        assert!(plan
            .headers
            .contains(&("Authorization".into(), "Basic dXNlcjpwYXNz".into())));
    }

    #[test]
    fn test_auth_header_appends_after_user_rows() {
        let mut request = get_request("http://a/b");
        request.headers.push(KeyValue::new("Authorization", "user-supplied"));
        request.auth = Auth::bearer("T");

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.headers[0].1, "user-supplied");
        assert_eq!(plan.headers[1].1, "Bearer T");
    }

    #[test]
    fn test_api_key_header_placement() {
        let mut request = get_request("http://a/b");
        request.auth = Auth::api_key("X-Api-Key", "secret", ApiKeyPlacement::Header);

        let plan = build_plan(&request).unwrap();

        assert_eq!(plan.url.as_str(), "http://a/b");
        assert!(plan
            .headers
            .contains(&("X-Api-Key".into(), "secret".into())));
    }

    #[test]
    fn test_get_and_head_never_carry_a_body() {
        let mut request = get_request("http://a/b");
        request.body = "{\"x\":1}".into();
        for method in [HttpMethod::GET, HttpMethod::HEAD] {
            request.method = method;
            assert_eq!(build_plan(&request).unwrap().body, None);
        }
    }

    #[test]
    fn test_body_defaults_content_type_unless_present() {
        let mut request = get_request("http://a/b");
        request.method = HttpMethod::POST;
        request.body = "{}".into();

        let plan = build_plan(&request).unwrap();
        assert!(plan
            .headers
            .contains(&("Content-Type".into(), "application/json".into())));

        request.headers.push(KeyValue::new("content-type", "text/plain"));
        let plan = build_plan(&request).unwrap();
        let content_types: Vec<_> = plan
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("content-type"))
            .collect();
        assert_eq!(content_types.len(), 1);
        assert_eq!(content_types[0].1, "text/plain");
    }

    #[test]
    fn test_empty_body_is_omitted() {
        let mut request = get_request("http://a/b");
        request.method = HttpMethod::POST;
        let plan = build_plan(&request).unwrap();
        assert_eq!(plan.body, None);
        assert!(plan.headers.is_empty());
    }

    #[test]
    fn test_invalid_url_is_an_error() {
        let request = get_request("not a url");
        assert!(build_plan(&request).is_err());
    }

    #[tokio::test]
    async fn test_execute_normalizes_a_real_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let body = r#"{"ok":true}"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = create_client();
        let request = get_request(&format!("http://{addr}/"));
        let response = execute(&client, &request).await;

        assert_eq!(response.status, 200);
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.data["ok"], true);
        assert_eq!(response.size, 11);
        assert_eq!(
            response.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_execute_keeps_non_json_body_as_raw_text() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response =
                "HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\n\r\nhello";
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = create_client();
        let response = execute(&client, &get_request(&format!("http://{addr}/"))).await;

        assert_eq!(response.data, serde_json::Value::String("hello".into()));
        assert_eq!(response.size, 5);
    }

    #[tokio::test]
    async fn test_execute_turns_transport_failure_into_sentinel() {
        // Bind then drop to get a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = create_client();
        let response = execute(&client, &get_request(&format!("http://{addr}/"))).await;

        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Fetch Error");
        assert!(response.data["hint"].as_str().unwrap().contains("cross-origin"));
    }

    #[tokio::test]
    async fn test_execute_reports_invalid_url_as_sentinel() {
        let client = create_client();
        let response = execute(&client, &get_request("not a url")).await;
        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Fetch Error");
    }
}
