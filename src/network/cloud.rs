//! Cloud client - the REST collection/auth service collaborator
//!
//! The service authenticates with an httpOnly session cookie, so the client
//! keeps a cookie store. All methods surface server-provided `message`
//! fields as error text when a call fails.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;

use crate::constants::REQUEST_TIMEOUT_SECS;
use crate::models::{Collection, User};

#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    user: User,
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PushPayload {
    access_code: String,
}

/// HTTP client for the cloud service, cookie-backed
#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: String,
}

impl CloudClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        CloudClient {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Pull the error `message` out of a failed response, falling back to
    /// the HTTP status line
    async fn error_from(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        match response.json::<ServerMessage>().await {
            Ok(body) => anyhow!(body.message),
            Err(_) => anyhow!("request failed with status {status}"),
        }
    }

    /// `POST /auth/register` - create an account, then establish a session
    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        // Registration does not set the cookie; log in to start the session
        self.login(email, password).await
    }

    /// `POST /auth/login` - on success the session cookie lands in the store
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let payload: LoginPayload = response.json().await?;
        Ok(payload.user)
    }

    /// `POST /auth/logout` - revoke the session cookie
    pub async fn logout(&self) -> Result<()> {
        let response = self.http.post(self.url("/auth/logout")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }

    /// `GET /auth/session` - who the cookie says we are, if anyone
    pub async fn session(&self) -> Result<Option<User>> {
        let response = self.http.get(self.url("/auth/session")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let payload: SessionPayload = response.json().await?;
        Ok(payload.user)
    }

    /// `GET /collections` - all collections owned by the session user
    pub async fn list_collections(&self) -> Result<Vec<Collection>> {
        let response = self.http.get(self.url("/collections")).send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }

    /// `POST /collections` - upsert by id; returns the access code
    pub async fn push_collection(&self, collection: &Collection) -> Result<String> {
        let response = self
            .http
            .post(self.url("/collections"))
            .json(collection)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let payload: PushPayload = response.json().await?;
        Ok(payload.access_code)
    }

    /// `GET /collections/{accessCode}` - public read by code, no ownership
    /// check
    pub async fn fetch_shared_collection(&self, access_code: &str) -> Result<Collection> {
        let response = self
            .http
            .get(self.url(&format!("/collections/{access_code}")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_doubled_slash() {
        let client = CloudClient::new("http://localhost:3000/api/");
        assert_eq!(client.url("/collections"), "http://localhost:3000/api/collections");
    }
}
