//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per playlist endpoint.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// GET /v1/status
    pub async fn status(&self) -> Response {
        self.client
            .get(format!("{}/v1/status", self.base_url))
            .send()
            .await
            .expect("Status request failed")
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// POST /v1/playlist/generate with an arbitrary JSON body
    pub async fn generate(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/v1/playlist/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// POST /v1/playlist/generate with just a prompt and a duration
    pub async fn generate_prompt(&self, prompt: &str, minutes: f64) -> Response {
        self.generate(json!({ "prompt": prompt, "minutes": minutes }))
            .await
    }

    /// POST /v1/playlist/publish, with a Bearer header when a token is given
    pub async fn publish(&self, user_token: Option<&str>, body: Value) -> Response {
        let mut request = self
            .client
            .post(format!("{}/v1/playlist/publish", self.base_url))
            .json(&body);
        if let Some(token) = user_token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Publish request failed")
    }
}
