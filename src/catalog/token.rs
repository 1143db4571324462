//! Client-credentials token issuance for catalog calls.

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::models::AccessToken;

/// Tokens are refreshed this long before the provider says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Catalog credentials are not configured: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET (or [catalog] client_id/client_secret in the config file)")]
    MissingCredentials,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Token request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

/// Supplies the credential used for catalog searches.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn access_token(&self) -> Result<AccessToken, CredentialError>;
}

struct CachedToken {
    token: AccessToken,
    refresh_at: Instant,
}

pub struct ClientCredentialsIssuer {
    client: Client,
    accounts_base_url: String,
    credentials: Option<(String, String)>,
    cached: Mutex<Option<CachedToken>>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

impl ClientCredentialsIssuer {
    pub fn new(
        accounts_base_url: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
        timeout_sec: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        let credentials = match (client_id, client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => Some((id, secret)),
            _ => None,
        };
        Ok(Self {
            client,
            accounts_base_url: accounts_base_url.into().trim_end_matches('/').to_string(),
            credentials,
            cached: Mutex::new(None),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    async fn request_token(&self, id: &str, secret: &str) -> Result<CachedToken, CredentialError> {
        let url = format!("{}/api/token", self.accounts_base_url);
        let basic = STANDARD.encode(format!("{}:{}", id, secret));

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Basic {}", basic))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| CredentialError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CredentialError::InvalidResponse(e.to_string()))?;
        if body.access_token.is_empty() {
            return Err(CredentialError::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(expires_in = body.expires_in, "Obtained catalog access token");

        Ok(CachedToken {
            token: AccessToken::new(body.access_token),
            refresh_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl TokenIssuer for ClientCredentialsIssuer {
    async fn access_token(&self) -> Result<AccessToken, CredentialError> {
        let (id, secret) = self
            .credentials
            .as_ref()
            .ok_or(CredentialError::MissingCredentials)?;

        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if Instant::now() < entry.refresh_at {
                return Ok(entry.token.clone());
            }
        }

        let fresh = self.request_token(id, secret).await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}

/// Issuer that always hands out the same token.
pub struct StaticTokenIssuer(pub AccessToken);

#[async_trait]
impl TokenIssuer for StaticTokenIssuer {
    async fn access_token(&self) -> Result<AccessToken, CredentialError> {
        Ok(self.0.clone())
    }
}
