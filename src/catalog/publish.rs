//! Creation of playlists in a user's catalog account.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::models::{track_uri, AccessToken};

pub const MAX_PLAYLIST_NAME_CHARS: usize = 80;
pub const MAX_PLAYLIST_DESCRIPTION_CHARS: usize = 200;
/// Tracks added per request.
const ADD_TRACKS_BATCH: usize = 100;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Catalog API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct PlaylistDraft {
    pub name: String,
    pub description: String,
    pub track_ids: Vec<String>,
}

impl PlaylistDraft {
    /// Name and description cut to the catalog's length limits.
    pub fn truncated(self) -> Self {
        Self {
            name: truncate_chars(&self.name, MAX_PLAYLIST_NAME_CHARS),
            description: truncate_chars(&self.description, MAX_PLAYLIST_DESCRIPTION_CHARS),
            track_ids: self.track_ids,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPlaylist {
    pub playlist_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,
    pub tracks_added: usize,
}

/// Creates a playlist on behalf of a user. Partial failures are not retried.
#[async_trait]
pub trait PlaylistPublisher: Send + Sync {
    async fn publish(
        &self,
        draft: PlaylistDraft,
        user_credential: &AccessToken,
    ) -> Result<PublishedPlaylist, PublishError>;
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub struct SpotifyPlaylistPublisher {
    client: Client,
    api_base_url: String,
}

#[derive(Deserialize)]
struct CurrentUser {
    id: String,
}

#[derive(Serialize)]
struct CreatePlaylistBody<'a> {
    name: &'a str,
    description: &'a str,
    public: bool,
}

#[derive(Deserialize)]
struct CreatedPlaylist {
    id: String,
    external_urls: Option<ExternalUrls>,
}

#[derive(Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[derive(Serialize)]
struct AddTracksBody {
    uris: Vec<String>,
}

impl SpotifyPlaylistPublisher {
    pub fn new(api_base_url: impl Into<String>, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        request: RequestBuilder,
    ) -> Result<T, PublishError> {
        let response = request
            .send()
            .await
            .map_err(|e| PublishError::Connection(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PublishError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| PublishError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl PlaylistPublisher for SpotifyPlaylistPublisher {
    async fn publish(
        &self,
        draft: PlaylistDraft,
        user_credential: &AccessToken,
    ) -> Result<PublishedPlaylist, PublishError> {
        let draft = draft.truncated();
        let auth = user_credential.bearer();

        let user: CurrentUser = Self::send_json(
            self.client
                .get(format!("{}/me", self.api_base_url))
                .header("Authorization", &auth),
        )
        .await?;

        let created: CreatedPlaylist = Self::send_json(
            self.client
                .post(format!(
                    "{}/users/{}/playlists",
                    self.api_base_url,
                    urlencoding::encode(&user.id)
                ))
                .header("Authorization", &auth)
                .json(&CreatePlaylistBody {
                    name: &draft.name,
                    description: &draft.description,
                    public: false,
                }),
        )
        .await?;
        debug!(playlist_id = %created.id, user_id = %user.id, "Created playlist");

        let mut tracks_added = 0;
        for batch in draft.track_ids.chunks(ADD_TRACKS_BATCH) {
            let uris = batch.iter().map(|id| track_uri(id)).collect();
            let _: serde_json::Value = Self::send_json(
                self.client
                    .post(format!(
                        "{}/playlists/{}/tracks",
                        self.api_base_url,
                        urlencoding::encode(&created.id)
                    ))
                    .header("Authorization", &auth)
                    .json(&AddTracksBody { uris }),
            )
            .await?;
            tracks_added += batch.len();
        }

        info!(
            "Published playlist {} with {} tracks",
            created.id, tracks_added
        );

        Ok(PublishedPlaylist {
            playlist_url: created.external_urls.and_then(|u| u.spotify),
            playlist_id: created.id,
            tracks_added,
        })
    }
}
