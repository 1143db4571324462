//! HTTP client for the Spotify Web API track search.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{AccessToken, CatalogTrack, EXPLICIT_RATING};
use super::search::{CatalogSearch, MAX_SEARCH_LIMIT};
use crate::server::metrics;

pub struct SpotifyCatalogClient {
    client: Client,
    api_base_url: String,
}

impl SpotifyCatalogClient {
    /// # Arguments
    /// * `api_base_url` - Base URL of the Web API (e.g., "https://api.spotify.com/v1")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(api_base_url: impl Into<String>, timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            api_base_url,
        })
    }

    async fn fetch(
        &self,
        query: &str,
        region: &str,
        limit: usize,
        credential: &AccessToken,
    ) -> Result<SearchResponse, String> {
        let url = format!("{}/search", self.api_base_url);
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();

        let response = self
            .client
            .get(&url)
            .header("Authorization", credential.bearer())
            .query(&[
                ("q", query),
                ("type", "track"),
                ("market", region),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("status {}", status));
        }

        response.json().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CatalogSearch for SpotifyCatalogClient {
    async fn search(
        &self,
        query: &str,
        region: &str,
        limit: usize,
        credential: &AccessToken,
    ) -> Vec<CatalogTrack> {
        match self.fetch(query, region, limit, credential).await {
            Ok(body) => {
                metrics::record_catalog_search("ok");
                let tracks = body.into_tracks();
                debug!(query = %query, results = tracks.len(), "Catalog search completed");
                tracks
            }
            Err(error) => {
                metrics::record_catalog_search("error");
                warn!(query = %query, error = %error, "Catalog search failed, treating as no results");
                Vec::new()
            }
        }
    }
}

// Spotify API types

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<Option<SpotifyTrack>>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    #[serde(default)]
    duration_ms: u64,
    #[serde(default)]
    explicit: bool,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: Option<String>,
}

impl SearchResponse {
    fn into_tracks(self) -> Vec<CatalogTrack> {
        self.tracks
            .map(|page| page.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(SpotifyTrack::into_catalog_track)
            .collect()
    }
}

impl SpotifyTrack {
    fn into_catalog_track(self) -> Option<CatalogTrack> {
        let id = self.id.filter(|s| !s.is_empty())?;
        let title = self.name.filter(|s| !s.is_empty())?;
        let artist = self
            .artists
            .into_iter()
            .next()
            .and_then(|a| a.name)
            .filter(|s| !s.is_empty())?;

        Some(CatalogTrack {
            id,
            title,
            artist,
            duration_ms: self.duration_ms,
            content_rating: if self.explicit {
                EXPLICIT_RATING.to_string()
            } else {
                String::new()
            },
        })
    }
}
