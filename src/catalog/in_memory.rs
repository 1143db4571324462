//! Catalog backed by a fixed list of tracks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::models::{AccessToken, CatalogTrack};
use super::search::{CatalogSearch, MAX_SEARCH_LIMIT};
use crate::matching::normalize;

/// In-memory [`CatalogSearch`] used for offline runs and tests.
///
/// A track matches a query when every normalized query token occurs in the
/// normalized "title artist" text. Queries registered with [`Self::script`]
/// return their fixed results instead. Every query is recorded.
#[derive(Default)]
pub struct InMemoryCatalog {
    tracks: Vec<CatalogTrack>,
    scripted: HashMap<String, Vec<CatalogTrack>>,
    queries: Mutex<Vec<String>>,
}

impl InMemoryCatalog {
    pub fn new(tracks: Vec<CatalogTrack>) -> Self {
        Self {
            tracks,
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Fixes the results of an exact query string.
    pub fn script(mut self, query: impl Into<String>, results: Vec<CatalogTrack>) -> Self {
        self.scripted.insert(query.into(), results);
        self
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    fn matching(&self, query: &str) -> Vec<CatalogTrack> {
        let query_tokens: Vec<String> = normalize(query)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if query_tokens.is_empty() {
            return Vec::new();
        }
        self.tracks
            .iter()
            .filter(|track| {
                let haystack = normalize(&format!("{} {}", track.title, track.artist));
                query_tokens.iter().all(|token| haystack.contains(token.as_str()))
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogSearch for InMemoryCatalog {
    async fn search(
        &self,
        query: &str,
        _region: &str,
        limit: usize,
        _credential: &AccessToken,
    ) -> Vec<CatalogTrack> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        let limit = limit.min(MAX_SEARCH_LIMIT);
        let results = match self.scripted.get(query) {
            Some(results) => results.clone(),
            None => self.matching(query),
        };
        results.into_iter().take(limit).collect()
    }
}
