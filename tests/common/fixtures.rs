//! Test data and hand-written collaborators
//!
//! The catalog, planner and publisher used by [`super::TestServer`].

use super::constants::*;
use async_trait::async_trait;
use mixtape_server::catalog::{
    AccessToken, CatalogTrack, InMemoryCatalog, PlaylistDraft, PlaylistPublisher, PublishError,
    PublishedPlaylist,
};
use mixtape_server::planner::{
    PlanOracle, PlanRequest, PlannerError, PlaylistPlan, SongIntent,
};
use std::sync::Mutex;

fn track(id: &str, title: &str, artist: &str, duration_ms: u64) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration_ms,
        content_rating: if id == EXPLICIT_TRACK_ID {
            "explicit".to_string()
        } else {
            String::new()
        },
    }
}

fn jazz(entries: &[(&str, &str, &str)]) -> Vec<CatalogTrack> {
    entries
        .iter()
        .map(|(id, title, artist)| track(id, title, artist, JAZZ_TRACK_MS))
        .collect()
}

/// Rock tracks are found through normal query matching; jazz tracks only
/// through the two genre backup queries.
pub fn create_test_catalog() -> InMemoryCatalog {
    let rock = ROCK_TRACKS
        .iter()
        .map(|(id, title, artist)| track(id, title, artist, ROCK_TRACK_MS))
        .collect();
    InMemoryCatalog::new(rock)
        .script("jazz essentials", jazz(&JAZZ_ESSENTIALS))
        .script("jazz classics", jazz(&JAZZ_CLASSICS))
}

/// Planner answering from fixed plans, keyed on prompt keywords.
pub struct FixturePlanner;

impl FixturePlanner {
    fn rock_plan() -> PlaylistPlan {
        let count = ROCK_TRACKS.len();
        // Listed back to front: only `position` gives the intended order.
        let songs = ROCK_TRACKS
            .iter()
            .enumerate()
            .rev()
            .map(|(i, (_, title, artist))| SongIntent {
                artist: artist.to_string(),
                title: title.to_string(),
                energy: 0.7,
                position: i as f64 / (count - 1) as f64,
                rationale: format!("{} defined the decade", artist),
            })
            .collect();
        PlaylistPlan {
            title: Some("90s Rock Hits".to_string()),
            description: Some("Loud guitars from the nineties".to_string()),
            songs,
            is_placeholder: false,
        }
    }

    fn unknown_plan() -> PlaylistPlan {
        PlaylistPlan {
            title: None,
            description: None,
            songs: vec![SongIntent {
                artist: "Nobody Known".to_string(),
                title: "Unwritten Tune".to_string(),
                energy: 0.5,
                position: 0.0,
                rationale: String::new(),
            }],
            is_placeholder: false,
        }
    }
}

#[async_trait]
impl PlanOracle for FixturePlanner {
    fn name(&self) -> &str {
        "fixture"
    }

    async fn plan(&self, request: &PlanRequest) -> Result<PlaylistPlan, PlannerError> {
        let prompt = request.prompt.to_lowercase();
        if prompt.contains("rock") {
            Ok(Self::rock_plan())
        } else if prompt.contains("nothing") {
            Ok(Self::unknown_plan())
        } else {
            Err(PlannerError::NotConfigured)
        }
    }
}

/// Publisher that records drafts instead of calling the catalog.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(PlaylistDraft, String)>>,
}

impl RecordingPublisher {
    /// Drafts received so far, each with the user token it came with.
    pub fn published(&self) -> Vec<(PlaylistDraft, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaylistPublisher for RecordingPublisher {
    async fn publish(
        &self,
        draft: PlaylistDraft,
        user_credential: &AccessToken,
    ) -> Result<PublishedPlaylist, PublishError> {
        let draft = draft.truncated();
        let tracks_added = draft.track_ids.len();
        self.published
            .lock()
            .unwrap()
            .push((draft, user_credential.secret().to_string()));
        Ok(PublishedPlaylist {
            playlist_id: PUBLISHED_PLAYLIST_ID.to_string(),
            playlist_url: Some(format!(
                "https://open.spotify.com/playlist/{}",
                PUBLISHED_PLAYLIST_ID
            )),
            tracks_added,
        })
    }
}
