use serde::{Deserialize, Serialize};

use crate::matching::SongKey;

/// Content rating value marking a track as explicit.
pub const EXPLICIT_RATING: &str = "explicit";

/// A track that exists in the external catalog.
///
/// Instances are only built from complete provider entries: `id`, `title` and
/// `artist` are never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub duration_ms: u64,
    /// `""` when unrated, `"explicit"` for explicit tracks.
    #[serde(default)]
    pub content_rating: String,
}

impl CatalogTrack {
    pub fn is_explicit(&self) -> bool {
        self.content_rating.eq_ignore_ascii_case(EXPLICIT_RATING)
    }

    /// Whether the track passes the content-rating gate.
    pub fn is_allowed(&self, explicit_allowed: bool) -> bool {
        explicit_allowed || !self.is_explicit()
    }

    pub fn uri(&self) -> String {
        track_uri(&self.id)
    }
}

impl SongKey for CatalogTrack {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }
}

/// Builds the catalog URI of a track id.
pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

/// A catalog track annotated with the suggestion that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTrack {
    #[serde(flatten)]
    pub track: CatalogTrack,
    pub suggested_energy: f64,
    pub suggested_position: f64,
    pub rationale: String,
}

impl ResolvedTrack {
    pub fn new(track: CatalogTrack, energy: f64, position: f64, rationale: impl Into<String>) -> Self {
        Self {
            track,
            suggested_energy: energy,
            suggested_position: position,
            rationale: rationale.into(),
        }
    }
}

/// Short-lived credential used to call the catalog API.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(***)")
    }
}
