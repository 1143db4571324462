//! Song intents and plans, plus repair of loosely shaped planner payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::matching::SongKey;

pub const DEFAULT_ENERGY: f64 = 0.5;
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const PLACEHOLDER_ARTIST: &str = "Various Artists";

/// A suggested song, not yet matched against the catalog.
///
/// `artist` and `title` are never empty once built through this module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongIntent {
    pub artist: String,
    pub title: String,
    pub energy: f64,
    pub position: f64,
    pub rationale: String,
}

impl SongKey for SongIntent {
    fn title(&self) -> &str {
        &self.title
    }

    fn artist(&self) -> &str {
        &self.artist
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistPlan {
    pub title: Option<String>,
    pub description: Option<String>,
    pub songs: Vec<SongIntent>,
    /// True when the songs are synthesized placeholders.
    pub is_placeholder: bool,
}

impl PlaylistPlan {
    /// Plan used when the planner is unavailable or its answer is unusable.
    pub fn placeholder(song_count: usize) -> Self {
        let count = song_count.max(1);
        let songs = (0..count)
            .map(|i| SongIntent {
                artist: PLACEHOLDER_ARTIST.to_string(),
                title: format!("Track {}", i + 1),
                energy: DEFAULT_ENERGY,
                position: index_position(i, count),
                rationale: String::new(),
            })
            .collect();
        Self {
            title: None,
            description: None,
            songs,
            is_placeholder: true,
        }
    }

    /// Repairs a raw planner payload. A missing, non-array or empty `songs`
    /// field yields placeholder songs.
    pub fn from_raw(raw: RawPlan, placeholder_count: usize) -> Self {
        let title = raw.title.as_ref().and_then(value_to_string);
        let description = raw.description.as_ref().and_then(value_to_string);

        let songs = match raw.songs {
            Some(Value::Array(items)) if !items.is_empty() => sanitize_songs(items),
            _ => {
                let mut plan = Self::placeholder(placeholder_count);
                plan.title = title;
                plan.description = description;
                return plan;
            }
        };

        Self {
            title,
            description,
            songs,
            is_placeholder: false,
        }
    }
}

/// Planner answer as received, every field optional and loosely typed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawPlan {
    pub title: Option<Value>,
    pub description: Option<Value>,
    pub songs: Option<Value>,
}

fn sanitize_songs(items: Vec<Value>) -> Vec<SongIntent> {
    let count = items.len();
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let field = |name: &str| item.get(name);
            SongIntent {
                artist: field("artist")
                    .and_then(value_to_string)
                    .unwrap_or_else(|| UNKNOWN_ARTIST.to_string()),
                title: field("title")
                    .and_then(value_to_string)
                    .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                energy: field("energy")
                    .and_then(value_to_f64)
                    .map(|e| e.clamp(0.0, 1.0))
                    .unwrap_or(DEFAULT_ENERGY),
                position: field("position")
                    .and_then(value_to_f64)
                    .map(|p| p.clamp(0.0, 1.0))
                    .unwrap_or_else(|| index_position(i, count)),
                rationale: field("rationale")
                    .and_then(value_to_string)
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Evenly spaced position of the `index`-th of `count` songs in `[0, 1]`.
pub fn index_position(index: usize, count: usize) -> f64 {
    if count <= 1 {
        0.0
    } else {
        index as f64 / (count - 1) as f64
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

fn value_to_f64(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}
