//! Keyword policies applied to the user's prompt before asking the planner.

/// How mainstream the suggested songs should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TasteLevel {
    Mainstream,
    Balanced,
    DeepCuts,
}

impl TasteLevel {
    pub fn instruction(&self) -> &'static str {
        match self {
            TasteLevel::Mainstream => {
                "Favor well-known songs and hits that most listeners will recognize."
            }
            TasteLevel::Balanced => {
                "Mix recognizable songs with a few lesser-known tracks."
            }
            TasteLevel::DeepCuts => {
                "Favor album tracks, B-sides and lesser-known songs over the obvious hits."
            }
        }
    }
}

/// Keyword rules in priority order: the first rule with a keyword found in the
/// lowercased prompt decides the level.
pub const TASTE_RULES: &[(&[&str], TasteLevel)] = &[
    (
        &["deep cuts", "obscure", "underground", "hidden gem", "rare", "b-side"],
        TasteLevel::DeepCuts,
    ),
    (
        &["hits", "popular", "top", "chart", "classics", "essentials", "greatest"],
        TasteLevel::Mainstream,
    ),
];

pub fn detect_taste_level(prompt: &str) -> TasteLevel {
    let prompt = prompt.to_lowercase();
    TASTE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))
        .map(|(_, level)| *level)
        .unwrap_or(TasteLevel::Balanced)
}

/// Average song length assumed when sizing the request.
const AVERAGE_SONG_SECS: f64 = 210.0;
/// Extra songs asked for, since some suggestions will not be found.
const OVERSHOOT: f64 = 1.3;
const MIN_SONGS: usize = 8;
const MAX_SONGS: usize = 60;

/// Number of songs to request for a playlist of `minutes`.
pub fn requested_song_count(minutes: f64) -> usize {
    let estimate = (minutes.max(0.0) * 60.0 / AVERAGE_SONG_SECS * OVERSHOOT).ceil();
    (estimate as usize).clamp(MIN_SONGS, MAX_SONGS)
}
