use serde::Serialize;

use crate::catalog::ResolvedTrack;

/// Number of unresolved songs echoed back for diagnostics.
pub const MAX_NOT_FOUND_SAMPLES: usize = 5;

/// The assembled playlist.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistResult {
    pub title: String,
    pub description: String,
    pub tracks: Vec<ResolvedTrack>,
    pub total_duration_ms: u64,
}

impl PlaylistResult {
    /// Total duration in whole minutes, rounded to nearest.
    pub fn minutes_actual(&self) -> u64 {
        (self.total_duration_ms as f64 / 60_000.0).round() as u64
    }

    pub fn track_ids(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.track.id.clone()).collect()
    }
}

/// A suggested song that could not be matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotFoundSong {
    pub artist: String,
    pub title: String,
    pub energy: f64,
}

/// Counters describing how the playlist was put together.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyReport {
    pub ai_suggested_count: usize,
    pub found_count: usize,
    pub not_found_count: usize,
    /// Suggestions that resolved to a track already in the playlist.
    pub duplicate_count: usize,
    pub supplemented_count: usize,
    /// Per-stage split of `found_count`, kept out of responses.
    #[serde(skip)]
    pub exact_count: usize,
    #[serde(skip)]
    pub similar_count: usize,
    /// At most [`MAX_NOT_FOUND_SAMPLES`] entries.
    pub not_found: Vec<NotFoundSong>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyOutcome {
    pub playlist: PlaylistResult,
    pub report: AssemblyReport,
}
