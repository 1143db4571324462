//! Duration-bounded assembly of the final track list.
//!
//! Intents are resolved one at a time in `position` order until the target is
//! met. A short result is padded with tracks found through backup queries.

use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use super::fallback::generate_backup_queries;
use super::models::{AssemblyOutcome, AssemblyReport, NotFoundSong, PlaylistResult, MAX_NOT_FOUND_SAMPLES};
use super::resolver::{ResolutionStage, SearchScope, SongResolver};
use crate::catalog::{CatalogSearch, CatalogTrack, ResolvedTrack};
use crate::matching::normalize;
use crate::planner::{PlaylistPlan, SongIntent, DEFAULT_ENERGY};

pub const SUPPLEMENT_RATIONALE: &str = "Added to reach the requested duration";
pub const NO_MATCHING_SONGS: &str = "No matching songs found in the catalog";

/// Thresholds of the assembly loop.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyPolicy {
    /// Requested durations below this are raised to it.
    pub min_minutes: f64,
    /// Tracks needed before reaching the target duration may stop the loop.
    pub min_tracks_before_stop: usize,
    pub max_tracks: usize,
    /// Fewer resolved tracks than this triggers supplementation.
    pub min_resolved_tracks: usize,
    /// Less than this share of the target duration triggers supplementation.
    pub shortfall_ratio: f64,
    /// Duration assumed per supplement when sizing the supplement set.
    pub estimated_track_ms: u64,
    pub max_supplements: usize,
    pub supplement_search_limit: usize,
    /// Chance of skipping a supplement whose artist is already present.
    pub artist_repeat_skip_probability: f64,
}

impl Default for AssemblyPolicy {
    fn default() -> Self {
        Self {
            min_minutes: 10.0,
            min_tracks_before_stop: 8,
            max_tracks: 50,
            min_resolved_tracks: 5,
            shortfall_ratio: 0.6,
            estimated_track_ms: 240_000,
            max_supplements: 20,
            supplement_search_limit: 20,
            artist_repeat_skip_probability: 0.7,
        }
    }
}

impl AssemblyPolicy {
    pub fn with_skip_probability(mut self, probability: f64) -> Self {
        self.artist_repeat_skip_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Target duration in milliseconds for a requested number of minutes.
    pub fn target_duration_ms(&self, requested_minutes: f64) -> u64 {
        let minutes = if requested_minutes.is_finite() {
            requested_minutes.max(self.min_minutes)
        } else {
            self.min_minutes
        };
        (minutes * 60_000.0).round() as u64
    }

    fn is_complete(&self, track_count: usize, total_ms: u64, target_ms: u64) -> bool {
        (total_ms >= target_ms && track_count >= self.min_tracks_before_stop)
            || track_count >= self.max_tracks
    }

    fn is_short(&self, track_count: usize, total_ms: u64, target_ms: u64) -> bool {
        track_count < self.min_resolved_tracks
            || (total_ms as f64) < self.shortfall_ratio * target_ms as f64
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    /// Carries the report so callers can still account for the attempt.
    #[error("{}", NO_MATCHING_SONGS)]
    NoMatchingSongs(AssemblyReport),
}

#[derive(Debug, Clone)]
pub struct AssemblyRequest<'a> {
    pub prompt: &'a str,
    pub minutes: f64,
    pub scope: SearchScope<'a>,
}

/// Tracks collected so far for one request.
#[derive(Default)]
struct Collected {
    tracks: Vec<ResolvedTrack>,
    ids: HashSet<String>,
    total_ms: u64,
}

impl Collected {
    fn push(&mut self, track: ResolvedTrack) {
        self.total_ms += track.track.duration_ms;
        self.ids.insert(track.track.id.clone());
        self.tracks.push(track);
    }
}

pub struct PlaylistAssembler<'a, R: Rng> {
    catalog: &'a dyn CatalogSearch,
    policy: &'a AssemblyPolicy,
    rng: R,
}

impl<'a, R: Rng + Send> PlaylistAssembler<'a, R> {
    pub fn new(catalog: &'a dyn CatalogSearch, policy: &'a AssemblyPolicy, rng: R) -> Self {
        Self {
            catalog,
            policy,
            rng,
        }
    }

    pub async fn assemble(
        mut self,
        request: &AssemblyRequest<'_>,
        plan: PlaylistPlan,
    ) -> Result<AssemblyOutcome, AssemblyError> {
        let target_ms = self.policy.target_duration_ms(request.minutes);
        let mut report = AssemblyReport {
            ai_suggested_count: plan.songs.len(),
            ..Default::default()
        };

        let mut intents = plan.songs;
        intents.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap_or(Ordering::Equal));

        let mut collected = Collected::default();
        self.collect_from_plan(request, &intents, target_ms, &mut collected, &mut report)
            .await;

        if self
            .policy
            .is_short(collected.tracks.len(), collected.total_ms, target_ms)
        {
            let supplements = self
                .find_supplements(request, target_ms, &collected)
                .await;
            for track in supplements {
                if self
                    .policy
                    .is_complete(collected.tracks.len(), collected.total_ms, target_ms)
                {
                    break;
                }
                collected.push(ResolvedTrack::new(
                    track,
                    DEFAULT_ENERGY,
                    1.0,
                    SUPPLEMENT_RATIONALE,
                ));
                report.supplemented_count += 1;
            }
        }

        if collected.tracks.is_empty() {
            return Err(AssemblyError::NoMatchingSongs(report));
        }

        info!(
            "Assembled {} tracks ({} found, {} not found, {} supplements), {} of {} ms",
            collected.tracks.len(),
            report.found_count,
            report.not_found_count,
            report.supplemented_count,
            collected.total_ms,
            target_ms
        );

        let playlist = PlaylistResult {
            title: plan
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback_title(request.prompt)),
            description: plan
                .description
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| fallback_description(request.prompt, target_ms)),
            tracks: collected.tracks,
            total_duration_ms: collected.total_ms,
        };

        Ok(AssemblyOutcome { playlist, report })
    }

    async fn collect_from_plan(
        &self,
        request: &AssemblyRequest<'_>,
        intents: &[SongIntent],
        target_ms: u64,
        collected: &mut Collected,
        report: &mut AssemblyReport,
    ) {
        let resolver = SongResolver::new(self.catalog, request.scope);

        for intent in intents {
            match resolver.resolve(intent).await {
                Some((track, stage)) => {
                    if collected.ids.contains(&track.id) {
                        debug!(track_id = %track.id, title = %intent.title, "Duplicate track skipped");
                        report.duplicate_count += 1;
                        continue;
                    }
                    debug!(
                        stage = stage.as_str(),
                        track_id = %track.id,
                        "Resolved \"{}\" by {}",
                        intent.title,
                        intent.artist
                    );
                    report.found_count += 1;
                    match stage {
                        ResolutionStage::Exact => report.exact_count += 1,
                        ResolutionStage::Similar => report.similar_count += 1,
                    }
                    collected.push(ResolvedTrack::new(
                        track,
                        intent.energy,
                        intent.position,
                        intent.rationale.clone(),
                    ));
                }
                None => {
                    debug!("Not found: \"{}\" by {}", intent.title, intent.artist);
                    report.not_found_count += 1;
                    if report.not_found.len() < MAX_NOT_FOUND_SAMPLES {
                        report.not_found.push(NotFoundSong {
                            artist: intent.artist.clone(),
                            title: intent.title.clone(),
                            energy: intent.energy,
                        });
                    }
                }
            }

            if self
                .policy
                .is_complete(collected.tracks.len(), collected.total_ms, target_ms)
            {
                debug!(
                    tracks = collected.tracks.len(),
                    total_ms = collected.total_ms,
                    "Target reached, remaining intents skipped"
                );
                break;
            }
        }
    }

    /// Searches backup queries for tracks not already in the playlist, until
    /// the estimated duration covers the remaining gap.
    async fn find_supplements(
        &mut self,
        request: &AssemblyRequest<'_>,
        target_ms: u64,
        collected: &Collected,
    ) -> Vec<CatalogTrack> {
        let gap_ms = target_ms.saturating_sub(collected.total_ms);
        let queries = generate_backup_queries(request.prompt, &collected.tracks);
        debug!(gap_ms, queries = ?queries, "Searching for supplementary tracks");

        let mut ids = collected.ids.clone();
        let mut titles: HashSet<String> = collected
            .tracks
            .iter()
            .map(|t| normalize(&t.track.title))
            .collect();
        let mut artists: HashSet<String> = collected
            .tracks
            .iter()
            .map(|t| normalize(&t.track.artist))
            .collect();

        let mut supplements: Vec<CatalogTrack> = Vec::new();
        let enough = |count: usize, policy: &AssemblyPolicy| {
            count >= policy.max_supplements || count as u64 * policy.estimated_track_ms >= gap_ms
        };

        'queries: for query in queries {
            if enough(supplements.len(), self.policy) {
                break;
            }
            let candidates = self
                .catalog
                .search(
                    &query,
                    request.scope.region,
                    self.policy.supplement_search_limit,
                    request.scope.credential,
                )
                .await;

            for candidate in candidates {
                if ids.contains(&candidate.id) {
                    continue;
                }
                let title = normalize(&candidate.title);
                if titles.contains(&title) {
                    continue;
                }
                let artist = normalize(&candidate.artist);
                if artists.contains(&artist)
                    && self.rng.random::<f64>() < self.policy.artist_repeat_skip_probability
                {
                    continue;
                }
                if !candidate.is_allowed(request.scope.explicit_allowed) {
                    continue;
                }

                ids.insert(candidate.id.clone());
                titles.insert(title);
                artists.insert(artist);
                supplements.push(candidate);

                if enough(supplements.len(), self.policy) {
                    break 'queries;
                }
            }
        }

        supplements
    }
}

fn fallback_title(prompt: &str) -> String {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return "My Mixtape".to_string();
    }
    let mut chars = prompt.chars();
    let first = chars.next().map(|c| c.to_uppercase().collect::<String>()).unwrap_or_default();
    first.chars().chain(chars).take(80).collect()
}

fn fallback_description(prompt: &str, target_ms: u64) -> String {
    format!(
        "A {}-minute playlist for \"{}\".",
        target_ms / 60_000,
        prompt.trim()
    )
}
