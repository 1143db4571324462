//! Matching of a single song intent to a catalog track.

use std::cmp::Ordering;
use tracing::debug;

use crate::catalog::{AccessToken, CatalogSearch, CatalogTrack};
use crate::matching::{match_score, normalize, similarity};
use crate::planner::SongIntent;

const EXACT_SEARCH_LIMIT: usize = 10;
const SIMILAR_SEARCH_LIMIT: usize = 15;
/// Titles must be longer than this to be searched alone in the exact stage.
const TITLE_ONLY_MIN_LEN: usize = 3;
/// Titles must be longer than this to be searched alone in the similar stage.
const SIMILAR_TITLE_ONLY_MIN_LEN: usize = 5;
const TITLE_ONLY_TITLE_THRESHOLD: f64 = 0.8;
const TITLE_ONLY_ARTIST_THRESHOLD: f64 = 0.6;
/// Candidates must score strictly above this in the similar stage.
const MIN_MATCH_SCORE: f64 = 0.4;

/// Per-request search settings shared by every catalog query.
#[derive(Debug, Clone, Copy)]
pub struct SearchScope<'a> {
    pub region: &'a str,
    pub explicit_allowed: bool,
    pub credential: &'a AccessToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStage {
    Exact,
    Similar,
}

impl ResolutionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStage::Exact => "exact",
            ResolutionStage::Similar => "similar",
        }
    }
}

pub struct SongResolver<'a> {
    catalog: &'a dyn CatalogSearch,
    scope: SearchScope<'a>,
}

impl<'a> SongResolver<'a> {
    pub fn new(catalog: &'a dyn CatalogSearch, scope: SearchScope<'a>) -> Self {
        Self { catalog, scope }
    }

    /// Exact stage first, then the similar stage.
    pub async fn resolve(&self, intent: &SongIntent) -> Option<(CatalogTrack, ResolutionStage)> {
        if let Some(track) = self.resolve_exact(intent).await {
            return Some((track, ResolutionStage::Exact));
        }
        self.resolve_similar(intent)
            .await
            .map(|track| (track, ResolutionStage::Similar))
    }

    /// Looks for a result whose normalized title and artist both equal the
    /// intent's, then retries with the title alone and similarity thresholds.
    pub async fn resolve_exact(&self, intent: &SongIntent) -> Option<CatalogTrack> {
        let target_title = normalize(&intent.title);
        let target_artist = normalize(&intent.artist);

        let query = format!("{} {}", intent.title, intent.artist);
        let results = self.search(&query, EXACT_SEARCH_LIMIT).await;
        let exact = results.into_iter().find(|track| {
            normalize(&track.title) == target_title
                && normalize(&track.artist) == target_artist
                && track.is_allowed(self.scope.explicit_allowed)
        });
        if exact.is_some() {
            return exact;
        }

        if intent.title.chars().count() <= TITLE_ONLY_MIN_LEN {
            return None;
        }

        let results = self.search(&intent.title, EXACT_SEARCH_LIMIT).await;
        results.into_iter().find(|track| {
            similarity(&track.title, &intent.title) > TITLE_ONLY_TITLE_THRESHOLD
                && similarity(&track.artist, &intent.artist) > TITLE_ONLY_ARTIST_THRESHOLD
                && track.is_allowed(self.scope.explicit_allowed)
        })
    }

    /// Tries progressively broader queries and keeps the best-scoring
    /// candidate of the first query that yields an acceptable one.
    pub async fn resolve_similar(&self, intent: &SongIntent) -> Option<CatalogTrack> {
        for query in similar_queries(intent) {
            let results = self.search(&query, SIMILAR_SEARCH_LIMIT).await;

            let mut scored: Vec<(f64, CatalogTrack)> = results
                .into_iter()
                .map(|track| (match_score(&track, intent), track))
                .filter(|(score, _)| *score > MIN_MATCH_SCORE)
                .collect();
            scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

            if let Some((score, best)) = scored.into_iter().next() {
                if best.is_allowed(self.scope.explicit_allowed) {
                    debug!(query = %query, score, track_id = %best.id, "Similar match accepted");
                    return Some(best);
                }
            }
        }
        None
    }

    async fn search(&self, query: &str, limit: usize) -> Vec<CatalogTrack> {
        self.catalog
            .search(query, self.scope.region, limit, self.scope.credential)
            .await
    }
}

/// Queries of the similar stage, in order. Blank queries are skipped.
fn similar_queries(intent: &SongIntent) -> Vec<String> {
    let mut queries = vec![
        format!("{} {}", intent.artist, intent.title),
        intent.artist.clone(),
    ];
    if intent.title.chars().count() > SIMILAR_TITLE_ONLY_MIN_LEN {
        queries.push(intent.title.clone());
    }
    queries.retain(|q| !q.trim().is_empty());
    queries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn track(id: &str, title: &str, artist: &str, rating: &str) -> CatalogTrack {
        CatalogTrack {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            duration_ms: 200_000,
            content_rating: rating.to_string(),
        }
    }

    fn intent(artist: &str, title: &str) -> SongIntent {
        SongIntent {
            artist: artist.to_string(),
            title: title.to_string(),
            energy: 0.5,
            position: 0.0,
            rationale: String::new(),
        }
    }

    fn scope(token: &AccessToken, explicit_allowed: bool) -> SearchScope<'_> {
        SearchScope {
            region: "US",
            explicit_allowed,
            credential: token,
        }
    }

    #[tokio::test]
    async fn test_exact_match_ignores_case_and_whitespace() {
        let catalog = InMemoryCatalog::new(vec![
            track("x", "Yellow Submarine", "The Beatles", ""),
            track("y", "Yellow", "Coldplay", ""),
        ]);
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));

        let found = resolver.resolve_exact(&intent("coldplay", "YELLOW ")).await;
        assert_eq!(found.map(|t| t.id), Some("y".to_string()));
    }

    #[tokio::test]
    async fn test_exact_stage_respects_content_gate() {
        let catalog = InMemoryCatalog::new(vec![track("e", "Song", "Band", "explicit")]);
        let token = AccessToken::new("t");

        let strict = SongResolver::new(&catalog, scope(&token, false));
        assert!(strict.resolve(&intent("Band", "Song")).await.is_none());

        let relaxed = SongResolver::new(&catalog, scope(&token, true));
        let (found, stage) = relaxed.resolve(&intent("Band", "Song")).await.unwrap();
        assert_eq!(found.id, "e");
        assert_eq!(stage, ResolutionStage::Exact);
    }

    #[tokio::test]
    async fn test_title_only_retry() {
        let remaster = track("r", "Bohemian Rhapsody Remastered", "Queen", "");
        let catalog = InMemoryCatalog::empty()
            .script("Bohemian Rhapsody Queen", vec![])
            .script("Bohemian Rhapsody", vec![remaster]);
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));

        // title similarity: 2 of max(2, 3) tokens = 0.67, below 0.8.
        assert!(resolver
            .resolve_exact(&intent("Queen", "Bohemian Rhapsody"))
            .await
            .is_none());
        assert_eq!(
            catalog.queries(),
            vec!["Bohemian Rhapsody Queen", "Bohemian Rhapsody"]
        );
    }

    #[tokio::test]
    async fn test_title_only_retry_accepts_close_match() {
        let live = track("l", "Creep (Acoustic)", "Radiohead", "");
        let catalog = InMemoryCatalog::empty()
            .script("Creep Radiohead", vec![])
            .script("Creep", vec![live]);
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));

        // "Creep" is 5 characters, so the title-only query runs; the
        // similarity of "creep acoustic" vs "creep" is 0.5, below 0.8.
        assert!(resolver.resolve_exact(&intent("Radiohead", "Creep")).await.is_none());

        let catalog = InMemoryCatalog::empty()
            .script("Creep Radiohead", vec![])
            .script("Creep", vec![track("c", "Creep", "Radiohead.", "")]);
        let resolver = SongResolver::new(&catalog, scope(&token, true));
        let found = resolver.resolve_exact(&intent("Radiohead", "Creep")).await;
        assert_eq!(found.map(|t| t.id), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_short_titles_skip_title_only_query() {
        let catalog = InMemoryCatalog::empty();
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));
        assert!(resolver.resolve_exact(&intent("U2", "One")).await.is_none());
        assert_eq!(catalog.queries(), vec!["One U2"]);
    }

    #[tokio::test]
    async fn test_similar_stage_picks_best_scoring_candidate() {
        let catalog = InMemoryCatalog::empty().script(
            "Oasis Wonderwall",
            vec![
                track("a", "Champagne Supernova", "Oasis", ""),
                track("b", "Wonderwall - Remastered", "Oasis", ""),
            ],
        );
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));

        let (found, stage) = resolver.resolve(&intent("Oasis", "Wonderwall")).await.unwrap();
        assert_eq!(found.id, "b");
        assert_eq!(stage, ResolutionStage::Similar);
    }

    #[tokio::test]
    async fn test_similar_stage_moves_on_when_top_candidate_is_explicit() {
        let catalog = InMemoryCatalog::empty()
            .script(
                "Artist Song Title",
                vec![
                    track("e", "Song Title", "Artist", "explicit"),
                    track("c", "Song Title Clean", "Artist", ""),
                ],
            )
            .script("Artist", vec![track("d", "Another", "Artist", "")]);
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, false));

        // The top candidate of the first query is explicit, so the next query
        // is tried; "Another" by "Artist" scores 0.4 which is not enough; the
        // title-only query then finds nothing.
        assert!(resolver.resolve_similar(&intent("Artist", "Song Title")).await.is_none());
        assert_eq!(
            catalog.queries(),
            vec!["Artist Song Title", "Artist", "Song Title"]
        );
    }

    #[tokio::test]
    async fn test_no_results_anywhere() {
        let catalog = InMemoryCatalog::empty();
        let token = AccessToken::new("t");
        let resolver = SongResolver::new(&catalog, scope(&token, true));
        assert!(resolver
            .resolve(&intent("Nobody", "Nothing At All"))
            .await
            .is_none());
    }

    #[test]
    fn test_similar_queries() {
        assert_eq!(
            similar_queries(&intent("Muse", "Hysteria")),
            vec!["Muse Hysteria", "Muse", "Hysteria"]
        );
        assert_eq!(similar_queries(&intent("Muse", "Uprising")).len(), 3);
        assert_eq!(similar_queries(&intent("Muse", "Dead")), vec!["Muse Dead", "Muse"]);
    }
}
