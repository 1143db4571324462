//! Broader search queries used to pad a playlist that came up short.

use std::collections::HashSet;

use crate::catalog::ResolvedTrack;
use crate::matching::normalize;

pub const MAX_BACKUP_QUERIES: usize = 8;
/// Resolved artists used to seed artist queries.
const MAX_SEED_ARTISTS: usize = 3;

/// Genre keyword table: when any keyword occurs in the lowercased prompt,
/// both queries are added.
pub const GENRE_QUERIES: &[(&[&str], [&str; 2])] = &[
    (&["rock"], ["rock essentials", "classic rock"]),
    (&["hip hop", "rap"], ["hip hop essentials", "rap hits"]),
    (&["electronic", "edm"], ["electronic essentials", "edm hits"]),
    (&["pop"], ["pop hits", "top pop songs"]),
    (&["indie"], ["indie essentials", "indie rock hits"]),
    (&["jazz"], ["jazz essentials", "jazz classics"]),
    (&["country"], ["country hits", "country essentials"]),
    (&["reggae"], ["reggae essentials", "reggae classics"]),
];

/// Used when neither the prompt nor the resolved artists produce a query.
pub const GENERIC_QUERIES: [&str; 4] = ["popular songs", "hit songs", "chart toppers", "best songs"];

/// Builds at most [`MAX_BACKUP_QUERIES`] queries from the prompt's genre
/// keywords and the first distinct resolved artists.
pub fn generate_backup_queries(prompt: &str, resolved: &[ResolvedTrack]) -> Vec<String> {
    let prompt = prompt.to_lowercase();
    let mut queries: Vec<String> = GENRE_QUERIES
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| prompt.contains(k)))
        .flat_map(|(_, genre_queries)| genre_queries.iter().map(|q| q.to_string()))
        .collect();

    let mut seen = HashSet::new();
    let artists = resolved
        .iter()
        .map(|t| t.track.artist.as_str())
        .filter(|artist| seen.insert(normalize(artist)))
        .take(MAX_SEED_ARTISTS);
    for artist in artists {
        queries.push(format!("similar to {}", artist));
        queries.push(format!("{} radio", artist));
    }

    if queries.is_empty() {
        queries = GENERIC_QUERIES.iter().map(|q| q.to_string()).collect();
    }

    queries.truncate(MAX_BACKUP_QUERIES);
    queries
}
