use super::normalize;

/// Weight of the title similarity in [`match_score`].
pub const TITLE_WEIGHT: f64 = 0.6;
/// Weight of the artist similarity in [`match_score`].
pub const ARTIST_WEIGHT: f64 = 0.4;

/// A pair of tokens may match by containment when either is longer than this.
const SUBSTRING_MIN_TOKEN_LEN: usize = 3;

/// Anything that can be identified by a title and an artist.
pub trait SongKey {
    fn title(&self) -> &str;
    fn artist(&self) -> &str;
}

/// Token-overlap similarity in `[0, 1]`.
///
/// Equal normalized strings score 1.0 (including two empty strings). Otherwise
/// each token of `a` counts once if some token of `b` equals it, or if either
/// token is longer than three characters and one contains the other. Tokens of `b` may be matched more than once. The match count is
/// divided by the larger token count.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 1.0;
    }

    let a_tokens: Vec<&str> = a.split_whitespace().collect();
    let b_tokens: Vec<&str> = b.split_whitespace().collect();
    let denominator = a_tokens.len().max(b_tokens.len());
    if denominator == 0 {
        return 0.0;
    }

    let matches = a_tokens
        .iter()
        .filter(|a_token| b_tokens.iter().any(|b_token| tokens_match(a_token, b_token)))
        .count();

    matches as f64 / denominator as f64
}

fn tokens_match(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let long = a.chars().count() > SUBSTRING_MIN_TOKEN_LEN
        || b.chars().count() > SUBSTRING_MIN_TOKEN_LEN;
    long && (a.contains(b) || b.contains(a))
}

/// Weighted title/artist similarity between a candidate and a target.
pub fn match_score(candidate: &impl SongKey, target: &impl SongKey) -> f64 {
    TITLE_WEIGHT * similarity(candidate.title(), target.title())
        + ARTIST_WEIGHT * similarity(candidate.artist(), target.artist())
}
