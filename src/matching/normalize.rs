use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid non-word regex");
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").expect("valid whitespace regex");
}

/// Canonicalizes free text for comparison.
///
/// Lowercases, turns every character that is neither a word character nor
/// whitespace into a space, collapses whitespace runs and trims.
/// `normalize(normalize(s)) == normalize(s)` for every input.
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let spaced = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}
