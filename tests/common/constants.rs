//! Shared constants for end-to-end tests
//!
//! When the fixture catalog or plans change, update only this file.

// ============================================================================
// Timing
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Prompts understood by the fixture planner
// ============================================================================

/// Planned as ten 90s rock songs, all present in the fixture catalog.
pub const ROCK_PROMPT: &str = "90s rock hits, 30 minutes";

/// Planned as songs that exist nowhere in the catalog.
pub const UNKNOWN_SONGS_PROMPT: &str = "nothing matches here";

/// The fixture planner fails for this one, so the placeholder plan is used.
pub const JAZZ_PROMPT: &str = "jazz for studying";

// ============================================================================
// Fixture catalog
// ============================================================================

/// Duration of every rock track: ten of them stay just under 30 minutes.
pub const ROCK_TRACK_MS: u64 = 175_000;

pub const JAZZ_TRACK_MS: u64 = 300_000;

/// Rock tracks in plan position order: (id, title, artist).
pub const ROCK_TRACKS: [(&str, &str, &str); 10] = [
    ("rock-01", "Smells Like Teen Spirit", "Nirvana"),
    ("rock-02", "Black Hole Sun", "Soundgarden"),
    ("rock-03", "Killing in the Name", "Rage Against the Machine"),
    ("rock-04", "Under the Bridge", "Red Hot Chili Peppers"),
    ("rock-05", "Everlong", "Foo Fighters"),
    ("rock-06", "Creep", "Radiohead"),
    ("rock-07", "Zombie", "The Cranberries"),
    ("rock-08", "Losing My Religion", "R.E.M."),
    ("rock-09", "Wonderwall", "Oasis"),
    ("rock-10", "Song 2", "Blur"),
];

/// The only explicit rock track.
pub const EXPLICIT_TRACK_ID: &str = "rock-03";

/// Returned for the "jazz essentials" backup query.
pub const JAZZ_ESSENTIALS: [(&str, &str, &str); 4] = [
    ("jazz-01", "So What", "Miles Davis"),
    ("jazz-02", "Take Five", "The Dave Brubeck Quartet"),
    ("jazz-03", "My Favorite Things", "John Coltrane"),
    ("jazz-04", "Moanin'", "Art Blakey"),
];

/// Returned for the "jazz classics" backup query.
pub const JAZZ_CLASSICS: [(&str, &str, &str); 3] = [
    ("jazz-05", "Round Midnight", "Thelonious Monk"),
    ("jazz-06", "Blue in Green", "Bill Evans"),
    ("jazz-07", "Strange Fruit", "Billie Holiday"),
];

// ============================================================================
// Publishing
// ============================================================================

pub const USER_TOKEN: &str = "user-token-123";
pub const PUBLISHED_PLAYLIST_ID: &str = "published-1";
