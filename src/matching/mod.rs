//! Text matching primitives used to compare AI song suggestions with catalog tracks.
//!
//! Everything here is pure: no I/O and no configuration, so the resolver can be
//! tested against hand-written catalogs.

mod normalize;
mod similarity;

pub use normalize::normalize;
pub use similarity::{match_score, similarity, SongKey, ARTIST_WEIGHT, TITLE_WEIGHT};
