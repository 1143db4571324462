//! Turns a plan into a playlist of real catalog tracks.

mod assembly;
mod fallback;
mod models;
mod resolver;

pub use assembly::{
    AssemblyError, AssemblyPolicy, AssemblyRequest, PlaylistAssembler, NO_MATCHING_SONGS,
    SUPPLEMENT_RATIONALE,
};
pub use fallback::{generate_backup_queries, GENERIC_QUERIES, GENRE_QUERIES, MAX_BACKUP_QUERIES};
pub use models::{AssemblyOutcome, AssemblyReport, NotFoundSong, PlaylistResult, MAX_NOT_FOUND_SAMPLES};
pub use resolver::{ResolutionStage, SearchScope, SongResolver};
