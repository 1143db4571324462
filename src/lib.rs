//! Mixtape Server Library
//!
//! Turns natural-language playlist requests into playlists of tracks that
//! exist in an external music catalog.

pub mod catalog;
pub mod config;
pub mod matching;
pub mod planner;
pub mod playlist;
pub mod server;

// Re-export commonly used types for convenience
pub use catalog::{CatalogSearch, InMemoryCatalog, PlaylistPublisher, TokenIssuer};
pub use planner::{PlanOracle, PlanRequest, PlaylistPlan, SongIntent};
pub use playlist::{AssemblyError, AssemblyPolicy, PlaylistAssembler};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig, ServerState};
