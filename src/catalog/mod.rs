//! External music catalog: track model, search, credentials and playlist creation.

mod in_memory;
mod models;
mod publish;
mod search;
mod spotify;
mod token;

pub use in_memory::InMemoryCatalog;
pub use models::{track_uri, AccessToken, CatalogTrack, ResolvedTrack, EXPLICIT_RATING};
pub use publish::{
    PlaylistDraft, PlaylistPublisher, PublishError, PublishedPlaylist, SpotifyPlaylistPublisher,
    MAX_PLAYLIST_DESCRIPTION_CHARS, MAX_PLAYLIST_NAME_CHARS,
};
pub use search::{CatalogSearch, MAX_SEARCH_LIMIT};
pub use spotify::SpotifyCatalogClient;
pub use token::{ClientCredentialsIssuer, CredentialError, StaticTokenIssuer, TokenIssuer};
