use async_trait::async_trait;

use super::models::{AccessToken, CatalogTrack};

/// Largest page size the catalog search accepts.
pub const MAX_SEARCH_LIMIT: usize = 50;

/// Free-text track search against the external catalog.
///
/// Implementations never fail: transport errors and non-success responses are
/// logged and reported as an empty result. Entries missing an id, title or
/// artist are discarded. Results keep the provider's ordering.
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        region: &str,
        limit: usize,
        credential: &AccessToken,
    ) -> Vec<CatalogTrack>;
}
