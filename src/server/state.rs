use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::catalog::{CatalogSearch, PlaylistPublisher, TokenIssuer};
use crate::planner::PlanOracle;
use crate::playlist::AssemblyPolicy;

use super::ServerConfig;

pub type GuardedCatalogSearch = Arc<dyn CatalogSearch>;
pub type GuardedTokenIssuer = Arc<dyn TokenIssuer>;
pub type GuardedPlanOracle = Arc<dyn PlanOracle>;
pub type OptionalPlaylistPublisher = Option<Arc<dyn PlaylistPublisher>>;
pub type GuardedAssemblyPolicy = Arc<AssemblyPolicy>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub hash: String,
    pub catalog: GuardedCatalogSearch,
    pub token_issuer: GuardedTokenIssuer,
    pub planner: GuardedPlanOracle,
    pub publisher: OptionalPlaylistPublisher,
    pub assembly_policy: GuardedAssemblyPolicy,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog: GuardedCatalogSearch,
        token_issuer: GuardedTokenIssuer,
        planner: GuardedPlanOracle,
        publisher: OptionalPlaylistPublisher,
        assembly_policy: AssemblyPolicy,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            hash: env!("GIT_HASH").to_string(),
            catalog,
            token_issuer,
            planner,
            publisher,
            assembly_policy: Arc::new(assembly_policy),
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogSearch {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedTokenIssuer {
    fn from_ref(input: &ServerState) -> Self {
        input.token_issuer.clone()
    }
}

impl FromRef<ServerState> for GuardedPlanOracle {
    fn from_ref(input: &ServerState) -> Self {
        input.planner.clone()
    }
}

impl FromRef<ServerState> for OptionalPlaylistPublisher {
    fn from_ref(input: &ServerState) -> Self {
        input.publisher.clone()
    }
}

impl FromRef<ServerState> for GuardedAssemblyPolicy {
    fn from_ref(input: &ServerState) -> Self {
        input.assembly_policy.clone()
    }
}
