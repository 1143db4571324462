//! AI planning: turns a natural-language request into ordered song intents.
//!
//! The planner itself is an external service behind [`PlanOracle`]. Whatever it
//! returns is repaired before use, and any failure degrades to a placeholder
//! plan instead of failing the request.

mod models;
mod openai;
mod policy;
mod prompt;

pub use models::{
    index_position, PlaylistPlan, RawPlan, SongIntent, DEFAULT_ENERGY, PLACEHOLDER_ARTIST,
    UNKNOWN_ARTIST, UNKNOWN_TITLE,
};
pub use openai::{parse_plan_content, ApiKeySource, OpenAiOptions, OpenAiPlanner};
pub use policy::{detect_taste_level, requested_song_count, TasteLevel, TASTE_RULES};
pub use prompt::{build_user_prompt, extract_json_object, SYSTEM_PROMPT};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub prompt: String,
    pub minutes: f64,
    pub explicit: bool,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Planner API key is not configured")]
    NotConfigured,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl PlannerError {
    /// Short label used in metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PlannerError::NotConfigured => "not_configured",
            PlannerError::Connection(_) => "connection",
            PlannerError::Timeout => "timeout",
            PlannerError::RateLimited => "rate_limited",
            PlannerError::Api { .. } => "api",
            PlannerError::InvalidResponse(_) => "invalid_response",
        }
    }
}

#[async_trait]
pub trait PlanOracle: Send + Sync {
    fn name(&self) -> &str;

    async fn plan(&self, request: &PlanRequest) -> Result<PlaylistPlan, PlannerError>;
}

/// The plan to assemble, and why it is a placeholder when it is one.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub plan: PlaylistPlan,
    pub fallback_reason: Option<&'static str>,
}

/// Asks the planner for a plan, substituting the placeholder plan on failure.
pub async fn plan_or_placeholder(oracle: &dyn PlanOracle, request: &PlanRequest) -> PlanOutcome {
    match oracle.plan(request).await {
        Ok(plan) => PlanOutcome {
            fallback_reason: plan.is_placeholder.then_some("malformed_songs"),
            plan,
        },
        Err(err) => {
            warn!(planner = oracle.name(), error = %err, "Planner unavailable, using placeholder plan");
            PlanOutcome {
                plan: PlaylistPlan::placeholder(requested_song_count(request.minutes)),
                fallback_reason: Some(err.kind()),
            }
        }
    }
}
