//! Playlist generation and publishing endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    routing::post,
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::error::ApiError;
use super::metrics;
use super::state::ServerState;
use crate::catalog::{AccessToken, PlaylistDraft, PublishedPlaylist};
use crate::planner::{plan_or_placeholder, PlanRequest};
use crate::playlist::{
    AssemblyError, AssemblyReport, AssemblyRequest, PlaylistAssembler, PlaylistResult,
    SearchScope,
};

pub const DEFAULT_MINUTES: f64 = 30.0;

fn default_minutes() -> f64 {
    DEFAULT_MINUTES
}

fn default_explicit() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    pub prompt: String,
    #[serde(default = "default_minutes")]
    pub minutes: f64,
    #[serde(default = "default_explicit")]
    pub explicit: bool,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub request_id: String,
    #[serde(flatten)]
    pub playlist: PlaylistResult,
    pub minutes_actual: u64,
    #[serde(flatten)]
    pub report: AssemblyReport,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublishBody {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub track_ids: Vec<String>,
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn bearer_token(headers: &HeaderMap) -> Option<AccessToken> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(AccessToken::new(token))
}

async fn generate_playlist(
    State(state): State<ServerState>,
    body: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let body = parse_body(body)?;
    let prompt = body.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }
    if !body.minutes.is_finite() {
        return Err(ApiError::BadRequest("minutes must be a number".to_string()));
    }

    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("generate", request_id = %request_id);
    let result = generate(&state, request_id, prompt, body).instrument(span).await;
    metrics::record_playlist_generated(match &result {
        Ok(_) => "success",
        Err(ApiError::NoMatchingSongs) => "no_matches",
        Err(_) => "error",
    });
    result.map(Json)
}

async fn generate(
    state: &ServerState,
    request_id: String,
    prompt: String,
    body: GenerateBody,
) -> Result<GenerateResponse, ApiError> {
    let region = body
        .region
        .filter(|r| !r.trim().is_empty())
        .unwrap_or_else(|| state.config.default_region.clone());
    info!(
        minutes = body.minutes,
        explicit = body.explicit,
        region = %region,
        "Generating playlist for \"{}\"",
        prompt
    );

    let credential = state.token_issuer.access_token().await?;

    let plan_request = PlanRequest {
        prompt: prompt.clone(),
        minutes: body.minutes,
        explicit: body.explicit,
    };
    let planned = plan_or_placeholder(state.planner.as_ref(), &plan_request).await;
    if let Some(reason) = planned.fallback_reason {
        metrics::record_planner_fallback(reason);
    }

    let rng = match state.config.diversity_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let request = AssemblyRequest {
        prompt: &prompt,
        minutes: body.minutes,
        scope: SearchScope {
            region: &region,
            explicit_allowed: body.explicit,
            credential: &credential,
        },
    };
    let result = PlaylistAssembler::new(state.catalog.as_ref(), &state.assembly_policy, rng)
        .assemble(&request, planned.plan)
        .await;
    metrics::record_assembly(match &result {
        Ok(outcome) => &outcome.report,
        Err(AssemblyError::NoMatchingSongs(report)) => report,
    });
    let outcome = result?;

    Ok(GenerateResponse {
        request_id,
        minutes_actual: outcome.playlist.minutes_actual(),
        playlist: outcome.playlist,
        report: outcome.report,
    })
}

async fn publish_playlist(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Json<PublishBody>, JsonRejection>,
) -> Result<Json<PublishedPlaylist>, ApiError> {
    let publisher = state
        .publisher
        .clone()
        .ok_or(ApiError::PublisherUnavailable)?;
    let user_credential = bearer_token(&headers).ok_or_else(|| {
        ApiError::Unauthorized("A Bearer user token is required to publish".to_string())
    })?;

    let body = parse_body(body)?;
    if body.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if body.track_ids.is_empty() {
        return Err(ApiError::BadRequest("trackIds must not be empty".to_string()));
    }

    let draft = PlaylistDraft {
        name: body.name.trim().to_string(),
        description: body.description.unwrap_or_default(),
        track_ids: body.track_ids,
    };
    let published = publisher.publish(draft, &user_credential).await?;
    info!(
        playlist_id = %published.playlist_id,
        tracks_added = published.tracks_added,
        "Published playlist"
    );
    Ok(Json(published))
}

pub fn make_playlist_routes(state: ServerState) -> Router {
    Router::new()
        .route("/generate", post(generate_playlist))
        .route("/publish", post(publish_playlist))
        .with_state(state)
}
