use anyhow::{Context, Result};
use std::time::Duration;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::metrics::metrics_handler;
use super::playlist_routes::make_playlist_routes;
use super::{log_requests, state::ServerState};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    })
}

pub fn make_app(state: ServerState) -> Router {
    let status_routes: Router = Router::new()
        .route("/v1/status", get(home))
        .with_state(state.clone());

    let home_router: Router = match state.config.frontend_dir_path.clone() {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    home_router
        .merge(status_routes)
        .nest("/v1/playlist", make_playlist_routes(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.config.requests_logging_level.clone(),
            log_requests,
        ))
}

fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let metrics_port = state.config.metrics_port;
    let app = make_app(state);

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", err);
        }
    });
    info!("Metrics available at port {}!", metrics_port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessToken, InMemoryCatalog, StaticTokenIssuer};
    use crate::planner::{ApiKeySource, OpenAiOptions, OpenAiPlanner};
    use crate::playlist::AssemblyPolicy;
    use crate::server::ServerConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_state(config: ServerConfig) -> ServerState {
        ServerState::new(
            config,
            Arc::new(InMemoryCatalog::empty()),
            Arc::new(StaticTokenIssuer(AccessToken::new("t"))),
            Arc::new(OpenAiPlanner::new(
                "http://127.0.0.1:9",
                "test-model",
                ApiKeySource::None,
                OpenAiOptions::default(),
            )),
            None,
            AssemblyPolicy::default(),
        )
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }

    #[tokio::test]
    async fn home_and_status_report_uptime_and_hash() {
        let app = make_app(test_state(ServerConfig::default()));

        for uri in ["/", "/v1/status"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(json["uptime"].as_str().unwrap().starts_with("0d "));
            assert_eq!(json["hash"], env!("GIT_HASH"));
        }
    }

    #[tokio::test]
    async fn frontend_dir_is_served_at_root() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>mixtape</h1>").unwrap();
        let app = make_app(test_state(ServerConfig {
            frontend_dir_path: Some(dir.path().to_string_lossy().to_string()),
            ..Default::default()
        }));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"<h1>mixtape</h1>");

        let request = Request::builder().uri("/v1/status").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generate_is_post_only() {
        let app = make_app(test_state(ServerConfig::default()));
        let request = Request::builder()
            .uri("/v1/playlist/generate")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn metrics_endpoint_serves_text() {
        crate::server::metrics::init_metrics();
        crate::server::metrics::record_assembly(&crate::playlist::AssemblyReport::default());
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = make_metrics_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("mixtape_songs_not_found_total"));
    }
}
