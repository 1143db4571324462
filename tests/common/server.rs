//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own fixture catalog and
//! recording publisher.

use super::constants::*;
use super::fixtures::{create_test_catalog, FixturePlanner, RecordingPublisher};
use mixtape_server::catalog::{
    AccessToken, ClientCredentialsIssuer, InMemoryCatalog, PlaylistPublisher, StaticTokenIssuer,
    TokenIssuer,
};
use mixtape_server::playlist::AssemblyPolicy;
use mixtape_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Which collaborators the spawned server gets.
pub struct TestServerOptions {
    /// Without catalog credentials every generate call fails with 503.
    pub catalog_credentials: bool,
    pub publishing: bool,
    pub diversity_seed: Option<u64>,
}

impl Default for TestServerOptions {
    fn default() -> Self {
        Self {
            catalog_credentials: true,
            publishing: true,
            diversity_seed: Some(7),
        }
    }
}

/// Test server instance
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The catalog behind the server, for inspecting issued queries
    pub catalog: Arc<InMemoryCatalog>,

    /// Drafts received by the publish endpoint
    pub publisher: Arc<RecordingPublisher>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a fully configured test server on a random port
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    /// # Panics
    ///
    /// Panics if port binding fails or the server doesn't become ready
    /// within the timeout.
    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let catalog = Arc::new(create_test_catalog());
        let publisher = Arc::new(RecordingPublisher::default());

        let token_issuer: Arc<dyn TokenIssuer> = if options.catalog_credentials {
            Arc::new(StaticTokenIssuer(AccessToken::new("app-token")))
        } else {
            Arc::new(
                ClientCredentialsIssuer::new("http://127.0.0.1:9", None, None, 1)
                    .expect("Failed to build token issuer"),
            )
        };
        let publisher_for_state: Option<Arc<dyn PlaylistPublisher>> = if options.publishing {
            Some(publisher.clone() as Arc<dyn PlaylistPublisher>)
        } else {
            None
        };

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            diversity_seed: options.diversity_seed,
            ..Default::default()
        };
        let state = ServerState::new(
            config,
            catalog.clone(),
            token_issuer,
            Arc::new(FixturePlanner),
            publisher_for_state,
            AssemblyPolicy::default(),
        );
        let app = make_app(state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            catalog,
            publisher,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the status endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/v1/status", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
