use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mixtape_server::catalog::{
    ClientCredentialsIssuer, PlaylistPublisher, SpotifyCatalogClient, SpotifyPlaylistPublisher,
};
use mixtape_server::config;
use mixtape_server::planner::OpenAiPlanner;
use mixtape_server::server::{metrics, run_server, RequestsLoggingLevel, ServerState};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version, about = "Generates playlists of real catalog tracks from text prompts")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Catalog market used when a request does not name one.
    #[clap(long, default_value = "US")]
    pub default_region: String,

    /// Client id of the catalog application.
    #[clap(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    pub catalog_client_id: Option<String>,

    /// Client secret of the catalog application.
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub catalog_client_secret: Option<String>,

    /// API key of the planning model.
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Planning model name.
    #[clap(long)]
    pub llm_model: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[clap(long)]
    pub llm_base_url: Option<String>,

    /// Do not expose playlist publishing.
    #[clap(long)]
    pub disable_publishing: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            frontend_dir_path: args.frontend_dir_path.clone(),
            default_region: args.default_region.clone(),
            catalog_client_id: args.catalog_client_id.clone(),
            catalog_client_secret: args.catalog_client_secret.clone(),
            llm_api_key: args.llm_api_key.clone(),
            llm_model: args.llm_model.clone(),
            llm_base_url: args.llm_base_url.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  default_region: {}", app_config.default_region);
    info!("  catalog api: {}", app_config.catalog.api_base_url);
    info!("  llm: {} at {}", app_config.llm.model, app_config.llm.base_url);

    info!("Initializing metrics...");
    metrics::init_metrics();

    let catalog = SpotifyCatalogClient::new(
        app_config.catalog.api_base_url.clone(),
        app_config.catalog.timeout_sec,
    )?;

    let token_issuer = ClientCredentialsIssuer::new(
        app_config.catalog.accounts_base_url.clone(),
        app_config.catalog.client_id.clone(),
        app_config.catalog.client_secret.clone(),
        app_config.catalog.timeout_sec,
    )?;
    if !token_issuer.is_configured() {
        warn!("Catalog credentials are not configured, playlist generation will fail until SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET are set");
    }

    let api_key_source = app_config.llm.api_key_source();
    if matches!(api_key_source, mixtape_server::planner::ApiKeySource::None) {
        warn!("No planner API key configured, every request will use the placeholder plan");
    }
    let planner = OpenAiPlanner::new(
        app_config.llm.base_url.clone(),
        app_config.llm.model.clone(),
        api_key_source,
        app_config.llm.options(),
    );

    let publisher: Option<Arc<dyn PlaylistPublisher>> = if cli_args.disable_publishing {
        info!("Playlist publishing disabled");
        None
    } else {
        Some(Arc::new(SpotifyPlaylistPublisher::new(
            app_config.catalog.api_base_url.clone(),
            app_config.catalog.timeout_sec,
        )?))
    };

    if let Some(seed) = app_config.assembly.diversity_seed {
        info!("Supplement selection seeded with {}", seed);
    }

    let state = ServerState::new(
        app_config.server_config(),
        Arc::new(catalog),
        Arc::new(token_issuer),
        Arc::new(planner),
        publisher,
        app_config.assembly_policy(),
    );

    run_server(state).await
}
