pub mod config;
pub mod error;
mod http_layers;
pub mod metrics;
mod playlist_routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use playlist_routes::{GenerateBody, GenerateResponse, PublishBody, DEFAULT_MINUTES};
pub use server::{make_app, run_server};
pub use state::ServerState;
