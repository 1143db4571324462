mod file_config;

pub use file_config::{AssemblyConfig, CatalogConfig, FileConfig, LlmConfig};

use crate::planner::{ApiKeySource, OpenAiOptions};
use crate::playlist::AssemblyPolicy;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CATALOG_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_CATALOG_TIMEOUT_SEC: u64 = 10;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub default_region: String,
    pub catalog_client_id: Option<String>,
    pub catalog_client_secret: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub llm_base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub default_region: String,

    pub catalog: CatalogSettings,
    pub llm: LlmSettings,
    pub assembly: AssemblySettings,
}

#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub timeout_sec: u64,
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_sec: u64,
}

impl LlmSettings {
    /// The command wins over a static key when both are set.
    pub fn api_key_source(&self) -> ApiKeySource {
        match (&self.api_key_command, &self.api_key) {
            (Some(cmd), _) => ApiKeySource::Command(cmd.clone()),
            (None, Some(key)) => ApiKeySource::Static(key.clone()),
            (None, None) => ApiKeySource::None,
        }
    }

    pub fn options(&self) -> OpenAiOptions {
        OpenAiOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_sec),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssemblySettings {
    pub artist_repeat_skip_probability: f64,
    pub diversity_seed: Option<u64>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());
        if let Some(dir) = &frontend_dir_path {
            let path = PathBuf::from(dir);
            if !path.exists() {
                bail!("Frontend directory does not exist: {:?}", path);
            }
            if !path.is_dir() {
                bail!("frontend_dir_path is not a directory: {:?}", path);
            }
        }

        let default_region = non_empty(file.default_region)
            .or_else(|| non_empty(Some(cli.default_region.clone())))
            .unwrap_or_else(|| "US".to_string());

        let catalog_file = file.catalog.unwrap_or_default();
        let client_id = non_empty(catalog_file.client_id)
            .or_else(|| non_empty(cli.catalog_client_id.clone()));
        let client_secret = non_empty(catalog_file.client_secret)
            .or_else(|| non_empty(cli.catalog_client_secret.clone()));
        if client_id.is_some() != client_secret.is_some() {
            bail!("Catalog client id and client secret must be provided together");
        }
        let catalog = CatalogSettings {
            client_id,
            client_secret,
            api_base_url: catalog_file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_CATALOG_API_URL.to_string()),
            accounts_base_url: catalog_file
                .accounts_base_url
                .unwrap_or_else(|| DEFAULT_ACCOUNTS_URL.to_string()),
            timeout_sec: catalog_file
                .timeout_sec
                .unwrap_or(DEFAULT_CATALOG_TIMEOUT_SEC),
        };

        let llm_file = file.llm.unwrap_or_default();
        let llm_defaults = OpenAiOptions::default();
        let llm = LlmSettings {
            base_url: llm_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model: llm_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_key: non_empty(llm_file.api_key).or_else(|| non_empty(cli.llm_api_key.clone())),
            api_key_command: non_empty(llm_file.api_key_command),
            temperature: llm_file.temperature.unwrap_or(llm_defaults.temperature),
            max_tokens: llm_file.max_tokens.unwrap_or(llm_defaults.max_tokens),
            timeout_sec: llm_file
                .timeout_sec
                .unwrap_or(llm_defaults.timeout.as_secs()),
        };

        let assembly_file = file.assembly.unwrap_or_default();
        let default_policy = AssemblyPolicy::default();
        let skip_probability = assembly_file
            .artist_repeat_skip_probability
            .unwrap_or(default_policy.artist_repeat_skip_probability);
        if !skip_probability.is_finite() {
            bail!("artist_repeat_skip_probability must be a number");
        }
        let assembly = AssemblySettings {
            artist_repeat_skip_probability: skip_probability.clamp(0.0, 1.0),
            diversity_seed: assembly_file.diversity_seed,
        };

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            default_region,
            catalog,
            llm,
            assembly,
        })
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            frontend_dir_path: self.frontend_dir_path.clone(),
            default_region: self.default_region.clone(),
            diversity_seed: self.assembly.diversity_seed,
        }
    }

    pub fn assembly_policy(&self) -> AssemblyPolicy {
        AssemblyPolicy::default().with_skip_probability(self.assembly.artist_repeat_skip_probability)
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
