//! Planner backed by an OpenAI-compatible chat completions API.
//!
//! Works with OpenAI, OpenRouter, Together AI, vLLM, and any other
//! service implementing the chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use super::models::{PlaylistPlan, RawPlan};
use super::policy::requested_song_count;
use super::prompt::{build_user_prompt, extract_json_object, SYSTEM_PROMPT};
use super::{PlanOracle, PlanRequest, PlannerError};

/// Timeout for api_key_command execution.
const API_KEY_COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of API key for authentication.
#[derive(Debug, Clone)]
pub enum ApiKeySource {
    /// No key configured; every plan request fails with `NotConfigured`.
    None,
    /// Static API key.
    Static(String),
    /// Shell command that outputs the API key (for rotating tokens).
    Command(String),
}

impl ApiKeySource {
    async fn get_key(&self) -> Result<String, PlannerError> {
        match self {
            ApiKeySource::None => Err(PlannerError::NotConfigured),
            ApiKeySource::Static(key) => Ok(key.clone()),
            ApiKeySource::Command(cmd) => {
                debug!(command = %cmd, "Fetching API key via command");

                let result = tokio::time::timeout(
                    API_KEY_COMMAND_TIMEOUT,
                    Command::new("sh").arg("-c").arg(cmd).output(),
                )
                .await;

                let output = match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(e)) => {
                        warn!(command = %cmd, error = %e, "api_key_command failed to execute");
                        return Err(PlannerError::Connection(format!(
                            "Failed to execute api_key_command: {}",
                            e
                        )));
                    }
                    Err(_) => {
                        warn!(command = %cmd, "api_key_command timed out");
                        return Err(PlannerError::Timeout);
                    }
                };

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    warn!(command = %cmd, stderr = %stderr, "api_key_command failed");
                    return Err(PlannerError::Connection(format!(
                        "api_key_command failed with status {}: {}",
                        output.status, stderr
                    )));
                }

                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    warn!(command = %cmd, "api_key_command returned empty key");
                    return Err(PlannerError::Connection(
                        "api_key_command returned empty key".to_string(),
                    ));
                }

                Ok(key)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for OpenAiOptions {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 4000,
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct OpenAiPlanner {
    client: Client,
    base_url: String,
    model: String,
    api_key_source: ApiKeySource,
    options: OpenAiOptions,
}

impl OpenAiPlanner {
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://api.openai.com/v1").
    /// * `model` - Model to use (e.g., "gpt-4o-mini").
    /// * `api_key_source` - Where the bearer key comes from.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_source: ApiKeySource,
        options: OpenAiOptions,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key_source,
            options,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Parses the assistant's reply into a repaired plan.
pub fn parse_plan_content(content: &str, placeholder_count: usize) -> Result<PlaylistPlan, PlannerError> {
    let json = extract_json_object(content).ok_or_else(|| {
        PlannerError::InvalidResponse("No JSON object in planner reply".to_string())
    })?;
    let raw: RawPlan = serde_json::from_str(json)
        .map_err(|e| PlannerError::InvalidResponse(format!("Unparsable plan: {}", e)))?;
    Ok(PlaylistPlan::from_raw(raw, placeholder_count))
}

#[async_trait]
impl PlanOracle for OpenAiPlanner {
    fn name(&self) -> &str {
        "openai"
    }

    async fn plan(&self, request: &PlanRequest) -> Result<PlaylistPlan, PlannerError> {
        let api_key = self.api_key_source.get_key().await?;
        let url = format!("{}/chat/completions", self.base_url);

        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(request),
                },
            ],
            temperature: Some(self.options.temperature),
            max_tokens: Some(self.options.max_tokens),
            response_format: Some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        debug!(model = %self.model, "Sending plan request to OpenAI-compatible API");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .timeout(self.options.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PlannerError::Timeout
                } else {
                    PlannerError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(PlannerError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlannerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            PlannerError::InvalidResponse(format!("Failed to parse completion: {}", e))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PlannerError::InvalidResponse("No choices in response".to_string()))?;

        let plan = parse_plan_content(&content, requested_song_count(request.minutes))?;
        debug!(
            songs = plan.songs.len(),
            placeholder = plan.is_placeholder,
            "Received plan from OpenAI-compatible API"
        );
        Ok(plan)
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
