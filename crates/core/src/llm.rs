//! Anthropic Messages API client.
//!
//! Direct REST client, no SDK. The API key is passed in explicitly so a
//! run's credentials never touch the process environment.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::ModelConfig;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to the Anthropic API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Anthropic API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("model returned no text content")]
    EmptyCompletion,
}

/// Client for one run, bound to the run's credentials and model settings.
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    config: ModelConfig,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, config: ModelConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            config,
        }
    }

    /// Send one system + user exchange and return the first text block.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system: Some(system.to_string()),
            messages: vec![Message {
                role: "user".to_string(),
                content: user.to_string(),
            }],
        };

        debug!(model = %request.model, "sending completion request");

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status,
                message: extract_api_error(&body),
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        extract_text(parsed)
    }
}

#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

fn extract_text(response: MessagesResponse) -> Result<String, LlmError> {
    response
        .content
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text,
        })
        .next()
        .ok_or(LlmError::EmptyCompletion)
}

/// Pull the human-readable message out of an Anthropic error body,
/// falling back to the raw body.
fn extract_api_error(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string())
}
