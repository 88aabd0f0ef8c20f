//! Chat completion client for an OpenAI-compatible API

use crate::config::LlmConfig;
use crate::errors::{IdeationError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const COLLABORATOR: &str = "Chat completion API";

/// Single-turn text completion
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a system and a user message, return the first choice's content
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// reqwest-backed [`CompletionClient`] posting to `{base_url}/chat/completions`
#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    /// Build from config; the API key is read from the configured env var
    pub fn new(cfg: &LlmConfig) -> Result<Self> {
        Self::with_api_key(cfg, cfg.api_key())
    }

    pub fn with_api_key(cfg: &LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(cfg.call_timeout())
            .build()
            .map_err(|e| IdeationError::config_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: cfg.base_url.clone(),
            model: cfg.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            IdeationError::collaborator_with_source(COLLABORATOR, "completion request failed", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdeationError::collaborator(
                COLLABORATOR,
                format!("HTTP {} - {body}", status.as_u16()),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            IdeationError::collaborator_with_source(
                COLLABORATOR,
                "unexpected completion payload",
                e,
            )
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        if content.is_empty() {
            return Err(IdeationError::collaborator(COLLABORATOR, "empty response"));
        }

        tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
        Ok(content)
    }
}
