//! Chat-model client over an OpenAI-compatible HTTP endpoint.
//!
//! The [`ChatClient`] trait decouples the agents from the actual backend.
//! Tests use scripted clients that return predetermined replies without
//! touching the network.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ForgeConfig;

/// Errors from model operations.
///
/// `RateLimited` is the one variant callers distinguish: the HTTP facade
/// reports it upstream as 429 instead of a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimited { retry_after: Option<u64> },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("missing API key: {0}")]
    MissingApiKey(String),
}

/// Abstraction over chat-model backends.
pub trait ChatClient {
    /// Send one prompt and return the assistant's text reply.
    fn complete(&self, system: Option<&str>, user: &str) -> Result<String, ChatError>;
}

/// Blocking client for an OpenAI-compatible chat-completions API.
pub struct HttpChatClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl HttpChatClient {
    /// Build a client from config, reading the API key from the configured
    /// environment variable.
    pub fn from_config(cfg: &ForgeConfig) -> Result<Self, ChatError> {
        let api_key = std::env::var(&cfg.api_key_env)
            .map_err(|_| ChatError::MissingApiKey(format!("{} not set", cfg.api_key_env)))?;
        Self::new(
            cfg.api_base.clone(),
            api_key,
            cfg.model.clone(),
            cfg.max_tokens,
            Duration::from_secs(cfg.request_timeout_secs),
        )
    }

    /// Build a client from explicit parts (useful against mock servers).
    pub fn new(
        api_base: String,
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, ChatError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base,
            api_key,
            model,
            max_tokens,
        })
    }
}

impl ChatClient for HttpChatClient {
    fn complete(&self, system: Option<&str>, user: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let body = build_request_body(&self.model, self.max_tokens, system, user);
        debug!(model = %self.model, "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());
            warn!(?retry_after, "model endpoint rate limited");
            return Err(ChatError::RateLimited { retry_after });
        }

        if status >= 400 {
            let message = response.text().unwrap_or_else(|_| "(no body)".into());
            warn!(status, "model endpoint returned error");
            return Err(ChatError::Api { status, message });
        }

        let value: Value = response
            .json()
            .map_err(|e| ChatError::InvalidResponse(format!("parse response body: {e}")))?;
        extract_reply(&value)
    }
}

/// Build the chat-completions request body.
fn build_request_body(model: &str, max_tokens: u32, system: Option<&str>, user: &str) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": user }));
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": messages,
    })
}

/// Pull the assistant text out of a chat-completions response.
fn extract_reply(value: &Value) -> Result<String, ChatError> {
    value["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            ChatError::InvalidResponse("response missing choices[0].message.content".to_string())
        })
}
