//! OpenAI-compatible chat completions client.
//!
//! Works with any endpoint that speaks the `/chat/completions` wire format.

use crate::data::{ModelClient, ModelClientError};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Blocking client for the Chat Completions API
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Creates a client from the environment.
    ///
    /// Returns `Ok(None)` when `OPENAI_API_KEY` is unset or empty; running
    /// without a key selects mock mode and is not an error.
    pub fn from_env() -> Result<Option<Self>, ModelClientError> {
        let api_key = match std::env::var(API_KEY_VAR) {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let base_url = std::env::var(BASE_URL_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, base_url).map(Some)
    }

    pub fn new(api_key: String, base_url: String) -> Result<Self, ModelClientError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ModelClientError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a single-message chat request
    pub fn build_request_body(model: &str, prompt: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        })
    }

    /// Extracts the first choice's message content from a response body
    pub fn parse_response(body: &Value) -> Result<String, ModelClientError> {
        let choices = body["choices"]
            .as_array()
            .ok_or_else(|| ModelClientError::Parse("missing 'choices' array".to_string()))?;

        choices
            .first()
            .and_then(|choice| choice["message"]["content"].as_str())
            .map(str::to_string)
            .ok_or(ModelClientError::EmptyResponse)
    }
}

impl ModelClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelClientError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&Self::build_request_body(model, prompt))
            .send()
            .map_err(|e| ModelClientError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(ModelClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .map_err(|e| ModelClientError::Parse(e.to_string()))?;

        Self::parse_response(&body)
    }
}
