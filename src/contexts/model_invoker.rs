use crate::data::{ModelClient, ModelClientError};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Delay between two attempts of a failing model call
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

const MOCK_PROMPT_CHARS: usize = 50;

/// A model call that kept failing until the retry budget ran out
#[derive(Debug, Error)]
#[error("model call to '{model}' failed after {attempts} attempt(s): {source}")]
pub struct ModelInvocationError {
    pub model: String,
    pub attempts: u32,
    #[source]
    pub source: ModelClientError,
}

/// Placeholder answer produced when no live client is configured
pub fn mock_response(model: &str, prompt: &str) -> String {
    let head: String = prompt.chars().take(MOCK_PROMPT_CHARS).collect();
    format!("[Mock response from {} for prompt: {}...]", model, head)
}

/// Performs model calls with bounded retry.
///
/// Retries block the calling thread for the backoff interval, so a flaky
/// provider makes each step take `failed attempts × backoff` longer.
pub struct ModelInvoker {
    client: Option<Box<dyn ModelClient>>,
    retry_count: u32,
    backoff: Duration,
}

impl ModelInvoker {
    /// Creates an invoker
    ///
    /// # Arguments
    /// * `client` - Live provider; `None` selects mock mode
    /// * `retry_count` - Maximum number of attempts per call (at least one is always made)
    pub fn new(client: Option<Box<dyn ModelClient>>, retry_count: u32) -> Self {
        Self {
            client,
            retry_count: retry_count.max(1),
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Whether calls reach a live provider
    pub fn is_live(&self) -> bool {
        self.client.is_some()
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Calls the model once, retrying failed attempts up to the retry count
    pub fn invoke(&self, model: &str, prompt: &str) -> Result<String, ModelInvocationError> {
        let Some(client) = &self.client else {
            debug!(model, "no model client configured, returning mock response");
            return Ok(mock_response(model, prompt));
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match client.complete(model, prompt) {
                Ok(text) => {
                    debug!(model, provider = client.name(), attempt, "model call succeeded");
                    return Ok(text.trim().to_string());
                }
                Err(e) => {
                    warn!(
                        model,
                        provider = client.name(),
                        attempt,
                        max_attempts = self.retry_count,
                        error = %e,
                        "model call failed"
                    );
                    if attempt >= self.retry_count {
                        return Err(ModelInvocationError {
                            model: model.to_string(),
                            attempts: attempt,
                            source: e,
                        });
                    }
                    thread::sleep(self.backoff);
                }
            }
        }
    }
}
