use thiserror::Error;

/// Errors a live model client can report for a single call
#[derive(Debug, Error)]
pub enum ModelClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse provider response: {0}")]
    Parse(String),

    #[error("provider response contained no message content")]
    EmptyResponse,

    #[error("invalid client configuration: {0}")]
    Config(String),
}

/// A live text-generation provider.
///
/// The model invoker owns an optional client; when none is configured it
/// answers with deterministic mock output instead.
pub trait ModelClient {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Performs exactly one single-message completion request.
    ///
    /// # Arguments
    /// * `model` - The model to address
    /// * `prompt` - The user message content
    ///
    /// # Returns
    /// * `Ok(String)` - The raw content of the first choice
    /// * `Err(ModelClientError)` - If the request failed in any way
    fn complete(&self, model: &str, prompt: &str) -> Result<String, ModelClientError>;
}
