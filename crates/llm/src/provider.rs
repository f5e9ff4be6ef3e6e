use async_trait::async_trait;

/// One completion call: a system and user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    /// Token cap; `None` leaves the provider default.
    pub max_tokens: Option<u32>,
    /// Ask for JSON matching the structured completion schema.
    pub structured: bool,
}

/// Errors from the completion layer.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("Malformed completion response: {0}")]
    Decode(String),

    /// The API answered without any generated text.
    #[error("Completion response contained no content")]
    EmptyCompletion,
}

/// Source of chat completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Run one completion and return the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError>;
}
