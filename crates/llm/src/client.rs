//! HTTP client for OpenAI-compatible chat-completion endpoints.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::CompletionConfig;
use crate::provider::{CompletionError, CompletionProvider, CompletionRequest};
use crate::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ChatRole, JsonSchemaFormat,
    ResponseFormat,
};

/// Name attached to the structured output schema.
const SCHEMA_NAME: &str = "ad_analysis";

/// Completion provider backed by a `/chat/completions` endpoint.
///
/// Model and temperature come from configuration and are the same for every
/// request. No retries: a failed call is reported to the caller.
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    config: CompletionConfig,
}

impl OpenAiCompatibleClient {
    /// Create a client with the configured request timeout.
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn build_body(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let response_format = request.structured.then(|| ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: SCHEMA_NAME.to_string(),
                strict: true,
                schema: adsage_core::parser::structured_output_schema(),
            },
        });

        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: ChatRole::System,
                    content: request.system.clone(),
                },
                ChatMessage {
                    role: ChatRole::User,
                    content: request.user.clone(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: request.max_tokens,
            response_format,
        }
    }

    // ---- private helpers ----

    /// Return the response unchanged on a 2xx status, or an
    /// [`CompletionError::Api`] carrying the status and body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CompletionError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = self.build_body(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;

        let text = response.text().await?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::Decode(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion finished",
            );
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyCompletion)?;
        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!(model = %self.config.model, "Completion truncated at token limit");
        }

        match choice.message.content {
            Some(content) if !content.trim().is_empty() => Ok(content),
            _ => Err(CompletionError::EmptyCompletion),
        }
    }
}
