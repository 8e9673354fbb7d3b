//! Completion API client for classification and recipe generation.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use crate::config::ClaudeConfig;

use super::error::{ApiErrorResponse, CompletionError};
use super::types::{ChatRequest, ChatResponse, ContentBlock, ImageSource, Message};
use super::{CompletionModel, NOT_PANTRY_SENTINEL};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Instruction sent alongside the image for classification.
const CLASSIFY_INSTRUCTION: &str = "Identify the single pantry item shown in this image. \
    Respond with only a short lowercase item name, such as \"olive oil\" or \"rice\". \
    If the image does not show a pantry item, respond with exactly \"not pantry item\".";

/// System prompt for recipe generation.
const RECIPE_SYSTEM_PROMPT: &str = "You are a home-cooking assistant. Suggest practical \
    recipes using only common techniques, formatted as a short ingredient list followed \
    by numbered steps.";

/// Completion API client.
///
/// Wraps the Anthropic Messages API for the two contracts the inventory
/// core needs: image classification and recipe text generation. Both are
/// single-shot request/response calls.
#[derive(Clone)]
pub struct CompletionClient {
    inner: Arc<CompletionClientInner>,
}

struct CompletionClientInner {
    client: reqwest::Client,
    model: String,
}

impl CompletionClient {
    /// Create a new completion client.
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(config: &ClaudeConfig) -> Self {
        let api_key = config.api_key.expose_secret();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(api_key).expect("Invalid API key for header"),
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner: Arc::new(CompletionClientInner {
                client,
                model: config.model.clone(),
            }),
        }
    }

    /// Send one request and return the complete response.
    async fn complete(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
    ) -> Result<ChatResponse, CompletionError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system,
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle a response, mapping error statuses.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<ChatResponse, CompletionError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| CompletionError::Parse(format!("Failed to parse response: {e}")))
        } else {
            Err(self.handle_error_status(status, response).await)
        }
    }

    /// Handle an error status code.
    async fn handle_error_status(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> CompletionError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return CompletionError::RateLimited(retry_after);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return CompletionError::Unauthorized("Invalid API key".to_string());
        }

        match response.text().await {
            Ok(body) => {
                if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                    CompletionError::Api {
                        error_type: api_error.error.error_type,
                        message: api_error.error.message,
                    }
                } else {
                    CompletionError::Api {
                        error_type: "unknown".to_string(),
                        message: body,
                    }
                }
            }
            Err(e) => CompletionError::Http(e),
        }
    }

    /// Extract the response text, rejecting empty completions.
    fn response_text(response: &ChatResponse) -> Result<String, CompletionError> {
        let text = response.text();
        if text.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(text)
    }
}

impl CompletionModel for CompletionClient {
    #[instrument(skip(self, image), fields(model = %self.inner.model, bytes = image.len()))]
    async fn classify_image(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<String, CompletionError> {
        let message = Message::user(vec![
            ContentBlock::Image {
                source: ImageSource::base64(image, media_type),
            },
            ContentBlock::Text {
                text: CLASSIFY_INSTRUCTION.to_string(),
            },
        ]);

        let response = self.complete(vec![message], None).await?;
        Self::response_text(&response)
    }

    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    async fn generate_text(&self, prompt: &str) -> Result<String, CompletionError> {
        let message = Message::user(vec![ContentBlock::Text {
            text: prompt.to_string(),
        }]);

        let response = self
            .complete(vec![message], Some(RECIPE_SYSTEM_PROMPT.to_string()))
            .await?;
        Self::response_text(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_instruction_names_the_sentinel() {
        assert!(CLASSIFY_INSTRUCTION.contains(NOT_PANTRY_SENTINEL));
    }

    #[test]
    fn response_text_rejects_empty_completions() {
        let response = ChatResponse {
            id: "msg_01".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            stop_reason: None,
            content: vec![],
            usage: super::super::Usage {
                input_tokens: 1,
                output_tokens: 0,
            },
        };
        assert!(matches!(
            CompletionClient::response_text(&response),
            Err(CompletionError::Empty)
        ));
    }

    #[test]
    fn completion_client_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<CompletionClient>();
    }
}
