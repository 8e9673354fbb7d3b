//! Completion API client (Anthropic Messages API).
//!
//! Two single-shot contracts, both non-streaming:
//! - classify an image into a short pantry-item label (or the
//!   [`NOT_PANTRY_SENTINEL`])
//! - generate free-form recipe text from a prompt
//!
//! There is no retry or backoff here; a failed call surfaces to the caller
//! as a user-facing message and the user retries manually.

mod client;
mod error;
mod types;

pub use client::CompletionClient;
pub use error::{ApiErrorResponse, CompletionError};
pub use types::{
    ChatRequest, ChatResponse, ContentBlock, ImageSource, Message, MessageContent, StopReason,
    Usage,
};

/// Label the classifier returns when the image does not show a pantry item.
pub const NOT_PANTRY_SENTINEL: &str = "not pantry item";

/// Contract for the external completion model.
///
/// Seams the [`CompletionClient`] so the inventory service can be exercised
/// against scripted responses in tests.
#[allow(async_fn_in_trait)]
pub trait CompletionModel: Send + Sync {
    /// Classify a photographed item into a short pantry-item label.
    ///
    /// Returns either the label or the literal [`NOT_PANTRY_SENTINEL`].
    async fn classify_image(
        &self,
        image: &[u8],
        media_type: &str,
    ) -> Result<String, CompletionError>;

    /// Generate free-form text from a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, CompletionError>;
}
