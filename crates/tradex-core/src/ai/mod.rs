//! Transport to the natural-language extraction service.

#[cfg(feature = "gemini")]
mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::AiError;

/// Sends a prompt and returns the raw text reply.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}
