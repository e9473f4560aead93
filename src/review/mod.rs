pub mod client;
pub mod comments;
pub mod prompt;
pub mod types;

pub use client::{OpenAiClient, ReviewClient};
pub use comments::map_comments;
pub use prompt::build_prompt;
pub use types::PostableComment;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Completion service returned {status}: {snippet}")]
    Status {
        status: reqwest::StatusCode,
        snippet: String,
    },

    #[error("Completion service returned no choices")]
    EmptyChoices,

    #[error("Completion API key not found in configuration or environment")]
    MissingApiKey,

    #[error("Completion endpoint must be an http(s) URL, got `{0}`")]
    InvalidEndpoint(String),
}

/// A language-model completion backend.
/// Implementations send `prompt` as the whole instruction and return the reply text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ReviewError>;
}
