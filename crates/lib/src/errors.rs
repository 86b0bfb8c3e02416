use crate::types::{Insight, PipelineStage};
use thiserror::Error;

/// Custom error types for the insight pipeline and its providers.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("API key is missing for the {0} provider")]
    MissingApiKey(String),
    #[error("The {0} provider was not configured")]
    MissingProvider(String),
    #[error("{provider} request failed: {message}")]
    ProviderUnavailable { provider: String, message: String },
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage operation failed: {0}")]
    Storage(String),
    #[error("Insight generation failed during {stage}: {message}")]
    Pipeline {
        stage: PipelineStage,
        message: String,
        insight: Box<Insight>,
    },
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

impl InsightError {
    /// Shorthand for a failed remote call to the named provider.
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        InsightError::ProviderUnavailable {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}

impl From<turso::Error> for InsightError {
    fn from(err: turso::Error) -> Self {
        InsightError::Storage(err.to_string())
    }
}
