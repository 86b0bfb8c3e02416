pub mod gemini;
pub mod local;

use crate::{errors::InsightError, types::GenerateOptions};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a generative-text provider.
///
/// This trait defines a common interface for turning a fully rendered prompt into
/// generated text using different Large Language Models (e.g., Gemini, local models).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates text for `prompt` using the given generation parameters.
    ///
    /// An empty string is a valid (degenerate) success.
    async fn generate(&self, prompt: &str, options: &GenerateOptions)
        -> Result<String, InsightError>;
}

dyn_clone::clone_trait_object!(AiProvider);
