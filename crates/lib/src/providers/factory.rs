//! # Provider Factory
//!
//! This module centralizes the logic for creating provider instances from plain
//! settings. By placing it in the `lib` crate, any consumer (the server, tests,
//! future tools) builds providers the same way, and no provider ever reads the
//! process environment on its own.

use crate::{
    errors::InsightError,
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        extraction::{exa::ExaContentsProvider, ExtractionProvider},
        search::{exa::ExaSearchProvider, SearchProvider},
    },
};
use std::time::Duration;
use tracing::info;

/// Settings for the generative-text provider.
#[derive(Debug, Clone, Default)]
pub struct AiProviderSettings {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub model_name: Option<String>,
}

/// Settings shared by the Exa-backed search and extraction providers.
#[derive(Debug, Clone, Default)]
pub struct ExaSettings {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
}

/// Creates the generative-text provider described by `settings`.
pub fn create_ai_provider(
    settings: &AiProviderSettings,
    timeout: Duration,
) -> Result<Box<dyn AiProvider>, InsightError> {
    let provider: Box<dyn AiProvider> = match settings.provider.as_str() {
        "gemini" => {
            let api_key = settings
                .api_key
                .clone()
                .ok_or_else(|| InsightError::MissingApiKey("gemini".to_string()))?;
            info!("Configuring Gemini provider");
            Box::new(GeminiProvider::new(
                settings.api_url.clone(),
                api_key,
                timeout,
            )?)
        }
        "local" => {
            let api_url = settings
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    InsightError::MissingProvider(
                        "local (api_url is required for the local provider)".to_string(),
                    )
                })?;
            info!("Configuring Local AI provider with URL: {}", api_url);
            Box::new(LocalAiProvider::new(
                api_url,
                settings.api_key.clone(),
                settings.model_name.clone(),
                timeout,
            )?)
        }
        other => {
            return Err(InsightError::MissingProvider(format!(
                "unsupported generation provider type '{other}'"
            )))
        }
    };
    Ok(provider)
}

/// Creates the Exa web-search provider.
pub fn create_search_provider(
    settings: &ExaSettings,
    timeout: Duration,
) -> Result<Box<dyn SearchProvider>, InsightError> {
    let api_key = settings.api_key.clone().unwrap_or_default();
    Ok(Box::new(ExaSearchProvider::new(
        settings.api_url.clone(),
        api_key,
        timeout,
    )?))
}

/// Creates the Exa content-extraction provider.
pub fn create_extraction_provider(
    settings: &ExaSettings,
    timeout: Duration,
) -> Result<Box<dyn ExtractionProvider>, InsightError> {
    let api_key = settings.api_key.clone().unwrap_or_default();
    Ok(Box::new(ExaContentsProvider::new(
        settings.api_url.clone(),
        api_key,
        timeout,
    )?))
}
