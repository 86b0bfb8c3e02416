//! # Application State
//!
//! This module defines the shared application state (`AppState`) and the logic
//! for building it at startup. The `AppState` holds the configuration and the
//! fully wired `InsightPipeline`, making them accessible to all request handlers.

use crate::config::AppConfig;
use brandsight::{
    providers::{
        db::{InsightStore, MemoryInsightStore, SqliteInsightStore},
        factory::{create_ai_provider, create_extraction_provider, create_search_provider},
    },
    InsightPipeline,
};
use std::{path::Path, sync::Arc};
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration, loaded from `config.yml`.
    pub config: Arc<AppConfig>,
    /// The orchestrator with its providers and insight store.
    pub pipeline: Arc<InsightPipeline>,
}

/// Opens the insight store selected by `db_url`.
async fn build_store(db_url: &str) -> anyhow::Result<Box<dyn InsightStore>> {
    if db_url == ":memory:" {
        info!("Using the in-memory insight store.");
        return Ok(Box::new(MemoryInsightStore::new()));
    }

    if let Some(parent) = Path::new(db_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteInsightStore::new(db_url).await?;
    info!(db_path = %db_url, "Initialized insight store (SQLite).");
    Ok(Box::new(store))
}

/// Builds the shared application state from the configuration.
///
/// This function initializes all necessary services:
/// - the search, extraction and generation providers, each bounded by the
///   configured request timeout;
/// - the insight store (in memory or SQLite);
/// - the `InsightPipeline` that ties them together.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let timeout = config.request_timeout();

    let search_provider = create_search_provider(&config.search_settings(), timeout)?;
    let extraction_provider = create_extraction_provider(&config.extraction_settings(), timeout)?;
    let ai_provider = create_ai_provider(&config.ai_settings(), timeout)?;
    let store = build_store(&config.db_url).await?;

    let pipeline = InsightPipeline::builder()
        .search_provider(search_provider)
        .extraction_provider(extraction_provider)
        .ai_provider(ai_provider)
        .store(store)
        .config(config.pipeline_config())
        .build()?;

    Ok(AppState {
        config: Arc::new(config),
        pipeline: Arc::new(pipeline),
    })
}
