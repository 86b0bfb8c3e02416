//! # Insight Pipeline
//!
//! The orchestrator that owns the lifecycle of one `Insight` per request:
//!
//! ```text
//! validate -> pending -> processing -> [search -> extraction -> synthesis] -> completed
//!                                                      (any stage fails) -> failed
//! ```
//!
//! The stages run strictly one after another as the ordered list `PIPELINE_STAGES`;
//! each one reads what the previous stages left in a `StageOutput`. The first
//! stage error stops the run, and the record is finalized from the stage that
//! failed. A record is written three times per run: the `pending` stub, the
//! `processing` transition, and the final state.

use crate::{
    errors::InsightError,
    extraction::extract,
    providers::{
        ai::AiProvider, db::storage::InsightStore, extraction::ExtractionProvider,
        search::SearchProvider,
    },
    search::search_all,
    synthesis::synthesize,
    types::{
        validate_owner_and_prompts, ExtractOptions, ExtractedContent, GenerateOptions, Insight,
        InsightRequest, InsightResult, InsightSummary, PipelineStage, SearchFailurePolicy,
        SearchOptions, SearchResult,
    },
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, info};

/// The stages of a full run, in execution order.
pub const PIPELINE_STAGES: [PipelineStage; 3] = [
    PipelineStage::Search,
    PipelineStage::Extraction,
    PipelineStage::Synthesis,
];

/// Explicit configuration for one pipeline instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub num_results: usize,
    pub max_characters: usize,
    pub search_failure_policy: SearchFailurePolicy,
    pub generate_options: GenerateOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_results: SearchOptions::default().num_results,
            max_characters: ExtractOptions::default().max_characters,
            search_failure_policy: SearchFailurePolicy::default(),
            generate_options: GenerateOptions::default(),
        }
    }
}

/// Everything the stages have produced so far.
#[derive(Debug, Default)]
struct StageOutput {
    search_results: Vec<SearchResult>,
    extracted: ExtractedContent,
    insights: String,
}

impl StageOutput {
    fn into_result(self, prompts: Vec<String>) -> InsightResult {
        InsightResult {
            prompts,
            search_results: self.search_results,
            content: self.extracted.results,
            context: self.extracted.context,
            insights: self.insights,
            success: true,
            error: None,
        }
    }
}

/// Sequences search, extraction and synthesis and persists the outcome.
pub struct InsightPipeline {
    search_provider: Box<dyn SearchProvider>,
    extraction_provider: Box<dyn ExtractionProvider>,
    ai_provider: Box<dyn AiProvider>,
    store: Box<dyn InsightStore>,
    config: PipelineConfig,
}

impl fmt::Debug for InsightPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsightPipeline")
            .field("store", &self.store.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InsightPipeline {
    pub fn builder() -> InsightPipelineBuilder {
        InsightPipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs the full pipeline for `request` and returns the completed record.
    ///
    /// Validation errors are returned before anything is written or any remote
    /// call is made. A stage failure finalizes the record as `failed` and is
    /// returned as `InsightError::Pipeline`, which carries that record.
    pub async fn create_insight(&self, request: InsightRequest) -> Result<Insight, InsightError> {
        request.validate()?;

        let mut insight = Insight::new_pending(&request.user_id, request.prompts.clone());
        self.store.create(&insight).await?;
        info!(insight_id = %insight.id, user_id = %insight.user_id, prompts = insight.prompts.len(), "Created pending insight");

        insight.mark_processing();
        self.store.update(&insight).await?;

        let generate_options = self
            .config
            .generate_options
            .merged(request.options.as_ref());
        let mut output = StageOutput::default();

        for stage in PIPELINE_STAGES {
            if let Err(e) = self
                .run_stage(stage, &request, &generate_options, &mut output)
                .await
            {
                let message = e.to_string();
                error!(insight_id = %insight.id, %stage, error = %message, "Insight pipeline failed");
                insight.mark_failed(message.clone());
                // The stage error stays the reported cause even if this write fails.
                if let Err(store_err) = self.store.update(&insight).await {
                    error!(insight_id = %insight.id, error = %store_err, "Failed to persist failed insight");
                }
                return Err(InsightError::Pipeline {
                    stage,
                    message,
                    insight: Box::new(insight),
                });
            }
        }

        insight.mark_completed(output.into_result(request.prompts));
        self.store.update(&insight).await?;
        info!(insight_id = %insight.id, "Insight completed");
        Ok(insight)
    }

    async fn run_stage(
        &self,
        stage: PipelineStage,
        request: &InsightRequest,
        generate_options: &GenerateOptions,
        output: &mut StageOutput,
    ) -> Result<(), InsightError> {
        match stage {
            PipelineStage::Search => {
                let options = SearchOptions {
                    num_results: self.config.num_results,
                };
                output.search_results = search_all(
                    self.search_provider.as_ref(),
                    &request.prompts,
                    &options,
                    self.config.search_failure_policy,
                )
                .await?;
            }
            PipelineStage::Extraction => {
                let urls: Vec<String> = output
                    .search_results
                    .iter()
                    .map(|r| r.url.clone())
                    .collect();
                let options = ExtractOptions {
                    max_characters: self.config.max_characters,
                };
                output.extracted =
                    extract(self.extraction_provider.as_ref(), &urls, &options).await?;
            }
            PipelineStage::Synthesis => {
                output.insights = synthesize(
                    self.ai_provider.as_ref(),
                    &output.extracted.context,
                    &request.brand_name,
                    &request.brand_description,
                    generate_options,
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Persists a `pending` record without running any stage.
    pub async fn create_pending_insight(
        &self,
        user_id: &str,
        prompts: Vec<String>,
    ) -> Result<Insight, InsightError> {
        validate_owner_and_prompts(user_id, &prompts)?;
        let insight = Insight::new_pending(user_id, prompts);
        self.store.create(&insight).await?;
        info!(insight_id = %insight.id, "Created pending insight without running the pipeline");
        Ok(insight)
    }

    pub async fn get_insight(&self, id: &str) -> Result<Insight, InsightError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| InsightError::NotFound(format!("Insight '{id}' not found")))
    }

    /// All records owned by `user_id`, newest first.
    pub async fn list_insights(&self, user_id: &str) -> Result<Vec<Insight>, InsightError> {
        self.store.find_by_user(user_id).await
    }

    /// Like `list_insights`, without the result payloads.
    pub async fn list_insight_summaries(
        &self,
        user_id: &str,
    ) -> Result<Vec<InsightSummary>, InsightError> {
        Ok(self
            .store
            .find_by_user(user_id)
            .await?
            .iter()
            .map(Insight::summary)
            .collect())
    }

    /// Every record in the store, newest first.
    pub async fn list_all_insights(&self) -> Result<Vec<Insight>, InsightError> {
        self.store.find_all().await
    }

    pub async fn delete_insight(&self, id: &str) -> Result<(), InsightError> {
        if self.store.delete(id).await? {
            info!(insight_id = %id, "Deleted insight");
            Ok(())
        } else {
            Err(InsightError::NotFound(format!("Insight '{id}' not found")))
        }
    }
}

/// A builder for creating `InsightPipeline` instances.
#[derive(Default)]
pub struct InsightPipelineBuilder {
    search_provider: Option<Box<dyn SearchProvider>>,
    extraction_provider: Option<Box<dyn ExtractionProvider>>,
    ai_provider: Option<Box<dyn AiProvider>>,
    store: Option<Box<dyn InsightStore>>,
    config: PipelineConfig,
}

impl InsightPipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_provider(mut self, provider: Box<dyn SearchProvider>) -> Self {
        self.search_provider = Some(provider);
        self
    }

    pub fn extraction_provider(mut self, provider: Box<dyn ExtractionProvider>) -> Self {
        self.extraction_provider = Some(provider);
        self
    }

    pub fn ai_provider(mut self, provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    pub fn store(mut self, store: Box<dyn InsightStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the `InsightPipeline`, failing if any collaborator is missing.
    pub fn build(self) -> Result<InsightPipeline, InsightError> {
        Ok(InsightPipeline {
            search_provider: self
                .search_provider
                .ok_or_else(|| InsightError::MissingProvider("search".to_string()))?,
            extraction_provider: self
                .extraction_provider
                .ok_or_else(|| InsightError::MissingProvider("extraction".to_string()))?,
            ai_provider: self
                .ai_provider
                .ok_or_else(|| InsightError::MissingProvider("generation".to_string()))?,
            store: self
                .store
                .ok_or_else(|| InsightError::MissingProvider("storage".to_string()))?,
            config: self.config,
        })
    }
}
