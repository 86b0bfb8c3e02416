//! # Brand Intelligence Pipeline
//!
//! This crate turns a set of research prompts plus a brand's identity into a
//! market-intelligence report. It searches the web for every prompt, extracts
//! the readable content of the pages it found, and asks a language model for a
//! structured briefing, persisting each run as an `Insight` record.
//!
//! The three remote services sit behind the `SearchProvider`,
//! `ExtractionProvider` and `AiProvider` traits and the persistence layer behind
//! `InsightStore`, so the orchestration in `InsightPipeline` can run against
//! real providers or test doubles alike.

pub mod constants;
pub mod errors;
pub mod extraction;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod search;
pub mod synthesis;
pub mod types;

pub use errors::InsightError;
pub use pipeline::{InsightPipeline, InsightPipelineBuilder, PipelineConfig, PIPELINE_STAGES};
pub use types::{
    ContentResult, ExtractOptions, ExtractedContent, GenerateOptions, GenerateOverrides, Insight,
    InsightRequest, InsightResult, InsightStatus, InsightSummary, PipelineStage,
    SearchFailurePolicy, SearchOptions, SearchResult,
};
