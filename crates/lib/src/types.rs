//! # Core Data Model
//!
//! Records exchanged between the pipeline stages and the persisted `Insight`
//! aggregate. Every type serializes with camelCase keys, which is the wire
//! format of the HTTP surface.

use crate::constants::{
    DEFAULT_MAX_CHARACTERS, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_NUM_RESULTS,
    DEFAULT_TEMPERATURE, DEFAULT_TOP_K, DEFAULT_TOP_P,
};
use crate::errors::InsightError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// --- Search ---

/// A single web search hit. Its identity is the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub num_results: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            num_results: DEFAULT_NUM_RESULTS,
        }
    }
}

/// What the aggregator does when the search for one prompt fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchFailurePolicy {
    /// Any failed prompt fails the whole aggregation.
    #[default]
    FailFast,
    /// Failed prompts are skipped; the aggregation only fails if every prompt fails.
    SkipFailed,
}

// --- Extraction ---

/// The extraction outcome for one requested URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResult {
    pub url: String,
    pub title: String,
    pub content: String,
    pub extracted_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContentResult {
    pub fn extracted(url: &str, title: String, content: String) -> Self {
        Self {
            url: url.to_string(),
            title,
            content,
            extracted_at: Utc::now(),
            success: true,
            error: None,
        }
    }

    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            title: String::new(),
            content: String::new(),
            extracted_at: Utc::now(),
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub max_characters: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_characters: DEFAULT_MAX_CHARACTERS,
        }
    }
}

/// The result of one batched extraction call: the provider-built combined
/// context plus one `ContentResult` per requested URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub context: String,
    pub results: Vec<ContentResult>,
}

// --- Generation ---

/// Fully resolved generation parameters sent to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl GenerateOptions {
    /// Applies caller overrides field by field; unspecified fields keep `self`'s values.
    pub fn merged(&self, overrides: Option<&GenerateOverrides>) -> Self {
        let Some(o) = overrides else {
            return self.clone();
        };
        Self {
            model: o.model.clone().unwrap_or_else(|| self.model.clone()),
            temperature: o.temperature.unwrap_or(self.temperature),
            max_tokens: o.max_tokens.unwrap_or(self.max_tokens),
            top_p: o.top_p.unwrap_or(self.top_p),
            top_k: o.top_k.unwrap_or(self.top_k),
        }
    }
}

/// Caller-supplied overrides for `GenerateOptions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOverrides {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub top_k: Option<u32>,
}

// --- Pipeline ---

/// The stages of one insight run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Search,
    Extraction,
    Synthesis,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Search => "search",
            PipelineStage::Extraction => "extraction",
            PipelineStage::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

/// The ephemeral input of `create_insight`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    #[serde(default)]
    pub user_id: String,
    pub prompts: Vec<String>,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub brand_description: String,
    #[serde(default)]
    pub options: Option<GenerateOverrides>,
}

impl InsightRequest {
    pub fn new(
        user_id: impl Into<String>,
        prompts: Vec<String>,
        brand_name: impl Into<String>,
        brand_description: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            prompts,
            brand_name: brand_name.into(),
            brand_description: brand_description.into(),
            options: None,
        }
    }

    /// Checks every field the full pipeline needs. No remote call or write
    /// may happen before this passes.
    pub fn validate(&self) -> Result<(), InsightError> {
        validate_owner_and_prompts(&self.user_id, &self.prompts)?;
        if self.brand_name.trim().is_empty() {
            return Err(InsightError::Validation(
                "brandName is required and must be a non-empty string".to_string(),
            ));
        }
        if self.brand_description.trim().is_empty() {
            return Err(InsightError::Validation(
                "brandDescription is required and must be a non-empty string".to_string(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_owner_and_prompts(
    user_id: &str,
    prompts: &[String],
) -> Result<(), InsightError> {
    if user_id.trim().is_empty() {
        return Err(InsightError::Validation(
            "an owning user id is required".to_string(),
        ));
    }
    if prompts.is_empty() {
        return Err(InsightError::Validation(
            "prompts is required and must be a non-empty array".to_string(),
        ));
    }
    if let Some(position) = prompts.iter().position(|p| p.trim().is_empty()) {
        return Err(InsightError::Validation(format!(
            "prompt at index {position} is empty"
        )));
    }
    Ok(())
}

/// One synthesis outcome. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub prompts: Vec<String>,
    pub search_results: Vec<SearchResult>,
    pub content: Vec<ContentResult>,
    pub context: String,
    pub insights: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// --- Persisted aggregate ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl InsightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightStatus::Pending => "pending",
            InsightStatus::Processing => "processing",
            InsightStatus::Completed => "completed",
            InsightStatus::Failed => "failed",
        }
    }
}

/// The persisted record of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    pub user_id: String,
    pub prompts: Vec<String>,
    pub status: InsightStatus,
    #[serde(default)]
    pub results: Vec<InsightResult>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Insight {
    /// A fresh `pending` stub with a new id.
    pub fn new_pending(user_id: &str, prompts: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            prompts,
            status: InsightStatus::Pending,
            results: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
            success: false,
            error: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = InsightStatus::Processing;
        self.updated_at = Utc::now();
    }

    pub fn mark_completed(&mut self, result: InsightResult) {
        let now = Utc::now();
        self.status = InsightStatus::Completed;
        self.results.push(result);
        self.success = true;
        self.error = None;
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let now = Utc::now();
        self.status = InsightStatus::Failed;
        self.success = false;
        self.error = Some(message.into());
        self.updated_at = now;
        self.completed_at = Some(now);
    }

    /// The list projection without the large `results` field.
    pub fn summary(&self) -> InsightSummary {
        InsightSummary {
            id: self.id.clone(),
            user_id: self.user_id.clone(),
            prompts: self.prompts.clone(),
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
            success: self.success,
            error: self.error.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightSummary {
    pub id: String,
    pub user_id: String,
    pub prompts: Vec<String>,
    pub status: InsightStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
