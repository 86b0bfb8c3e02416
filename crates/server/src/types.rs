use brandsight::{GenerateOverrides, Insight, InsightSummary};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

// --- Insight payloads ---

/// The body of `POST /insights`. Missing fields are left empty and rejected by validation.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateInsightRequest {
    #[serde(default)]
    pub prompts: Vec<String>,
    #[serde(default)]
    pub brand_name: String,
    #[serde(default)]
    pub brand_description: String,
    #[serde(default)]
    pub options: Option<GenerateOverrides>,
}

/// The body of `POST /insights/drafts`.
#[derive(Debug, Deserialize, Default)]
pub struct CreateDraftRequest {
    #[serde(default)]
    pub prompts: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListInsightsParams {
    /// Whose insights to list; defaults to the caller.
    pub user: Option<String>,
    /// Return projections without the result payloads.
    pub summary: Option<bool>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum InsightListing {
    Full(Vec<Insight>),
    Summaries(Vec<InsightSummary>),
}
