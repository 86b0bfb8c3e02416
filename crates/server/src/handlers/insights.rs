//! # Insight Handlers
//!
//! The caller-facing operations on insights: running the full pipeline, saving
//! a draft, reading, listing and deleting records. Every handler acts on behalf
//! of the `CallerIdentity` resolved from the request.

use super::{wrap_response, ApiResponse, AppError, AppState, CallerIdentity, DebugParams};
use crate::types::{CreateDraftRequest, CreateInsightRequest, InsightListing, ListInsightsParams};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use brandsight::{Insight, InsightError, InsightRequest};
use serde_json::json;
use tracing::info;

/// Handler for `POST /insights`: runs search, extraction and synthesis and
/// returns the completed record.
pub async fn create_insight_handler(
    State(app_state): State<AppState>,
    caller: CallerIdentity,
    debug_params: Query<DebugParams>,
    Json(payload): Json<CreateInsightRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Insight>>), AppError> {
    info!(
        user_id = %caller.as_str(),
        prompts = payload.prompts.len(),
        brand = %payload.brand_name,
        "Received insight request"
    );

    let pipeline_config = app_state.pipeline.config();
    let debug_info = json!({
        "numResults": pipeline_config.num_results,
        "maxCharacters": pipeline_config.max_characters,
        "searchFailurePolicy": pipeline_config.search_failure_policy,
        "generateOptions": pipeline_config.generate_options.merged(payload.options.as_ref()),
    });

    let request = InsightRequest {
        user_id: caller.0,
        prompts: payload.prompts,
        brand_name: payload.brand_name,
        brand_description: payload.brand_description,
        options: payload.options,
    };
    let insight = app_state.pipeline.create_insight(request).await?;

    Ok((
        StatusCode::CREATED,
        wrap_response(insight, debug_params, Some(debug_info)),
    ))
}

/// Handler for `POST /insights/drafts`: stores a `pending` record without running
/// the pipeline.
pub async fn create_draft_handler(
    State(app_state): State<AppState>,
    caller: CallerIdentity,
    debug_params: Query<DebugParams>,
    Json(payload): Json<CreateDraftRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Insight>>), AppError> {
    info!(user_id = %caller.as_str(), prompts = payload.prompts.len(), "Received draft request");
    let insight = app_state
        .pipeline
        .create_pending_insight(caller.as_str(), payload.prompts)
        .await?;
    Ok((StatusCode::CREATED, wrap_response(insight, debug_params, None)))
}

/// Handler for `GET /insights/{id}`.
///
/// A record owned by someone else is reported exactly like a missing one.
pub async fn get_insight_handler(
    State(app_state): State<AppState>,
    caller: CallerIdentity,
    debug_params: Query<DebugParams>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Insight>>, AppError> {
    let insight = app_state.pipeline.get_insight(&id).await?;
    if insight.user_id != caller.as_str() {
        info!(insight_id = %id, user_id = %caller.as_str(), "Caller does not own insight");
        return Err(InsightError::NotFound(format!("Insight '{id}' not found")).into());
    }
    let debug_info = json!({ "owner": insight.user_id });
    Ok(wrap_response(insight, debug_params, Some(debug_info)))
}

/// Handler for `GET /insights`: newest first, optionally as summaries.
pub async fn list_insights_handler(
    State(app_state): State<AppState>,
    caller: CallerIdentity,
    debug_params: Query<DebugParams>,
    Query(params): Query<ListInsightsParams>,
) -> Result<Json<ApiResponse<InsightListing>>, AppError> {
    let user_id = params
        .user
        .filter(|user| !user.trim().is_empty())
        .unwrap_or(caller.0);
    let summary = params.summary.unwrap_or(false);

    let listing = if summary {
        InsightListing::Summaries(app_state.pipeline.list_insight_summaries(&user_id).await?)
    } else {
        InsightListing::Full(app_state.pipeline.list_insights(&user_id).await?)
    };

    let debug_info = json!({ "user": user_id, "summary": summary });
    Ok(wrap_response(listing, debug_params, Some(debug_info)))
}

/// Handler for `DELETE /insights/{id}` (administrative).
pub async fn delete_insight_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    app_state.pipeline.delete_insight(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
