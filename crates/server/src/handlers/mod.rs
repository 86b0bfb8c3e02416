//! # API Route Handlers
//!
//! This module organizes all the Axum route handlers for the `brandsight-server`.

pub mod general;
pub mod insights;

pub use general::*;
pub use insights::*;

// Shared items used by multiple handler modules.
use super::{
    auth::CallerIdentity,
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;

/// A shared helper function to wrap a successful result in the standard `ApiResponse`
/// format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
