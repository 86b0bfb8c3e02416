use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use brandsight::InsightError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `brandsight` library.
    Insight(InsightError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<InsightError> for AppError {
    fn from(err: InsightError) -> Self {
        AppError::Insight(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, body) = match self {
            AppError::Insight(err) => {
                error!("InsightError: {:?}", err);
                match err {
                    InsightError::Validation(msg) => {
                        (StatusCode::BAD_REQUEST, json!({ "error": msg }))
                    }
                    InsightError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
                    InsightError::Pipeline {
                        stage,
                        message,
                        insight,
                    } => (
                        StatusCode::BAD_GATEWAY,
                        json!({
                            "error": format!("Insight generation failed during {stage}: {message}"),
                            "insight": insight,
                        }),
                    ),
                    e @ InsightError::ProviderUnavailable { .. } => {
                        (StatusCode::BAD_GATEWAY, json!({ "error": e.to_string() }))
                    }
                    InsightError::MissingApiKey(_) | InsightError::MissingProvider(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": "Server is not configured correctly." }),
                    ),
                    e @ (InsightError::Storage(_)
                    | InsightError::ReqwestClientBuild(_)
                    | InsightError::Regex(_)
                    | InsightError::JsonSerialization(_)) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "error": e.to_string() }),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "An internal server error occurred." }),
                )
            }
        };

        (status_code, Json(body)).into_response()
    }
}
