//! # Remote Providers
//!
//! Capability traits for the three black-box services the pipeline talks to
//! (web search, content extraction, text generation) together with their HTTP
//! adapters, and the persistence collaborator for `Insight` records.

pub mod ai;
pub mod db;
pub mod extraction;
pub mod factory;
pub mod search;

use crate::errors::InsightError;
use reqwest::Client as ReqwestClient;
use std::time::Duration;

/// Builds the HTTP client shared by a provider. Every call made through it is
/// bounded by `timeout`; an elapsed timeout surfaces as a provider failure.
pub(crate) fn build_http_client(timeout: Duration) -> Result<ReqwestClient, InsightError> {
    ReqwestClient::builder()
        .timeout(timeout)
        .build()
        .map_err(InsightError::ReqwestClientBuild)
}

/// Turns a transport or decoding failure into a provider error. The request URL
/// is stripped because it can carry credentials.
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> InsightError {
    InsightError::provider(provider, err.without_url().to_string())
}

/// Turns an unreadable response body into a provider error, without the request URL.
pub(crate) fn decode_error(provider: &str, err: reqwest::Error) -> InsightError {
    InsightError::provider(
        provider,
        format!("invalid response: {}", err.without_url()),
    )
}

/// Reads a non-2xx response into a provider error, keeping the status and body.
pub(crate) async fn status_error(provider: &str, response: reqwest::Response) -> InsightError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    InsightError::provider(provider, format!("status {}: {}", status.as_u16(), body))
}
