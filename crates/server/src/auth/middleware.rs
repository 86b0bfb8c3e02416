//! # Caller Identity
//!
//! Resolves who is making a request. Authentication is handled outside this
//! service; the caller's identifier arrives in the `X-User-Id` header. Requests
//! without one are attributed to the guest identity.

use axum::{extract::FromRequestParts, http::request::Parts};
use brandsight::constants::GUEST_USER_IDENTIFIER;
use std::convert::Infallible;
use tracing::debug;

pub const USER_ID_HEADER: &str = "x-user-id";

/// An Axum extractor that provides the identifier of the calling user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub String);

impl CallerIdentity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user_id {
            Some(user_id) => Ok(CallerIdentity(user_id.to_string())),
            None => {
                debug!("No caller identity supplied; using the guest identity.");
                Ok(CallerIdentity(GUEST_USER_IDENTIFIER.to_string()))
            }
        }
    }
}
