//! Caller identity extraction for axum.
//!
//! The API gateway validates credentials upstream and forwards the caller
//! identity in the `X-User-ID` header; this service trusts that header and
//! performs no credential validation of its own. The extractor rejects
//! requests where the header is missing or blank with 401.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::session::dto::ErrorResponse;

/// Header carrying the gateway-verified user identifier.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Extractor for the authenticated caller's user id.
///
/// ```text
/// Request → X-User-ID header → UserIdentity(user_id) in the handler
/// ```
#[derive(Debug, Clone)]
pub struct UserIdentity(pub String);

impl UserIdentity {
    /// Returns the user id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match user_id {
            Some(user_id) => Ok(UserIdentity(user_id.to_string())),
            None => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::unauthorized(
                    "X-User-ID header is required (should be added by API Gateway)",
                )),
            )
                .into_response()),
        }
    }
}
