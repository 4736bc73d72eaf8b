use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::{claims::Identity, jwt::JwtKeys};
use crate::{error::ApiError, state::AppState};

/// Extracts and verifies the bearer token, yielding the caller's identity.
/// Routes without this extractor accept anonymous requests.
pub struct AuthUser(pub Identity);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        // Signature, expiry, and structure failures all collapse into the
        // same rejection; nothing about the cause leaks to the client.
        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized("Invalid or expired token".into())
        })?;

        Ok(AuthUser(Identity::from(claims)))
    }
}
