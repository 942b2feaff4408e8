//! AuthUser extractor
//!
//! Handlers behind `require_auth` take `AuthUser` as an argument instead of
//! digging through extensions.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use crate::auth::AuthUser;

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(AppError::missing_auth_header)
    }
}
