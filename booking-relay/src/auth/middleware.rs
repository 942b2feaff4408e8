//! Authentication middleware
//!
//! Reads `Authorization: Bearer <token>`, verifies it and injects the
//! [`AuthUser`] into the request extensions.
//!
//! | Failure | Response |
//! |---------|----------|
//! | no Authorization header | 401 `Missing Authorization header` |
//! | header is not `Bearer <token>` | 401 `Invalid Authorization header format` |
//! | bad signature, expired, malformed | 401 `Invalid or expired token` |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::AppError;

use crate::auth::{JwtError, extract_bearer};
use crate::security_log;
use crate::state::AppState;

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS preflight never carries credentials
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(header) = req.headers().get(http::header::AUTHORIZATION) else {
        security_log!(WARN, "auth_missing", uri = %req.uri());
        return Err(AppError::missing_auth_header());
    };

    let Some(token) = header.to_str().ok().and_then(extract_bearer) else {
        security_log!(WARN, "auth_malformed_header", uri = %req.uri());
        return Err(AppError::invalid_auth_header());
    };

    match state.jwt().verify(token) {
        Ok(user) => {
            tracing::debug!(subject = user.actor(), "Request authenticated");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
            let err = match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token(),
            };
            Err(err.with_cause(e))
        }
    }
}
