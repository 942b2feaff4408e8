//! Bearer-token authentication for the relay API

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{AuthUser, JwtError, JwtVerifier, create_token, extract_bearer};
pub use middleware::require_auth;
