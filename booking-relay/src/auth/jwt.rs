//! JWT verification
//!
//! Tokens are issued by the Spring backend with a shared HMAC secret. Spring
//! (jjwt) picks HS256/384/512 from the key length, so all three are accepted.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid secret: {0}")]
    InvalidSecret(String),

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Authenticated caller, inserted into request extensions by `require_auth`
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// `sub` claim (Spring puts the account email here)
    pub subject: Option<String>,
    /// Every claim carried by the token
    pub claims: Map<String, Value>,
}

impl AuthUser {
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Name used in audit logs
    pub fn actor(&self) -> &str {
        self.subject.as_deref().unwrap_or("unknown")
    }
}

/// Verifies bearer tokens against the shared secret
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl JwtVerifier {
    /// Build a verifier from the configured secret.
    ///
    /// With `base64 = true` the secret is decoded as standard Base64 first.
    pub fn new(secret: &str, base64: bool, leeway_secs: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret("secret is empty".to_string()));
        }

        let decoding_key = if base64 {
            DecodingKey::from_base64_secret(secret)
                .map_err(|e| JwtError::InvalidSecret(e.to_string()))?
        } else {
            DecodingKey::from_secret(secret.as_bytes())
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = leeway_secs;
        validation.validate_aud = false;
        // `exp` is checked when present but not demanded
        validation.set_required_spec_claims::<&str>(&[]);

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    /// Verify signature and expiry and return the caller's claims
    pub fn verify(&self, token: &str) -> Result<AuthUser, JwtError> {
        let data = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?;

        let claims = data.claims;
        let subject = claims.get("sub").and_then(Value::as_str).map(String::from);
        Ok(AuthUser { subject, claims })
    }
}

/// Extract the token from a `Bearer <token>` header value
///
/// Exactly one space separates scheme and token.
pub fn extract_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

/// Sign a token the way the Spring backend does (local tooling and tests)
pub fn create_token<C: Serialize>(
    claims: &C,
    secret: &[u8],
    algorithm: Algorithm,
) -> Result<String, JwtError> {
    encode(
        &Header::new(algorithm),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| JwtError::GenerationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "vaccination-portal-shared-secret-0123456789";

    fn claims(exp_offset: i64) -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "sub": "staff@clinic.vn",
            "role": "STAFF",
            "iat": now,
            "exp": now + exp_offset,
        })
    }

    #[test]
    fn extract_bearer_accepts_only_bearer_scheme() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("Bearer   abc"), None);
        assert_eq!(extract_bearer("Bearer\tabc"), None);
        assert_eq!(extract_bearer("Bearer"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("bearer abc"), None);
        assert_eq!(extract_bearer("abc.def.ghi"), None);
        assert_eq!(extract_bearer("Bearer a b"), None);
    }

    #[test]
    fn verifies_all_hmac_algorithms() {
        let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
        for alg in ACCEPTED_ALGORITHMS {
            let token = create_token(&claims(3600), SECRET.as_bytes(), alg).unwrap();
            let user = verifier.verify(&token).unwrap();
            assert_eq!(user.subject.as_deref(), Some("staff@clinic.vn"));
            assert_eq!(user.claim("role"), Some(&json!("STAFF")));
            assert_eq!(user.actor(), "staff@clinic.vn");
        }
    }

    #[test]
    fn rejects_wrong_secret() {
        let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
        let token = create_token(&claims(3600), b"another-secret", Algorithm::HS256).unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
        let token = create_token(&claims(-600), SECRET.as_bytes(), Algorithm::HS512).unwrap();
        assert!(matches!(verifier.verify(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn rejects_garbage() {
        let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
        assert!(matches!(
            verifier.verify("not-a-jwt"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn base64_secret_is_decoded() {
        // "spring-base64-secret-for-hs256-signing!!" in standard Base64
        let encoded = "c3ByaW5nLWJhc2U2NC1zZWNyZXQtZm9yLWhzMjU2LXNpZ25pbmchIQ==";
        let raw = b"spring-base64-secret-for-hs256-signing!!";

        let verifier = JwtVerifier::new(encoded, true, 0).unwrap();
        let token = create_token(&claims(3600), raw, Algorithm::HS256).unwrap();
        assert!(verifier.verify(&token).is_ok());

        // same secret used without decoding does not match
        let plain = JwtVerifier::new(encoded, false, 0).unwrap();
        assert!(plain.verify(&token).is_err());
    }

    #[test]
    fn rejects_bad_secrets() {
        assert!(matches!(
            JwtVerifier::new("", false, 0),
            Err(JwtError::InvalidSecret(_))
        ));
        assert!(matches!(
            JwtVerifier::new("%%%not base64%%%", true, 0),
            Err(JwtError::InvalidSecret(_))
        ));
    }

    #[test]
    fn token_without_exp_is_accepted() {
        let verifier = JwtVerifier::new(SECRET, false, 0).unwrap();
        let token = create_token(&json!({"sub": "x"}), SECRET.as_bytes(), Algorithm::HS256).unwrap();
        let user = verifier.verify(&token).unwrap();
        assert_eq!(user.subject.as_deref(), Some("x"));
    }
}
