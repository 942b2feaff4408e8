//! Relay configuration

use std::time::Duration;

use crate::BoxError;

/// Which ledger the relay writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerBackend {
    /// In-process hash-chained ledger (development, tests)
    Memory,
    /// Contract-call gateway over HTTP
    Gateway {
        url: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Relay configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment: development | staging | production
    pub environment: String,
    pub http_host: String,
    pub http_port: u16,
    /// Shared HMAC secret used by the Spring backend to sign tokens
    pub jwt_secret: String,
    /// Treat `jwt_secret` as standard Base64
    pub jwt_secret_base64: bool,
    /// Clock skew tolerance for `exp` / `nbf`
    pub jwt_leeway_secs: u64,
    /// Guard the GET read-throughs as well as the mutations
    pub require_auth_for_reads: bool,
    pub ledger: LedgerBackend,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Enables daily rotated file logs when set
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BoxError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let jwt_secret = match var("JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "development" => "dev-JWT_SECRET-not-for-production".into(),
            None => return Err(format!("JWT_SECRET must be set in {environment} environment").into()),
        };

        let ledger = match var("LEDGER_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => LedgerBackend::Memory,
            "gateway" => LedgerBackend::Gateway {
                url: var("LEDGER_GATEWAY_URL")
                    .ok_or("LEDGER_GATEWAY_URL must be set when LEDGER_BACKEND=gateway")?
                    .trim_end_matches('/')
                    .to_string(),
                api_key: var("LEDGER_API_KEY"),
                timeout: Duration::from_secs(parse_or(var("LEDGER_TIMEOUT_SECS"), "LEDGER_TIMEOUT_SECS", 30)?),
            },
            other => return Err(format!("Unknown LEDGER_BACKEND: {other}").into()),
        };

        let log_format = match var("LOG_FORMAT").as_deref().unwrap_or("text") {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => return Err(format!("Unknown LOG_FORMAT: {other}").into()),
        };

        Ok(Self {
            http_host: var("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            http_port: parse_or(var("HTTP_PORT"), "HTTP_PORT", 5000)?,
            jwt_secret,
            jwt_secret_base64: parse_bool(var("JWT_SECRET_BASE64"), "JWT_SECRET_BASE64", false)?,
            jwt_leeway_secs: parse_or(var("JWT_LEEWAY_SECS"), "JWT_LEEWAY_SECS", 0)?,
            require_auth_for_reads: parse_bool(
                var("REQUIRE_AUTH_FOR_READS"),
                "REQUIRE_AUTH_FOR_READS",
                false,
            )?,
            ledger,
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_format,
            log_dir: var("LOG_DIR"),
            environment,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, name: &str, default: T) -> Result<T, BoxError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| format!("{name} has an invalid value: {v}").into()),
        None => Ok(default),
    }
}

fn parse_bool(value: Option<String>, name: &str, default: bool) -> Result<bool, BoxError> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(format!("{name} must be a boolean, got: {v}").into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, BoxError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn defaults_in_development() {
        let config = load(&[]).unwrap();
        assert!(config.is_development());
        assert_eq!(config.http_port, 5000);
        assert_eq!(config.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.ledger, LedgerBackend::Memory);
        assert!(!config.jwt_secret_base64);
        assert_eq!(config.jwt_leeway_secs, 0);
        assert!(!config.require_auth_for_reads);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn production_requires_secret() {
        let err = load(&[("ENVIRONMENT", "production")]).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));

        let config = load(&[("ENVIRONMENT", "production"), ("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.jwt_secret, "s3cret");
    }

    #[test]
    fn gateway_backend_requires_url() {
        let err = load(&[("LEDGER_BACKEND", "gateway")]).unwrap_err();
        assert!(err.to_string().contains("LEDGER_GATEWAY_URL"));

        let config = load(&[
            ("LEDGER_BACKEND", "gateway"),
            ("LEDGER_GATEWAY_URL", "http://chain:8545/"),
            ("LEDGER_API_KEY", "k"),
            ("LEDGER_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(
            config.ledger,
            LedgerBackend::Gateway {
                url: "http://chain:8545".into(),
                api_key: Some("k".into()),
                timeout: Duration::from_secs(5),
            }
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(load(&[("HTTP_PORT", "eighty")]).is_err());
        assert!(load(&[("JWT_SECRET_BASE64", "maybe")]).is_err());
        assert!(load(&[("LEDGER_BACKEND", "ethereum")]).is_err());
        assert!(load(&[("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn parses_lists_and_flags() {
        let config = load(&[
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://verify.example.org,"),
            ("REQUIRE_AUTH_FOR_READS", "TRUE"),
            ("JWT_SECRET_BASE64", "1"),
            ("LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://verify.example.org"]
        );
        assert!(config.require_auth_for_reads);
        assert!(config.jwt_secret_base64);
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
