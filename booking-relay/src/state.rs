//! Application state

use std::sync::Arc;

use crate::BoxError;
use crate::auth::JwtVerifier;
use crate::config::{Config, LedgerBackend};
use crate::ledger::{GatewayLedger, Ledger, MemoryLedger};
use crate::services::BookingService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    jwt: Arc<JwtVerifier>,
    bookings: BookingService,
    /// Guard GET routes as well as mutations
    pub require_auth_for_reads: bool,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, BoxError> {
        let verifier = JwtVerifier::new(
            &config.jwt_secret,
            config.jwt_secret_base64,
            config.jwt_leeway_secs,
        )?;

        let ledger: Arc<dyn Ledger> = match &config.ledger {
            LedgerBackend::Memory => {
                if !config.is_development() {
                    tracing::warn!(
                        "Memory ledger selected outside development; records are lost on restart"
                    );
                }
                Arc::new(MemoryLedger::new())
            }
            LedgerBackend::Gateway {
                url,
                api_key,
                timeout,
            } => Arc::new(GatewayLedger::new(url.clone(), api_key.clone(), *timeout)?),
        };

        tracing::info!(ledger = ledger.name(), "Ledger backend ready");
        Ok(Self::from_parts(verifier, ledger, config.require_auth_for_reads))
    }

    pub fn from_parts(
        verifier: JwtVerifier,
        ledger: Arc<dyn Ledger>,
        require_auth_for_reads: bool,
    ) -> Self {
        Self {
            jwt: Arc::new(verifier),
            bookings: BookingService::new(ledger),
            require_auth_for_reads,
        }
    }

    pub fn jwt(&self) -> &JwtVerifier {
        &self.jwt
    }

    pub fn bookings(&self) -> &BookingService {
        &self.bookings
    }
}
