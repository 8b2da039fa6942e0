use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;

/// Reason a presented token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed, wrong secret, or signed with an unexpected algorithm.
    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,
}

/// Verifies session tokens signed with one designated secret.
///
/// Validation is purely cryptographic and temporal. It does not consult the
/// credential store, so a superseded token keeps validating until it expires.
pub struct SessionValidator {
    handler: JwtHandler,
    clock: Arc<dyn Clock>,
}

impl SessionValidator {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            clock,
        }
    }

    /// Validate `token` and return its claims.
    ///
    /// Decoding (structure, algorithm, signature) comes first; only a token
    /// that decodes is checked for expiry.
    ///
    /// # Errors
    /// * `InvalidSignature` - Decoding or algorithm check failed
    /// * `Expired` - `exp` lies before the current instant
    pub fn validate(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let claims: SessionClaims = self
            .handler
            .decode(token)
            .map_err(|_| TokenError::InvalidSignature)?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
