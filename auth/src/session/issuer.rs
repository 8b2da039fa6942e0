use std::sync::Arc;

use chrono::Duration;

use crate::clock::Clock;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::SessionClaims;
use crate::jwt::SessionSubject;
use crate::session::settings::SessionSettings;

/// Access token lifetime.
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Refresh token lifetime (7 days).
pub const REFRESH_TOKEN_TTL_HOURS: i64 = 24 * 7;

/// Freshly minted access/refresh pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Mints access/refresh pairs, each signed with its own secret.
///
/// Issuance is pure: storing the pair is the caller's job, so a signing
/// failure and a persistence failure surface separately.
pub struct SessionIssuer {
    access: JwtHandler,
    refresh: JwtHandler,
    issuer: String,
    clock: Arc<dyn Clock>,
}

impl SessionIssuer {
    pub fn new(settings: &SessionSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: JwtHandler::new(settings.access_secret.as_bytes()),
            refresh: JwtHandler::new(settings.refresh_secret.as_bytes()),
            issuer: settings.issuer.clone(),
            clock,
        }
    }

    /// Issue a new pair for `subject`.
    ///
    /// Both tokens share the same `iat`; the access token lives
    /// [`ACCESS_TOKEN_TTL_HOURS`], the refresh token [`REFRESH_TOKEN_TTL_HOURS`].
    ///
    /// # Errors
    /// * `EncodingFailed` - Signing key or algorithm misconfiguration
    pub fn issue(&self, subject: &SessionSubject) -> Result<TokenPair, JwtError> {
        let issued_at = self.clock.now();

        let access_claims = SessionClaims::for_subject(
            subject,
            &self.issuer,
            issued_at,
            Duration::hours(ACCESS_TOKEN_TTL_HOURS),
        );
        let refresh_claims = SessionClaims::for_subject(
            subject,
            &self.issuer,
            issued_at,
            Duration::hours(REFRESH_TOKEN_TTL_HOURS),
        );

        Ok(TokenPair {
            access_token: self.access.encode(&access_claims)?,
            refresh_token: self.refresh.encode(&refresh_claims)?,
        })
    }
}
