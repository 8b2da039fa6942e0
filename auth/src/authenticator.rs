use std::sync::Arc;
use std::sync::OnceLock;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::jwt::JwtError;
use crate::jwt::SessionClaims;
use crate::jwt::SessionSubject;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::session::SessionIssuer;
use crate::session::SessionSettings;
use crate::session::SessionValidator;
use crate::session::TokenError;
use crate::session::TokenPair;

/// Plaintext behind the hash used to reject unknown identities.
const UNKNOWN_IDENTITY_PASSWORD: &str = "unknown-identity-placeholder";

/// Authentication coordinator combining password verification, session
/// issuance and token validation.
///
/// Holds one validator per secret so callers never pick the secret by hand:
/// access tokens only validate through [`validate_access_token`], refresh
/// tokens only through [`validate_refresh_token`].
///
/// [`validate_access_token`]: Authenticator::validate_access_token
/// [`validate_refresh_token`]: Authenticator::validate_refresh_token
pub struct Authenticator {
    password_hasher: PasswordHasher,
    issuer: SessionIssuer,
    access_validator: SessionValidator,
    refresh_validator: SessionValidator,
    /// Hashed on first use, then verified against for every unknown identity.
    unknown_identity_hash: OnceLock<String>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator using the wall clock.
    pub fn new(settings: &SessionSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    /// Create an authenticator whose issuer and validators share `clock`.
    pub fn with_clock(settings: &SessionSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            issuer: SessionIssuer::new(settings, Arc::clone(&clock)),
            access_validator: SessionValidator::new(
                settings.access_secret.as_bytes(),
                Arc::clone(&clock),
            ),
            refresh_validator: SessionValidator::new(settings.refresh_secret.as_bytes(), clock),
            unknown_identity_hash: OnceLock::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a session pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `subject` - Identity attributes to embed in both tokens
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash unreadable
    /// * `JwtError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &SessionSubject,
    ) -> Result<TokenPair, AuthenticationError> {
        let is_valid = self.password_hasher.verify(password, stored_hash)?;

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issuer.issue(subject)?)
    }

    /// Reject a login attempt for an identity with no stored hash.
    ///
    /// Still runs one Argon2 verification so the rejection costs the same as
    /// a wrong password for a known identity. Always returns
    /// `InvalidCredentials`.
    pub fn reject_unknown_identity(&self, password: &str) -> AuthenticationError {
        if let Ok(hash) = self.unknown_identity_hash() {
            let _ = self.password_hasher.verify(password, hash);
        }

        AuthenticationError::InvalidCredentials
    }

    fn unknown_identity_hash(&self) -> Result<&str, PasswordError> {
        if let Some(hash) = self.unknown_identity_hash.get() {
            return Ok(hash);
        }

        let hash = self.password_hasher.hash(UNKNOWN_IDENTITY_PASSWORD)?;
        Ok(self.unknown_identity_hash.get_or_init(|| hash))
    }

    /// Issue a session pair without password verification.
    ///
    /// Used by the refresh flow, where the refresh token already proved the
    /// caller's identity.
    pub fn issue(&self, subject: &SessionSubject) -> Result<TokenPair, JwtError> {
        self.issuer.issue(subject)
    }

    /// Validate a token presented as an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.access_validator.validate(token)
    }

    /// Validate a token presented as a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.refresh_validator.validate(token)
    }
}
