use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::role::Role;

/// Issuer label stamped into every session token by default.
pub const DEFAULT_ISSUER: &str = "PeliculApp";

/// Public attributes of an identity that end up inside a session token.
///
/// Built from the stored user record at the moment of issuance, never from a
/// previously decoded token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSubject {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// Claim set carried by access and refresh tokens.
///
/// `iat` and `exp` are Unix timestamps in seconds. `jti` is random per token
/// so two pairs minted in the same second still differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub user_id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl SessionClaims {
    /// Create claims for `subject` valid from `issued_at` for `lifetime`.
    pub fn for_subject(
        subject: &SessionSubject,
        issuer: &str,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        let expiration = issued_at + lifetime;

        Self {
            email: subject.email.clone(),
            first_name: subject.first_name.clone(),
            last_name: subject.last_name.clone(),
            role: subject.role,
            user_id: subject.user_id.clone(),
            iss: issuer.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token is still valid during the exact second of its expiry.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
