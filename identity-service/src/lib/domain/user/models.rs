use std::fmt;
use std::str::FromStr;

pub use auth::Role;
use auth::SessionSubject;
pub use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::AuthError;
use crate::user::errors::EmailError;
use crate::user::errors::GenreError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UserIdError;

/// User aggregate entity.
///
/// Holds the credential material (password hash, latest issued token pair)
/// next to the profile. An empty `token`/`refresh_token` means no session
/// has been issued since registration or the last logout.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: EmailAddress,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
    pub password_hash: String,
    pub favourite_genres: Vec<Genre>,
    pub token: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Attributes embedded into newly issued tokens.
    pub fn session_subject(&self) -> SessionSubject {
        SessionSubject {
            user_id: self.id.to_string(),
            email: self.email.as_str().to_string(),
            first_name: self.first_name.as_str().to_string(),
            last_name: self.last_name.as_str().to_string(),
            role: self.role,
        }
    }

    pub fn has_active_session(&self) -> bool {
        !self.token.is_empty() || !self.refresh_token.is_empty()
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser. Used as the
/// login key, so it is unique across users.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name, trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    pub fn new(name: String) -> Result<Self, NameError> {
        let name = name.trim().to_string();
        let length = name.chars().count();

        if length == 0 {
            Err(NameError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of a favourite genre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre(String);

impl Genre {
    const MAX_LENGTH: usize = 100;

    pub fn new(genre: String) -> Result<Self, GenreError> {
        let genre = genre.trim().to_string();
        let length = genre.chars().count();

        if length == 0 {
            Err(GenreError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(GenreError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(genre))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext password accepted at registration.
///
/// Only lives long enough to be hashed. `Debug` never prints the value.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    const MAX_LENGTH: usize = 128;

    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();

        if length == 0 {
            Err(PasswordPolicyError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Command to register a new user with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: Password,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub role: Role,
    pub favourite_genres: Vec<Genre>,
}

/// Raw login credentials.
///
/// The email is left unvalidated: a malformed address fails login exactly
/// like an unknown one.
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Successful login: the stored user and the pair just persisted for it.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub tokens: TokenPair,
}

/// Identity and role attached to a request by the authorization gate.
///
/// Lives only for the duration of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub role: Role,
}

impl AuthenticatedUser {
    /// Reject the caller unless its role covers `required`.
    ///
    /// # Errors
    /// * `Forbidden` - Caller's role is below `required`
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.role.satisfies(required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                required,
                actual: self.role,
            })
        }
    }
}
