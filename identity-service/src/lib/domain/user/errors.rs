use auth::Role;
use auth::RoleError;
use auth::TokenError;
use thiserror::Error;

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for first/last name validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Name must not be empty")]
    Empty,

    #[error("Name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for favourite genre validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenreError {
    #[error("Genre name must not be empty")]
    Empty,

    #[error("Genre name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for plaintext password policy failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password too long: maximum {max} characters")]
    TooLong { max: usize },
}

/// Why a caller could not be authenticated.
///
/// Login failures always use `InvalidCredentials`, whether the email is
/// unknown or the password is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnauthenticatedReason {
    #[error("no session token was presented")]
    MissingToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid token")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("user no longer exists")]
    UnknownUser,
}

impl From<TokenError> for UnauthenticatedReason {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidSignature => UnauthenticatedReason::InvalidSignature,
            TokenError::Expired => UnauthenticatedReason::Expired,
        }
    }
}

/// Top-level error for every authentication and authorization operation
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid user ID: {0}")]
    InvalidUserId(#[from] UserIdError),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid name: {0}")]
    InvalidName(#[from] NameError),

    #[error("Invalid genre: {0}")]
    InvalidGenre(#[from] GenreError),

    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordPolicyError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    // Domain-level errors
    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("Forbidden: requires role {required}, caller has {actual}")]
    Forbidden { required: Role, actual: Role },

    #[error("User not found: {0}")]
    NotFound(String),

    // Infrastructure errors
    #[error("Credential store error: {0}")]
    StoreFailure(String),

    #[error("Token signing failed: {0}")]
    SigningFailure(String),

    #[error("Password hashing failed: {0}")]
    HashingFailure(String),
}

impl AuthError {
    pub fn unauthenticated(reason: UnauthenticatedReason) -> Self {
        AuthError::Unauthenticated(reason)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Unauthenticated(err.into())
    }
}
