//! Session credential library
//!
//! Provides the building blocks behind login, refresh and request gating:
//! - Password hashing (Argon2id)
//! - Signed session tokens (HS256 JWT) with a closed role set
//! - Session issuance (access + refresh pair) and validation
//! - Authentication coordination
//!
//! Nothing here performs I/O. Persisting the issued pair and resolving
//! identities is left to the service that owns the credential store.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Issuing and validating a session
//! ```
//! use auth::{Authenticator, Role, SessionSettings, SessionSubject};
//!
//! let settings = SessionSettings::new(
//!     "access_secret_key_at_least_32_bytes!",
//!     "refresh_secret_key_at_least_32_bytes",
//! );
//! let authenticator = Authenticator::new(&settings);
//!
//! let subject = SessionSubject {
//!     user_id: "user123".to_string(),
//!     email: "alice@example.com".to_string(),
//!     first_name: "Alice".to_string(),
//!     last_name: "Liddell".to_string(),
//!     role: Role::User,
//! };
//! let pair = authenticator.issue(&subject).unwrap();
//!
//! let claims = authenticator.validate_access_token(&pair.access_token).unwrap();
//! assert_eq!(claims.user_id, "user123");
//! assert!(authenticator.validate_access_token(&pair.refresh_token).is_err());
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;
pub mod role;
pub mod session;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::SystemClock;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SessionClaims;
pub use jwt::SessionSubject;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use role::Role;
pub use role::RoleError;
pub use session::SessionIssuer;
pub use session::SessionSettings;
pub use session::SessionValidator;
pub use session::TokenError;
pub use session::TokenPair;
pub use session::ACCESS_TOKEN_TTL_HOURS;
pub use session::REFRESH_TOKEN_TTL_HOURS;
