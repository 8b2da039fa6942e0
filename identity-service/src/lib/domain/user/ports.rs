use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::TokenPair;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;

/// Port for authentication and authorization operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity.
    ///
    /// # Arguments
    /// * `command` - Validated email, password, names, role and genres
    ///
    /// # Returns
    /// Created user entity (no session issued yet)
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `HashingFailure` - Password could not be hashed
    /// * `StoreFailure` - Credential store failed or timed out
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError>;

    /// Verify credentials, mint a fresh pair and persist it.
    ///
    /// # Returns
    /// Stored user and the issued token pair
    ///
    /// # Errors
    /// * `Unauthenticated(InvalidCredentials)` - Unknown email or wrong password
    /// * `SigningFailure` - Tokens could not be signed
    /// * `StoreFailure` - Credential store failed or timed out
    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError>;

    /// Exchange a refresh token for a new pair minted from the current
    /// stored attributes of its identity.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token missing, invalid, expired, or identity gone
    /// * `SigningFailure` - Tokens could not be signed
    /// * `StoreFailure` - Credential store failed or timed out
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Clear the stored token pair of `user_id`.
    ///
    /// Tokens already handed out stay cryptographically valid until they expire.
    ///
    /// # Errors
    /// * `StoreFailure` - Credential store failed or timed out
    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError>;

    /// Resolve an access token into the request's authenticated context.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token missing, invalid, or expired
    fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError>;

    /// Fetch the stored record of the authenticated caller.
    ///
    /// # Errors
    /// * `Unauthenticated(UnknownUser)` - Caller's identity no longer exists
    /// * `StoreFailure` - Credential store failed or timed out
    async fn get_user(&self, actor: &AuthenticatedUser) -> Result<User, AuthError>;

    /// Change the role of `target`. Requires an `ADMIN` caller.
    ///
    /// Takes effect in tokens issued from the next login or refresh onward.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not an admin
    /// * `NotFound` - Target does not exist
    /// * `StoreFailure` - Credential store failed or timed out
    async fn change_role(
        &self,
        actor: &AuthenticatedUser,
        target: &UserId,
        role: Role,
    ) -> Result<User, AuthError>;
}

/// Persistence operations for user credentials.
///
/// Every method touches a single record. Writes are unconditional, so two
/// concurrent writers for the same user resolve as last-writer-wins.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `StoreFailure` - Storage operation failed
    async fn insert(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;

    /// Count users registered with `email` (0 or 1).
    async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, AuthError>;

    /// Overwrite the stored token pair and stamp `updated_at`.
    ///
    /// Only the two token fields and the timestamp change.
    ///
    /// # Returns
    /// Whether a user with `id` existed
    async fn persist_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AuthError>;

    /// Overwrite the role and stamp `updated_at`.
    ///
    /// # Returns
    /// Updated user entity (None if not found)
    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError>;
}
