use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::Clock;
use auth::SystemClock;

use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::LoginOutcome;
use crate::domain::user::models::Password;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Role;
use crate::domain::user::models::TokenPair;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::AuthError;
use crate::user::errors::UnauthenticatedReason;
use crate::user::ports::AuthServicePort;
use crate::user::ports::CredentialStore;

/// Default deadline for a single credential store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Domain service implementation for session operations.
///
/// Concrete implementation of AuthServicePort with dependency injection.
/// Store calls are bounded by a deadline and never retried; password hashing
/// runs on the blocking thread pool.
pub struct AuthService<CS>
where
    CS: CredentialStore,
{
    store: Arc<CS>,
    authenticator: Arc<Authenticator>,
    clock: Arc<dyn Clock>,
    store_timeout: Duration,
}

impl<CS> AuthService<CS>
where
    CS: CredentialStore,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential store implementation
    /// * `authenticator` - Hasher, issuer and validators configured with the signing secrets
    pub fn new(store: Arc<CS>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            store,
            authenticator,
            clock: Arc::new(SystemClock),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Use `clock` for record timestamps. Should be the authenticator's clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    async fn within_deadline<T, F>(&self, operation: &'static str, call: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Credential store call timed out"
                );
                Err(AuthError::StoreFailure(format!(
                    "{} timed out after {:?}",
                    operation, self.store_timeout
                )))
            }
        }
    }

    async fn hash_password(&self, password: Password) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(password.expose()))
            .await
            .map_err(|e| AuthError::HashingFailure(e.to_string()))?
            .map_err(|e| AuthError::HashingFailure(e.to_string()))
    }

    /// Spend one Argon2 verification before rejecting, so a login for an
    /// unregistered email takes as long as a wrong password.
    async fn reject_login(&self, password: String) -> AuthError {
        let authenticator = Arc::clone(&self.authenticator);
        let _ = tokio::task::spawn_blocking(move || {
            authenticator.reject_unknown_identity(&password)
        })
        .await;

        AuthError::unauthenticated(UnauthenticatedReason::InvalidCredentials)
    }

    async fn persist(&self, user_id: &UserId, tokens: &TokenPair) -> Result<bool, AuthError> {
        self.within_deadline(
            "persist_tokens",
            self.store.persist_tokens(
                user_id,
                &tokens.access_token,
                &tokens.refresh_token,
                self.clock.now(),
            ),
        )
        .await
    }
}

#[async_trait]
impl<CS> AuthServicePort for AuthService<CS>
where
    CS: CredentialStore,
{
    async fn register(&self, command: RegisterCommand) -> Result<User, AuthError> {
        let existing = self
            .within_deadline("count_by_email", self.store.count_by_email(&command.email))
            .await?;
        if existing > 0 {
            tracing::warn!(email = %command.email, "Registration rejected: email already exists");
            return Err(AuthError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password).await?;

        let now = self.clock.now();
        let user = User {
            id: UserId::new(),
            email: command.email,
            first_name: command.first_name,
            last_name: command.last_name,
            role: command.role,
            password_hash,
            favourite_genres: command.favourite_genres,
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
        };

        let created_user = self
            .within_deadline("insert", self.store.insert(user))
            .await?;

        tracing::info!(
            user_id = %created_user.id,
            role = %created_user.role,
            "User registered"
        );

        Ok(created_user)
    }

    async fn login(&self, command: LoginCommand) -> Result<LoginOutcome, AuthError> {
        let invalid_credentials =
            || AuthError::unauthenticated(UnauthenticatedReason::InvalidCredentials);

        let Ok(email) = EmailAddress::new(command.email) else {
            tracing::warn!("Login rejected: malformed email");
            return Err(self.reject_login(command.password).await);
        };

        let Some(mut user) = self
            .within_deadline("find_by_email", self.store.find_by_email(&email))
            .await?
        else {
            tracing::warn!(email = %email, "Login rejected");
            return Err(self.reject_login(command.password).await);
        };

        let authenticator = Arc::clone(&self.authenticator);
        let subject = user.session_subject();
        let stored_hash = user.password_hash.clone();
        let password = command.password;

        let tokens = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &stored_hash, &subject)
        })
        .await
        .map_err(|e| AuthError::HashingFailure(e.to_string()))?
        .map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(email = %email, "Login rejected");
                invalid_credentials()
            }
            AuthenticationError::PasswordError(err) => {
                tracing::error!(user_id = %user.id, error = %err, "Stored password hash unusable");
                AuthError::HashingFailure(err.to_string())
            }
            AuthenticationError::JwtError(err) => AuthError::SigningFailure(err.to_string()),
        })?;

        if !self.persist(&user.id, &tokens).await? {
            tracing::warn!(user_id = %user.id, "Login rejected: record vanished before persist");
            return Err(AuthError::unauthenticated(UnauthenticatedReason::UnknownUser));
        }

        user.token = tokens.access_token.clone();
        user.refresh_token = tokens.refresh_token.clone();
        user.updated_at = self.clock.now();

        tracing::info!(user_id = %user.id, role = %user.role, "Session issued");

        Ok(LoginOutcome { user, tokens })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        if refresh_token.is_empty() {
            return Err(AuthError::unauthenticated(
                UnauthenticatedReason::MissingToken,
            ));
        }

        let claims = self
            .authenticator
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!(reason = %e, "Refresh token rejected");
                AuthError::from(e)
            })?;

        let unknown_user = || AuthError::unauthenticated(UnauthenticatedReason::UnknownUser);

        let user_id = UserId::from_string(&claims.user_id).map_err(|_| unknown_user())?;

        // Mint from the stored record so role or name changes since the
        // original login are reflected.
        let user = self
            .within_deadline("find_by_id", self.store.find_by_id(&user_id))
            .await?
            .ok_or_else(|| {
                tracing::warn!(user_id = %user_id, "Refresh rejected: user no longer exists");
                unknown_user()
            })?;

        let tokens = self
            .authenticator
            .issue(&user.session_subject())
            .map_err(|e| AuthError::SigningFailure(e.to_string()))?;

        if !self.persist(&user.id, &tokens).await? {
            return Err(unknown_user());
        }

        tracing::info!(user_id = %user.id, role = %user.role, "Session refreshed");

        Ok(tokens)
    }

    async fn logout(&self, user_id: &UserId) -> Result<(), AuthError> {
        let cleared = TokenPair {
            access_token: String::new(),
            refresh_token: String::new(),
        };

        if self.persist(user_id, &cleared).await? {
            tracing::info!(user_id = %user_id, "Session cleared");
        } else {
            tracing::debug!(user_id = %user_id, "Logout for unknown user ignored");
        }

        Ok(())
    }

    fn authenticate(&self, access_token: &str) -> Result<AuthenticatedUser, AuthError> {
        if access_token.is_empty() {
            return Err(AuthError::unauthenticated(
                UnauthenticatedReason::MissingToken,
            ));
        }

        let claims = self.authenticator.validate_access_token(access_token)?;

        let user_id = UserId::from_string(&claims.user_id)
            .map_err(|_| AuthError::unauthenticated(UnauthenticatedReason::InvalidSignature))?;

        Ok(AuthenticatedUser {
            user_id,
            role: claims.role,
        })
    }

    async fn get_user(&self, actor: &AuthenticatedUser) -> Result<User, AuthError> {
        self.within_deadline("find_by_id", self.store.find_by_id(&actor.user_id))
            .await?
            .ok_or(AuthError::unauthenticated(
                UnauthenticatedReason::UnknownUser,
            ))
    }

    async fn change_role(
        &self,
        actor: &AuthenticatedUser,
        target: &UserId,
        role: Role,
    ) -> Result<User, AuthError> {
        actor.require_role(Role::Admin).map_err(|e| {
            tracing::warn!(
                user_id = %actor.user_id,
                role = %actor.role,
                "Role change refused"
            );
            e
        })?;

        let updated_user = self
            .within_deadline(
                "update_role",
                self.store.update_role(target, role, self.clock.now()),
            )
            .await?
            .ok_or_else(|| AuthError::NotFound(target.to_string()))?;

        tracing::info!(
            actor = %actor.user_id,
            user_id = %updated_user.id,
            role = %updated_user.role,
            "Role changed"
        );

        Ok(updated_user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use auth::SessionSettings;
    use chrono::DateTime;
    use chrono::Utc;
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::PersonName;

    const ACCESS_SECRET: &str = "test-access-secret-at-least-32-bytes-long";
    const REFRESH_SECRET: &str = "test-refresh-secret-at-least-32-bytes-long";

    // Define mocks in the test module using mockall
    mock! {
        pub TestCredentialStore {}

        #[async_trait]
        impl CredentialStore for TestCredentialStore {
            async fn insert(&self, user: User) -> Result<User, AuthError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError>;
            async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError>;
            async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, AuthError>;
            async fn persist_tokens(
                &self,
                id: &UserId,
                access_token: &str,
                refresh_token: &str,
                updated_at: DateTime<Utc>,
            ) -> Result<bool, AuthError>;
            async fn update_role(
                &self,
                id: &UserId,
                role: Role,
                updated_at: DateTime<Utc>,
            ) -> Result<Option<User>, AuthError>;
        }
    }

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(&SessionSettings::new(
            ACCESS_SECRET,
            REFRESH_SECRET,
        )))
    }

    fn stored_user(password: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            first_name: PersonName::new("Ana".to_string()).unwrap(),
            last_name: PersonName::new("Gomez".to_string()).unwrap(),
            role,
            password_hash: auth::PasswordHasher::new().hash(password).unwrap(),
            favourite_genres: vec![],
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn register_command() -> RegisterCommand {
        RegisterCommand {
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password: Password::new("secret1".to_string()).unwrap(),
            first_name: PersonName::new("Ana".to_string()).unwrap(),
            last_name: PersonName::new("Gomez".to_string()).unwrap(),
            role: Role::User,
            favourite_genres: vec![],
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_count_by_email()
            .times(1)
            .returning(|_| Ok(0));
        store
            .expect_insert()
            .withf(|user| {
                user.email.as_str() == "a@x.com"
                    && user.role == Role::User
                    && user.password_hash.starts_with("$argon2id")
                    && user.token.is_empty()
                    && user.refresh_token.is_empty()
            })
            .times(1)
            .returning(|user| Ok(user));

        let service = AuthService::new(Arc::new(store), authenticator());

        let user = service
            .register(register_command())
            .await
            .expect("Registration failed");
        assert_eq!(user.email.as_str(), "a@x.com");
        assert!(auth::PasswordHasher::new()
            .verify("secret1", &user.password_hash)
            .unwrap());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut store = MockTestCredentialStore::new();

        store
            .expect_count_by_email()
            .times(1)
            .returning(|_| Ok(1));
        store.expect_insert().times(0);

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service.register(register_command()).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_success_persists_pair() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);
        let user_id = user.id;

        let found = user.clone();
        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));
        store
            .expect_persist_tokens()
            .withf(move |id, access, refresh, _| {
                *id == user_id && !access.is_empty() && !refresh.is_empty() && access != refresh
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let service = AuthService::new(Arc::new(store), authenticator());

        let outcome = service
            .login(LoginCommand {
                email: "a@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .expect("Login failed");

        assert_eq!(outcome.user.id, user_id);
        assert_eq!(outcome.user.token, outcome.tokens.access_token);

        let context = service
            .authenticate(&outcome.tokens.access_token)
            .expect("Issued access token should authenticate");
        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);

        store
            .expect_find_by_email()
            .withf(|email| email.as_str() == "a@x.com")
            .returning(move |_| Ok(Some(user.clone())));
        store
            .expect_find_by_email()
            .returning(|_| Ok(None));
        store.expect_persist_tokens().times(0);

        let service = AuthService::new(Arc::new(store), authenticator());

        let wrong_password = service
            .login(LoginCommand {
                email: "a@x.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginCommand {
                email: "nobody@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();
        let malformed_email = service
            .login(LoginCommand {
                email: "not an email".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        for err in [&wrong_password, &unknown_email, &malformed_email] {
            assert!(matches!(
                err,
                AuthError::Unauthenticated(UnauthenticatedReason::InvalidCredentials)
            ));
        }
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_record_deleted_before_persist() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);

        store
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        // Row removed between lookup and the token write
        store
            .expect_persist_tokens()
            .times(1)
            .returning(|_, _, _, _| Ok(false));

        let service = AuthService::new(Arc::new(store), authenticator());

        let result = service
            .login(LoginCommand {
                email: "a@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await;
        assert!(matches!(
            result,
            Err(AuthError::Unauthenticated(UnauthenticatedReason::UnknownUser))
        ));
    }

    #[tokio::test]
    async fn test_refresh_uses_current_role() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);
        let user_id = user.id;

        let authenticator = authenticator();
        let original = authenticator.issue(&user.session_subject()).unwrap();

        // Promoted after the original pair was issued
        let mut promoted = user.clone();
        promoted.role = Role::Admin;

        store
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(promoted.clone())));
        store
            .expect_persist_tokens()
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let service = AuthService::new(Arc::new(store), Arc::clone(&authenticator));

        let tokens = service
            .refresh(&original.refresh_token)
            .await
            .expect("Refresh failed");

        let claims = authenticator
            .validate_access_token(&tokens.access_token)
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_ne!(tokens.refresh_token, original.refresh_token);
    }

    #[tokio::test]
    async fn test_refresh_unknown_user() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);
        let authenticator = authenticator();
        let original = authenticator.issue(&user.session_subject()).unwrap();

        store.expect_find_by_id().times(1).returning(|_| Ok(None));
        store.expect_persist_tokens().times(0);

        let service = AuthService::new(Arc::new(store), authenticator);

        let result = service.refresh(&original.refresh_token).await;
        assert!(matches!(
            result,
            Err(AuthError::Unauthenticated(UnauthenticatedReason::UnknownUser))
        ));
    }

    #[tokio::test]
    async fn test_refresh_rejects_access_token() {
        let mut store = MockTestCredentialStore::new();
        let user = stored_user("secret1", Role::User);
        let authenticator = authenticator();
        let original = authenticator.issue(&user.session_subject()).unwrap();

        store.expect_find_by_id().times(0);

        let service = AuthService::new(Arc::new(store), authenticator);

        let result = service.refresh(&original.access_token).await;
        assert!(matches!(
            result,
            Err(AuthError::Unauthenticated(UnauthenticatedReason::InvalidSignature))
        ));

        let result = service.refresh("").await;
        assert!(matches!(
            result,
            Err(AuthError::Unauthenticated(UnauthenticatedReason::MissingToken))
        ));
    }

    #[tokio::test]
    async fn test_logout_clears_tokens() {
        let mut store = MockTestCredentialStore::new();
        let user_id = UserId::new();

        store
            .expect_persist_tokens()
            .withf(move |id, access, refresh, _| {
                *id == user_id && access.is_empty() && refresh.is_empty()
            })
            .times(1)
            .returning(|_, _, _, _| Ok(true));

        let service = AuthService::new(Arc::new(store), authenticator());

        assert!(service.logout(&user_id).await.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_missing_token() {
        let store = MockTestCredentialStore::new();
        let service = AuthService::new(Arc::new(store), authenticator());

        assert!(matches!(
            service.authenticate(""),
            Err(AuthError::Unauthenticated(UnauthenticatedReason::MissingToken))
        ));
        assert!(matches!(
            service.authenticate("garbage"),
            Err(AuthError::Unauthenticated(UnauthenticatedReason::InvalidSignature))
        ));
    }

    #[tokio::test]
    async fn test_change_role_requires_admin() {
        let mut store = MockTestCredentialStore::new();
        let target = stored_user("secret1", Role::User);
        let target_id = target.id;

        store
            .expect_update_role()
            .withf(move |id, role, _| *id == target_id && *role == Role::Admin)
            .times(1)
            .returning(move |_, role, _| {
                let mut updated = target.clone();
                updated.role = role;
                Ok(Some(updated))
            });

        let service = AuthService::new(Arc::new(store), authenticator());

        let user_actor = AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::User,
        };
        let result = service
            .change_role(&user_actor, &target_id, Role::Admin)
            .await;
        assert!(matches!(result, Err(AuthError::Forbidden { .. })));

        let admin_actor = AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::Admin,
        };
        let updated = service
            .change_role(&admin_actor, &target_id, Role::Admin)
            .await
            .expect("Admin should change roles");
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_change_role_unknown_target() {
        let mut store = MockTestCredentialStore::new();
        store
            .expect_update_role()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let service = AuthService::new(Arc::new(store), authenticator());
        let admin_actor = AuthenticatedUser {
            user_id: UserId::new(),
            role: Role::Admin,
        };

        let result = service
            .change_role(&admin_actor, &UserId::new(), Role::User)
            .await;
        assert!(matches!(result, Err(AuthError::NotFound(_))));
    }

    /// Store whose lookups never answer in time.
    struct StalledStore {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl CredentialStore for StalledStore {
        async fn insert(&self, user: User) -> Result<User, AuthError> {
            Ok(user)
        }

        async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, AuthError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &EmailAddress) -> Result<Option<User>, AuthError> {
            *self.calls.lock().unwrap() += 1;
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(None)
        }

        async fn count_by_email(&self, _email: &EmailAddress) -> Result<u64, AuthError> {
            Ok(0)
        }

        async fn persist_tokens(
            &self,
            _id: &UserId,
            _access_token: &str,
            _refresh_token: &str,
            _updated_at: DateTime<Utc>,
        ) -> Result<bool, AuthError> {
            Ok(true)
        }

        async fn update_role(
            &self,
            _id: &UserId,
            _role: Role,
            _updated_at: DateTime<Utc>,
        ) -> Result<Option<User>, AuthError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_store_timeout_is_store_failure() {
        let store = Arc::new(StalledStore {
            calls: Mutex::new(0),
        });
        let service = AuthService::new(Arc::clone(&store), authenticator())
            .with_store_timeout(Duration::from_millis(50));

        let result = service
            .login(LoginCommand {
                email: "a@x.com".to_string(),
                password: "secret1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AuthError::StoreFailure(_))));
        // Not retried
        assert_eq!(*store.calls.lock().unwrap(), 1);
    }
}
