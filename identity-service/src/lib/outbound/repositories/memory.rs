use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::user::errors::AuthError;

/// Process-local credential store.
///
/// Used by the test harness and for running the service without PostgreSQL.
/// Email uniqueness is enforced under the write lock, so concurrent inserts
/// of the same address cannot both succeed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn insert(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        if users.values().any(|existing| existing.email == user.email) {
            return Err(AuthError::EmailAlreadyExists(
                user.email.as_str().to_string(),
            ));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| &user.email == email)
            .cloned())
    }

    async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, AuthError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|user| &user.email == email)
            .count() as u64)
    }

    async fn persist_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        match self.users.write().await.get_mut(id) {
            Some(user) => {
                user.token = access_token.to_string();
                user.refresh_token = refresh_token.to_string();
                user.updated_at = updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError> {
        Ok(self.users.write().await.get_mut(id).map(|user| {
            user.role = role;
            user.updated_at = updated_at;
            user.clone()
        }))
    }
}
