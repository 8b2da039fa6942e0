use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Genre;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::Role;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::CredentialStore;
use crate::user::errors::AuthError;

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, password_hash, \
     favourite_genres, token, refresh_token, created_at, updated_at";

/// Row shape of the `users` table.
#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    password_hash: String,
    favourite_genres: Vec<String>,
    token: String,
    refresh_token: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AuthError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let corrupt = |field: &str, e: &dyn std::fmt::Display| {
            AuthError::StoreFailure(format!("Stored user {} has invalid {}: {}", row.id, field, e))
        };

        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email.clone()).map_err(|e| corrupt("email", &e))?,
            first_name: PersonName::new(row.first_name.clone())
                .map_err(|e| corrupt("first_name", &e))?,
            last_name: PersonName::new(row.last_name.clone())
                .map_err(|e| corrupt("last_name", &e))?,
            role: row.role.parse::<Role>().map_err(|e| corrupt("role", &e))?,
            password_hash: row.password_hash.clone(),
            favourite_genres: row
                .favourite_genres
                .iter()
                .map(|g| Genre::new(g.clone()).map_err(|e| corrupt("favourite_genres", &e)))
                .collect::<Result<Vec<_>, _>>()?,
            token: row.token.clone(),
            refresh_token: row.refresh_token.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn store_failure(e: sqlx::Error) -> AuthError {
    AuthError::StoreFailure(e.to_string())
}

/// PostgreSQL implementation of the credential store.
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn insert(&self, user: User) -> Result<User, AuthError> {
        let genres: Vec<&str> = user.favourite_genres.iter().map(Genre::as_str).collect();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, password_hash,
                               favourite_genres, token, refresh_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(user.first_name.as_str())
        .bind(user.last_name.as_str())
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .bind(&genres)
        .bind(&user.token)
        .bind(&user.refresh_token)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
                    return AuthError::EmailAlreadyExists(user.email.as_str().to_string());
                }
            }
            store_failure(e)
        })?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(store_failure)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_failure)?;

        row.map(User::try_from).transpose()
    }

    async fn count_by_email(&self, email: &EmailAddress) -> Result<u64, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(store_failure)?;

        Ok(count.max(0) as u64)
    }

    async fn persist_tokens(
        &self,
        id: &UserId,
        access_token: &str,
        refresh_token: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, AuthError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET token = $2, refresh_token = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(access_token)
        .bind(refresh_token)
        .bind(updated_at)
        .execute(&self.pool)
        .await
        .map_err(store_failure)?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_role(
        &self,
        id: &UserId,
        role: Role,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET role = $2, updated_at = $3 WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id.0)
        .bind(role.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_failure)?;

        row.map(User::try_from).transpose()
    }
}
