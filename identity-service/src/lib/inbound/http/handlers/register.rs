use std::fmt;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Genre;
use crate::domain::user::models::Password;
use crate::domain::user::models::PersonName;
use crate::domain::user::models::RegisterCommand;
use crate::domain::user::models::Role;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::CREATED, user.into()))
}

/// HTTP request body for registering a user (raw JSON)
#[derive(Deserialize)]
pub struct RegisterRequest {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    role: Option<String>,
    #[serde(default)]
    favourite_genres: Vec<String>,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("role", &self.role)
            .field("favourite_genres", &self.favourite_genres)
            .finish()
    }
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, AuthError> {
        // Validation happens here - errors are automatically converted via #[from]
        let role = self
            .role
            .map(|role| role.parse::<Role>())
            .transpose()?
            .unwrap_or_default();

        let favourite_genres = self
            .favourite_genres
            .into_iter()
            .map(Genre::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RegisterCommand {
            email: EmailAddress::new(self.email)?,
            password: Password::new(self.password)?,
            first_name: PersonName::new(self.first_name)?,
            last_name: PersonName::new(self.last_name)?,
            role,
            favourite_genres,
        })
    }
}
