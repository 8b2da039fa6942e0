use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// Verify credentials and deliver the new session pair as cookies.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<UserData>), ApiError> {
    let outcome = state
        .auth_service
        .login(LoginCommand {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = state.cookies.session_cookies(jar, &outcome.tokens);

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, (&outcome.user).into()),
    ))
}

/// HTTP request body for logging in (raw JSON)
#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
