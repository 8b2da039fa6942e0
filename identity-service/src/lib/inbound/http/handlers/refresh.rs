use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::cookies::token_from_jar;
use crate::inbound::http::cookies::REFRESH_TOKEN_COOKIE;
use crate::inbound::http::router::AppState;

/// Rotate the session pair using the `refresh_token` cookie.
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageData>), ApiError> {
    let refresh_token = token_from_jar(&jar, REFRESH_TOKEN_COOKIE)
        .unwrap_or_default()
        .to_string();

    let tokens = state.auth_service.refresh(&refresh_token).await?;

    let jar = state.cookies.session_cookies(jar, &tokens);

    Ok((
        jar,
        ApiSuccess::new(StatusCode::OK, MessageData::new("Tokens refreshed")),
    ))
}
