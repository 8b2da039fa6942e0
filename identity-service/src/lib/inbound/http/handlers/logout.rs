use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::MessageData;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn logout(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<MessageData>), ApiError> {
    state.auth_service.logout(&actor.user_id).await?;

    Ok((
        state.cookies.cleared_cookies(jar),
        ApiSuccess::new(StatusCode::OK, MessageData::new("Logged out")),
    ))
}
