use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::cookies::token_from_jar;
use crate::inbound::http::cookies::ACCESS_TOKEN_COOKIE;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

/// Middleware that validates the `access_token` cookie and adds the
/// authenticated user to request extensions.
///
/// Role-agnostic: handlers that need a specific role check it themselves.
pub async fn authorize(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let jar = CookieJar::from_headers(req.headers());
    let token = token_from_jar(&jar, ACCESS_TOKEN_COOKIE).unwrap_or_default();

    let actor = state.auth_service.authenticate(token).map_err(|e| {
        tracing::warn!(
            method = %req.method(),
            uri = %req.uri(),
            reason = %e,
            "Request rejected by authorization gate"
        );
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(actor);

    Ok(next.run(req).await)
}
