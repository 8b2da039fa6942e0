use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::AuthenticatedUser;
use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::AuthError;

/// HTTP request body for changing a role (raw JSON)
#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

pub async fn change_role(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(user_id): Path<String>,
    Json(body): Json<ChangeRoleRequest>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let target = UserId::from_string(&user_id).map_err(AuthError::from)?;
    let role = body.role.parse::<Role>().map_err(AuthError::from)?;

    state
        .auth_service
        .change_role(&actor, &target, role)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}
