use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::PasswordService;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/admin/login: credential check against the configured admin
/// account, answered with a bearer token for the dashboard routes.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let admin = state.admin();

    let password_ok =
        PasswordService::verify_password(&request.password, &admin.password_hash)?;
    if request.username != admin.username || !password_ok {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let token = state.jwt_service().create_token(&admin.username)?;
    Ok(Json(LoginResponse { token }))
}
