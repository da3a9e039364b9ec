//! Handler for `POST /login`.

use axum::extract::State;
use axum::Json;
use plotwist_core::error::CoreError;
use plotwist_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /login`. `login` is an email or a username.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/v1/login
///
/// Exchange credentials for a bearer token. Unknown users and wrong
/// passwords get the same error.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let user = UserRepo::find_by_login(&state.pool, input.login.trim())
        .await?
        .ok_or_else(CoreError::invalid_credentials)?;

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(CoreError::invalid_credentials().into());
    }

    let token = generate_token(user.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Json(DataResponse {
        data: LoginResponse { token },
    }))
}
