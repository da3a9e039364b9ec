//! Handlers for accounts, profiles, preferences and social links.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::accounts::{validate_password, validate_username};
use plotwist_core::enums::ActivityType;
use plotwist_core::error::CoreError;
use plotwist_core::types::DbId;
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::social_link::{SocialLink, UpsertSocialLink};
use plotwist_db::models::user::{
    CreateUser, PublicUser, UpdateProfile, UpsertPreferences, User, UserPreferences,
};
use plotwist_db::pg_errors::{constraint_name, is_unique_violation};
use plotwist_db::repositories::{SocialLinkRepo, UserRepo};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct Availability {
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct SocialLinksRequest {
    pub links: Vec<UpsertSocialLink>,
}

/// Map a unique violation on `users` to the matching domain conflict.
fn account_conflict(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err) {
        match constraint_name(&err) {
            Some("uq_users_email_lower") => CoreError::email_already_registered().into(),
            _ => CoreError::username_already_registered().into(),
        }
    } else {
        AppError::Database(err)
    }
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.validate_email() {
        Ok(())
    } else {
        Err(CoreError::Validation("Invalid email address".into()))
    }
}

// ---------------------------------------------------------------------------
// Sign-up and availability
// ---------------------------------------------------------------------------

/// POST /api/v1/users/create
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<PublicUser>>)> {
    let username = input.username.trim().to_string();
    let email = input.email.trim().to_lowercase();
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&input.password)?;

    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(CoreError::email_already_registered().into());
    }
    if UserRepo::find_by_username(&state.pool, &username).await?.is_some() {
        return Err(CoreError::username_already_registered().into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username,
            email,
            password_hash,
            display_name: input.display_name,
        },
    )
    .await
    .map_err(account_conflict)?;

    activities::record(
        &state.pool,
        CreateActivity::new(user.id, ActivityType::CreateAccount),
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: PublicUser::from(user),
        }),
    ))
}

/// GET /api/v1/users/available-username?username=
pub async fn available_username(
    State(state): State<AppState>,
    Query(params): Query<UsernameQuery>,
) -> AppResult<Json<DataResponse<Availability>>> {
    if UserRepo::find_by_username(&state.pool, params.username.trim())
        .await?
        .is_some()
    {
        return Err(CoreError::username_already_registered().into());
    }
    Ok(Json(DataResponse {
        data: Availability { available: true },
    }))
}

/// GET /api/v1/users/available-email?email=
pub async fn available_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> AppResult<Json<DataResponse<Availability>>> {
    if UserRepo::find_by_email(&state.pool, params.email.trim())
        .await?
        .is_some()
    {
        return Err(CoreError::email_already_registered().into());
    }
    Ok(Json(DataResponse {
        data: Availability { available: true },
    }))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/v1/me
pub async fn me(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<User>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(CoreError::user_not_found)?;
    Ok(Json(DataResponse { data: user }))
}

/// GET /api/v1/users/{username}
pub async fn get_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let user = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(CoreError::user_not_found)?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/user/by/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PublicUser>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::user_not_found)?;
    Ok(Json(DataResponse { data: user.into() }))
}

/// GET /api/v1/users/search?username=
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<UsernameQuery>,
) -> AppResult<Json<DataResponse<Vec<PublicUser>>>> {
    let users = UserRepo::search_by_username(&state.pool, params.username.trim()).await?;
    Ok(Json(DataResponse {
        data: users.into_iter().map(PublicUser::from).collect(),
    }))
}

/// PATCH /api/v1/user
pub async fn update_profile(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(mut input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<User>>> {
    if let Some(username) = input.username.as_mut() {
        *username = username.trim().to_string();
        validate_username(username)?;
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await
        .map_err(account_conflict)?
        .ok_or_else(CoreError::user_not_found)?;
    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/user/password
pub async fn update_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePasswordRequest>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(CoreError::user_not_found)?;

    let valid = verify_password(&input.current_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        return Err(CoreError::invalid_credentials().into());
    }
    validate_password(&input.new_password)?;

    let password_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;
    if !UserRepo::update_password(&state.pool, user.id, &password_hash).await? {
        return Err(CoreError::user_not_found().into());
    }

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(SuccessResponse::ok()))
}

/// DELETE /api/v1/user
pub async fn delete_account(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    if !UserRepo::soft_delete(&state.pool, auth.user_id).await? {
        return Err(CoreError::user_not_found().into());
    }
    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(auth.user_id).await;
    }
    tracing::info!(user_id = %auth.user_id, "Account deleted");
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Preferences and social links
// ---------------------------------------------------------------------------

/// GET /api/v1/user/preferences
pub async fn get_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Option<UserPreferences>>>> {
    let preferences = UserRepo::get_preferences(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: preferences }))
}

/// PATCH /api/v1/user/preferences
pub async fn update_preferences(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpsertPreferences>,
) -> AppResult<Json<DataResponse<UserPreferences>>> {
    let preferences = UserRepo::upsert_preferences(&state.pool, auth.user_id, &input).await?;
    Ok(Json(DataResponse { data: preferences }))
}

/// GET /api/v1/user/social-links
pub async fn get_social_links(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<SocialLink>>>> {
    let links = SocialLinkRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: links }))
}

/// PUT /api/v1/user/social-links
///
/// Links with an empty url are removed.
pub async fn upsert_social_links(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SocialLinksRequest>,
) -> AppResult<Json<DataResponse<Vec<SocialLink>>>> {
    let links = SocialLinkRepo::upsert_many(&state.pool, auth.user_id, &input.links).await?;
    Ok(Json(DataResponse { data: links }))
}
