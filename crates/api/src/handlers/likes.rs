//! Handlers for likes on reviews, replies and lists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::error::CoreError;
use plotwist_core::types::DbId;
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::like::{CreateLike, Like};
use plotwist_db::models::user::UserSummary;
use plotwist_db::pg_errors::is_unique_violation;
use plotwist_db::repositories::{ActivityRepo, LikeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

/// POST /api/v1/like
pub async fn create_like(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateLike>,
) -> AppResult<(StatusCode, Json<DataResponse<Like>>)> {
    let like = LikeRepo::create(&state.pool, auth.user_id, &input)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::like_already_exists().into()
            } else {
                AppError::Database(e)
            }
        })?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, like.entity_type.like_activity())
            .entity(like.entity_id, Some(like.entity_type)),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: like })))
}

/// DELETE /api/v1/like/{id}
pub async fn delete_like(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    let like = LikeRepo::delete(&state.pool, id, auth.user_id)
        .await?
        .ok_or_else(CoreError::like_not_found)?;

    ActivityRepo::delete_matching(
        &state.pool,
        like.entity_type.like_activity(),
        like.entity_id,
        Some(like.entity_type),
        auth.user_id,
    )
    .await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/v1/likes/{entity_id}
pub async fn list_likes(
    State(state): State<AppState>,
    Path(entity_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserSummary>>>> {
    let users = LikeRepo::list_by_entity(&state.pool, entity_id).await?;
    Ok(Json(DataResponse { data: users }))
}
