//! Handlers for the follow graph.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::enums::ActivityType;
use plotwist_core::error::CoreError;
use plotwist_core::pagination::CursorPage;
use plotwist_core::types::DbId;
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::follow::{Follow, FollowUser};
use plotwist_db::pg_errors::{is_foreign_key_violation, is_unique_violation};
use plotwist_db::repositories::{ActivityRepo, FollowRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::resolve_page;
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub user_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct FollowQuery {
    pub followed_id: DbId,
}

#[derive(Debug, Serialize)]
pub struct FollowStatus {
    pub follow: Option<Follow>,
}

#[derive(Debug, Deserialize)]
pub struct FollowersQuery {
    pub followed_id: DbId,
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct FollowingQuery {
    pub follower_id: DbId,
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
}

/// POST /api/v1/follow
pub async fn follow(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<FollowRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Follow>>)> {
    if input.user_id == auth.user_id {
        return Err(AppError::BadRequest("You cannot follow yourself".into()));
    }

    let follow = FollowRepo::insert(&state.pool, auth.user_id, input.user_id)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::follow_already_exists().into()
            } else if is_foreign_key_violation(&e) {
                CoreError::user_not_found().into()
            } else {
                AppError::Database(e)
            }
        })?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::FollowUser).metadata(json!({
            "follower_id": follow.follower_id,
            "followed_id": follow.followed_id,
        })),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: follow })))
}

/// GET /api/v1/follow?followed_id=
pub async fn get_follow(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FollowQuery>,
) -> AppResult<Json<DataResponse<FollowStatus>>> {
    let follow = FollowRepo::find(&state.pool, auth.user_id, params.followed_id).await?;
    Ok(Json(DataResponse {
        data: FollowStatus { follow },
    }))
}

/// DELETE /api/v1/follow
pub async fn unfollow(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<FollowRequest>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    if !FollowRepo::delete(&state.pool, auth.user_id, input.user_id).await? {
        return Err(CoreError::NotFound("Follow").into());
    }
    ActivityRepo::delete_follow(&state.pool, auth.user_id, auth.user_id, input.user_id).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /api/v1/followers?followed_id=&cursor=&page_size=
pub async fn followers(
    State(state): State<AppState>,
    Query(params): Query<FollowersQuery>,
) -> AppResult<Json<DataResponse<CursorPage<FollowUser>>>> {
    let (cursor, page_size) = resolve_page(params.cursor.as_deref(), params.page_size)?;
    let page = FollowRepo::list_followers(&state.pool, params.followed_id, cursor, page_size).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/following?follower_id=&cursor=&page_size=
pub async fn following(
    State(state): State<AppState>,
    Query(params): Query<FollowingQuery>,
) -> AppResult<Json<DataResponse<CursorPage<FollowUser>>>> {
    let (cursor, page_size) = resolve_page(params.cursor.as_deref(), params.page_size)?;
    let page = FollowRepo::list_following(&state.pool, params.follower_id, cursor, page_size).await?;
    Ok(Json(DataResponse { data: page }))
}
