//! Handlers for activity feeds.

use axum::extract::{Path, Query, State};
use axum::Json;
use plotwist_core::enums::Language;
use plotwist_core::error::CoreError;
use plotwist_core::pagination::CursorPage;
use plotwist_core::types::DbId;
use plotwist_db::models::activity::ActivityFeedItem;
use plotwist_db::repositories::{ActivityRepo, FollowRepo};
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::resolve_page;
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
    pub language: Option<Language>,
}

async fn feed(
    state: &AppState,
    user_ids: &[DbId],
    params: &FeedQuery,
) -> AppResult<CursorPage<ActivityFeedItem>> {
    let (cursor, page_size) = resolve_page(params.cursor.as_deref(), params.page_size)?;
    let mut page = ActivityRepo::list(&state.pool, Some(user_ids), cursor, page_size).await?;
    activities::enrich(
        state.metadata.as_ref(),
        &mut page.items,
        params.language.unwrap_or_default(),
    )
    .await;
    Ok(page)
}

/// GET /api/v1/user/{id}/activities?cursor=&page_size=
pub async fn user_activities(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<DataResponse<CursorPage<ActivityFeedItem>>>> {
    let page = feed(&state, &[user_id], &params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/network-activities?cursor=&page_size=
///
/// Activities of everyone the user follows, plus the user's own.
pub async fn network_activities(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<DataResponse<CursorPage<ActivityFeedItem>>>> {
    let mut user_ids = FollowRepo::followed_ids(&state.pool, auth.user_id).await?;
    user_ids.push(auth.user_id);
    let page = feed(&state, &user_ids, &params).await?;
    Ok(Json(DataResponse { data: page }))
}

/// DELETE /api/v1/user/activities/{id}
pub async fn delete_activity(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    if !ActivityRepo::delete_by_id(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::NotFound("Activity").into());
    }
    Ok(Json(SuccessResponse::ok()))
}
