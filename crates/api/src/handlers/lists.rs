//! Handlers for lists and their items.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::enums::{ActivityType, LikeEntity, ListVisibility};
use plotwist_core::error::CoreError;
use plotwist_core::types::DbId;
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::list::{
    CreateList, CreateListItem, ItemPosition, List, ListFilter, ListItem, ListProgress,
    ListWithStats, UpdateList,
};
use plotwist_db::pg_errors::is_unique_violation;
use plotwist_db::repositories::{ListItemRepo, ListRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

/// Load a list and make sure `user_id` owns it.
async fn owned_list(state: &AppState, list_id: DbId, user_id: DbId) -> AppResult<List> {
    let list = ListRepo::find_by_id(&state.pool, list_id)
        .await?
        .ok_or_else(CoreError::list_not_found)?;
    if list.user_id != user_id {
        return Err(CoreError::Forbidden("Only the list owner can change this list".into()).into());
    }
    Ok(list)
}

/// Load a list the viewer may see. Private lists of other users are
/// reported as missing.
async fn visible_list(state: &AppState, list_id: DbId, viewer_id: Option<DbId>) -> AppResult<List> {
    ListRepo::find_by_id(&state.pool, list_id)
        .await?
        .filter(|list| list.is_visible_to(viewer_id))
        .ok_or_else(|| CoreError::list_not_found().into())
}

fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation("List title must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListsQuery {
    pub user_id: Option<DbId>,
    pub visibility: Option<ListVisibility>,
    pub has_banner: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct BannerRequest {
    pub list_id: DbId,
    pub banner_url: Option<String>,
}

/// POST /api/v1/list
pub async fn create_list(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateList>,
) -> AppResult<(StatusCode, Json<DataResponse<List>>)> {
    validate_title(&input.title)?;
    let list = ListRepo::create(&state.pool, auth.user_id, &input).await?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::CreateList)
            .entity(list.id, Some(LikeEntity::List)),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: list })))
}

/// GET /api/v1/lists?user_id=&visibility=&has_banner=&limit=
pub async fn list_lists(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListsQuery>,
) -> AppResult<Json<DataResponse<Vec<ListWithStats>>>> {
    let filter = ListFilter {
        user_id: params.user_id,
        visibility: params.visibility,
        has_banner: params.has_banner,
        limit: params.limit.unwrap_or(0),
        viewer_id: viewer.user_id(),
    };
    let lists = ListRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: lists }))
}

/// GET /api/v1/list/by/{id}
pub async fn get_list(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ListWithStats>>> {
    let list = ListRepo::find_with_stats(&state.pool, id, viewer.user_id())
        .await?
        .filter(|l| l.list.is_visible_to(viewer.user_id()))
        .ok_or_else(CoreError::list_not_found)?;
    Ok(Json(DataResponse { data: list }))
}

/// PUT /api/v1/list/{id}
pub async fn update_list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateList>,
) -> AppResult<Json<DataResponse<List>>> {
    if let Some(title) = input.title.as_deref() {
        validate_title(title)?;
    }
    owned_list(&state, id, auth.user_id).await?;

    let list = ListRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or_else(CoreError::list_not_found)?;
    Ok(Json(DataResponse { data: list }))
}

/// DELETE /api/v1/list/{id}
pub async fn delete_list(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    owned_list(&state, id, auth.user_id).await?;
    if !ListRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::list_not_found().into());
    }
    Ok(Json(SuccessResponse::ok()))
}

/// PATCH /api/v1/list/banner
pub async fn update_banner(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BannerRequest>,
) -> AppResult<Json<DataResponse<List>>> {
    owned_list(&state, input.list_id, auth.user_id).await?;
    let list = ListRepo::update_banner(
        &state.pool,
        input.list_id,
        auth.user_id,
        input.banner_url.as_deref(),
    )
    .await?
    .ok_or_else(CoreError::list_not_found)?;
    Ok(Json(DataResponse { data: list }))
}

/// GET /api/v1/list/{id}/progress
///
/// How much of the list the requesting user has watched.
pub async fn list_progress(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ListProgress>>> {
    visible_list(&state, id, Some(auth.user_id)).await?;
    let progress = ListRepo::progress(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// List items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReorderListItemsRequest {
    pub list_id: DbId,
    pub items: Vec<ItemPosition>,
}

/// POST /api/v1/list-item
pub async fn create_list_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateListItem>,
) -> AppResult<(StatusCode, Json<DataResponse<ListItem>>)> {
    owned_list(&state, input.list_id, auth.user_id).await?;

    let item = ListItemRepo::create(&state.pool, &input)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::Conflict("This title is already in the list.".into()).into()
            } else {
                AppError::Database(e)
            }
        })?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::AddItem)
            .entity(item.list_id, Some(LikeEntity::List))
            .metadata(json!({
                "tmdb_id": item.tmdb_id,
                "media_type": item.media_type,
            })),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// GET /api/v1/list-items/by/{list_id}
pub async fn list_items(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(list_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ListItem>>>> {
    visible_list(&state, list_id, viewer.user_id()).await?;
    let items = ListItemRepo::list_by_list(&state.pool, list_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// DELETE /api/v1/list-item/{id}
pub async fn delete_list_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    let item = ListItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::list_item_not_found)?;
    owned_list(&state, item.list_id, auth.user_id).await?;

    if !ListItemRepo::delete(&state.pool, id).await? {
        return Err(CoreError::list_item_not_found().into());
    }

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::DeleteItem)
            .entity(item.list_id, Some(LikeEntity::List))
            .metadata(json!({
                "tmdb_id": item.tmdb_id,
                "media_type": item.media_type,
            })),
    )
    .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// PATCH /api/v1/list-items
pub async fn reorder_list_items(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReorderListItemsRequest>,
) -> AppResult<Json<DataResponse<Vec<ListItem>>>> {
    owned_list(&state, input.list_id, auth.user_id).await?;
    let items = ListItemRepo::reorder(&state.pool, input.list_id, &input.items).await?;
    Ok(Json(DataResponse { data: items }))
}
