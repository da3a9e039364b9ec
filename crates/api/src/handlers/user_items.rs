//! Handlers for the user's collection: items, watch entries and episodes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::enums::{ActivityType, MediaType, UserItemStatus};
use plotwist_core::error::CoreError;
use plotwist_core::pagination::{clamp_page_size, CursorPage};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::user_item::{
    CreateUserEpisode, SortDirection, UpsertUserItem, UserEpisode, UserItem, UserItemFilter,
    UserItemOrder, UserItemWithRating, WatchEntry,
};
use plotwist_db::repositories::{UserEpisodeRepo, UserItemRepo, WatchEntryRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, SuccessResponse};
use crate::services::{activities, user_items};
use crate::state::AppState;

async fn invalidate_stats(state: &AppState, user_id: DbId) {
    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(user_id).await;
    }
}

/// Load a user item and make sure `user_id` owns it.
async fn owned_item(state: &AppState, id: DbId, user_id: DbId) -> AppResult<UserItem> {
    let item = UserItemRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::user_item_not_found)?;
    if item.user_id != user_id {
        return Err(CoreError::Forbidden("This item belongs to another user".into()).into());
    }
    Ok(item)
}

/// Parse a status filter where `ALL` (or nothing) means every status.
fn status_filter(value: Option<&str>) -> Result<Option<UserItemStatus>, CoreError> {
    match value {
        None | Some("ALL") => Ok(None),
        Some(other) => UserItemStatus::from_str(other)
            .map(Some)
            .ok_or_else(|| CoreError::Validation(format!("Invalid status '{other}'"))),
    }
}

// ---------------------------------------------------------------------------
// User items
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MediaQuery {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
}

/// A user item with its viewing history.
#[derive(Debug, Serialize)]
pub struct UserItemDetails {
    #[serde(flatten)]
    pub item: UserItem,
    pub watch_entries: Vec<WatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct UserItemLookup {
    pub user_item: Option<UserItemDetails>,
}

/// Body of `POST /user/items`.
#[derive(Debug, Deserialize)]
pub struct ListUserItemsRequest {
    pub user_id: DbId,
    pub status: Option<UserItemStatus>,
    #[serde(default)]
    pub media_types: Vec<MediaType>,
    /// Inclusive `[min, max]` rating bounds.
    pub rating: Option<(f32, f32)>,
    #[serde(default)]
    pub only_items_without_review: bool,
    #[serde(default)]
    pub order_by: UserItemOrder,
    #[serde(default)]
    pub order_direction: SortDirection,
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AllItemsQuery {
    pub user_id: DbId,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CountQuery {
    pub user_id: DbId,
    pub status: Option<String>,
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Serialize)]
pub struct ItemCount {
    pub count: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReorderUserItemsRequest {
    pub user_id: Option<DbId>,
    pub status: UserItemStatus,
    pub item_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResult {
    pub updated: u64,
}

/// PUT /api/v1/user/item
pub async fn upsert_user_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpsertUserItem>,
) -> AppResult<Json<DataResponse<UserItem>>> {
    let item = user_items::upsert_user_item(&state, auth.user_id, &input).await?;
    Ok(Json(DataResponse { data: item }))
}

/// GET /api/v1/user/item?tmdb_id=&media_type=
pub async fn get_user_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MediaQuery>,
) -> AppResult<Json<DataResponse<UserItemLookup>>> {
    let item =
        UserItemRepo::find_by_media(&state.pool, auth.user_id, params.tmdb_id, params.media_type)
            .await?;
    let user_item = match item {
        Some(item) => {
            let watch_entries = WatchEntryRepo::list_by_user_item(&state.pool, item.id).await?;
            Some(UserItemDetails {
                item,
                watch_entries,
            })
        }
        None => None,
    };
    Ok(Json(DataResponse {
        data: UserItemLookup { user_item },
    }))
}

/// DELETE /api/v1/user/item/{id}
pub async fn delete_user_item(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    owned_item(&state, id, auth.user_id).await?;
    if !UserItemRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::user_item_not_found().into());
    }
    invalidate_stats(&state, auth.user_id).await;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/v1/user/items
pub async fn list_user_items(
    State(state): State<AppState>,
    Json(input): Json<ListUserItemsRequest>,
) -> AppResult<Json<DataResponse<CursorPage<UserItemWithRating>>>> {
    let cursor = input
        .cursor
        .as_deref()
        .map(|raw| input.order_by.parse_cursor(raw))
        .transpose()?;
    let page_size = clamp_page_size(input.page_size);
    if let Some((min, max)) = input.rating {
        if min > max || !(0.0..=5.0).contains(&min) || !(0.0..=5.0).contains(&max) {
            return Err(AppError::BadRequest(
                "rating must be [min, max] within 0..=5".into(),
            ));
        }
    }

    let filter = UserItemFilter {
        user_id: input.user_id,
        status: input.status,
        media_types: input.media_types,
        rating: input.rating,
        only_items_without_review: input.only_items_without_review,
        order_by: input.order_by,
        direction: input.order_direction,
        cursor,
        page_size,
    };
    let page = UserItemRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/user/items/all?user_id=&status=
pub async fn all_user_items(
    State(state): State<AppState>,
    Query(params): Query<AllItemsQuery>,
) -> AppResult<Json<DataResponse<Vec<UserItem>>>> {
    let status = status_filter(params.status.as_deref())?;
    let items = UserItemRepo::list_all_by_status(&state.pool, params.user_id, status, None, None)
        .await?;
    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/user/items/count?user_id=&status=&media_type=
pub async fn count_user_items(
    State(state): State<AppState>,
    Query(params): Query<CountQuery>,
) -> AppResult<Json<DataResponse<ItemCount>>> {
    let status = status_filter(params.status.as_deref())?;
    let count =
        UserItemRepo::count(&state.pool, params.user_id, status, params.media_type).await?;
    Ok(Json(DataResponse {
        data: ItemCount { count },
    }))
}

/// PUT /api/v1/user/items/reorder
///
/// Positions follow the order of `item_ids`.
pub async fn reorder_user_items(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ReorderUserItemsRequest>,
) -> AppResult<Json<DataResponse<ReorderResult>>> {
    if input.user_id.is_some_and(|id| id != auth.user_id) {
        return Err(CoreError::Forbidden("You can only reorder your own items".into()).into());
    }
    let updated =
        UserItemRepo::reorder(&state.pool, auth.user_id, input.status, &input.item_ids).await?;
    Ok(Json(DataResponse {
        data: ReorderResult { updated },
    }))
}

// ---------------------------------------------------------------------------
// Watch entries
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWatchEntryRequest {
    pub user_item_id: DbId,
    pub watched_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub struct WatchEntriesQuery {
    pub user_item_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWatchEntryRequest {
    pub watched_at: Timestamp,
}

/// Load a watch entry whose item `user_id` owns.
async fn owned_entry(state: &AppState, id: DbId, user_id: DbId) -> AppResult<WatchEntry> {
    let entry = WatchEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::watch_entry_not_found)?;
    owned_item(state, entry.user_item_id, user_id).await?;
    Ok(entry)
}

/// POST /api/v1/watch-entry
pub async fn create_watch_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateWatchEntryRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WatchEntry>>)> {
    owned_item(&state, input.user_item_id, auth.user_id).await?;
    let entry = WatchEntryRepo::create(&state.pool, input.user_item_id, input.watched_at).await?;
    invalidate_stats(&state, auth.user_id).await;
    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// GET /api/v1/watch-entries?user_item_id=
pub async fn list_watch_entries(
    State(state): State<AppState>,
    Query(params): Query<WatchEntriesQuery>,
) -> AppResult<Json<DataResponse<Vec<WatchEntry>>>> {
    let entries = WatchEntryRepo::list_by_user_item(&state.pool, params.user_item_id).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// PUT /api/v1/watch-entry/{id}
pub async fn update_watch_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWatchEntryRequest>,
) -> AppResult<Json<DataResponse<WatchEntry>>> {
    owned_entry(&state, id, auth.user_id).await?;
    let entry = WatchEntryRepo::update(&state.pool, id, input.watched_at)
        .await?
        .ok_or_else(CoreError::watch_entry_not_found)?;
    invalidate_stats(&state, auth.user_id).await;
    Ok(Json(DataResponse { data: entry }))
}

/// DELETE /api/v1/watch-entry/{id}
pub async fn delete_watch_entry(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    owned_entry(&state, id, auth.user_id).await?;
    if !WatchEntryRepo::delete(&state.pool, id).await? {
        return Err(CoreError::watch_entry_not_found().into());
    }
    invalidate_stats(&state, auth.user_id).await;
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Episodes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct EpisodesQuery {
    pub user_id: DbId,
    pub tmdb_id: Option<TmdbId>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteEpisodesRequest {
    pub ids: Vec<DbId>,
}

/// POST /api/v1/user/episodes
///
/// Already watched episodes are skipped. One `WATCH_EPISODE` activity
/// covers the whole batch.
pub async fn create_episodes(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<Vec<CreateUserEpisode>>,
) -> AppResult<(StatusCode, Json<DataResponse<Vec<UserEpisode>>>)> {
    if input.is_empty() {
        return Err(AppError::BadRequest("At least one episode is required".into()));
    }
    let episodes = UserEpisodeRepo::create_many(&state.pool, auth.user_id, &input).await?;

    if !episodes.is_empty() {
        let metadata = serde_json::to_value(&input)
            .map_err(|e| AppError::InternalError(format!("Failed to encode episodes: {e}")))?;
        activities::record(
            &state.pool,
            CreateActivity::new(auth.user_id, ActivityType::WatchEpisode).metadata(metadata),
        )
        .await?;
        invalidate_stats(&state, auth.user_id).await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: episodes })))
}

/// GET /api/v1/user/episodes?user_id=&tmdb_id=
pub async fn list_episodes(
    State(state): State<AppState>,
    Query(params): Query<EpisodesQuery>,
) -> AppResult<Json<DataResponse<Vec<UserEpisode>>>> {
    let episodes =
        UserEpisodeRepo::list(&state.pool, params.user_id, params.tmdb_id, None, None).await?;
    Ok(Json(DataResponse { data: episodes }))
}

/// DELETE /api/v1/user/episodes
pub async fn delete_episodes(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<DeleteEpisodesRequest>,
) -> AppResult<Json<DataResponse<Vec<UserEpisode>>>> {
    let deleted = UserEpisodeRepo::delete_many(&state.pool, auth.user_id, &input.ids).await?;
    if !deleted.is_empty() {
        invalidate_stats(&state, auth.user_id).await;
    }
    Ok(Json(DataResponse { data: deleted }))
}
