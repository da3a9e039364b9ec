//! Collection status changes.

use plotwist_core::enums::{ActivityType, UserItemStatus};
use plotwist_core::types::DbId;
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::user_item::{UpsertUserItem, UserItem};
use plotwist_db::repositories::{UserItemRepo, WatchEntryRepo};
use serde_json::json;

use crate::error::AppResult;
use crate::services::activities;
use crate::state::AppState;

/// Set the user's status for a title.
///
/// Moving to `WATCHED` creates a first watch entry when none exists; any
/// other status clears the watch history. The change is recorded in the
/// feed and the user's cached stats are dropped.
pub async fn upsert_user_item(
    state: &AppState,
    user_id: DbId,
    input: &UpsertUserItem,
) -> AppResult<UserItem> {
    let item = UserItemRepo::upsert(&state.pool, user_id, input).await?;

    if item.status == UserItemStatus::Watched {
        if WatchEntryRepo::count_by_user_item(&state.pool, item.id).await? == 0 {
            WatchEntryRepo::create(&state.pool, item.id, None).await?;
        }
    } else {
        WatchEntryRepo::delete_by_user_item(&state.pool, item.id).await?;
    }

    activities::record(
        &state.pool,
        CreateActivity::new(user_id, ActivityType::ChangeStatus).metadata(json!({
            "tmdb_id": item.tmdb_id,
            "media_type": item.media_type,
            "status": item.status,
        })),
    )
    .await?;

    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(user_id).await;
    }

    Ok(item)
}
