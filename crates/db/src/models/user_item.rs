//! Collection models: user items, watch entries and watched episodes.

use plotwist_core::enums::{MediaType, UserItemStatus};
use plotwist_core::error::CoreError;
use plotwist_core::pagination::parse_cursor;
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserItem {
    pub id: DbId,
    pub user_id: DbId,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub status: UserItemStatus,
    pub position: Option<i32>,
    pub added_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A user item joined with the owner's whole-title review rating.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserItemWithRating {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: UserItem,
    pub rating: Option<f32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertUserItem {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub status: UserItemStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserItemOrder {
    #[default]
    UpdatedAt,
    AddedAt,
    Rating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl UserItemOrder {
    /// Parse a `next_cursor` handed out for this ordering.
    pub fn parse_cursor(self, raw: &str) -> Result<UserItemCursor, CoreError> {
        match self {
            UserItemOrder::UpdatedAt => parse_cursor(raw).map(UserItemCursor::UpdatedAt),
            UserItemOrder::AddedAt | UserItemOrder::Rating => raw
                .parse::<i64>()
                .ok()
                .filter(|offset| *offset >= 0)
                .map(UserItemCursor::Offset)
                .ok_or_else(|| CoreError::Validation(format!("Invalid cursor '{raw}'"))),
        }
    }
}

/// Where a [`UserItemFilter`] page resumes.
///
/// `updated_at` ordering is keyed on the timestamp. The other orderings have
/// repeated or missing sort keys, so they page by row offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserItemCursor {
    UpdatedAt(Timestamp),
    Offset(i64),
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filters for [`crate::repositories::UserItemRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct UserItemFilter {
    pub user_id: DbId,
    pub status: Option<UserItemStatus>,
    pub media_types: Vec<MediaType>,
    /// Inclusive rating bounds; only applied when narrower than `[0, 5]`.
    pub rating: Option<(f32, f32)>,
    pub only_items_without_review: bool,
    pub order_by: UserItemOrder,
    pub direction: SortDirection,
    pub cursor: Option<UserItemCursor>,
    pub page_size: i64,
}

/// Count of items in one status with its share of the collection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: UserItemStatus,
    pub count: i64,
    pub percentage: f64,
}

/// A row from the `watch_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatchEntry {
    pub id: DbId,
    pub user_item_id: DbId,
    pub watched_at: Timestamp,
    pub created_at: Timestamp,
}

/// A row from the `user_episodes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserEpisode {
    pub id: DbId,
    pub user_id: DbId,
    pub tmdb_id: TmdbId,
    pub season_number: i32,
    pub episode_number: i32,
    pub runtime: i32,
    pub watched_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserEpisode {
    pub tmdb_id: TmdbId,
    pub season_number: i32,
    pub episode_number: i32,
    #[serde(default)]
    pub runtime: i32,
    pub watched_at: Option<Timestamp>,
}
