//! List and list item models.

use plotwist_core::enums::{ListVisibility, MediaType};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct List {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub visibility: ListVisibility,
    pub created_at: Timestamp,
}

impl List {
    /// Private lists are only visible to their owner.
    pub fn is_visible_to(&self, viewer_id: Option<DbId>) -> bool {
        self.visibility != ListVisibility::Private || viewer_id == Some(self.user_id)
    }
}

/// A list with its items and like counters.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ListWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub list: List,
    pub like_count: i64,
    pub user_liked: bool,
    pub items: Json<Vec<ListItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateList {
    pub title: String,
    pub description: Option<String>,
    pub visibility: Option<ListVisibility>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateList {
    pub title: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<ListVisibility>,
}

/// Filters for [`crate::repositories::ListRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user_id: Option<DbId>,
    pub visibility: Option<ListVisibility>,
    pub has_banner: Option<bool>,
    pub limit: i64,
    pub viewer_id: Option<DbId>,
}

/// Completion of a list against the owner's watched items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct ListProgress {
    pub total: i64,
    pub completed: i64,
    pub percentage: i64,
}

/// A row from the `list_items` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ListItem {
    pub id: DbId,
    pub list_id: DbId,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub position: i32,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListItem {
    pub list_id: DbId,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
}

/// New position for one item in a reorder request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ItemPosition {
    pub id: DbId,
    pub position: i32,
}
