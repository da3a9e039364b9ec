//! Activity feed models.

use plotwist_core::enums::{ActivityType, LikeEntity};
use plotwist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::user::UserSummary;

/// A row from the `user_activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Activity {
    pub id: DbId,
    pub user_id: DbId,
    pub activity_type: ActivityType,
    pub entity_id: Option<DbId>,
    pub entity_type: Option<LikeEntity>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// An activity as shown in a feed: the row, its owner, and the referenced
/// entity resolved per activity type.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ActivityFeedItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub activity: Activity,
    pub owner: Json<UserSummary>,
    pub additional_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct CreateActivity {
    pub user_id: DbId,
    pub activity_type: ActivityType,
    pub entity_id: Option<DbId>,
    pub entity_type: Option<LikeEntity>,
    pub metadata: Option<serde_json::Value>,
}

impl CreateActivity {
    pub fn new(user_id: DbId, activity_type: ActivityType) -> Self {
        Self {
            user_id,
            activity_type,
            entity_id: None,
            entity_type: None,
            metadata: None,
        }
    }

    pub fn entity(mut self, entity_id: DbId, entity_type: Option<LikeEntity>) -> Self {
        self.entity_id = Some(entity_id);
        self.entity_type = entity_type;
        self
    }

    pub fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
