//! Follow graph models.

use plotwist_core::enums::SubscriptionType;
use plotwist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `followers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Follow {
    pub follower_id: DbId,
    pub followed_id: DbId,
    pub created_at: Timestamp,
}

/// One entry of a followers/following page: the other user plus when the
/// follow happened (the page cursor).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FollowUser {
    pub follower_id: DbId,
    pub followed_id: DbId,
    pub created_at: Timestamp,
    pub user_id: DbId,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub subscription_type: SubscriptionType,
}
