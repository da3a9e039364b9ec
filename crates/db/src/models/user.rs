//! User account, preference and summary models.

use plotwist_core::enums::{MediaType, SubscriptionType};
use plotwist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table plus the user's effective subscription type.
///
/// `password_hash` is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub is_legacy: bool,
    pub created_at: Timestamp,
    /// `PRO` while an active subscription exists, `MEMBER` otherwise.
    pub subscription_type: SubscriptionType,
}

/// Public projection of a user, safe to show on other users' pages.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: DbId,
    pub username: String,
    pub display_name: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
    pub created_at: Timestamp,
    pub subscription_type: SubscriptionType,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            biography: user.biography,
            avatar_url: user.avatar_url,
            banner_url: user.banner_url,
            created_at: user.created_at,
            subscription_type: user.subscription_type,
        }
    }
}

/// Compact user shape embedded in follower lists, likes and activity feeds.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: DbId,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub subscription_type: SubscriptionType,
}

/// Insert DTO. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

/// Profile patch. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub biography: Option<String>,
    pub avatar_url: Option<String>,
    pub banner_url: Option<String>,
}

/// A row from the `user_preferences` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserPreferences {
    pub user_id: DbId,
    pub watch_region: Option<String>,
    pub watch_providers_ids: Vec<i32>,
    pub media_types: Vec<MediaType>,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertPreferences {
    pub watch_region: Option<String>,
    pub watch_providers_ids: Option<Vec<i32>>,
    pub media_types: Option<Vec<MediaType>>,
}
