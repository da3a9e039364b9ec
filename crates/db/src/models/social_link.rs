//! Social link models.

use plotwist_core::enums::SocialPlatform;
use plotwist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `social_links` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SocialLink {
    pub id: DbId,
    pub user_id: DbId,
    pub platform: SocialPlatform,
    pub url: String,
    pub created_at: Timestamp,
}

/// One platform in an upsert request. An empty `url` removes the link.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertSocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}
