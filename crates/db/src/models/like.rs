//! Like models.

use plotwist_core::enums::LikeEntity;
use plotwist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `likes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Like {
    pub id: DbId,
    pub entity_type: LikeEntity,
    pub entity_id: DbId,
    pub user_id: DbId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateLike {
    pub entity_type: LikeEntity,
    pub entity_id: DbId,
}
