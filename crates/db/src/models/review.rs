//! Review and review reply models.

use plotwist_core::enums::{Language, MediaType};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use crate::models::user::UserSummary;

/// A row from the `reviews` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Review {
    pub id: DbId,
    pub user_id: DbId,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub review: String,
    pub rating: f32,
    pub has_spoilers: bool,
    pub language: Option<Language>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub created_at: Timestamp,
}

/// A review with its author and engagement counters, as listed on title and
/// profile pages.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub review: Review,
    pub user: Json<UserSummary>,
    pub like_count: i64,
    pub reply_count: i64,
    /// Whether the requesting user liked this review. Always `false` for
    /// anonymous requests.
    pub user_liked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub review: String,
    pub rating: f32,
    #[serde(default)]
    pub has_spoilers: bool,
    pub language: Option<Language>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub review: Option<String>,
    pub rating: Option<f32>,
    pub has_spoilers: Option<bool>,
}

/// Sort key for review listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOrder {
    #[default]
    CreatedAt,
    LikeCount,
}

/// Filters for [`crate::repositories::ReviewRepo::list`].
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub user_id: Option<DbId>,
    pub tmdb_id: Option<TmdbId>,
    pub media_type: Option<MediaType>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub order_by: ReviewOrder,
    /// Zero-based page index.
    pub page: i64,
    pub limit: i64,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    /// User whose likes drive `user_liked`.
    pub viewer_id: Option<DbId>,
}

/// A row from the `review_replies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewReply {
    pub id: DbId,
    pub user_id: DbId,
    pub review_id: DbId,
    pub reply: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReplyWithStats {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reply: ReviewReply,
    pub user: Json<UserSummary>,
    pub like_count: i64,
    pub user_liked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateReply {
    pub review_id: DbId,
    pub reply: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReply {
    pub reply: String,
}

/// One page of reviews. `next_page` is set when more rows exist.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewPage {
    pub items: Vec<ReviewWithStats>,
    pub next_page: Option<i64>,
}
