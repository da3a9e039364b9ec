//! Repository for the `reviews` table.

use plotwist_core::enums::MediaType;
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use sqlx::PgPool;

use super::user_summary_json;
use crate::models::review::{
    CreateReview, Review, ReviewFilter, ReviewOrder, ReviewPage, ReviewWithStats, UpdateReview,
};

const COLUMNS: &str = "id, user_id, tmdb_id, media_type, review, rating, has_spoilers, \
                       language, season_number, episode_number, created_at";

/// Default number of reviews returned by [`ReviewRepo::best_by_user`].
pub const BEST_REVIEWS_LIMIT: i64 = 10;

/// Select list producing [`ReviewWithStats`]. `$1` is the viewer id.
fn with_stats_select() -> String {
    format!(
        "SELECT r.id, r.user_id, r.tmdb_id, r.media_type, r.review, r.rating, r.has_spoilers, \
                r.language, r.season_number, r.episode_number, r.created_at, \
                {user} AS user, \
                (SELECT COUNT(*) FROM likes l \
                  WHERE l.entity_type = 'REVIEW' AND l.entity_id = r.id) AS like_count, \
                (SELECT COUNT(*) FROM review_replies rr WHERE rr.review_id = r.id) AS reply_count, \
                EXISTS (SELECT 1 FROM likes l \
                  WHERE l.entity_type = 'REVIEW' AND l.entity_id = r.id \
                    AND l.user_id = $1) AS user_liked \
         FROM reviews r \
         JOIN users u ON u.id = r.user_id",
        user = user_summary_json()
    )
}

pub struct ReviewRepo;

impl ReviewRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let query = format!(
            "INSERT INTO reviews \
                (user_id, tmdb_id, media_type, review, rating, has_spoilers, language, \
                 season_number, episode_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .bind(input.tmdb_id)
            .bind(input.media_type)
            .bind(&input.review)
            .bind(input.rating)
            .bind(input.has_spoilers)
            .bind(input.language)
            .bind(input.season_number)
            .bind(input.episode_number)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Review>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reviews WHERE id = $1");
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a review owned by `user_id`. Returns `None` if no such review
    /// belongs to that user.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "UPDATE reviews SET \
                review = COALESCE($3, review), \
                rating = COALESCE($4, rating), \
                has_spoilers = COALESCE($5, has_spoilers) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.review)
            .bind(input.rating)
            .bind(input.has_spoilers)
            .fetch_optional(pool)
            .await
    }

    /// Delete a review owned by `user_id`.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// The review `user_id` wrote for a title, season or episode.
    pub async fn find_for_user_item(
        pool: &PgPool,
        user_id: DbId,
        tmdb_id: TmdbId,
        media_type: MediaType,
        season_number: Option<i32>,
        episode_number: Option<i32>,
    ) -> Result<Option<Review>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reviews \
             WHERE user_id = $1 AND tmdb_id = $2 AND media_type = $3 \
               AND season_number IS NOT DISTINCT FROM $4 \
               AND episode_number IS NOT DISTINCT FROM $5 \
             ORDER BY created_at DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .bind(tmdb_id)
            .bind(media_type)
            .bind(season_number)
            .bind(episode_number)
            .fetch_optional(pool)
            .await
    }

    /// Filtered, offset-paginated review listing.
    ///
    /// Without a season filter only whole-title reviews are returned; with a
    /// season but no episode, only season reviews.
    pub async fn list(pool: &PgPool, filter: &ReviewFilter) -> Result<ReviewPage, sqlx::Error> {
        let limit = filter.limit.max(1);
        let offset = filter.page.max(0) * limit;
        let order = match filter.order_by {
            ReviewOrder::CreatedAt => "r.created_at DESC",
            ReviewOrder::LikeCount => "like_count DESC, r.created_at DESC",
        };

        // Season/episode scoping only applies when listing reviews of one title.
        let scope = if filter.tmdb_id.is_some() {
            "AND r.season_number IS NOT DISTINCT FROM $5::int \
             AND r.episode_number IS NOT DISTINCT FROM $6::int"
        } else {
            "AND ($5::int IS NULL OR r.season_number = $5) \
             AND ($6::int IS NULL OR r.episode_number = $6)"
        };

        let query = format!(
            "{select} \
             WHERE ($2::uuid IS NULL OR r.user_id = $2) \
               AND ($3::int IS NULL OR r.tmdb_id = $3) \
               AND ($4::media_type IS NULL OR r.media_type = $4) \
               {scope} \
               AND ($7::timestamptz IS NULL OR r.created_at >= $7) \
               AND ($8::timestamptz IS NULL OR r.created_at <= $8) \
               AND u.deleted_at IS NULL \
             ORDER BY {order} \
             LIMIT $9 OFFSET $10",
            select = with_stats_select(),
        );

        let mut items = sqlx::query_as::<_, ReviewWithStats>(&query)
            .bind(filter.viewer_id)
            .bind(filter.user_id)
            .bind(filter.tmdb_id)
            .bind(filter.media_type)
            .bind(filter.season_number)
            .bind(filter.episode_number)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(limit + 1)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let next_page = if items.len() as i64 > limit {
            items.truncate(limit as usize);
            Some(filter.page.max(0) + 1)
        } else {
            None
        };
        Ok(ReviewPage { items, next_page })
    }

    /// Five-star whole-title reviews by a user, newest first.
    pub async fn best_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: Option<i64>,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<Vec<ReviewWithStats>, sqlx::Error> {
        let query = format!(
            "{select} \
             WHERE r.user_id = $2 \
               AND r.rating = 5 \
               AND r.season_number IS NULL AND r.episode_number IS NULL \
               AND ($3::timestamptz IS NULL OR r.created_at >= $3) \
               AND ($4::timestamptz IS NULL OR r.created_at <= $4) \
             ORDER BY r.created_at DESC \
             LIMIT $5",
            select = with_stats_select(),
        );
        sqlx::query_as::<_, ReviewWithStats>(&query)
            .bind(None::<DbId>)
            .bind(user_id)
            .bind(start_date)
            .bind(end_date)
            .bind(limit.unwrap_or(BEST_REVIEWS_LIMIT))
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
    }
}
