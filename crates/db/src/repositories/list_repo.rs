//! Repository for the `lists` table.

use plotwist_core::types::DbId;
use sqlx::PgPool;

use crate::models::list::{CreateList, List, ListFilter, ListProgress, ListWithStats, UpdateList};

const COLUMNS: &str = "id, user_id, title, description, banner_url, visibility, created_at";

/// Default number of lists returned by [`ListRepo::list`].
pub const DEFAULT_LIST_LIMIT: i64 = 5;

/// Select list producing [`ListWithStats`]. `$1` is the viewer id.
const WITH_STATS_SELECT: &str = "\
    SELECT l.id, l.user_id, l.title, l.description, l.banner_url, l.visibility, l.created_at, \
           (SELECT COUNT(*) FROM likes lk \
             WHERE lk.entity_type = 'LIST' AND lk.entity_id = l.id) AS like_count, \
           EXISTS (SELECT 1 FROM likes lk \
             WHERE lk.entity_type = 'LIST' AND lk.entity_id = l.id \
               AND lk.user_id = $1) AS user_liked, \
           COALESCE((SELECT json_agg(li ORDER BY li.position, li.created_at) \
                     FROM list_items li WHERE li.list_id = l.id), '[]'::json) AS items \
    FROM lists l";

pub struct ListRepo;

impl ListRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateList,
    ) -> Result<List, sqlx::Error> {
        let query = format!(
            "INSERT INTO lists (user_id, title, description, visibility) \
             VALUES ($1, $2, $3, COALESCE($4, 'PUBLIC'::list_visibility)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.visibility)
            .fetch_one(pool)
            .await
    }

    /// Lists matching the filter, newest first. Private lists only appear for
    /// their owner (`viewer_id`).
    pub async fn list(pool: &PgPool, filter: &ListFilter) -> Result<Vec<ListWithStats>, sqlx::Error> {
        let limit = if filter.limit > 0 {
            filter.limit
        } else {
            DEFAULT_LIST_LIMIT
        };
        let query = format!(
            "{WITH_STATS_SELECT} \
             WHERE ($2::uuid IS NULL OR l.user_id = $2) \
               AND ($3::list_visibility IS NULL OR l.visibility = $3) \
               AND ($4::boolean IS NULL OR (l.banner_url IS NOT NULL) = $4) \
               AND (l.visibility <> 'PRIVATE' OR l.user_id = $1) \
             ORDER BY l.created_at DESC \
             LIMIT $5"
        );
        sqlx::query_as::<_, ListWithStats>(&query)
            .bind(filter.viewer_id)
            .bind(filter.user_id)
            .bind(filter.visibility)
            .bind(filter.has_banner)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<List>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lists WHERE id = $1");
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A list with its items and like counters for `viewer_id`.
    pub async fn find_with_stats(
        pool: &PgPool,
        id: DbId,
        viewer_id: Option<DbId>,
    ) -> Result<Option<ListWithStats>, sqlx::Error> {
        let query = format!("{WITH_STATS_SELECT} WHERE l.id = $2");
        sqlx::query_as::<_, ListWithStats>(&query)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a list owned by `user_id`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        input: &UpdateList,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET \
                title = COALESCE($3, title), \
                description = COALESCE($4, description), \
                visibility = COALESCE($5, visibility) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.visibility)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_banner(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        banner_url: Option<&str>,
    ) -> Result<Option<List>, sqlx::Error> {
        let query = format!(
            "UPDATE lists SET banner_url = $3 WHERE id = $1 AND user_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, List>(&query)
            .bind(id)
            .bind(user_id)
            .bind(banner_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a list owned by `user_id`. Items cascade.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// How many of the list's titles `user_id` has watched.
    pub async fn progress(
        pool: &PgPool,
        list_id: DbId,
        user_id: DbId,
    ) -> Result<ListProgress, sqlx::Error> {
        let (total, completed): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(ui.id) \
             FROM list_items li \
             LEFT JOIN user_items ui \
               ON ui.tmdb_id = li.tmdb_id \
              AND ui.media_type = li.media_type \
              AND ui.user_id = $2 \
              AND ui.status = 'WATCHED' \
             WHERE li.list_id = $1",
        )
        .bind(list_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        let percentage = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as i64
        };
        Ok(ListProgress {
            total,
            completed,
            percentage,
        })
    }
}
