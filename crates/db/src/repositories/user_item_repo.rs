//! Repository for the `user_items` table.

use plotwist_core::enums::{MediaType, UserItemStatus};
use plotwist_core::pagination::{paginate, CursorPage};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use sqlx::PgPool;

use crate::models::user_item::{
    StatusCount, UpsertUserItem, UserItem, UserItemCursor, UserItemFilter, UserItemOrder,
    UserItemWithRating,
};

const COLUMNS: &str = "id, user_id, tmdb_id, media_type, status, position, added_at, updated_at";

pub struct UserItemRepo;

impl UserItemRepo {
    /// Insert or update the user's entry for a title.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertUserItem,
    ) -> Result<UserItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_items (user_id, tmdb_id, media_type, status) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT ON CONSTRAINT uq_user_items_user_media DO UPDATE SET \
                status = EXCLUDED.status, \
                updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserItem>(&query)
            .bind(user_id)
            .bind(input.tmdb_id)
            .bind(input.media_type)
            .bind(input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_items WHERE id = $1");
        sqlx::query_as::<_, UserItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_media(
        pool: &PgPool,
        user_id: DbId,
        tmdb_id: TmdbId,
        media_type: MediaType,
    ) -> Result<Option<UserItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_items \
             WHERE user_id = $1 AND tmdb_id = $2 AND media_type = $3"
        );
        sqlx::query_as::<_, UserItem>(&query)
            .bind(user_id)
            .bind(tmdb_id)
            .bind(media_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete an item owned by `user_id`. Watch entries cascade.
    pub async fn delete(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Filtered cursor page of a user's collection. `updated_at` ordering is
    /// keyed on the timestamp; the other orderings page by offset.
    pub async fn list(
        pool: &PgPool,
        filter: &UserItemFilter,
    ) -> Result<CursorPage<UserItemWithRating>, sqlx::Error> {
        // Build dynamic WHERE clauses. $1 is always the user id.
        let mut conditions = vec!["ui.user_id = $1".to_string()];
        let mut bind_idx = 2u32;

        if filter.status.is_some() {
            conditions.push(format!("ui.status = ${bind_idx}"));
            bind_idx += 1;
        }
        if !filter.media_types.is_empty() {
            conditions.push(format!("ui.media_type = ANY(${bind_idx})"));
            bind_idx += 1;
        }
        let rating = filter.rating.filter(|&(min, max)| min > 0.0 || max < 5.0);
        if rating.is_some() {
            conditions.push(format!(
                "r.rating BETWEEN ${bind_idx} AND ${next}",
                next = bind_idx + 1
            ));
            bind_idx += 2;
        }
        if filter.only_items_without_review {
            conditions.push("r.id IS NULL".to_string());
        }
        let direction = filter.direction.as_sql();
        if let Some(UserItemCursor::UpdatedAt(_)) = filter.cursor {
            let op = if direction == "ASC" { ">=" } else { "<=" };
            conditions.push(format!(
                "DATE_TRUNC('milliseconds', ui.updated_at) {op} ${bind_idx}"
            ));
            bind_idx += 1;
        }
        let offset = match filter.cursor {
            Some(UserItemCursor::Offset(offset)) => offset,
            _ => 0,
        };

        // `ui.id` breaks ties so offset pages never overlap.
        let order = match filter.order_by {
            UserItemOrder::UpdatedAt => format!("ui.updated_at {direction}, ui.id {direction}"),
            UserItemOrder::AddedAt => {
                format!("ui.added_at {direction}, ui.updated_at DESC, ui.id")
            }
            UserItemOrder::Rating => {
                format!("r.rating {direction} NULLS LAST, ui.updated_at DESC, ui.id")
            }
        };

        let query = format!(
            "SELECT ui.id, ui.user_id, ui.tmdb_id, ui.media_type, ui.status, ui.position, \
                    ui.added_at, ui.updated_at, r.rating \
             FROM user_items ui \
             LEFT JOIN LATERAL ( \
                 SELECT id, rating FROM reviews \
                 WHERE user_id = ui.user_id AND tmdb_id = ui.tmdb_id \
                   AND media_type = ui.media_type \
                   AND season_number IS NULL AND episode_number IS NULL \
                 ORDER BY created_at DESC LIMIT 1 \
             ) r ON true \
             WHERE {where_clause} \
             ORDER BY {order} \
             LIMIT ${bind_idx} OFFSET ${offset_idx}",
            where_clause = conditions.join(" AND "),
            offset_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, UserItemWithRating>(&query).bind(filter.user_id);
        if let Some(status) = filter.status {
            q = q.bind(status);
        }
        if !filter.media_types.is_empty() {
            q = q.bind(filter.media_types.clone());
        }
        if let Some((min, max)) = rating {
            q = q.bind(min).bind(max);
        }
        if let Some(UserItemCursor::UpdatedAt(cursor)) = filter.cursor {
            q = q.bind(cursor);
        }
        let rows = q
            .bind(filter.page_size + 1)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let mut page = paginate(rows, filter.page_size, |row| row.item.updated_at);
        if filter.order_by != UserItemOrder::UpdatedAt {
            page.next_cursor = page
                .next_cursor
                .map(|_| (offset + filter.page_size).to_string());
        }
        Ok(page)
    }

    /// Every item of a user in `status` (`None` means all statuses),
    /// optionally restricted to items updated within a date range.
    pub async fn list_all_by_status(
        pool: &PgPool,
        user_id: DbId,
        status: Option<UserItemStatus>,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<Vec<UserItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_items \
             WHERE user_id = $1 \
               AND ($2::user_item_status IS NULL OR status = $2) \
               AND ($3::timestamptz IS NULL OR updated_at >= $3) \
               AND ($4::timestamptz IS NULL OR updated_at <= $4) \
             ORDER BY position NULLS LAST, updated_at DESC"
        );
        sqlx::query_as::<_, UserItem>(&query)
            .bind(user_id)
            .bind(status)
            .bind(start_date)
            .bind(end_date)
            .fetch_all(pool)
            .await
    }

    pub async fn count(
        pool: &PgPool,
        user_id: DbId,
        status: Option<UserItemStatus>,
        media_type: Option<MediaType>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_items \
             WHERE user_id = $1 \
               AND ($2::user_item_status IS NULL OR status = $2) \
               AND ($3::media_type IS NULL OR media_type = $3)",
        )
        .bind(user_id)
        .bind(status)
        .bind(media_type)
        .fetch_one(pool)
        .await
    }

    /// Item counts per status with their share of the whole collection.
    pub async fn status_breakdown(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, \
                    COUNT(*) AS count, \
                    ROUND(COUNT(*) * 100.0 / SUM(COUNT(*)) OVER (), 2)::float8 AS percentage \
             FROM user_items \
             WHERE user_id = $1 \
             GROUP BY status \
             ORDER BY status",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Set positions to follow the order of `item_ids`, in one transaction.
    /// Only items of `user_id` in `status` are touched.
    pub async fn reorder(
        pool: &PgPool,
        user_id: DbId,
        status: UserItemStatus,
        item_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut updated = 0;
        for (position, id) in item_ids.iter().enumerate() {
            let result = sqlx::query(
                "UPDATE user_items SET position = $4 \
                 WHERE id = $1 AND user_id = $2 AND status = $3",
            )
            .bind(id)
            .bind(user_id)
            .bind(status)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }
        tx.commit().await?;
        Ok(updated)
    }
}
