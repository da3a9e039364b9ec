//! Repository for the `list_items` table.

use plotwist_core::types::DbId;
use sqlx::PgPool;

use crate::models::list::{CreateListItem, ItemPosition, ListItem};

const COLUMNS: &str = "id, list_id, tmdb_id, media_type, position, created_at";

pub struct ListItemRepo;

impl ListItemRepo {
    /// Append an item at the end of its list.
    pub async fn create(pool: &PgPool, input: &CreateListItem) -> Result<ListItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO list_items (list_id, tmdb_id, media_type, position) \
             VALUES ($1, $2, $3, \
                (SELECT COALESCE(MAX(position), 0) + 1 FROM list_items WHERE list_id = $1)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ListItem>(&query)
            .bind(input.list_id)
            .bind(input.tmdb_id)
            .bind(input.media_type)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ListItem>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM list_items WHERE id = $1");
        sqlx::query_as::<_, ListItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_list(pool: &PgPool, list_id: DbId) -> Result<Vec<ListItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM list_items WHERE list_id = $1 ORDER BY position, created_at"
        );
        sqlx::query_as::<_, ListItem>(&query)
            .bind(list_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM list_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply new positions in one transaction. Items outside `list_id` are
    /// ignored. Returns the list's items in their new order.
    pub async fn reorder(
        pool: &PgPool,
        list_id: DbId,
        items: &[ItemPosition],
    ) -> Result<Vec<ListItem>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for item in items {
            sqlx::query("UPDATE list_items SET position = $3 WHERE id = $1 AND list_id = $2")
                .bind(item.id)
                .bind(list_id)
                .bind(item.position)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Self::list_by_list(pool, list_id).await
    }
}
