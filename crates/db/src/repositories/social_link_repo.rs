//! Repository for the `social_links` table.

use plotwist_core::types::DbId;
use sqlx::PgPool;

use crate::models::social_link::{SocialLink, UpsertSocialLink};

const COLUMNS: &str = "id, user_id, platform, url, created_at";

pub struct SocialLinkRepo;

impl SocialLinkRepo {
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<SocialLink>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM social_links WHERE user_id = $1 ORDER BY platform");
        sqlx::query_as::<_, SocialLink>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a batch of links in one transaction. A blank url removes the
    /// platform's link. Returns the user's links afterwards.
    pub async fn upsert_many(
        pool: &PgPool,
        user_id: DbId,
        links: &[UpsertSocialLink],
    ) -> Result<Vec<SocialLink>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for link in links {
            let url = link.url.trim();
            if url.is_empty() {
                sqlx::query("DELETE FROM social_links WHERE user_id = $1 AND platform = $2")
                    .bind(user_id)
                    .bind(link.platform)
                    .execute(&mut *tx)
                    .await?;
            } else {
                sqlx::query(
                    "INSERT INTO social_links (user_id, platform, url) VALUES ($1, $2, $3) \
                     ON CONFLICT ON CONSTRAINT uq_social_links_user_platform \
                     DO UPDATE SET url = EXCLUDED.url",
                )
                .bind(user_id)
                .bind(link.platform)
                .bind(url)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;
        Self::list_by_user(pool, user_id).await
    }
}
