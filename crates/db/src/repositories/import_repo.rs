//! Repository for `user_imports`, `import_movies` and `import_series`.

use chrono::NaiveDate;
use plotwist_core::enums::{ImportItemStatus, ImportStatus, UserItemStatus};
use plotwist_core::imports::DecodedImport;
use plotwist_core::types::{DbId, TmdbId};
use sqlx::PgPool;

use crate::models::import::{DetailedImport, ImportMovie, ImportSeries, UserImport};

const IMPORT_COLUMNS: &str =
    "id, user_id, items_count, import_status, provider, created_at, updated_at";

const MOVIE_COLUMNS: &str =
    "id, import_id, name, end_date, item_status, import_status, tmdb_id, metadata";

const SERIES_COLUMNS: &str = "id, import_id, name, start_date, end_date, item_status, \
                              import_status, tmdb_id, watched_episodes, series_episodes, metadata";

pub struct ImportRepo;

impl ImportRepo {
    /// Persist a decoded import and all of its items in one transaction.
    ///
    /// Fails with a foreign-key violation when `user_id` does not exist.
    pub async fn create_with_items(
        pool: &PgPool,
        user_id: DbId,
        decoded: &DecodedImport,
    ) -> Result<DetailedImport, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO user_imports (user_id, items_count, import_status, provider) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {IMPORT_COLUMNS}"
        );
        // Nothing will ever be queued for an empty export.
        let status = if decoded.items_count() == 0 {
            ImportStatus::Completed
        } else {
            ImportStatus::NotStarted
        };
        let import = sqlx::query_as::<_, UserImport>(&query)
            .bind(user_id)
            .bind(decoded.items_count())
            .bind(status)
            .bind(decoded.provider)
            .fetch_one(&mut *tx)
            .await?;

        let movies = if decoded.movies.is_empty() {
            Vec::new()
        } else {
            let names: Vec<&str> = decoded.movies.iter().map(|m| m.name.as_str()).collect();
            let end_dates: Vec<Option<NaiveDate>> =
                decoded.movies.iter().map(|m| m.end_date).collect();
            let statuses: Vec<UserItemStatus> =
                decoded.movies.iter().map(|m| m.item_status).collect();
            let metadata: Vec<serde_json::Value> =
                decoded.movies.iter().map(|m| m.metadata.clone()).collect();

            let query = format!(
                "INSERT INTO import_movies (import_id, name, position, end_date, item_status, metadata) \
                 SELECT $1, t.name, t.ord::int, t.end_date, t.item_status, t.metadata \
                 FROM UNNEST($2::text[], $3::date[], $4::user_item_status[], $5::jsonb[]) \
                    WITH ORDINALITY AS t(name, end_date, item_status, metadata, ord) \
                 ORDER BY t.ord \
                 RETURNING {MOVIE_COLUMNS}"
            );
            sqlx::query_as::<_, ImportMovie>(&query)
                .bind(import.id)
                .bind(&names)
                .bind(&end_dates)
                .bind(&statuses)
                .bind(&metadata)
                .fetch_all(&mut *tx)
                .await?
        };

        let series = if decoded.series.is_empty() {
            Vec::new()
        } else {
            let names: Vec<&str> = decoded.series.iter().map(|s| s.name.as_str()).collect();
            let start_dates: Vec<Option<NaiveDate>> =
                decoded.series.iter().map(|s| s.start_date).collect();
            let end_dates: Vec<Option<NaiveDate>> =
                decoded.series.iter().map(|s| s.end_date).collect();
            let statuses: Vec<UserItemStatus> =
                decoded.series.iter().map(|s| s.item_status).collect();
            let watched: Vec<Option<i32>> =
                decoded.series.iter().map(|s| s.watched_episodes).collect();
            let totals: Vec<Option<i32>> =
                decoded.series.iter().map(|s| s.series_episodes).collect();
            let metadata: Vec<serde_json::Value> =
                decoded.series.iter().map(|s| s.metadata.clone()).collect();

            let query = format!(
                "INSERT INTO import_series \
                    (import_id, name, position, start_date, end_date, item_status, \
                     watched_episodes, series_episodes, metadata) \
                 SELECT $1, t.name, t.ord::int, t.start_date, t.end_date, t.item_status, \
                        t.watched_episodes, t.series_episodes, t.metadata \
                 FROM UNNEST($2::text[], $3::date[], $4::date[], $5::user_item_status[], \
                             $6::int[], $7::int[], $8::jsonb[]) \
                    WITH ORDINALITY AS t(name, start_date, end_date, item_status, \
                                         watched_episodes, series_episodes, metadata, ord) \
                 ORDER BY t.ord \
                 RETURNING {SERIES_COLUMNS}"
            );
            sqlx::query_as::<_, ImportSeries>(&query)
                .bind(import.id)
                .bind(&names)
                .bind(&start_dates)
                .bind(&end_dates)
                .bind(&statuses)
                .bind(&watched)
                .bind(&totals)
                .bind(&metadata)
                .fetch_all(&mut *tx)
                .await?
        };

        tx.commit().await?;
        Ok(DetailedImport {
            import,
            movies,
            series,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserImport>, sqlx::Error> {
        let query = format!("SELECT {IMPORT_COLUMNS} FROM user_imports WHERE id = $1");
        sqlx::query_as::<_, UserImport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// An import with its movies and series.
    pub async fn find_detailed(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DetailedImport>, sqlx::Error> {
        let Some(import) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let query = format!(
            "SELECT {MOVIE_COLUMNS} FROM import_movies WHERE import_id = $1 ORDER BY position"
        );
        let movies = sqlx::query_as::<_, ImportMovie>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        let query = format!(
            "SELECT {SERIES_COLUMNS} FROM import_series WHERE import_id = $1 ORDER BY position"
        );
        let series = sqlx::query_as::<_, ImportSeries>(&query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(DetailedImport {
            import,
            movies,
            series,
        }))
    }

    /// A user's imports, newest first.
    pub async fn list_by_user(pool: &PgPool, user_id: DbId) -> Result<Vec<UserImport>, sqlx::Error> {
        let query = format!(
            "SELECT {IMPORT_COLUMNS} FROM user_imports WHERE user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, UserImport>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_movie(pool: &PgPool, id: DbId) -> Result<Option<ImportMovie>, sqlx::Error> {
        let query = format!("SELECT {MOVIE_COLUMNS} FROM import_movies WHERE id = $1");
        sqlx::query_as::<_, ImportMovie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_series(pool: &PgPool, id: DbId) -> Result<Option<ImportSeries>, sqlx::Error> {
        let query = format!("SELECT {SERIES_COLUMNS} FROM import_series WHERE id = $1");
        sqlx::query_as::<_, ImportSeries>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Record the outcome of matching one movie.
    pub async fn update_movie_status(
        pool: &PgPool,
        id: DbId,
        status: ImportItemStatus,
        tmdb_id: Option<TmdbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_movies SET import_status = $2, tmdb_id = COALESCE($3, tmdb_id), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(tmdb_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the outcome of matching one series.
    pub async fn update_series_status(
        pool: &PgPool,
        id: DbId,
        status: ImportItemStatus,
        tmdb_id: Option<TmdbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE import_series SET import_status = $2, tmdb_id = COALESCE($3, tmdb_id), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(tmdb_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Roll item outcomes up into the import status.
    ///
    /// `COMPLETED` once no item is pending, `PARTIAL` while some are done
    /// and some pending. The import row is locked for the duration so
    /// concurrent consumers finalize one at a time.
    pub async fn finalize_if_done(
        pool: &PgPool,
        import_id: DbId,
    ) -> Result<Option<ImportStatus>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<ImportStatus> =
            sqlx::query_scalar("SELECT import_status FROM user_imports WHERE id = $1 FOR UPDATE")
                .bind(import_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(current) = current else {
            return Ok(None);
        };

        let (pending, finished): (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM import_movies \
                  WHERE import_id = $1 AND import_status NOT IN ('COMPLETED', 'FAILED')) \
              + (SELECT COUNT(*) FROM import_series \
                  WHERE import_id = $1 AND import_status NOT IN ('COMPLETED', 'FAILED')), \
                (SELECT COUNT(*) FROM import_movies \
                  WHERE import_id = $1 AND import_status IN ('COMPLETED', 'FAILED')) \
              + (SELECT COUNT(*) FROM import_series \
                  WHERE import_id = $1 AND import_status IN ('COMPLETED', 'FAILED'))",
        )
        .bind(import_id)
        .fetch_one(&mut *tx)
        .await?;

        let next = if pending == 0 {
            ImportStatus::Completed
        } else if finished > 0 {
            ImportStatus::Partial
        } else {
            current
        };

        if next != current {
            sqlx::query(
                "UPDATE user_imports SET import_status = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(import_id)
            .bind(next)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(next))
    }
}
