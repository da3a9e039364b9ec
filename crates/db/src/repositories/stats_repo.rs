//! Aggregate queries behind the user statistics endpoints.

use plotwist_core::enums::MediaType;
use plotwist_core::stats::period::DateRange;
use plotwist_core::types::{DbId, TmdbId};
use sqlx::PgPool;

use crate::models::stats::{EpisodeRuntime, SeriesEpisodeCount, WatchedTitle};

/// When a watched title counts as watched: its latest viewing, or the last
/// status change when no viewing was recorded.
const WATCHED_AT_SQL: &str = "COALESCE( \
    (SELECT MAX(we.watched_at) FROM watch_entries we WHERE we.user_item_id = ui.id), \
    ui.updated_at)";

pub struct StatsRepo;

impl StatsRepo {
    pub async fn watched_movies_count(
        pool: &PgPool,
        user_id: DbId,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        Self::watched_count(pool, user_id, MediaType::Movie, range).await
    }

    pub async fn watched_series_count(
        pool: &PgPool,
        user_id: DbId,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        Self::watched_count(pool, user_id, MediaType::TvShow, range).await
    }

    async fn watched_count(
        pool: &PgPool,
        user_id: DbId,
        media_type: MediaType,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM user_items ui \
             WHERE ui.user_id = $1 AND ui.media_type = $2 AND ui.status = 'WATCHED' \
               AND ($3::timestamptz IS NULL OR {WATCHED_AT_SQL} >= $3) \
               AND ($4::timestamptz IS NULL OR {WATCHED_AT_SQL} <= $4)"
        );
        sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(media_type)
            .bind(range.start)
            .bind(range.end)
            .fetch_one(pool)
            .await
    }

    pub async fn watched_episodes_count(
        pool: &PgPool,
        user_id: DbId,
        range: &DateRange,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_episodes \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR watched_at >= $2) \
               AND ($3::timestamptz IS NULL OR watched_at <= $3)",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_one(pool)
        .await
    }

    /// Series with the most watched episodes.
    pub async fn most_watched_series(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        range: &DateRange,
    ) -> Result<Vec<SeriesEpisodeCount>, sqlx::Error> {
        sqlx::query_as::<_, SeriesEpisodeCount>(
            "SELECT tmdb_id, COUNT(*) AS episodes FROM user_episodes \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR watched_at >= $2) \
               AND ($3::timestamptz IS NULL OR watched_at <= $3) \
             GROUP BY tmdb_id \
             ORDER BY episodes DESC, tmdb_id \
             LIMIT $4",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Watched titles with the time they count as watched.
    pub async fn watched_titles(
        pool: &PgPool,
        user_id: DbId,
        media_type: Option<MediaType>,
        range: &DateRange,
    ) -> Result<Vec<WatchedTitle>, sqlx::Error> {
        let query = format!(
            "SELECT tmdb_id, media_type, watched_at FROM ( \
                SELECT ui.tmdb_id, ui.media_type, {WATCHED_AT_SQL} AS watched_at \
                FROM user_items ui \
                WHERE ui.user_id = $1 AND ui.status = 'WATCHED' \
                  AND ($2::media_type IS NULL OR ui.media_type = $2) \
             ) t \
             WHERE ($3::timestamptz IS NULL OR t.watched_at >= $3) \
               AND ($4::timestamptz IS NULL OR t.watched_at <= $4) \
             ORDER BY t.watched_at DESC"
        );
        sqlx::query_as::<_, WatchedTitle>(&query)
            .bind(user_id)
            .bind(media_type)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }

    /// Watched episodes with their runtimes.
    pub async fn episode_runtimes(
        pool: &PgPool,
        user_id: DbId,
        range: &DateRange,
    ) -> Result<Vec<EpisodeRuntime>, sqlx::Error> {
        sqlx::query_as::<_, EpisodeRuntime>(
            "SELECT tmdb_id, runtime, watched_at FROM user_episodes \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR watched_at >= $2) \
               AND ($3::timestamptz IS NULL OR watched_at <= $3) \
             ORDER BY watched_at",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }

    /// Distinct series with at least one episode watched in the range.
    pub async fn series_with_episodes(
        pool: &PgPool,
        user_id: DbId,
        range: &DateRange,
    ) -> Result<Vec<TmdbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT tmdb_id FROM user_episodes \
             WHERE user_id = $1 \
               AND ($2::timestamptz IS NULL OR watched_at >= $2) \
               AND ($3::timestamptz IS NULL OR watched_at <= $3) \
             ORDER BY tmdb_id",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(pool)
        .await
    }
}
