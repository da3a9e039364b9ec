//! Repository for the `user_episodes` table.

use plotwist_core::types::{DbId, Timestamp, TmdbId};
use sqlx::PgPool;

use crate::models::user_item::{CreateUserEpisode, UserEpisode};

const COLUMNS: &str =
    "id, user_id, tmdb_id, season_number, episode_number, runtime, watched_at";

pub struct UserEpisodeRepo;

impl UserEpisodeRepo {
    /// Mark episodes as watched. Episodes already marked are left untouched
    /// and not returned.
    pub async fn create_many(
        pool: &PgPool,
        user_id: DbId,
        episodes: &[CreateUserEpisode],
    ) -> Result<Vec<UserEpisode>, sqlx::Error> {
        let tmdb_ids: Vec<TmdbId> = episodes.iter().map(|e| e.tmdb_id).collect();
        let seasons: Vec<i32> = episodes.iter().map(|e| e.season_number).collect();
        let numbers: Vec<i32> = episodes.iter().map(|e| e.episode_number).collect();
        let runtimes: Vec<i32> = episodes.iter().map(|e| e.runtime).collect();
        let watched: Vec<Option<Timestamp>> = episodes.iter().map(|e| e.watched_at).collect();

        let query = format!(
            "INSERT INTO user_episodes \
                (user_id, tmdb_id, season_number, episode_number, runtime, watched_at) \
             SELECT $1, t.tmdb_id, t.season_number, t.episode_number, t.runtime, \
                    COALESCE(t.watched_at, NOW()) \
             FROM UNNEST($2::int[], $3::int[], $4::int[], $5::int[], $6::timestamptz[]) \
                AS t(tmdb_id, season_number, episode_number, runtime, watched_at) \
             ON CONFLICT ON CONSTRAINT uq_user_episodes_episode DO NOTHING \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserEpisode>(&query)
            .bind(user_id)
            .bind(&tmdb_ids)
            .bind(&seasons)
            .bind(&numbers)
            .bind(&runtimes)
            .bind(&watched)
            .fetch_all(pool)
            .await
    }

    /// Watched episodes of a user, optionally for one series or date range.
    pub async fn list(
        pool: &PgPool,
        user_id: DbId,
        tmdb_id: Option<TmdbId>,
        start_date: Option<Timestamp>,
        end_date: Option<Timestamp>,
    ) -> Result<Vec<UserEpisode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_episodes \
             WHERE user_id = $1 \
               AND ($2::int IS NULL OR tmdb_id = $2) \
               AND ($3::timestamptz IS NULL OR watched_at >= $3) \
               AND ($4::timestamptz IS NULL OR watched_at <= $4) \
             ORDER BY tmdb_id, season_number, episode_number"
        );
        sqlx::query_as::<_, UserEpisode>(&query)
            .bind(user_id)
            .bind(tmdb_id)
            .bind(start_date)
            .bind(end_date)
            .fetch_all(pool)
            .await
    }

    /// Delete episodes by id, scoped to the owner. Returns the removed rows.
    pub async fn delete_many(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<UserEpisode>, sqlx::Error> {
        let query = format!(
            "DELETE FROM user_episodes WHERE user_id = $1 AND id = ANY($2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserEpisode>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }
}
