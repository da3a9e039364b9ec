//! Repository for the `user_activities` table.

use plotwist_core::enums::{ActivityType, LikeEntity};
use plotwist_core::pagination::{paginate, CursorPage};
use plotwist_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use super::user_summary_json;
use crate::models::activity::{Activity, ActivityFeedItem, CreateActivity};

const COLUMNS: &str = "id, user_id, activity_type, entity_id, entity_type, metadata, created_at";

/// Per-type resolution of the entity an activity points at, for the row
/// aliased `a`.
const ADDITIONAL_INFO_SQL: &str = "\
    CASE a.activity_type \
      WHEN 'FOLLOW_USER' THEN ( \
        SELECT json_build_object('id', fu.id, 'username', fu.username, \
                                 'display_name', fu.display_name, 'avatar_url', fu.avatar_url) \
        FROM users fu WHERE fu.id = (a.metadata->>'followed_id')::uuid) \
      WHEN 'CREATE_LIST' THEN ( \
        SELECT json_build_object('id', l.id, 'title', l.title) FROM lists l WHERE l.id = a.entity_id) \
      WHEN 'LIKE_LIST' THEN ( \
        SELECT json_build_object('id', l.id, 'title', l.title) FROM lists l WHERE l.id = a.entity_id) \
      WHEN 'CREATE_REVIEW' THEN ( \
        SELECT json_build_object('id', r.id, 'review', r.review, 'rating', r.rating, \
                                 'tmdb_id', r.tmdb_id, 'media_type', r.media_type, \
                                 'season_number', r.season_number, 'episode_number', r.episode_number, \
                                 'author', json_build_object('id', ru.id, 'username', ru.username, \
                                                            'avatar_url', ru.avatar_url)) \
        FROM reviews r JOIN users ru ON ru.id = r.user_id WHERE r.id = a.entity_id) \
      WHEN 'LIKE_REVIEW' THEN ( \
        SELECT json_build_object('id', r.id, 'review', r.review, 'rating', r.rating, \
                                 'tmdb_id', r.tmdb_id, 'media_type', r.media_type, \
                                 'season_number', r.season_number, 'episode_number', r.episode_number, \
                                 'author', json_build_object('id', ru.id, 'username', ru.username, \
                                                            'avatar_url', ru.avatar_url)) \
        FROM reviews r JOIN users ru ON ru.id = r.user_id WHERE r.id = a.entity_id) \
      WHEN 'CREATE_REPLY' THEN ( \
        SELECT json_build_object('id', rr.id, 'reply', rr.reply, \
                                 'author', json_build_object('id', pu.id, 'username', pu.username, \
                                                            'avatar_url', pu.avatar_url), \
                                 'review', json_build_object('id', r.id, 'tmdb_id', r.tmdb_id, \
                                                            'media_type', r.media_type, \
                                                            'author', json_build_object( \
                                                              'id', ru.id, 'username', ru.username, \
                                                              'avatar_url', ru.avatar_url))) \
        FROM review_replies rr \
        JOIN users pu ON pu.id = rr.user_id \
        JOIN reviews r ON r.id = rr.review_id \
        JOIN users ru ON ru.id = r.user_id \
        WHERE rr.id = a.entity_id) \
      WHEN 'LIKE_REPLY' THEN ( \
        SELECT json_build_object('id', rr.id, 'reply', rr.reply, \
                                 'author', json_build_object('id', pu.id, 'username', pu.username, \
                                                            'avatar_url', pu.avatar_url), \
                                 'review', json_build_object('id', r.id, 'tmdb_id', r.tmdb_id, \
                                                            'media_type', r.media_type, \
                                                            'author', json_build_object( \
                                                              'id', ru.id, 'username', ru.username, \
                                                              'avatar_url', ru.avatar_url))) \
        FROM review_replies rr \
        JOIN users pu ON pu.id = rr.user_id \
        JOIN reviews r ON r.id = rr.review_id \
        JOIN users ru ON ru.id = r.user_id \
        WHERE rr.id = a.entity_id) \
      WHEN 'ADD_ITEM' THEN json_build_object( \
        'tmdb_id', a.metadata->'tmdb_id', 'media_type', a.metadata->'media_type', \
        'list_id', a.entity_id, \
        'list_title', (SELECT l.title FROM lists l WHERE l.id = a.entity_id)) \
      WHEN 'DELETE_ITEM' THEN json_build_object( \
        'tmdb_id', a.metadata->'tmdb_id', 'media_type', a.metadata->'media_type', \
        'list_id', a.entity_id, \
        'list_title', (SELECT l.title FROM lists l WHERE l.id = a.entity_id)) \
      WHEN 'WATCH_EPISODE' THEN json_build_object('episodes', a.metadata) \
      WHEN 'CHANGE_STATUS' THEN json_build_object( \
        'tmdb_id', a.metadata->'tmdb_id', 'media_type', a.metadata->'media_type', \
        'status', a.metadata->'status') \
      ELSE NULL \
    END";

pub struct ActivityRepo;

impl ActivityRepo {
    pub async fn insert(pool: &PgPool, input: &CreateActivity) -> Result<Activity, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_activities (user_id, activity_type, entity_id, entity_type, metadata) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Activity>(&query)
            .bind(input.user_id)
            .bind(input.activity_type)
            .bind(input.entity_id)
            .bind(input.entity_type)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Activity>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_activities WHERE id = $1");
        sqlx::query_as::<_, Activity>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Cursor page of activities, newest first. `user_ids = None` lists
    /// everyone's activity.
    pub async fn list(
        pool: &PgPool,
        user_ids: Option<&[DbId]>,
        cursor: Option<Timestamp>,
        page_size: i64,
    ) -> Result<CursorPage<ActivityFeedItem>, sqlx::Error> {
        let query = format!(
            "SELECT a.id, a.user_id, a.activity_type, a.entity_id, a.entity_type, a.metadata, \
                    a.created_at, \
                    {owner} AS owner, \
                    {ADDITIONAL_INFO_SQL} AS additional_info \
             FROM user_activities a \
             JOIN users u ON u.id = a.user_id \
             WHERE ($1::uuid[] IS NULL OR a.user_id = ANY($1)) \
               AND ($2::timestamptz IS NULL OR DATE_TRUNC('milliseconds', a.created_at) <= $2) \
               AND u.deleted_at IS NULL \
             ORDER BY a.created_at DESC \
             LIMIT $3",
            owner = user_summary_json()
        );
        let rows = sqlx::query_as::<_, ActivityFeedItem>(&query)
            .bind(user_ids)
            .bind(cursor)
            .bind(page_size + 1)
            .fetch_all(pool)
            .await?;
        Ok(paginate(rows, page_size, |row| row.activity.created_at))
    }

    /// Delete the activities a user recorded for an entity, e.g. the
    /// `CREATE_REVIEW` of a deleted review.
    pub async fn delete_matching(
        pool: &PgPool,
        activity_type: ActivityType,
        entity_id: DbId,
        entity_type: Option<LikeEntity>,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_activities \
             WHERE activity_type = $1 AND entity_id = $2 \
               AND entity_type IS NOT DISTINCT FROM $3 \
               AND user_id = $4",
        )
        .bind(activity_type)
        .bind(entity_id)
        .bind(entity_type)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete the `FOLLOW_USER` activity of one follow.
    pub async fn delete_follow(
        pool: &PgPool,
        user_id: DbId,
        follower_id: DbId,
        followed_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_activities \
             WHERE user_id = $1 AND activity_type = 'FOLLOW_USER' \
               AND (metadata->>'follower_id')::uuid = $2 \
               AND (metadata->>'followed_id')::uuid = $3",
        )
        .bind(user_id)
        .bind(follower_id)
        .bind(followed_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one activity owned by `user_id`.
    pub async fn delete_by_id(pool: &PgPool, id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_activities WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
