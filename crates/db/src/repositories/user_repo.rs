//! Repository for the `users` and `user_preferences` tables.

use plotwist_core::accounts::{deleted_email, deleted_username};
use plotwist_core::types::DbId;
use sqlx::PgPool;

use super::SUBSCRIPTION_TYPE_SQL;
use crate::models::user::{CreateUser, UpdateProfile, UpsertPreferences, User, UserPreferences};

/// User columns, read from a relation aliased `u`.
const FIELDS: &str = "u.id, u.username, u.email, u.password_hash, u.display_name, \
                      u.biography, u.avatar_url, u.banner_url, u.is_legacy, u.created_at";

const PREFERENCE_COLUMNS: &str =
    "user_id, watch_region, watch_providers_ids, media_types, updated_at";

/// Maximum rows returned by [`UserRepo::search_by_username`].
pub const SEARCH_LIMIT: i64 = 10;

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. New accounts are always members.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH u AS ( \
                INSERT INTO users (username, email, password_hash, display_name) \
                VALUES ($1, $2, $3, $4) \
                RETURNING * \
             ) \
             SELECT {FIELDS}, 'MEMBER'::subscription_type AS subscription_type FROM u"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a live (not soft-deleted) user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM users u WHERE u.id = $1 AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup by e-mail.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM users u WHERE LOWER(u.email) = LOWER($1) AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup by username.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM users u WHERE LOWER(u.username) = LOWER($1) AND u.deleted_at IS NULL"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Lookup by e-mail or username, for sign-in.
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM users u \
             WHERE (LOWER(u.email) = LOWER($1) OR LOWER(u.username) = LOWER($1)) \
               AND u.deleted_at IS NULL \
             LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    /// Users whose name starts with `prefix`, case-insensitively.
    pub async fn search_by_username(
        pool: &PgPool,
        prefix: &str,
    ) -> Result<Vec<User>, sqlx::Error> {
        let escaped = prefix
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let query = format!(
            "SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type \
             FROM users u \
             WHERE u.username ILIKE $1 AND u.deleted_at IS NULL \
             ORDER BY u.username \
             LIMIT $2"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(format!("{escaped}%"))
            .bind(SEARCH_LIMIT)
            .fetch_all(pool)
            .await
    }

    /// Apply a profile patch. Returns `None` when the user does not exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "WITH u AS ( \
                UPDATE users SET \
                    username = COALESCE($2, username), \
                    display_name = COALESCE($3, display_name), \
                    biography = COALESCE($4, biography), \
                    avatar_url = COALESCE($5, avatar_url), \
                    banner_url = COALESCE($6, banner_url) \
                WHERE id = $1 AND deleted_at IS NULL \
                RETURNING * \
             ) \
             SELECT {FIELDS}, {SUBSCRIPTION_TYPE_SQL} AS subscription_type FROM u"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(&input.biography)
            .bind(&input.avatar_url)
            .bind(&input.banner_url)
            .fetch_optional(pool)
            .await
    }

    /// Replace the password hash and clear the legacy flag.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, is_legacy = false \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Anonymize an account in place.
    ///
    /// Returns `false` if the user does not exist or is already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET \
                email = $2, \
                username = $3, \
                display_name = NULL, \
                avatar_url = NULL, \
                banner_url = NULL, \
                biography = NULL, \
                password_hash = 'DELETED', \
                deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(deleted_email(&id))
        .bind(deleted_username(&id))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get_preferences(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserPreferences>, sqlx::Error> {
        let query = format!("SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1");
        sqlx::query_as::<_, UserPreferences>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create or patch the user's preferences. `None` fields keep their
    /// current value.
    pub async fn upsert_preferences(
        pool: &PgPool,
        user_id: DbId,
        input: &UpsertPreferences,
    ) -> Result<UserPreferences, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_preferences (user_id, watch_region, watch_providers_ids, media_types) \
             VALUES ($1, $2, COALESCE($3, '{{}}'::integer[]), COALESCE($4, '{{}}'::media_type[])) \
             ON CONFLICT (user_id) DO UPDATE SET \
                watch_region = COALESCE($2, user_preferences.watch_region), \
                watch_providers_ids = COALESCE($3, user_preferences.watch_providers_ids), \
                media_types = COALESCE($4, user_preferences.media_types), \
                updated_at = NOW() \
             RETURNING {PREFERENCE_COLUMNS}"
        );
        sqlx::query_as::<_, UserPreferences>(&query)
            .bind(user_id)
            .bind(&input.watch_region)
            .bind(&input.watch_providers_ids)
            .bind(&input.media_types)
            .fetch_one(pool)
            .await
    }
}
