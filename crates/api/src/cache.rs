//! Redis cache for the statistics endpoints.
//!
//! Entries live under `user-stats:{user_id}:{kind}:{language}:{period}` and
//! expire after an hour. Cache failures are logged and treated as misses so
//! stats keep working while Redis is unavailable.

use std::fmt;
use std::time::Duration;

use plotwist_core::enums::Language;
use plotwist_core::types::DbId;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Lifetime of a cached statistic.
pub const STATS_TTL: Duration = Duration::from_secs(60 * 60);

/// Cache key for one statistic of one user.
pub fn stats_key(user_id: DbId, kind: &str, language: Language, period: &str) -> String {
    format!("user-stats:{user_id}:{kind}:{language}:{period}")
}

/// Pattern matching every cached statistic of a user.
pub fn user_pattern(user_id: DbId) -> String {
    format!("user-stats:{user_id}:*")
}

#[derive(Clone)]
pub struct StatsCache {
    conn: ConnectionManager,
}

impl fmt::Debug for StatsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsCache")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl StatsCache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Connected to Redis stats cache");
        Ok(Self { conn })
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(key, error = %e, "Stats cache GET failed");
                return None;
            }
        };

        let json = data?;
        match serde_json::from_str(&json) {
            Ok(value) => {
                tracing::debug!(key, "Stats cache hit");
                Some(value)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable stats cache entry");
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize stats cache entry");
                return;
            }
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(key, json, STATS_TTL.as_secs())
            .await
        {
            tracing::warn!(key, error = %e, "Stats cache SET failed");
        }
    }

    pub async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }

    /// Drop every cached statistic of a user.
    pub async fn invalidate_user(&self, user_id: DbId) {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = match conn.keys(user_pattern(user_id)).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Stats cache KEYS failed");
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = conn.del::<_, ()>(keys).await {
            tracing::warn!(%user_id, error = %e, "Stats cache invalidation failed");
        }
    }
}

/// Serve `key` from the cache when possible, otherwise compute and store it.
pub async fn cached<T, F, Fut, E>(cache: Option<&StatsCache>, key: String, compute: F) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    if let Some(cache) = cache {
        if let Some(hit) = cache.get::<T>(&key).await {
            return Ok(hit);
        }
    }

    let value = compute().await?;
    if let Some(cache) = cache {
        cache.set(&key, &value).await;
    }
    Ok(value)
}
