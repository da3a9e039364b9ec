//! Import models: the import header, its items, and queue messages.

use chrono::NaiveDate;
use plotwist_core::enums::{ImportItemStatus, ImportProvider, ImportStatus, UserItemStatus};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_imports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserImport {
    pub id: DbId,
    pub user_id: DbId,
    pub items_count: i32,
    pub import_status: ImportStatus,
    pub provider: ImportProvider,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `import_movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportMovie {
    pub id: DbId,
    pub import_id: DbId,
    pub name: String,
    pub end_date: Option<NaiveDate>,
    pub item_status: UserItemStatus,
    pub import_status: ImportItemStatus,
    pub tmdb_id: Option<TmdbId>,
    pub metadata: serde_json::Value,
}

/// A row from the `import_series` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImportSeries {
    pub id: DbId,
    pub import_id: DbId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub item_status: UserItemStatus,
    pub import_status: ImportItemStatus,
    pub tmdb_id: Option<TmdbId>,
    pub watched_episodes: Option<i32>,
    pub series_episodes: Option<i32>,
    pub metadata: serde_json::Value,
}

/// An import with every item it created.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedImport {
    #[serde(flatten)]
    pub import: UserImport,
    pub movies: Vec<ImportMovie>,
    pub series: Vec<ImportSeries>,
}

/// A message leased from `import_queue_messages`.
#[derive(Debug, Clone, FromRow)]
pub struct QueueMessage {
    pub id: DbId,
    pub queue: String,
    pub body: serde_json::Value,
    pub enqueued_at: Timestamp,
    pub receive_count: i32,
}
