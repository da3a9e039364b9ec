//! Watch-history import: decoders for provider exports, status mapping,
//! TMDB candidate matching, and the queue message contract shared by the API
//! (producer) and the worker (consumer).

pub mod letterboxd;
pub mod matching;
pub mod my_anime_list;

use std::io::Read;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enums::{ImportProvider, UserItemStatus};
use crate::types::DbId;

/// Queue carrying imported movies to the worker.
pub const IMPORT_MOVIES_QUEUE: &str = "import-movies";

/// Queue carrying imported series to the worker.
pub const IMPORT_SERIES_QUEUE: &str = "import-series";

/// Largest decompressed export accepted, in bytes.
pub const MAX_DECOMPRESSED_BYTES: u64 = 64 * 1024 * 1024;

/// Read `reader` into a string, or `None` once it yields more than `limit`
/// bytes.
pub(crate) fn read_capped(reader: impl Read, limit: u64) -> std::io::Result<Option<String>> {
    let mut content = String::new();
    reader.take(limit + 1).read_to_string(&mut content)?;
    Ok((content.len() as u64 <= limit).then_some(content))
}

/// A movie parsed from a provider export, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportMovieDraft {
    pub name: String,
    pub end_date: Option<NaiveDate>,
    pub item_status: UserItemStatus,
    /// The raw provider record, kept for matching hints.
    pub metadata: serde_json::Value,
}

/// A series parsed from a provider export, not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSeriesDraft {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub watched_episodes: Option<i32>,
    pub series_episodes: Option<i32>,
    pub item_status: UserItemStatus,
    pub metadata: serde_json::Value,
}

/// Result of decoding one uploaded export.
#[derive(Debug, Clone)]
pub struct DecodedImport {
    pub provider: ImportProvider,
    pub movies: Vec<ImportMovieDraft>,
    pub series: Vec<ImportSeriesDraft>,
}

impl DecodedImport {
    pub fn items_count(&self) -> i32 {
        (self.movies.len() + self.series.len()) as i32
    }
}

/// Body of one queue message: a single import item to resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportMessage {
    /// Id of the `import_movies` / `import_series` row.
    pub id: DbId,
    pub name: String,
    pub provider: ImportProvider,
    pub user_id: DbId,
}

/// Decode an uploaded export for the given provider.
pub fn decode(
    provider: ImportProvider,
    bytes: &[u8],
) -> Result<DecodedImport, crate::error::CoreError> {
    match provider {
        ImportProvider::Letterboxd => letterboxd::decode(bytes),
        ImportProvider::MyAnimeList => my_anime_list::decode(bytes),
    }
}

/// Parse an export date. `0000-00-00`, empty, and unparseable values mean
/// "unknown".
pub(crate) fn parse_export_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() || value == "0000-00-00" {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}
