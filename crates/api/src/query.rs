//! Shared query parameter types for API handlers.

use plotwist_core::enums::Language;
use plotwist_core::error::CoreError;
use plotwist_core::pagination::{clamp_page_size, parse_cursor};
use plotwist_core::stats::period::StatsPeriod;
use plotwist_core::types::Timestamp;
use serde::Deserialize;

/// Cursor pagination parameters (`?cursor=&page_size=`).
#[derive(Debug, Default, Deserialize)]
pub struct CursorParams {
    pub cursor: Option<String>,
    pub page_size: Option<i64>,
}

impl CursorParams {
    /// Parse the cursor and clamp the page size.
    pub fn resolve(&self) -> Result<(Option<Timestamp>, i64), CoreError> {
        resolve_page(self.cursor.as_deref(), self.page_size)
    }
}

/// [`CursorParams::resolve`] for query structs that carry `cursor` and
/// `page_size` next to their own filters.
pub fn resolve_page(
    cursor: Option<&str>,
    page_size: Option<i64>,
) -> Result<(Option<Timestamp>, i64), CoreError> {
    let cursor = cursor.map(parse_cursor).transpose()?;
    Ok((cursor, clamp_page_size(page_size)))
}

/// `?period=&language=` accepted by every statistics endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub period: Option<String>,
    pub language: Option<Language>,
}

impl StatsParams {
    pub fn period(&self) -> Result<StatsPeriod, CoreError> {
        self.period
            .as_deref()
            .map(StatsPeriod::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    pub fn language(&self) -> Language {
        self.language.unwrap_or_default()
    }
}
