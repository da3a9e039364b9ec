//! Cursor pagination helpers.
//!
//! Repositories fetch `page_size + 1` rows ordered by a timestamp. When the
//! extra row exists it is dropped from the page and its timestamp becomes the
//! cursor for the next request.

use chrono::SecondsFormat;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default number of rows per cursor page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Maximum number of rows per cursor page.
pub const MAX_PAGE_SIZE: i64 = 100;

/// One page of rows plus the cursor for the next page, if any.
#[derive(Debug, Clone, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Format a timestamp as a cursor (RFC 3339, millisecond precision).
pub fn format_cursor(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a cursor previously produced by [`format_cursor`].
pub fn parse_cursor(cursor: &str) -> Result<Timestamp, CoreError> {
    chrono::DateTime::parse_from_rfc3339(cursor)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| CoreError::Validation(format!("Invalid cursor '{cursor}'")))
}

/// Build a page from `page_size + 1` fetched rows.
pub fn paginate<T>(
    mut rows: Vec<T>,
    page_size: i64,
    cursor_of: impl Fn(&T) -> Timestamp,
) -> CursorPage<T> {
    let page_size = page_size.max(0) as usize;
    let next_cursor = if rows.len() > page_size {
        let extra = rows.split_off(page_size);
        extra.first().map(|row| format_cursor(&cursor_of(row)))
    } else {
        None
    };
    CursorPage {
        items: rows,
        next_cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn stamps(n: i64) -> Vec<Timestamp> {
        let base = Utc.with_ymd_and_hms(2025, 4, 10, 12, 0, 0).unwrap();
        (0..n).map(|i| base - Duration::minutes(i)).collect()
    }

    #[test]
    fn full_page_with_extra_row_sets_cursor() {
        let rows = stamps(4);
        let page = paginate(rows.clone(), 3, |ts| *ts);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.next_cursor, Some(format_cursor(&rows[3])));
    }

    #[test]
    fn short_page_has_no_cursor() {
        let page = paginate(stamps(2), 3, |ts| *ts);
        assert_eq!(page.items.len(), 2);
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn cursor_round_trips_at_millisecond_precision() {
        let ts = Utc.timestamp_millis_opt(1_744_286_400_123).unwrap();
        let cursor = format_cursor(&ts);
        assert_eq!(cursor, "2025-04-10T12:00:00.123Z");
        assert_eq!(parse_cursor(&cursor).unwrap(), ts);
    }

    #[test]
    fn invalid_cursor_is_validation_error() {
        assert!(matches!(
            parse_cursor("yesterday"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(5_000)), MAX_PAGE_SIZE);
    }
}
