//! User statistics: reporting periods and the pure aggregations over watched
//! titles. Data loading and caching live in the API crate.

pub mod breakdown;
pub mod period;

/// How far back the stats timeline scans before giving up, in months.
pub const MAX_TIMELINE_SCAN_MONTHS: u32 = 24;

/// Default number of non-empty months per timeline page.
pub const DEFAULT_TIMELINE_PAGE_SIZE: u32 = 3;

/// Largest timeline page a client may request.
pub const MAX_TIMELINE_PAGE_SIZE: u32 = 10;

/// Number of series reported by the most-watched-series statistic.
pub const MOST_WATCHED_SERIES_LIMIT: i64 = 5;

/// Clamp a requested timeline page size into `1..=MAX_TIMELINE_PAGE_SIZE`.
pub fn clamp_timeline_page_size(page_size: Option<u32>) -> u32 {
    page_size
        .unwrap_or(DEFAULT_TIMELINE_PAGE_SIZE)
        .clamp(1, MAX_TIMELINE_PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_page_size_bounds() {
        assert_eq!(clamp_timeline_page_size(None), 3);
        assert_eq!(clamp_timeline_page_size(Some(0)), 1);
        assert_eq!(clamp_timeline_page_size(Some(50)), 10);
    }
}
