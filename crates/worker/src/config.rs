//! Worker configuration loaded from environment variables.

use std::time::Duration;

/// Default delay between two polls of an import queue.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Feature flags and timing for the import consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Run the `import-movies` consumer.
    pub enable_movies: bool,
    /// Run the `import-series` consumer.
    pub enable_series: bool,
    pub poll_interval: Duration,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            enable_movies: false,
            enable_series: false,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl ImportConfig {
    /// Load from `ENABLE_IMPORT_MOVIES`, `ENABLE_IMPORT_SERIES` and
    /// `IMPORT_POLL_INTERVAL_MS`. Unset or unparseable values fall back to
    /// the defaults (both consumers off, one second between polls).
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |key: &str| lookup(key).is_some_and(|v| parse_flag(&v));
        let poll_ms = lookup("IMPORT_POLL_INTERVAL_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POLL_INTERVAL_MS);

        Self {
            enable_movies: flag("ENABLE_IMPORT_MOVIES"),
            enable_series: flag("ENABLE_IMPORT_SERIES"),
            poll_interval: Duration::from_millis(poll_ms.max(1)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
