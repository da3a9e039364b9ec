//! Aggregate rows used by the statistics endpoints.

use plotwist_core::enums::MediaType;
use plotwist_core::types::{Timestamp, TmdbId};
use serde::Serialize;
use sqlx::FromRow;

/// Episodes watched per series.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeriesEpisodeCount {
    pub tmdb_id: TmdbId,
    pub episodes: i64,
}

/// A watched title with the time it was last marked watched.
#[derive(Debug, Clone, FromRow)]
pub struct WatchedTitle {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub watched_at: Timestamp,
}

/// One watched episode with its runtime, for hour totals.
#[derive(Debug, Clone, FromRow)]
pub struct EpisodeRuntime {
    pub tmdb_id: TmdbId,
    pub runtime: i32,
    pub watched_at: Timestamp,
}
