//! Route definitions for per-user statistics. All are public.

use axum::routing::get;
use axum::Router;

use crate::handlers::stats;
use crate::state::AppState;

/// ```text
/// GET    /user/{id}/stats                 -> user_stats
/// GET    /user/{id}/total-hours           -> total_hours
/// GET    /user/{id}/reviews-count         -> reviews_count
/// GET    /user/{id}/most-watched-series   -> most_watched_series
/// GET    /user/{id}/watched-genres        -> watched_genres
/// GET    /user/{id}/watched-cast          -> watched_cast
/// GET    /user/{id}/best-reviews          -> best_reviews
/// GET    /user/{id}/items-status          -> items_status
/// GET    /user/{id}/stats-timeline        -> stats_timeline
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{id}/stats", get(stats::user_stats))
        .route("/user/{id}/total-hours", get(stats::total_hours))
        .route("/user/{id}/reviews-count", get(stats::reviews_count))
        .route("/user/{id}/most-watched-series", get(stats::most_watched_series))
        .route("/user/{id}/watched-genres", get(stats::watched_genres))
        .route("/user/{id}/watched-cast", get(stats::watched_cast))
        .route("/user/{id}/best-reviews", get(stats::best_reviews))
        .route("/user/{id}/items-status", get(stats::items_status))
        .route("/user/{id}/stats-timeline", get(stats::stats_timeline))
}
