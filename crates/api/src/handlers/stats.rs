//! Handlers for the user statistics endpoints.
//!
//! Every statistic accepts `?period=&language=` and is served from the
//! Redis cache when one is configured.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use plotwist_core::enums::Language;
use plotwist_core::error::CoreError;
use plotwist_core::stats::clamp_timeline_page_size;
use plotwist_core::stats::period::YearMonth;
use plotwist_core::types::DbId;
use plotwist_db::repositories::UserRepo;
use serde::Deserialize;

use crate::cache::{cached, stats_key};
use crate::error::AppResult;
use crate::query::StatsParams;
use crate::response::DataResponse;
use crate::services::stats::{
    self, BestReviews, ItemsStatus, MostWatchedSeriesList, ReviewsCount, StatsScope,
    StatsTimeline, TotalHours, UserStats, WatchedCast, WatchedGenres,
};
use crate::state::AppState;

/// Resolve the scope for `user_id`, failing with 404 for unknown users.
async fn scope(state: &AppState, user_id: DbId, language: Language) -> AppResult<StatsScope<'_>> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(CoreError::user_not_found)?;
    Ok(StatsScope {
        pool: &state.pool,
        metadata: state.metadata.as_ref(),
        user_id,
        language,
        now: Utc::now(),
    })
}

/// GET /api/v1/user/{id}/stats
pub async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<UserStats>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "stats", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::user_stats(&scope, &period)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/total-hours
pub async fn total_hours(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<TotalHours>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "total-hours", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::total_hours(&scope, &period)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/reviews-count
pub async fn reviews_count(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<ReviewsCount>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "reviews-count", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || stats::reviews_count(&scope)).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/most-watched-series
pub async fn most_watched_series(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<MostWatchedSeriesList>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "most-watched-series", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::most_watched_series(&scope, &period)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/watched-genres
pub async fn watched_genres(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<WatchedGenres>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "watched-genres", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::watched_genres(&scope, &period)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/watched-cast
pub async fn watched_cast(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<WatchedCast>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "watched-cast", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::watched_cast(&scope, &period)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/best-reviews
pub async fn best_reviews(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<BestReviews>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "best-reviews", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::best_reviews(&scope, &period, None)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/user/{id}/items-status
pub async fn items_status(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<StatsParams>,
) -> AppResult<Json<DataResponse<ItemsStatus>>> {
    let period = params.period()?;
    let scope = scope(&state, user_id, params.language()).await?;
    let key = stats_key(user_id, "items-status", scope.language, &period.to_string());
    let data = cached(state.stats_cache.as_ref(), key, || stats::items_status(&scope)).await?;
    Ok(Json(DataResponse { data }))
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    /// `YYYY-MM` month to start scanning from.
    pub cursor: Option<String>,
    pub page_size: Option<u32>,
    pub language: Option<Language>,
}

/// GET /api/v1/user/{id}/stats-timeline?cursor=&page_size=
pub async fn stats_timeline(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(params): Query<TimelineQuery>,
) -> AppResult<Json<DataResponse<StatsTimeline>>> {
    let cursor = params
        .cursor
        .as_deref()
        .map(|c| {
            YearMonth::parse(c)
                .ok_or_else(|| CoreError::Validation(format!("Invalid cursor '{c}', expected YYYY-MM")))
        })
        .transpose()?;
    let page_size = clamp_timeline_page_size(params.page_size);
    let scope = scope(&state, user_id, params.language.unwrap_or_default()).await?;

    let start = cursor.unwrap_or_else(|| YearMonth::of(&scope.now));
    let key = stats_key(
        user_id,
        "stats-timeline",
        scope.language,
        &format!("{start}:{page_size}"),
    );
    let data = cached(state.stats_cache.as_ref(), key, || {
        stats::timeline(&scope, Some(start), page_size)
    })
    .await?;
    Ok(Json(DataResponse { data }))
}
