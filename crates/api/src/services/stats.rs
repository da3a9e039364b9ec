//! User statistics assembled from the database and TMDB metadata.
//!
//! Every computation is relative to an explicit `now` so periods resolve the
//! same way for a whole request. Titles whose TMDB details cannot be loaded
//! are left out of the aggregates rather than failing the request.

use std::collections::{HashMap, HashSet};

use futures::future;
use futures::stream::{self, StreamExt};
use plotwist_core::enums::{Language, MediaType, UserItemStatus};
use plotwist_core::stats::breakdown::{
    self, cast_breakdown, genre_breakdown, monthly_breakdown, round1, ActorShare, CastCredit,
    GenreShare, HoursBucket, TitleGenres, WatchPoint,
};
use plotwist_core::stats::period::{StatsPeriod, YearMonth};
use plotwist_core::stats::{MAX_TIMELINE_SCAN_MONTHS, MOST_WATCHED_SERIES_LIMIT};
use plotwist_core::types::{DbId, Timestamp, TmdbId};
use plotwist_db::repositories::{FollowRepo, ReviewRepo, StatsRepo, UserItemRepo};
use plotwist_providers::tmdb::{MetadataProvider, TitleDetails};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::AppResult;

/// Concurrent TMDB requests per statistic.
const TMDB_CONCURRENCY: usize = 8;

/// Who the statistics are for and how to resolve titles.
#[derive(Clone, Copy)]
pub struct StatsScope<'a> {
    pub pool: &'a PgPool,
    pub metadata: &'a dyn MetadataProvider,
    pub user_id: DbId,
    pub language: Language,
    pub now: Timestamp,
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub followers_count: i64,
    pub following_count: i64,
    pub watched_movies_count: i64,
    pub watched_series_count: i64,
    pub watched_episodes_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalHours {
    pub total_hours: f64,
    pub movie_hours: f64,
    pub series_hours: f64,
    pub monthly_hours: Vec<HoursBucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewsCount {
    pub reviews_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostWatchedSeries {
    pub tmdb_id: TmdbId,
    pub episodes: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MostWatchedSeriesList {
    pub most_watched_series: Vec<MostWatchedSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedGenres {
    pub genres: Vec<GenreShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedCast {
    pub watched_cast: Vec<ActorShare>,
}

/// A top-rated review with the reviewed title's artwork.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestReview {
    pub id: DbId,
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub review: String,
    pub rating: f32,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    pub created_at: Timestamp,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestReviews {
    pub best_reviews: Vec<BestReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub status: UserItemStatus,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsStatus {
    pub items_status: Vec<StatusShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopGenre {
    pub name: String,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopReview {
    pub title: String,
    pub poster_path: Option<String>,
    pub rating: f32,
}

/// One month of the stats timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSection {
    pub year_month: String,
    pub total_hours: f64,
    pub movie_hours: f64,
    pub series_hours: f64,
    pub top_genre: Option<TopGenre>,
    pub top_review: Option<TopReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTimeline {
    pub sections: Vec<TimelineSection>,
    /// `YYYY-MM` of the next month to scan.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// TMDB lookups
// ---------------------------------------------------------------------------

type TitleKey = (TmdbId, MediaType);

async fn fetch_details(
    metadata: &dyn MetadataProvider,
    titles: impl IntoIterator<Item = TitleKey>,
    language: Language,
) -> HashMap<TitleKey, TitleDetails> {
    let unique: HashSet<TitleKey> = titles.into_iter().collect();
    stream::iter(unique)
        .map(|(tmdb_id, media_type)| async move {
            match metadata.details(tmdb_id, media_type, language).await {
                Ok(details) => Some(((tmdb_id, media_type), details)),
                Err(e) => {
                    tracing::warn!(
                        tmdb_id,
                        media_type = %media_type,
                        error = %e,
                        "Skipping title without TMDB details"
                    );
                    None
                }
            }
        })
        .buffer_unordered(TMDB_CONCURRENCY)
        .filter_map(future::ready)
        .collect()
        .await
}

async fn fetch_credits(
    metadata: &dyn MetadataProvider,
    titles: &[TitleKey],
    language: Language,
) -> Vec<Vec<CastCredit>> {
    stream::iter(titles.iter().copied())
        .map(|(tmdb_id, media_type)| async move {
            metadata
                .credits(tmdb_id, media_type, language)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!(tmdb_id, error = %e, "Skipping title without TMDB credits");
                    Vec::new()
                })
        })
        .buffer_unordered(TMDB_CONCURRENCY)
        .collect()
        .await
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

pub async fn user_stats(scope: &StatsScope<'_>, period: &StatsPeriod) -> AppResult<UserStats> {
    let range = period.date_range(&scope.now);
    let (followers, following, movies, series, episodes) = tokio::try_join!(
        FollowRepo::count_followers(scope.pool, scope.user_id),
        FollowRepo::count_following(scope.pool, scope.user_id),
        StatsRepo::watched_movies_count(scope.pool, scope.user_id, &range),
        StatsRepo::watched_series_count(scope.pool, scope.user_id, &range),
        StatsRepo::watched_episodes_count(scope.pool, scope.user_id, &range),
    )?;
    Ok(UserStats {
        followers_count: followers,
        following_count: following,
        watched_movies_count: movies,
        watched_series_count: series,
        watched_episodes_count: episodes,
    })
}

/// Hours watched. Movie runtimes come from TMDB, episode runtimes from the
/// stored episode rows.
pub async fn total_hours(scope: &StatsScope<'_>, period: &StatsPeriod) -> AppResult<TotalHours> {
    let range = period.date_range(&scope.now);
    let movies =
        StatsRepo::watched_titles(scope.pool, scope.user_id, Some(MediaType::Movie), &range)
            .await?;
    let episodes = StatsRepo::episode_runtimes(scope.pool, scope.user_id, &range).await?;

    let details = fetch_details(
        scope.metadata,
        movies.iter().map(|m| (m.tmdb_id, m.media_type)),
        scope.language,
    )
    .await;

    let movie_points: Vec<WatchPoint> = movies
        .iter()
        .filter_map(|m| {
            let runtime = details.get(&(m.tmdb_id, m.media_type))?.runtime?;
            Some(WatchPoint {
                at: m.watched_at,
                runtime_minutes: f64::from(runtime),
            })
        })
        .collect();
    let episode_points: Vec<WatchPoint> = episodes
        .iter()
        .map(|e| WatchPoint {
            at: e.watched_at,
            runtime_minutes: f64::from(e.runtime),
        })
        .collect();

    let movie_hours = breakdown::total_hours(movie_points.iter().map(|p| p.runtime_minutes));
    let series_hours = breakdown::total_hours(episode_points.iter().map(|p| p.runtime_minutes));
    let points: Vec<WatchPoint> = movie_points.into_iter().chain(episode_points).collect();

    Ok(TotalHours {
        total_hours: round1(movie_hours + series_hours),
        movie_hours: round1(movie_hours),
        series_hours: round1(series_hours),
        monthly_hours: monthly_breakdown(period, &scope.now, &points),
    })
}

pub async fn reviews_count(scope: &StatsScope<'_>) -> AppResult<ReviewsCount> {
    let reviews_count = ReviewRepo::count_by_user(scope.pool, scope.user_id).await?;
    Ok(ReviewsCount { reviews_count })
}

pub async fn most_watched_series(
    scope: &StatsScope<'_>,
    period: &StatsPeriod,
) -> AppResult<MostWatchedSeriesList> {
    let range = period.date_range(&scope.now);
    let counts = StatsRepo::most_watched_series(
        scope.pool,
        scope.user_id,
        MOST_WATCHED_SERIES_LIMIT,
        &range,
    )
    .await?;
    let details = fetch_details(
        scope.metadata,
        counts.iter().map(|c| (c.tmdb_id, MediaType::TvShow)),
        scope.language,
    )
    .await;

    let most_watched_series = counts
        .into_iter()
        .filter_map(|c| {
            let d = details.get(&(c.tmdb_id, MediaType::TvShow))?;
            Some(MostWatchedSeries {
                tmdb_id: c.tmdb_id,
                episodes: c.episodes,
                title: d.title.clone(),
                poster_path: d.poster_path.clone(),
                backdrop_path: d.backdrop_path.clone(),
            })
        })
        .collect();
    Ok(MostWatchedSeriesList {
        most_watched_series,
    })
}

/// Watched titles in the period. Inside a bounded range, series with an
/// episode watched in it count as well.
async fn titles_in_period(scope: &StatsScope<'_>, period: &StatsPeriod) -> AppResult<Vec<TitleKey>> {
    let range = period.date_range(&scope.now);
    let mut titles: Vec<TitleKey> = StatsRepo::watched_titles(scope.pool, scope.user_id, None, &range)
        .await?
        .into_iter()
        .map(|t| (t.tmdb_id, t.media_type))
        .collect();

    if range.is_bounded() {
        for tmdb_id in StatsRepo::series_with_episodes(scope.pool, scope.user_id, &range).await? {
            let key = (tmdb_id, MediaType::TvShow);
            if !titles.contains(&key) {
                titles.push(key);
            }
        }
    }
    Ok(titles)
}

pub async fn watched_genres(
    scope: &StatsScope<'_>,
    period: &StatsPeriod,
) -> AppResult<WatchedGenres> {
    let titles = titles_in_period(scope, period).await?;
    let details = fetch_details(scope.metadata, titles.iter().copied(), scope.language).await;

    let title_genres: Vec<TitleGenres> = titles
        .iter()
        .filter_map(|key| details.get(key))
        .map(|d| TitleGenres {
            genres: d.genres.clone(),
            poster_path: d.poster_path.clone(),
        })
        .collect();

    Ok(WatchedGenres {
        genres: genre_breakdown(&title_genres),
    })
}

pub async fn watched_cast(scope: &StatsScope<'_>, period: &StatsPeriod) -> AppResult<WatchedCast> {
    let range = period.date_range(&scope.now);
    let titles: Vec<TitleKey> = StatsRepo::watched_titles(scope.pool, scope.user_id, None, &range)
        .await?
        .into_iter()
        .map(|t| (t.tmdb_id, t.media_type))
        .collect();
    let credits = fetch_credits(scope.metadata, &titles, scope.language).await;

    Ok(WatchedCast {
        watched_cast: cast_breakdown(&credits),
    })
}

/// Five-star reviews written in the period, newest first.
pub async fn best_reviews(
    scope: &StatsScope<'_>,
    period: &StatsPeriod,
    limit: Option<i64>,
) -> AppResult<BestReviews> {
    let range = period.date_range(&scope.now);
    let reviews =
        ReviewRepo::best_by_user(scope.pool, scope.user_id, limit, range.start, range.end).await?;
    let details = fetch_details(
        scope.metadata,
        reviews.iter().map(|r| (r.review.tmdb_id, r.review.media_type)),
        scope.language,
    )
    .await;

    let best_reviews = reviews
        .into_iter()
        .filter_map(|r| {
            let review = r.review;
            let d = details.get(&(review.tmdb_id, review.media_type))?;
            Some(BestReview {
                id: review.id,
                tmdb_id: review.tmdb_id,
                media_type: review.media_type,
                review: review.review,
                rating: review.rating,
                season_number: review.season_number,
                episode_number: review.episode_number,
                created_at: review.created_at,
                title: d.title.clone(),
                poster_path: d.poster_path.clone(),
                backdrop_path: d.backdrop_path.clone(),
            })
        })
        .collect();
    Ok(BestReviews { best_reviews })
}

pub async fn items_status(scope: &StatsScope<'_>) -> AppResult<ItemsStatus> {
    let items_status = UserItemRepo::status_breakdown(scope.pool, scope.user_id)
        .await?
        .into_iter()
        .map(|s| StatusShare {
            status: s.status,
            count: s.count,
            percentage: s.percentage,
        })
        .collect();
    Ok(ItemsStatus { items_status })
}

/// Walk back month by month from `cursor` (default: the current month),
/// emitting months with any activity until `page_size` sections are found or
/// the scan limit is reached.
pub async fn timeline(
    scope: &StatsScope<'_>,
    cursor: Option<YearMonth>,
    page_size: u32,
) -> AppResult<StatsTimeline> {
    let page_size = page_size as usize;
    let mut current = cursor.unwrap_or_else(|| YearMonth::of(&scope.now));
    let mut sections = Vec::new();
    let mut scanned = 0;

    while sections.len() < page_size && scanned < MAX_TIMELINE_SCAN_MONTHS {
        let period = StatsPeriod::Specific(current);
        let (hours, genres, reviews) = tokio::try_join!(
            total_hours(scope, &period),
            watched_genres(scope, &period),
            best_reviews(scope, &period, Some(1)),
        )?;

        if hours.total_hours > 0.0 || !genres.genres.is_empty() || !reviews.best_reviews.is_empty()
        {
            sections.push(TimelineSection {
                year_month: current.to_string(),
                total_hours: hours.total_hours,
                movie_hours: hours.movie_hours,
                series_hours: hours.series_hours,
                top_genre: genres.genres.into_iter().next().map(|g| TopGenre {
                    name: g.name,
                    poster_path: g.poster_path,
                }),
                top_review: reviews.best_reviews.into_iter().next().map(|r| TopReview {
                    title: r.title,
                    poster_path: r.poster_path,
                    rating: r.rating,
                }),
            });
        }

        current = current.previous();
        scanned += 1;
    }

    let has_more = sections.len() >= page_size && scanned < MAX_TIMELINE_SCAN_MONTHS;
    Ok(StatsTimeline {
        sections,
        next_cursor: has_more.then(|| current.to_string()),
        has_more,
    })
}
