//! Handlers for reviews and review replies.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::enums::{ActivityType, LikeEntity, MediaType};
use plotwist_core::error::CoreError;
use plotwist_core::types::{DbId, TmdbId};
use plotwist_db::models::activity::CreateActivity;
use plotwist_db::models::review::{
    CreateReply, CreateReview, ReplyWithStats, Review, ReviewFilter, ReviewOrder, ReviewPage,
    ReviewReply, UpdateReply, UpdateReview,
};
use plotwist_db::pg_errors::is_foreign_key_violation;
use plotwist_db::repositories::{ActivityRepo, ReviewReplyRepo, ReviewRepo};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::{DataResponse, SuccessResponse};
use crate::services::activities;
use crate::state::AppState;

/// Default and maximum page size for `GET /reviews`.
const DEFAULT_REVIEWS_LIMIT: i64 = 20;
const MAX_REVIEWS_LIMIT: i64 = 100;

fn validate_rating(rating: f32) -> Result<(), CoreError> {
    if (0.0..=5.0).contains(&rating) {
        Ok(())
    } else {
        Err(CoreError::Validation("Rating must be between 0 and 5".into()))
    }
}

fn validate_text(text: &str, field: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Load a review and make sure `user_id` wrote it.
async fn owned_review(state: &AppState, id: DbId, user_id: DbId) -> AppResult<Review> {
    let review = ReviewRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::review_not_found)?;
    if review.user_id != user_id {
        return Err(CoreError::Forbidden("Only the author can change this review".into()).into());
    }
    Ok(review)
}

async fn owned_reply(state: &AppState, id: DbId, user_id: DbId) -> AppResult<ReviewReply> {
    let reply = ReviewReplyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(CoreError::reply_not_found)?;
    if reply.user_id != user_id {
        return Err(CoreError::Forbidden("Only the author can change this reply".into()).into());
    }
    Ok(reply)
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub tmdb_id: Option<TmdbId>,
    pub media_type: Option<MediaType>,
    pub user_id: Option<DbId>,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
    #[serde(default)]
    pub order_by: ReviewOrder,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UserReviewQuery {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct UserReview {
    pub review: Option<Review>,
}

/// POST /api/v1/review
pub async fn create_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<DataResponse<Review>>)> {
    validate_rating(input.rating)?;
    validate_text(&input.review, "Review")?;

    let review = ReviewRepo::create(&state.pool, auth.user_id, &input)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                CoreError::user_not_found().into()
            } else {
                AppError::Database(e)
            }
        })?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::CreateReview)
            .entity(review.id, Some(LikeEntity::Review))
            .metadata(json!({
                "tmdb_id": review.tmdb_id,
                "media_type": review.media_type,
            })),
    )
    .await?;

    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(auth.user_id).await;
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: review })))
}

/// GET /api/v1/reviews
pub async fn list_reviews(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ReviewsQuery>,
) -> AppResult<Json<DataResponse<ReviewPage>>> {
    let filter = ReviewFilter {
        user_id: params.user_id,
        tmdb_id: params.tmdb_id,
        media_type: params.media_type,
        season_number: params.season_number,
        episode_number: params.episode_number,
        order_by: params.order_by,
        page: params.page.unwrap_or(0).max(0),
        limit: params
            .limit
            .unwrap_or(DEFAULT_REVIEWS_LIMIT)
            .clamp(1, MAX_REVIEWS_LIMIT),
        viewer_id: viewer.user_id(),
        ..Default::default()
    };
    let page = ReviewRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: page }))
}

/// GET /api/v1/review?tmdb_id=&media_type=
///
/// The current user's review of a title, season or episode.
pub async fn get_user_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserReviewQuery>,
) -> AppResult<Json<DataResponse<UserReview>>> {
    let review = ReviewRepo::find_for_user_item(
        &state.pool,
        auth.user_id,
        params.tmdb_id,
        params.media_type,
        params.season_number,
        params.episode_number,
    )
    .await?;
    Ok(Json(DataResponse {
        data: UserReview { review },
    }))
}

/// PUT /api/v1/review/by/{id}
pub async fn update_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReview>,
) -> AppResult<Json<DataResponse<Review>>> {
    if let Some(rating) = input.rating {
        validate_rating(rating)?;
    }
    if let Some(text) = input.review.as_deref() {
        validate_text(text, "Review")?;
    }
    owned_review(&state, id, auth.user_id).await?;

    let review = ReviewRepo::update(&state.pool, id, auth.user_id, &input)
        .await?
        .ok_or_else(CoreError::review_not_found)?;

    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(auth.user_id).await;
    }
    Ok(Json(DataResponse { data: review }))
}

/// DELETE /api/v1/review/by/{id}
pub async fn delete_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    owned_review(&state, id, auth.user_id).await?;

    if !ReviewRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::review_not_found().into());
    }
    ActivityRepo::delete_matching(
        &state.pool,
        ActivityType::CreateReview,
        id,
        Some(LikeEntity::Review),
        auth.user_id,
    )
    .await?;

    if let Some(cache) = &state.stats_cache {
        cache.invalidate_user(auth.user_id).await;
    }
    Ok(Json(SuccessResponse::ok()))
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RepliesQuery {
    pub review_id: DbId,
}

/// POST /api/v1/review-reply
pub async fn create_reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateReply>,
) -> AppResult<(StatusCode, Json<DataResponse<ReviewReply>>)> {
    validate_text(&input.reply, "Reply")?;

    let reply = ReviewReplyRepo::create(&state.pool, auth.user_id, &input)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                CoreError::review_not_found().into()
            } else {
                AppError::Database(e)
            }
        })?;

    activities::record(
        &state.pool,
        CreateActivity::new(auth.user_id, ActivityType::CreateReply)
            .entity(reply.id, Some(LikeEntity::Reply)),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: reply })))
}

/// GET /api/v1/review-replies?review_id=
pub async fn list_replies(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<RepliesQuery>,
) -> AppResult<Json<DataResponse<Vec<ReplyWithStats>>>> {
    let replies =
        ReviewReplyRepo::list_by_review(&state.pool, params.review_id, viewer.user_id()).await?;
    Ok(Json(DataResponse { data: replies }))
}

/// PUT /api/v1/review-reply/by/{id}
pub async fn update_reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateReply>,
) -> AppResult<Json<DataResponse<ReviewReply>>> {
    validate_text(&input.reply, "Reply")?;
    owned_reply(&state, id, auth.user_id).await?;

    let reply = ReviewReplyRepo::update(&state.pool, id, auth.user_id, &input.reply)
        .await?
        .ok_or_else(CoreError::reply_not_found)?;
    Ok(Json(DataResponse { data: reply }))
}

/// DELETE /api/v1/review-reply/by/{id}
pub async fn delete_reply(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SuccessResponse>>> {
    owned_reply(&state, id, auth.user_id).await?;

    if !ReviewReplyRepo::delete(&state.pool, id, auth.user_id).await? {
        return Err(CoreError::reply_not_found().into());
    }
    ActivityRepo::delete_matching(
        &state.pool,
        ActivityType::CreateReply,
        id,
        Some(LikeEntity::Reply),
        auth.user_id,
    )
    .await?;
    Ok(Json(SuccessResponse::ok()))
}
