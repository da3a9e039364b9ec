//! Route definitions for reviews and replies.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// ```text
/// POST   /review                   -> create_review
/// GET    /review                   -> get_user_review
/// GET    /reviews                  -> list_reviews (optional auth)
/// PUT    /review/by/{id}           -> update_review
/// DELETE /review/by/{id}           -> delete_review
/// POST   /review-reply             -> create_reply
/// GET    /review-replies           -> list_replies (public)
/// PUT    /review-reply/by/{id}     -> update_reply
/// DELETE /review-reply/by/{id}     -> delete_reply
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/review",
            post(reviews::create_review).get(reviews::get_user_review),
        )
        .route("/reviews", get(reviews::list_reviews))
        .route(
            "/review/by/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .route("/review-reply", post(reviews::create_reply))
        .route("/review-replies", get(reviews::list_replies))
        .route(
            "/review-reply/by/{id}",
            put(reviews::update_reply).delete(reviews::delete_reply),
        )
}
