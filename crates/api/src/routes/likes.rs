//! Route definitions for likes on reviews, replies and lists.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::likes;
use crate::state::AppState;

/// ```text
/// POST   /like                 -> create_like
/// DELETE /like/{id}            -> delete_like
/// GET    /likes/{entity_id}    -> list_likes (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/like", post(likes::create_like))
        .route("/like/{id}", delete(likes::delete_like))
        .route("/likes/{entity_id}", get(likes::list_likes))
}
