//! Route definitions for the follow graph.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::follows;
use crate::state::AppState;

/// ```text
/// POST   /follow        -> follow
/// GET    /follow        -> get_follow
/// DELETE /follow        -> unfollow
/// GET    /followers     -> followers (public)
/// GET    /following     -> following (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/follow",
            post(follows::follow)
                .get(follows::get_follow)
                .delete(follows::unfollow),
        )
        .route("/followers", get(follows::followers))
        .route("/following", get(follows::following))
}
