//! Route definitions for tracked titles, watch entries and episodes.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::user_items;
use crate::state::AppState;

/// ```text
/// PUT    /user/item                 -> upsert_user_item
/// GET    /user/item                 -> get_user_item
/// DELETE /user/item/{id}            -> delete_user_item
/// POST   /user/items                -> list_user_items (public)
/// GET    /user/items/all            -> all_user_items (public)
/// GET    /user/items/count          -> count_user_items (public)
/// PUT    /user/items/reorder        -> reorder_user_items
///
/// POST   /watch-entry               -> create_watch_entry
/// GET    /watch-entries             -> list_watch_entries
/// PUT    /watch-entry/{id}          -> update_watch_entry
/// DELETE /watch-entry/{id}          -> delete_watch_entry
///
/// POST   /user/episodes             -> create_episodes
/// GET    /user/episodes             -> list_episodes (public)
/// DELETE /user/episodes             -> delete_episodes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/item",
            put(user_items::upsert_user_item).get(user_items::get_user_item),
        )
        .route(
            "/user/item/{id}",
            axum::routing::delete(user_items::delete_user_item),
        )
        .route("/user/items", post(user_items::list_user_items))
        .route("/user/items/all", get(user_items::all_user_items))
        .route("/user/items/count", get(user_items::count_user_items))
        .route("/user/items/reorder", put(user_items::reorder_user_items))
        .route("/watch-entry", post(user_items::create_watch_entry))
        .route("/watch-entries", get(user_items::list_watch_entries))
        .route(
            "/watch-entry/{id}",
            put(user_items::update_watch_entry).delete(user_items::delete_watch_entry),
        )
        .route(
            "/user/episodes",
            post(user_items::create_episodes)
                .get(user_items::list_episodes)
                .delete(user_items::delete_episodes),
        )
}
