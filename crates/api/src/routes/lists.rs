//! Route definitions for lists and their items.

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::lists;
use crate::state::AppState;

/// ```text
/// POST   /list                       -> create_list
/// GET    /lists                      -> list_lists (optional auth)
/// GET    /list/by/{id}               -> get_list (optional auth)
/// PUT    /list/{id}                  -> update_list
/// DELETE /list/{id}                  -> delete_list
/// PATCH  /list/banner                -> update_banner
/// GET    /list/{id}/progress         -> list_progress
/// POST   /list-item                  -> create_list_item
/// GET    /list-items/by/{list_id}    -> list_items (optional auth)
/// DELETE /list-item/{id}             -> delete_list_item
/// PATCH  /list-items                 -> reorder_list_items
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(lists::create_list))
        .route("/lists", get(lists::list_lists))
        .route("/list/by/{id}", get(lists::get_list))
        .route("/list/{id}", put(lists::update_list).delete(lists::delete_list))
        .route("/list/banner", patch(lists::update_banner))
        .route("/list/{id}/progress", get(lists::list_progress))
        .route("/list-item", post(lists::create_list_item))
        .route("/list-items/by/{list_id}", get(lists::list_items))
        .route("/list-item/{id}", delete(lists::delete_list_item))
        .route("/list-items", patch(lists::reorder_list_items))
}
