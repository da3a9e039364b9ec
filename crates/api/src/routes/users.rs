//! Route definitions for accounts, profiles and preferences.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// POST   /users/create               -> create_user (public)
/// GET    /users/available-username   -> available_username (public)
/// GET    /users/available-email      -> available_email (public)
/// GET    /users/search               -> search (public)
/// GET    /users/{username}           -> get_by_username (public)
/// GET    /user/by/{id}               -> get_by_id (public)
/// GET    /me                         -> me
/// PATCH  /user                       -> update_profile
/// DELETE /user                       -> delete_account
/// PATCH  /user/password              -> update_password
/// GET    /user/preferences           -> get_preferences
/// PATCH  /user/preferences           -> update_preferences
/// GET    /user/social-links          -> get_social_links
/// PUT    /user/social-links          -> upsert_social_links
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/create", post(users::create_user))
        .route("/users/available-username", get(users::available_username))
        .route("/users/available-email", get(users::available_email))
        .route("/users/search", get(users::search))
        .route("/users/{username}", get(users::get_by_username))
        .route("/user/by/{id}", get(users::get_by_id))
        .route("/me", get(users::me))
        .route(
            "/user",
            patch(users::update_profile).delete(users::delete_account),
        )
        .route("/user/password", patch(users::update_password))
        .route(
            "/user/preferences",
            get(users::get_preferences).patch(users::update_preferences),
        )
        .route(
            "/user/social-links",
            get(users::get_social_links).put(users::upsert_social_links),
        )
}
