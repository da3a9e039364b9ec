//! Route definitions for activity feeds.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::activities;
use crate::state::AppState;

/// ```text
/// GET    /user/{id}/activities      -> user_activities (public)
/// GET    /network-activities        -> network_activities
/// DELETE /user/activities/{id}      -> delete_activity
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{id}/activities", get(activities::user_activities))
        .route("/network-activities", get(activities::network_activities))
        .route("/user/activities/{id}", delete(activities::delete_activity))
}
