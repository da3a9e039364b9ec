pub mod activities;
pub mod auth;
pub mod follows;
pub mod health;
pub mod imports;
pub mod likes;
pub mod lists;
pub mod reviews;
pub mod stats;
pub mod subscriptions;
pub mod user_items;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Each resource module documents its own routes; they are merged flat
/// because most resources are addressed by both singular and plural paths
/// (`/review`, `/reviews`, `/review/by/{id}`).
///
/// ```text
/// /login, /me, /users/*, /user, /user/by/{id}       users and sessions
/// /follow, /followers, /following                   follow graph
/// /review*, /review-reply*, /review-replies         reviews and replies
/// /like, /like/{id}, /likes/{entity_id}             likes
/// /list*, /list-item*, /list-items*                 lists
/// /user/item*, /user/items*, /watch-entr*           tracked titles
/// /user/episodes                                    watched episodes
/// /user/{id}/activities, /network-activities        activity feeds
/// /user/{id}/<statistic>                            statistics
/// /imports, /imports/{id}                           imports
/// /subscription, /stripe-webhook                    billing
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(follows::router())
        .merge(reviews::router())
        .merge(likes::router())
        .merge(lists::router())
        .merge(user_items::router())
        .merge(activities::router())
        .merge(stats::router())
        .merge(imports::router())
        .merge(subscriptions::router())
}
