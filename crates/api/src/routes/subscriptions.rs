//! Route definitions for subscriptions and the Stripe webhook.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::subscriptions;
use crate::state::AppState;

/// ```text
/// GET    /subscription      -> get_subscription
/// DELETE /subscription      -> cancel_subscription
/// POST   /stripe-webhook    -> stripe_webhook (signed, no auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscription",
            get(subscriptions::get_subscription).delete(subscriptions::cancel_subscription),
        )
        .route("/stripe-webhook", post(subscriptions::stripe_webhook))
}
