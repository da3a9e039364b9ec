//! Domain error taxonomy shared by every crate in the workspace.
//!
//! Expected failures are returned as [`CoreError`] values and translated to
//! HTTP responses at the API edge. The named constructors below carry the
//! exact user-facing messages.

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0} not found.")]
    NotFound(&'static str),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A third-party service (TMDB, Stripe, MyAnimeList) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn user_not_found() -> Self {
        Self::NotFound("User")
    }

    pub fn list_not_found() -> Self {
        Self::NotFound("List")
    }

    pub fn list_item_not_found() -> Self {
        Self::NotFound("List item")
    }

    pub fn review_not_found() -> Self {
        Self::NotFound("Review")
    }

    pub fn reply_not_found() -> Self {
        Self::NotFound("Reply")
    }

    pub fn like_not_found() -> Self {
        Self::NotFound("Like")
    }

    pub fn user_item_not_found() -> Self {
        Self::NotFound("User item")
    }

    pub fn watch_entry_not_found() -> Self {
        Self::NotFound("Watch entry")
    }

    pub fn import_not_found() -> Self {
        Self::NotFound("Import")
    }

    pub fn subscription_not_found() -> Self {
        Self::NotFound("Subscription")
    }

    pub fn no_active_subscription() -> Self {
        Self::NotFound("Active subscription")
    }

    pub fn invalid_credentials() -> Self {
        Self::Unauthorized("Invalid credentials.".into())
    }

    pub fn username_already_registered() -> Self {
        Self::Conflict("Username is already registered.".into())
    }

    pub fn email_already_registered() -> Self {
        Self::Conflict("Email is already registered.".into())
    }

    pub fn follow_already_exists() -> Self {
        Self::Conflict("You already follow this user.".into())
    }

    pub fn like_already_exists() -> Self {
        Self::Conflict("You already liked this.".into())
    }

    /// The message shown to clients, without the variant prefix that
    /// `Display` adds for logs.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound(entity) => format!("{entity} not found."),
            Self::Validation(msg)
            | Self::Conflict(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Upstream(msg)
            | Self::Internal(msg) => msg.clone(),
        }
    }
}
