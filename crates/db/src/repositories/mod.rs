//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&PgPool` as the first argument and return `sqlx::Error` on
//! failure. Translating database errors into domain errors is left to the
//! callers.

pub mod activity_repo;
pub mod follow_repo;
pub mod import_queue_repo;
pub mod import_repo;
pub mod like_repo;
pub mod list_item_repo;
pub mod list_repo;
pub mod review_reply_repo;
pub mod review_repo;
pub mod social_link_repo;
pub mod stats_repo;
pub mod subscription_repo;
pub mod user_episode_repo;
pub mod user_item_repo;
pub mod user_repo;
pub mod watch_entry_repo;

pub use activity_repo::ActivityRepo;
pub use follow_repo::FollowRepo;
pub use import_queue_repo::ImportQueueRepo;
pub use import_repo::ImportRepo;
pub use like_repo::LikeRepo;
pub use list_item_repo::ListItemRepo;
pub use list_repo::ListRepo;
pub use review_reply_repo::ReviewReplyRepo;
pub use review_repo::ReviewRepo;
pub use social_link_repo::SocialLinkRepo;
pub use stats_repo::StatsRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_episode_repo::UserEpisodeRepo;
pub use user_item_repo::UserItemRepo;
pub use user_repo::UserRepo;
pub use watch_entry_repo::WatchEntryRepo;

/// Effective subscription type of the user whose id is in column `u.id`.
pub(crate) const SUBSCRIPTION_TYPE_SQL: &str = "COALESCE(\
        (SELECT s.type FROM subscriptions s \
         WHERE s.user_id = u.id AND s.status = 'ACTIVE' \
         ORDER BY s.created_at DESC LIMIT 1), \
        'MEMBER'::subscription_type)";

/// `json_build_object` producing a `UserSummary` for the user aliased `u`.
pub(crate) fn user_summary_json() -> String {
    format!(
        "json_build_object(\
            'id', u.id, \
            'username', u.username, \
            'display_name', u.display_name, \
            'avatar_url', u.avatar_url, \
            'subscription_type', {SUBSCRIPTION_TYPE_SQL})"
    )
}
