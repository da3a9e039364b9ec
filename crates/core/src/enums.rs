//! Domain enums backed by PostgreSQL enum types.
//!
//! Every enum exposes the same surface: `as_str` (the stored value),
//! `from_str` returning `None` for unknown input, an `ALL` slice, `Display`,
//! serde in the stored spelling, and a `sqlx::Type` mapping to the named
//! PostgreSQL enum created by the migrations.

use serde::{Deserialize, Serialize};

macro_rules! db_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $pg_type:literal {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = $pg_type)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                #[sqlx(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The value as stored in the database and sent over the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            /// Parse a stored value. Returns `None` for unknown input.
            #[allow(clippy::should_implement_trait)]
            pub fn from_str(value: &str) -> Option<Self> {
                match value {
                    $($value => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

db_enum! {
    /// Kind of title a row refers to.
    pub enum MediaType: "media_type" {
        Movie => "MOVIE",
        TvShow => "TV_SHOW",
    }
}

db_enum! {
    /// Where a title sits in a user's collection.
    pub enum UserItemStatus: "user_item_status" {
        Watchlist => "WATCHLIST",
        Watching => "WATCHING",
        Watched => "WATCHED",
        Dropped => "DROPPED",
    }
}

db_enum! {
    pub enum ListVisibility: "list_visibility" {
        Public => "PUBLIC",
        Network => "NETWORK",
        Private => "PRIVATE",
    }
}

db_enum! {
    /// Content languages supported for reviews and TMDB lookups.
    pub enum Language: "language" {
        EnUs => "en-US",
        EsEs => "es-ES",
        FrFr => "fr-FR",
        ItIt => "it-IT",
        DeDe => "de-DE",
        PtBr => "pt-BR",
        JaJp => "ja-JP",
    }
}

db_enum! {
    pub enum SubscriptionType: "subscription_type" {
        Member => "MEMBER",
        Pro => "PRO",
    }
}

db_enum! {
    pub enum SubscriptionStatus: "subscription_status" {
        Active => "ACTIVE",
        Canceled => "CANCELED",
        Expired => "EXPIRED",
        PendingCancellation => "PENDING_CANCELLATION",
    }
}

db_enum! {
    /// Processing state of a single imported movie or series.
    pub enum ImportItemStatus: "import_item_status" {
        NotStarted => "NOT_STARTED",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

db_enum! {
    /// Aggregate processing state of a whole import.
    pub enum ImportStatus: "import_status" {
        NotStarted => "NOT_STARTED",
        Partial => "PARTIAL",
        Completed => "COMPLETED",
        Failed => "FAILED",
    }
}

db_enum! {
    pub enum ImportProvider: "import_provider" {
        MyAnimeList => "MY_ANIME_LIST",
        Letterboxd => "LETTERBOXD",
    }
}

db_enum! {
    pub enum SocialPlatform: "social_platform" {
        Instagram => "INSTAGRAM",
        Tiktok => "TIKTOK",
        Youtube => "YOUTUBE",
        X => "X",
    }
}

db_enum! {
    /// Entities that can be liked.
    pub enum LikeEntity: "like_entity" {
        Review => "REVIEW",
        Reply => "REPLY",
        List => "LIST",
    }
}

db_enum! {
    /// Kinds of entries in the activity feed.
    pub enum ActivityType: "activity_type" {
        CreateList => "CREATE_LIST",
        AddItem => "ADD_ITEM",
        DeleteItem => "DELETE_ITEM",
        LikeReview => "LIKE_REVIEW",
        LikeReply => "LIKE_REPLY",
        LikeList => "LIKE_LIST",
        CreateReview => "CREATE_REVIEW",
        CreateReply => "CREATE_REPLY",
        FollowUser => "FOLLOW_USER",
        WatchEpisode => "WATCH_EPISODE",
        ChangeStatus => "CHANGE_STATUS",
        CreateAccount => "CREATE_ACCOUNT",
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::EnUs
    }
}

impl MediaType {
    /// The `media_type` discriminator TMDB uses in multi-search results.
    pub fn tmdb_kind(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::TvShow => "tv",
        }
    }
}

impl LikeEntity {
    /// The activity recorded when a user likes this kind of entity.
    pub fn like_activity(&self) -> ActivityType {
        match self {
            LikeEntity::Review => ActivityType::LikeReview,
            LikeEntity::Reply => ActivityType::LikeReply,
            LikeEntity::List => ActivityType::LikeList,
        }
    }
}

impl ImportItemStatus {
    /// Whether the worker is done with this item.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ImportItemStatus::Completed | ImportItemStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_values_round_trip() {
        for status in UserItemStatus::ALL {
            assert_eq!(UserItemStatus::from_str(status.as_str()), Some(*status));
        }
        for kind in ActivityType::ALL {
            assert_eq!(ActivityType::from_str(kind.as_str()), Some(*kind));
        }
    }

    #[test]
    fn unknown_value_returns_none() {
        assert!(MediaType::from_str("ANIME").is_none());
        assert!(Language::from_str("en-us").is_none());
    }

    #[test]
    fn language_uses_hyphenated_tags() {
        assert_eq!(Language::PtBr.as_str(), "pt-BR");
        assert_eq!(Language::default(), Language::EnUs);
        let json = serde_json::to_string(&Language::JaJp).unwrap();
        assert_eq!(json, "\"ja-JP\"");
    }

    #[test]
    fn serde_uses_stored_spelling() {
        let status: SubscriptionStatus =
            serde_json::from_str("\"PENDING_CANCELLATION\"").unwrap();
        assert_eq!(status, SubscriptionStatus::PendingCancellation);
        assert_eq!(format!("{}", MediaType::TvShow), "TV_SHOW");
    }

    #[test]
    fn activity_type_has_twelve_kinds() {
        assert_eq!(ActivityType::ALL.len(), 12);
    }

    #[test]
    fn like_entity_maps_to_activity() {
        assert_eq!(LikeEntity::Reply.like_activity(), ActivityType::LikeReply);
        assert_eq!(MediaType::TvShow.tmdb_kind(), "tv");
    }

    #[test]
    fn terminal_import_items() {
        assert!(ImportItemStatus::Failed.is_terminal());
        assert!(!ImportItemStatus::NotStarted.is_terminal());
    }
}
