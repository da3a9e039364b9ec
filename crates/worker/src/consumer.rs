//! Resolution of a single imported title.

use std::sync::Arc;

use plotwist_core::enums::{ImportItemStatus, ImportProvider, ImportStatus, MediaType};
use plotwist_core::imports::matching::{letterboxd_hint, select_tmdb_match, MatchHint};
use plotwist_core::imports::my_anime_list::anime_id_from_metadata;
use plotwist_core::imports::{ImportMessage, IMPORT_MOVIES_QUEUE, IMPORT_SERIES_QUEUE};
use plotwist_core::types::{DbId, TmdbId};
use plotwist_db::models::user_item::UpsertUserItem;
use plotwist_db::repositories::{ImportRepo, UserItemRepo};
use plotwist_providers::my_anime_list::{AnimeLookup, MalError};
use plotwist_providers::tmdb::{MetadataProvider, TmdbError};
use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("TMDB lookup failed: {0}")]
    Metadata(#[from] TmdbError),

    #[error("MyAnimeList lookup failed: {0}")]
    Anime(#[from] MalError),
}

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Matched, added to the collection, item marked `COMPLETED`.
    Matched {
        tmdb_id: TmdbId,
        import_status: Option<ImportStatus>,
    },
    /// No unambiguous TMDB match; item marked `FAILED`.
    Unmatched { import_status: Option<ImportStatus> },
    /// The item was already resolved by an earlier delivery.
    AlreadyResolved { import_status: Option<ImportStatus> },
    /// The import row is gone.
    Missing,
}

/// Stored state of the item a message points at.
struct PendingItem {
    import_id: DbId,
    import_status: ImportItemStatus,
    item_status: plotwist_core::enums::UserItemStatus,
    metadata: serde_json::Value,
}

/// Consumer for one of the two import queues.
#[derive(Clone)]
pub struct ImportConsumer {
    pool: PgPool,
    media_type: MediaType,
    metadata: Arc<dyn MetadataProvider>,
    anime: Arc<dyn AnimeLookup>,
}

impl ImportConsumer {
    pub fn movies(
        pool: PgPool,
        metadata: Arc<dyn MetadataProvider>,
        anime: Arc<dyn AnimeLookup>,
    ) -> Self {
        Self {
            pool,
            media_type: MediaType::Movie,
            metadata,
            anime,
        }
    }

    pub fn series(
        pool: PgPool,
        metadata: Arc<dyn MetadataProvider>,
        anime: Arc<dyn AnimeLookup>,
    ) -> Self {
        Self {
            pool,
            media_type: MediaType::TvShow,
            metadata,
            anime,
        }
    }

    /// Name of the queue this consumer reads.
    pub fn queue(&self) -> &'static str {
        match self.media_type {
            MediaType::Movie => IMPORT_MOVIES_QUEUE,
            MediaType::TvShow => IMPORT_SERIES_QUEUE,
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Resolve the item a message points at and finalize its import.
    ///
    /// On `Err` nothing about the item has been recorded and the message
    /// should be left for redelivery.
    pub async fn process(&self, message: &ImportMessage) -> Result<ItemOutcome, ConsumeError> {
        let Some(item) = self.load(message.id).await? else {
            tracing::warn!(item_id = %message.id, queue = self.queue(), "Import item no longer exists");
            return Ok(ItemOutcome::Missing);
        };

        if item.import_status != ImportItemStatus::NotStarted {
            let import_status = ImportRepo::finalize_if_done(&self.pool, item.import_id).await?;
            return Ok(ItemOutcome::AlreadyResolved { import_status });
        }

        let candidates = self.metadata.search(&message.name, self.media_type).await?;
        let hint = self.hint(message.provider, &item.metadata).await?;

        let outcome = match select_tmdb_match(&candidates, &hint) {
            Some(tmdb_id) => {
                UserItemRepo::upsert(
                    &self.pool,
                    message.user_id,
                    &UpsertUserItem {
                        tmdb_id,
                        media_type: self.media_type,
                        status: item.item_status,
                    },
                )
                .await?;
                self.mark(message.id, ImportItemStatus::Completed, Some(tmdb_id))
                    .await?;
                tracing::debug!(item_id = %message.id, tmdb_id, name = %message.name, "Import item matched");
                Some(tmdb_id)
            }
            None => {
                self.mark(message.id, ImportItemStatus::Failed, None).await?;
                tracing::debug!(
                    item_id = %message.id,
                    name = %message.name,
                    candidates = candidates.len(),
                    "Import item has no unambiguous match",
                );
                None
            }
        };

        let import_status = ImportRepo::finalize_if_done(&self.pool, item.import_id).await?;
        Ok(match outcome {
            Some(tmdb_id) => ItemOutcome::Matched {
                tmdb_id,
                import_status,
            },
            None => ItemOutcome::Unmatched { import_status },
        })
    }

    async fn load(&self, id: DbId) -> Result<Option<PendingItem>, sqlx::Error> {
        Ok(match self.media_type {
            MediaType::Movie => ImportRepo::find_movie(&self.pool, id).await?.map(|m| PendingItem {
                import_id: m.import_id,
                import_status: m.import_status,
                item_status: m.item_status,
                metadata: m.metadata,
            }),
            MediaType::TvShow => ImportRepo::find_series(&self.pool, id).await?.map(|s| PendingItem {
                import_id: s.import_id,
                import_status: s.import_status,
                item_status: s.item_status,
                metadata: s.metadata,
            }),
        })
    }

    async fn mark(
        &self,
        id: DbId,
        status: ImportItemStatus,
        tmdb_id: Option<TmdbId>,
    ) -> Result<bool, sqlx::Error> {
        match self.media_type {
            MediaType::Movie => ImportRepo::update_movie_status(&self.pool, id, status, tmdb_id).await,
            MediaType::TvShow => {
                ImportRepo::update_series_status(&self.pool, id, status, tmdb_id).await
            }
        }
    }

    /// Evidence for choosing between several TMDB candidates.
    ///
    /// A MyAnimeList client without credentials yields no hint rather than
    /// an error, so single-candidate titles still resolve.
    async fn hint(
        &self,
        provider: ImportProvider,
        metadata: &serde_json::Value,
    ) -> Result<MatchHint, ConsumeError> {
        match provider {
            ImportProvider::Letterboxd => Ok(letterboxd_hint(metadata)),
            ImportProvider::MyAnimeList => {
                let Some(anime_id) = anime_id_from_metadata(metadata) else {
                    return Ok(MatchHint::None);
                };
                match self.anime.start_date(anime_id).await {
                    Ok(Some(date)) => Ok(MatchHint::ReleaseDate(date)),
                    Ok(None) | Err(MalError::NotConfigured) => Ok(MatchHint::None),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}
