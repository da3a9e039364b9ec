use std::sync::Arc;

use plotwist_providers::stripe::SubscriptionProvider;
use plotwist_providers::tmdb::MetadataProvider;
use plotwist_worker::queue::ImportQueue;

use crate::cache::StatsCache;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: plotwist_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// TMDB metadata for stats and activity enrichment.
    pub metadata: Arc<dyn MetadataProvider>,
    /// Payment provider used to cancel subscriptions.
    pub subscriptions: Arc<dyn SubscriptionProvider>,
    /// Queue feeding the import worker.
    pub import_queue: Arc<dyn ImportQueue>,
    /// Stats cache; `None` when Redis is not configured.
    pub stats_cache: Option<StatsCache>,
}
