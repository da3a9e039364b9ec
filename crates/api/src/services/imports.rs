//! Import creation: decode the upload, persist it and queue every item.

use plotwist_core::enums::ImportProvider;
use plotwist_core::error::CoreError;
use plotwist_core::imports::{self, ImportMessage, IMPORT_MOVIES_QUEUE, IMPORT_SERIES_QUEUE};
use plotwist_core::types::DbId;
use plotwist_db::models::import::DetailedImport;
use plotwist_db::pg_errors::is_foreign_key_violation;
use plotwist_db::repositories::ImportRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Queue messages for every stored item: movies first, then series.
pub fn messages(detailed: &DetailedImport) -> (Vec<ImportMessage>, Vec<ImportMessage>) {
    let user_id = detailed.import.user_id;
    let provider = detailed.import.provider;
    let movies = detailed
        .movies
        .iter()
        .map(|m| ImportMessage {
            id: m.id,
            name: m.name.clone(),
            provider,
            user_id,
        })
        .collect();
    let series = detailed
        .series
        .iter()
        .map(|s| ImportMessage {
            id: s.id,
            name: s.name.clone(),
            provider,
            user_id,
        })
        .collect();
    (movies, series)
}

pub async fn create_import(
    state: &AppState,
    user_id: DbId,
    provider: ImportProvider,
    file: &[u8],
) -> AppResult<DetailedImport> {
    let decoded = imports::decode(provider, file)?;

    let detailed = ImportRepo::create_with_items(&state.pool, user_id, &decoded)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                AppError::Core(CoreError::user_not_found())
            } else {
                AppError::Database(e)
            }
        })?;

    let (movies, series) = messages(&detailed);
    for (queue, batch) in [(IMPORT_MOVIES_QUEUE, &movies), (IMPORT_SERIES_QUEUE, &series)] {
        if batch.is_empty() {
            continue;
        }
        state
            .import_queue
            .publish(queue, batch)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to queue import items: {e}")))?;
    }

    tracing::info!(
        import_id = %detailed.import.id,
        %user_id,
        provider = %provider,
        movies = movies.len(),
        series = series.len(),
        "Import created"
    );
    Ok(detailed)
}
