//! Handlers for Letterboxd and MyAnimeList imports.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use plotwist_core::enums::ImportProvider;
use plotwist_core::error::CoreError;
use plotwist_core::types::DbId;
use plotwist_db::models::import::{DetailedImport, UserImport};
use plotwist_db::repositories::ImportRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::services::imports;
use crate::state::AppState;

/// POST /api/v1/imports
///
/// Multipart form with a `provider` text field (`LETTERBOXD` or
/// `MY_ANIME_LIST`) and the exported `file`.
pub async fn create_import(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<DetailedImport>>)> {
    let mut provider: Option<ImportProvider> = None;
    let mut file: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("provider") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                let parsed = ImportProvider::from_str(value.trim()).ok_or_else(|| {
                    AppError::BadRequest(format!("Unknown import provider '{}'", value.trim()))
                })?;
                provider = Some(parsed);
            }
            Some("file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                file = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let provider = provider.ok_or_else(|| AppError::BadRequest("Missing provider field".into()))?;
    let file = file.ok_or_else(|| AppError::BadRequest("Missing file field".into()))?;

    let detailed = imports::create_import(&state, auth.user_id, provider, &file).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: detailed })))
}

/// GET /api/v1/imports
pub async fn list_imports(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<UserImport>>>> {
    let imports = ImportRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: imports }))
}

/// GET /api/v1/imports/{id}
pub async fn get_import(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DetailedImport>>> {
    let detailed = ImportRepo::find_detailed(&state.pool, id)
        .await?
        .filter(|d| d.import.user_id == auth.user_id)
        .ok_or_else(CoreError::import_not_found)?;
    Ok(Json(DataResponse { data: detailed }))
}
