//! Route definitions for third-party imports.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::imports;
use crate::state::AppState;

/// Largest accepted export upload.
const MAX_IMPORT_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// ```text
/// POST   /imports          -> create_import (multipart)
/// GET    /imports          -> list_imports
/// GET    /imports/{id}     -> get_import
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/imports",
            get(imports::list_imports).post(imports::create_import),
        )
        .route("/imports/{id}", get(imports::get_import))
        .layer(DefaultBodyLimit::max(MAX_IMPORT_UPLOAD_BYTES))
}
