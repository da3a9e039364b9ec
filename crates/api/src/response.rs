//! Shared response envelope types for API handlers.
//!
//! API responses use a `{ "data": ... }` envelope. Use [`DataResponse`]
//! instead of ad-hoc `json!({ "data": ... })`.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Acknowledgement body for deletions and other side-effect-only calls.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> DataResponse<Self> {
        DataResponse {
            data: Self { success: true },
        }
    }
}
