//! Clients for the third-party services Plotwist depends on.
//!
//! Each service sits behind an object-safe trait so the API and the import
//! worker can run against in-process stubs in tests:
//!
//! - [`tmdb::MetadataProvider`]: title search, details and credits.
//! - [`my_anime_list::AnimeLookup`]: anime start dates for import matching.
//! - [`stripe::SubscriptionProvider`]: subscription cancellation.

pub mod my_anime_list;
pub mod stripe;
pub mod tmdb;

/// Read a non-2xx response into `(status, body)` for error reporting.
pub(crate) async fn read_failure(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    (status, body)
}
