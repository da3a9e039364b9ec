//! MyAnimeList API client, used to disambiguate imported anime.

use async_trait::async_trait;
use chrono::NaiveDate;
use plotwist_core::error::CoreError;
use serde::Deserialize;

use crate::read_failure;

/// Default MyAnimeList v2 API base URL.
pub const MAL_API_URL: &str = "https://api.myanimelist.net/v2";

#[derive(Debug, thiserror::Error)]
pub enum MalError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("MyAnimeList API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("MyAnimeList client id is not configured")]
    NotConfigured,
}

impl From<MalError> for CoreError {
    fn from(err: MalError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

/// Anime lookups by MyAnimeList id.
#[async_trait]
pub trait AnimeLookup: Send + Sync {
    /// The anime's first air date. `None` when unknown or only partially
    /// known (MyAnimeList reports `YYYY` or `YYYY-MM` for some entries).
    async fn start_date(&self, anime_id: i64) -> Result<Option<NaiveDate>, MalError>;
}

#[derive(Debug, Deserialize)]
struct AnimeResponse {
    start_date: Option<String>,
}

fn parse_start_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, "%Y-%m-%d").ok()
}

/// HTTP client for the MyAnimeList v2 API.
pub struct MalClient {
    client: reqwest::Client,
    api_url: String,
    client_id: Option<String>,
}

impl MalClient {
    pub fn new(client_id: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), MAL_API_URL.to_string(), client_id)
    }

    pub fn with_client(client: reqwest::Client, api_url: String, client_id: Option<String>) -> Self {
        Self {
            client,
            api_url,
            client_id: client_id.filter(|id| !id.is_empty()),
        }
    }
}

#[async_trait]
impl AnimeLookup for MalClient {
    async fn start_date(&self, anime_id: i64) -> Result<Option<NaiveDate>, MalError> {
        let client_id = self.client_id.as_deref().ok_or(MalError::NotConfigured)?;
        let response = self
            .client
            .get(format!("{}/anime/{anime_id}", self.api_url))
            .header("X-MAL-CLIENT-ID", client_id)
            .query(&[("fields", "start_date")])
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = read_failure(response).await;
            return Err(MalError::Api { status, body });
        }

        let anime: AnimeResponse = response.json().await?;
        Ok(parse_start_date(anime.start_date.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn full_dates_only() {
        assert_eq!(
            parse_start_date(Some("1998-04-03")),
            NaiveDate::from_ymd_opt(1998, 4, 3)
        );
        assert_eq!(parse_start_date(Some("1998-04")), None);
        assert_eq!(parse_start_date(Some("1998")), None);
        assert_eq!(parse_start_date(None), None);
    }

    #[test]
    fn response_without_start_date() {
        let anime: AnimeResponse = serde_json::from_str(r#"{"id":1,"title":"Cowboy Bebop"}"#).unwrap();
        assert!(anime.start_date.is_none());
    }

    #[tokio::test]
    async fn missing_client_id() {
        let client = MalClient::new(None);
        assert_matches!(client.start_date(1).await, Err(MalError::NotConfigured));
    }
}
