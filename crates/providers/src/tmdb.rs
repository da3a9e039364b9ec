//! TMDB client: multi search, movie/TV details and credits.
//!
//! Only the fields needed for import matching and user statistics are
//! decoded. Requests authenticate with a v4 read access token.

use async_trait::async_trait;
use plotwist_core::enums::{Language, MediaType};
use plotwist_core::error::CoreError;
use plotwist_core::imports::matching::TmdbCandidate;
use plotwist_core::stats::breakdown::CastCredit;
use plotwist_core::types::TmdbId;
use serde::{Deserialize, Serialize};

use crate::read_failure;

/// Default TMDB API base URL.
pub const TMDB_API_URL: &str = "https://api.themoviedb.org/3";

/// Errors from the TMDB client.
#[derive(Debug, thiserror::Error)]
pub enum TmdbError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// TMDB returned a non-2xx status code.
    #[error("TMDB API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// No access token was configured.
    #[error("TMDB access token is not configured")]
    NotConfigured,
}

impl From<TmdbError> for CoreError {
    fn from(err: TmdbError) -> Self {
        CoreError::Upstream(err.to_string())
    }
}

/// The metadata of one title that statistics need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleDetails {
    pub tmdb_id: TmdbId,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    /// Runtime in minutes. For series this is the typical episode runtime.
    pub runtime: Option<i32>,
    pub genres: Vec<String>,
}

/// Title metadata lookups.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search titles by name, keeping only results of `media_type`.
    async fn search(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<TmdbCandidate>, TmdbError>;

    async fn details(
        &self,
        tmdb_id: TmdbId,
        media_type: MediaType,
        language: Language,
    ) -> Result<TitleDetails, TmdbError>;

    /// Cast of a title.
    async fn credits(
        &self,
        tmdb_id: TmdbId,
        media_type: MediaType,
        language: Language,
    ) -> Result<Vec<CastCredit>, TmdbError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: TmdbId,
    #[serde(default)]
    media_type: String,
    release_date: Option<String>,
    first_air_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    id: TmdbId,
    /// Movies.
    title: Option<String>,
    /// Series.
    name: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    runtime: Option<i32>,
    #[serde(default)]
    episode_run_time: Vec<i32>,
    #[serde(default)]
    genres: Vec<Genre>,
}

#[derive(Debug, Deserialize)]
struct CreditsResponse {
    #[serde(default)]
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    id: i64,
    name: String,
    #[serde(default)]
    character: String,
    #[serde(default)]
    known_for_department: String,
    profile_path: Option<String>,
}

fn candidates_of(response: SearchResponse, media_type: MediaType) -> Vec<TmdbCandidate> {
    let kind = media_type.tmdb_kind();
    response
        .results
        .into_iter()
        .filter(|r| r.media_type == kind)
        .map(|r| TmdbCandidate {
            id: r.id,
            release_date: r.release_date.or(r.first_air_date).filter(|d| !d.is_empty()),
        })
        .collect()
}

fn details_of(response: DetailsResponse, media_type: MediaType) -> TitleDetails {
    let runtime = match media_type {
        MediaType::Movie => response.runtime,
        MediaType::TvShow => response.episode_run_time.first().copied(),
    };
    TitleDetails {
        tmdb_id: response.id,
        media_type,
        title: response.title.or(response.name).unwrap_or_default(),
        poster_path: response.poster_path,
        backdrop_path: response.backdrop_path,
        runtime,
        genres: response.genres.into_iter().map(|g| g.name).collect(),
    }
}

fn cast_of(response: CreditsResponse) -> Vec<CastCredit> {
    response
        .cast
        .into_iter()
        .map(|m| CastCredit {
            id: m.id,
            name: m.name,
            character: m.character,
            known_for_department: m.known_for_department,
            profile_path: m.profile_path,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the TMDB v3 API.
pub struct TmdbClient {
    client: reqwest::Client,
    api_url: String,
    access_token: Option<String>,
}

impl TmdbClient {
    /// Create a client. Without an access token every call fails with
    /// [`TmdbError::NotConfigured`].
    pub fn new(access_token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), TMDB_API_URL.to_string(), access_token)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            api_url,
            access_token: access_token.filter(|t| !t.is_empty()),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        let token = self.access_token.as_deref().ok_or(TmdbError::NotConfigured)?;
        let response = self
            .client
            .get(format!("{}{path}", self.api_url))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = read_failure(response).await;
            return Err(TmdbError::Api { status, body });
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl MetadataProvider for TmdbClient {
    async fn search(
        &self,
        query: &str,
        media_type: MediaType,
    ) -> Result<Vec<TmdbCandidate>, TmdbError> {
        let response: SearchResponse = self
            .get_json("/search/multi", &[("query", query), ("language", "en-US")])
            .await?;
        let candidates = candidates_of(response, media_type);
        tracing::debug!(query, media_type = %media_type, count = candidates.len(), "TMDB search");
        Ok(candidates)
    }

    async fn details(
        &self,
        tmdb_id: TmdbId,
        media_type: MediaType,
        language: Language,
    ) -> Result<TitleDetails, TmdbError> {
        let path = format!("/{}/{tmdb_id}", media_type.tmdb_kind());
        let response: DetailsResponse = self
            .get_json(&path, &[("language", language.as_str())])
            .await?;
        Ok(details_of(response, media_type))
    }

    async fn credits(
        &self,
        tmdb_id: TmdbId,
        media_type: MediaType,
        language: Language,
    ) -> Result<Vec<CastCredit>, TmdbError> {
        let path = format!("/{}/{tmdb_id}/credits", media_type.tmdb_kind());
        let response: CreditsResponse = self
            .get_json(&path, &[("language", language.as_str())])
            .await?;
        Ok(cast_of(response))
    }
}
