#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use plotwist_api::auth::jwt::JwtConfig;
use plotwist_api::config::{AppEnv, ServerConfig};
use plotwist_api::router::build_app_router;
use plotwist_api::state::AppState;
use plotwist_core::enums::{Language, MediaType};
use plotwist_core::imports::matching::TmdbCandidate;
use plotwist_core::stats::breakdown::CastCredit;
use plotwist_core::types::TmdbId;
use plotwist_providers::stripe::{StripeError, SubscriptionProvider};
use plotwist_providers::tmdb::{MetadataProvider, TitleDetails, TmdbError};
use plotwist_worker::queue::PgImportQueue;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const WEBHOOK_SECRET: &str = "whsec_test";
pub const PASSWORD: &str = "correct-horse-battery";

/// Movies run two hours, series episodes 45 minutes, everything is a drama.
pub struct StubMetadata;

#[async_trait]
impl MetadataProvider for StubMetadata {
    async fn search(
        &self,
        _query: &str,
        _media_type: MediaType,
    ) -> Result<Vec<TmdbCandidate>, TmdbError> {
        Ok(Vec::new())
    }

    async fn details(
        &self,
        tmdb_id: TmdbId,
        media_type: MediaType,
        _language: Language,
    ) -> Result<TitleDetails, TmdbError> {
        Ok(TitleDetails {
            tmdb_id,
            media_type,
            title: format!("Title {tmdb_id}"),
            poster_path: Some(format!("/poster-{tmdb_id}.jpg")),
            backdrop_path: None,
            runtime: Some(match media_type {
                MediaType::Movie => 120,
                MediaType::TvShow => 45,
            }),
            genres: vec!["Drama".to_string()],
        })
    }

    async fn credits(
        &self,
        _tmdb_id: TmdbId,
        _media_type: MediaType,
        _language: Language,
    ) -> Result<Vec<CastCredit>, TmdbError> {
        Ok(vec![CastCredit {
            id: 1,
            name: "Frances McDormand".to_string(),
            character: "Marge Gunderson".to_string(),
            known_for_department: "Acting".to_string(),
            profile_path: None,
        }])
    }
}

/// Records the provider subscription ids it was asked to cancel.
#[derive(Default)]
pub struct StubStripe {
    pub canceled: Mutex<Vec<String>>,
    pub scheduled: Mutex<Vec<String>>,
}

#[async_trait]
impl SubscriptionProvider for StubStripe {
    async fn cancel_immediately(&self, subscription_id: &str) -> Result<(), StripeError> {
        if let Ok(mut canceled) = self.canceled.lock() {
            canceled.push(subscription_id.to_string());
        }
        Ok(())
    }

    async fn schedule_cancel_at_period_end(
        &self,
        subscription_id: &str,
    ) -> Result<(), StripeError> {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.push(subscription_id.to_string());
        }
        Ok(())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        app_env: AppEnv::Test,
        client_url: "http://localhost:3000".to_string(),
        redis_url: None,
        stripe_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
        stripe_secret_key: None,
        tmdb_access_token: None,
        mal_client_id: None,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            expiry_days: 1,
        },
    }
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_stripe(pool, Arc::new(StubStripe::default()))
}

pub fn build_test_app_with_stripe(pool: PgPool, stripe: Arc<StubStripe>) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        metadata: Arc::new(StubMetadata),
        subscriptions: stripe,
        import_queue: Arc::new(PgImportQueue::new(pool)),
        stats_cache: None,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<&Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(&body))).await
}

pub async fn post_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(&body))).await
}

pub async fn put_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(&body))).await
}

pub async fn patch_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request(Method::PATCH, uri, Some(token), Some(&body))).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

pub async fn delete_json_auth(app: &Router, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), Some(&body))).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A signed-up user with a bearer token.
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Sign a user up and log them in through the API.
pub async fn sign_up(app: &Router, username: &str) -> TestUser {
    let email = format!("{username}@example.com");
    let response = post_json(
        app,
        "/api/v1/users/create",
        serde_json::json!({ "username": username, "email": email, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), 201, "sign-up of {username} failed");
    let id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = post_json(
        app,
        "/api/v1/login",
        serde_json::json!({ "login": username, "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), 200, "login of {username} failed");
    let token = body_json(response).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    TestUser {
        id,
        username: username.to_string(),
        email,
        token,
    }
}
