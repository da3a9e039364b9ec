//! MyAnimeList and Letterboxd uploads over HTTP.

mod common;

use std::io::Write;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::{body_json, build_test_app, get_auth, send, sign_up};
use flate2::write::GzEncoder;
use flate2::Compression;
use plotwist_core::imports::{IMPORT_MOVIES_QUEUE, IMPORT_SERIES_QUEUE};
use plotwist_worker::queue::{ImportQueue, PgImportQueue};
use sqlx::PgPool;

const BOUNDARY: &str = "plotwist-test-boundary";

const MAL_EXPORT: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<myanimelist>
  <anime>
    <series_animedb_id>1</series_animedb_id>
    <series_title><![CDATA[Cowboy Bebop]]></series_title>
    <series_type>TV</series_type>
    <series_episodes>26</series_episodes>
    <my_watched_episodes>26</my_watched_episodes>
    <my_start_date>2023-02-01</my_start_date>
    <my_finish_date>2023-03-15</my_finish_date>
    <my_status>Completed</my_status>
  </anime>
  <anime>
    <series_animedb_id>5</series_animedb_id>
    <series_title><![CDATA[Cowboy Bebop: Tengoku no Tobira]]></series_title>
    <series_type>Movie</series_type>
    <series_episodes>1</series_episodes>
    <my_watched_episodes>0</my_watched_episodes>
    <my_start_date>0000-00-00</my_start_date>
    <my_finish_date>0000-00-00</my_finish_date>
    <my_status>Plan to Watch</my_status>
  </anime>
</myanimelist>"#;

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn multipart_body(provider: &str, file: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"provider\"\r\n\r\n{provider}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"export.xml.gz\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(file);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &axum::Router, token: &str, provider: &str, file: &[u8]) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/imports")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(multipart_body(provider, file)))
        .unwrap();
    send(app, request).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mal_upload_creates_import_and_queues_items(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let ana = sign_up(&app, "ana").await;

    let response = upload(&app, &ana.token, "MY_ANIME_LIST", &gzip(MAL_EXPORT.as_bytes())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["provider"], "MY_ANIME_LIST");
    assert_eq!(data["items_count"], 2);
    assert_eq!(data["import_status"], "NOT_STARTED");
    assert_eq!(data["series"][0]["name"], "Cowboy Bebop");
    assert_eq!(data["series"][0]["item_status"], "WATCHED");
    assert_eq!(data["movies"][0]["item_status"], "WATCHLIST");

    let queue = PgImportQueue::new(pool);
    let series = queue.receive(IMPORT_SERIES_QUEUE, 10).await.unwrap();
    assert_eq!(series.len(), 1);
    let message = series[0].message().unwrap();
    assert_eq!(message.name, "Cowboy Bebop");
    assert_eq!(message.user_id.to_string(), ana.id);
    let movies = queue.receive(IMPORT_MOVIES_QUEUE, 10).await.unwrap();
    assert_eq!(movies.len(), 1);

    let import_id = data["id"].as_str().unwrap();
    let response = get_auth(&app, &format!("/api/v1/imports/{import_id}"), &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, "/api/v1/imports", &ana.token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_export_completes_immediately(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let ana = sign_up(&app, "ana").await;

    let export = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?><myanimelist></myanimelist>";
    let response = upload(&app, &ana.token, "MY_ANIME_LIST", &gzip(export.as_bytes())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items_count"], 0);
    assert_eq!(json["data"]["import_status"], "COMPLETED");

    let queue = PgImportQueue::new(pool);
    assert!(queue.receive(IMPORT_MOVIES_QUEUE, 10).await.unwrap().is_empty());
    assert!(queue.receive(IMPORT_SERIES_QUEUE, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn imports_are_private(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;

    let response = upload(&app, &ana.token, "MY_ANIME_LIST", &gzip(MAL_EXPORT.as_bytes())).await;
    let import_id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let response = get_auth(&app, &format!("/api/v1/imports/{import_id}"), &bruno.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_uploads_are_rejected(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = upload(&app, &ana.token, "IMDB", b"whatever").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Plain XML is not a MAL export; it must be gzipped.
    let response = upload(&app, &ana.token, "MY_ANIME_LIST", MAL_EXPORT.as_bytes()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid MyAnimeList export");

    let response = upload(&app, &ana.token, "LETTERBOXD", b"not a zip").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid Letterboxd archive");
}
