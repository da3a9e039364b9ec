//! Follows, reviews, replies, likes, lists and feeds over HTTP.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, delete_json_auth, get, get_auth, patch_json_auth,
    post_json_auth, put_json_auth, sign_up,
};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Follows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn follow_lifecycle(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;

    let response = post_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": bruno.id })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": bruno.id })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(&app, &format!("/api/v1/follow?followed_id={}", bruno.id), &ana.token).await;
    assert!(body_json(response).await["data"]["follow"].is_object());

    let response = get(&app, &format!("/api/v1/followers?followed_id={}", bruno.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);

    let response = get(&app, &format!("/api/v1/following?follower_id={}&page_size=5", ana.id)).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 1);
    assert!(json["data"]["next_cursor"].is_null());

    let response = delete_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": bruno.id })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": bruno.id })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cannot_follow_yourself_or_ghosts(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = post_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": ana.id })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        &app,
        "/api/v1/follow",
        &ana.token,
        json!({ "user_id": uuid::Uuid::new_v4() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn network_feed_includes_followed_users(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;
    sign_up(&app, "carla").await;

    post_json_auth(&app, "/api/v1/follow", &ana.token, json!({ "user_id": bruno.id })).await;
    put_json_auth(
        &app,
        "/api/v1/user/item",
        &bruno.token,
        json!({ "tmdb_id": 550, "media_type": "MOVIE", "status": "WATCHED" }),
    )
    .await;

    let response = get_auth(&app, "/api/v1/network-activities", &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();

    let owners: Vec<&str> = items
        .iter()
        .filter_map(|i| i["owner"]["username"].as_str())
        .collect();
    assert!(owners.contains(&"ana"));
    assert!(owners.contains(&"bruno"));
    assert!(!owners.contains(&"carla"));

    let status_change = items
        .iter()
        .find(|i| i["activity_type"] == "CHANGE_STATUS")
        .expect("status change in feed");
    assert_eq!(status_change["additional_info"]["title"], "Title 550");
    assert_eq!(status_change["additional_info"]["poster_path"], "/poster-550.jpg");
}

// ---------------------------------------------------------------------------
// Reviews, replies and likes
// ---------------------------------------------------------------------------

async fn create_review(app: &axum::Router, token: &str, tmdb_id: i64, rating: f32) -> String {
    let response = post_json_auth(
        app,
        "/api/v1/review",
        token,
        json!({
            "tmdb_id": tmdb_id,
            "media_type": "MOVIE",
            "review": "Tense from start to finish.",
            "rating": rating,
            "language": "en-US"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_str().unwrap().to_string()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn review_validation_and_ownership(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;

    let response = post_json_auth(
        &app,
        "/api/v1/review",
        &ana.token,
        json!({ "tmdb_id": 550, "media_type": "MOVIE", "review": "ok", "rating": 6 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let review_id = create_review(&app, &ana.token, 550, 4.5).await;

    let response = put_json_auth(
        &app,
        &format!("/api/v1/review/by/{review_id}"),
        &bruno.token,
        json!({ "rating": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(
        &app,
        &format!("/api/v1/review/by/{review_id}"),
        &ana.token,
        json!({ "rating": 3.5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["rating"], 3.5);

    let response = get_auth(&app, "/api/v1/review?tmdb_id=550&media_type=MOVIE", &ana.token).await;
    assert_eq!(body_json(response).await["data"]["review"]["id"], review_id);

    let response = delete_auth(&app, &format!("/api/v1/review/by/{review_id}"), &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, "/api/v1/review?tmdb_id=550&media_type=MOVIE", &ana.token).await;
    assert!(body_json(response).await["data"]["review"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn likes_and_replies_show_in_listing(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;
    let review_id = create_review(&app, &ana.token, 550, 5.0).await;

    let response = post_json_auth(
        &app,
        "/api/v1/like",
        &bruno.token,
        json!({ "entity_type": "REVIEW", "entity_id": review_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let like_id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let response = post_json_auth(
        &app,
        "/api/v1/like",
        &bruno.token,
        json!({ "entity_type": "REVIEW", "entity_id": review_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json_auth(
        &app,
        "/api/v1/review-reply",
        &bruno.token,
        json!({ "review_id": review_id, "reply": "Agreed!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(&app, "/api/v1/reviews?tmdb_id=550&media_type=MOVIE", &bruno.token).await;
    let json = body_json(response).await;
    let review = &json["data"]["items"][0];
    assert_eq!(review["like_count"], 1);
    assert_eq!(review["reply_count"], 1);
    assert_eq!(review["user_liked"], true);
    assert_eq!(review["user"]["username"], "ana");

    // Anonymous viewers never see their own like.
    let response = get(&app, "/api/v1/reviews?tmdb_id=550&media_type=MOVIE").await;
    assert_eq!(body_json(response).await["data"]["items"][0]["user_liked"], false);

    let response = get(&app, &format!("/api/v1/likes/{review_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["username"], "bruno");

    let response = get(&app, &format!("/api/v1/review-replies?review_id={review_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["reply"], "Agreed!");

    let response = delete_auth(&app, &format!("/api/v1/like/{like_id}"), &bruno.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get(&app, &format!("/api/v1/likes/{review_id}")).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn reply_to_missing_review_is_404(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = post_json_auth(
        &app,
        "/api/v1/review-reply",
        &ana.token,
        json!({ "review_id": uuid::Uuid::new_v4(), "reply": "Hello?" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_items_and_progress(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;

    let response = post_json_auth(&app, "/api/v1/list", &ana.token, json!({ "title": "Noir" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let list_id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let mut item_ids = Vec::new();
    for tmdb_id in [550, 680] {
        let response = post_json_auth(
            &app,
            "/api/v1/list-item",
            &ana.token,
            json!({ "list_id": list_id, "tmdb_id": tmdb_id, "media_type": "MOVIE" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        item_ids.push(body_json(response).await["data"]["id"].as_str().unwrap().to_string());
    }

    let response = post_json_auth(
        &app,
        "/api/v1/list-item",
        &bruno.token,
        json!({ "list_id": list_id, "tmdb_id": 13, "media_type": "MOVIE" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    put_json_auth(
        &app,
        "/api/v1/user/item",
        &ana.token,
        json!({ "tmdb_id": 550, "media_type": "MOVIE", "status": "WATCHED" }),
    )
    .await;

    let response = get_auth(&app, &format!("/api/v1/list/{list_id}/progress"), &ana.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["completed"], 1);
    assert_eq!(json["data"]["percentage"], 50);

    let response = patch_json_auth(
        &app,
        "/api/v1/list-items",
        &ana.token,
        json!({
            "list_id": list_id,
            "items": [
                { "id": item_ids[0], "position": 2 },
                { "id": item_ids[1], "position": 1 }
            ]
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, &format!("/api/v1/list-items/by/{list_id}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["tmdb_id"], 680);
    assert_eq!(json["data"][1]["tmdb_id"], 550);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn private_lists_are_hidden(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    let bruno = sign_up(&app, "bruno").await;

    let response = post_json_auth(
        &app,
        "/api/v1/list",
        &ana.token,
        json!({ "title": "Guilty pleasures", "visibility": "PRIVATE" }),
    )
    .await;
    let list_id = body_json(response).await["data"]["id"].as_str().unwrap().to_string();

    let response = get_auth(&app, &format!("/api/v1/list/by/{list_id}"), &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, &format!("/api/v1/list/by/{list_id}"), &bruno.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &format!("/api/v1/lists?user_id={}", ana.id)).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = put_json_auth(
        &app,
        &format!("/api/v1/list/{list_id}"),
        &bruno.token,
        json!({ "title": "Mine now" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(&app, &format!("/api/v1/list/{list_id}"), &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn recent_private_lists_do_not_hide_public_ones(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = post_json_auth(&app, "/api/v1/list", &ana.token, json!({ "title": "Classics" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    for i in 0..5 {
        let response = post_json_auth(
            &app,
            "/api/v1/list",
            &ana.token,
            json!({ "title": format!("Draft {i}"), "visibility": "PRIVATE" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(&app, &format!("/api/v1/lists?user_id={}", ana.id)).await;
    let json = body_json(response).await;
    let lists = json["data"].as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["title"], "Classics");

    let response = get_auth(&app, &format!("/api/v1/lists?user_id={}&limit=10", ana.id), &ana.token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 6);
}
