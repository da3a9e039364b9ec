//! Sign-up, login, profile and account management over HTTP.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete_auth, get, get_auth, patch_json_auth, post_json,
    put_json_auth, sign_up, PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_up_and_login(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = get_auth(&app, "/api/v1/me", &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["username"], "ana");
    assert_eq!(json["data"]["subscription_type"], "MEMBER");
    assert!(json["data"].get("password_hash").is_none());

    // Login also accepts the email, case-insensitively.
    let response = post_json(
        &app,
        "/api/v1/login",
        json!({ "login": "ANA@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_up_records_activity(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = get(&app, &format!("/api/v1/user/{}/activities", ana.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["activity_type"], "CREATE_ACCOUNT");
    assert_eq!(items[0]["owner"]["username"], "ana");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_accounts_conflict(pool: PgPool) {
    let app = build_test_app(pool);
    sign_up(&app, "ana").await;

    let response = post_json(
        &app,
        "/api/v1/users/create",
        json!({ "username": "ana2", "email": "ANA@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Email is already registered.");

    let response = post_json(
        &app,
        "/api/v1/users/create",
        json!({ "username": "ana", "email": "other@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await["error"],
        "Username is already registered."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn sign_up_validates_input(pool: PgPool) {
    let app = build_test_app(pool);

    for body in [
        json!({ "username": "a b", "email": "ab@example.com", "password": PASSWORD }),
        json!({ "username": "abc", "email": "not-an-email", "password": PASSWORD }),
        json!({ "username": "abc", "email": "abc@example.com", "password": "short" }),
    ] {
        let response = post_json(&app, "/api/v1/users/create", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn availability_checks(pool: PgPool) {
    let app = build_test_app(pool);
    sign_up(&app, "ana").await;

    let response = get(&app, "/api/v1/users/available-username?username=ana").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get(&app, "/api/v1/users/available-username?username=bruno").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["available"], true);

    let response = get(&app, "/api/v1/users/available-email?email=ana@example.com").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn wrong_password_and_missing_token(pool: PgPool) {
    let app = build_test_app(pool);
    sign_up(&app, "ana").await;

    let response = post_json(
        &app,
        "/api/v1/login",
        json!({ "login": "ana", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid credentials.");

    let response = post_json(
        &app,
        "/api/v1/login",
        json!({ "login": "nobody", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/v1/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(&app, "/api/v1/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn public_profiles_and_search(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    sign_up(&app, "anabela").await;
    sign_up(&app, "bruno").await;

    let response = get(&app, "/api/v1/users/ana").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], ana.id);

    let response = get(&app, &format!("/api/v1/user/by/{}", ana.id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/api/v1/users/search?username=ana").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get(&app, "/api/v1/users/nobody").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_profile_and_password(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;
    sign_up(&app, "bruno").await;

    let response = patch_json_auth(
        &app,
        "/api/v1/user",
        &ana.token,
        json!({ "display_name": "Ana", "biography": "Noir fan" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Ana");
    assert_eq!(json["data"]["biography"], "Noir fan");

    let response = patch_json_auth(&app, "/api/v1/user", &ana.token, json!({ "username": "bruno" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = patch_json_auth(
        &app,
        "/api/v1/user/password",
        &ana.token,
        json!({ "current_password": "wrong-password", "new_password": "another-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = patch_json_auth(
        &app,
        "/api/v1/user/password",
        &ana.token,
        json!({ "current_password": PASSWORD, "new_password": "another-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/v1/login",
        json!({ "login": "ana", "password": "another-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preferences_and_social_links(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = get_auth(&app, "/api/v1/user/preferences", &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let response = patch_json_auth(
        &app,
        "/api/v1/user/preferences",
        &ana.token,
        json!({ "watch_region": "BR", "watch_providers_ids": [8, 337] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["watch_region"], "BR");

    let response = put_json_auth(
        &app,
        "/api/v1/user/social-links",
        &ana.token,
        json!({ "links": [{ "platform": "INSTAGRAM", "url": "https://instagram.com/ana" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, "/api/v1/user/social-links", &ana.token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["platform"], "INSTAGRAM");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleted_account_cannot_log_in(pool: PgPool) {
    let app = build_test_app(pool);
    let ana = sign_up(&app, "ana").await;

    let response = delete_auth(&app, "/api/v1/user", &ana.token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/v1/login",
        json!({ "login": "ana", "password": PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The username is free again.
    let response = get(&app, "/api/v1/users/available-username?username=ana").await;
    assert_eq!(response.status(), StatusCode::OK);
}
