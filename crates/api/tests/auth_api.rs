//! HTTP-level tests for registration, login, token refresh, logout, and the
//! admin premium toggle.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, expect_status, get_auth, post_json, post_json_auth, put_json_auth, token_for,
};
use escaperoom_api::auth::jwt::validate_token;
use escaperoom_api::state::Integrations;
use escaperoom_core::roles::ROLE_ADMIN;
use serde_json::json;
use sqlx::PgPool;

fn app(pool: PgPool) -> axum::Router {
    common::build_test_app(pool, Integrations::default())
}

async fn register(pool: &PgPool, name: &str, email: &str) -> serde_json::Value {
    let response = post_json(
        app(pool.clone()),
        "/api/v1/auth/register",
        json!({ "name": name, "email": email, "password": "correct horse" }),
    )
    .await;
    expect_status(response, StatusCode::CREATED).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_returns_tokens_and_user(pool: PgPool) {
    let data = register(&pool, "Ada", "  Ada@Example.com ").await;

    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["expires_in"], 15 * 60);
    assert_eq!(data["user"]["name"], "Ada");
    assert_eq!(data["user"]["email"], "ada@example.com");
    assert_eq!(data["user"]["role"], "user");
    assert_eq!(data["user"]["premium"], false);
    assert!(data["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_duplicate_email(pool: PgPool) {
    register(&pool, "Ada", "ada@example.com").await;

    let response = post_json(
        app(pool),
        "/api/v1/auth/register",
        json!({ "name": "Other", "email": "ADA@example.com", "password": "another pass" }),
    )
    .await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(json["error"], "An account with this email already exists");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_validates_input(pool: PgPool) {
    let cases = [
        (json!({ "name": "", "email": "a@b.co", "password": "long enough" }), "Name is required"),
        (
            json!({ "name": "A", "email": "nope", "password": "long enough" }),
            "A valid email address is required",
        ),
    ];
    for (body, message) in cases {
        let response = post_json(app(pool.clone()), "/api/v1/auth/register", body).await;
        let json = expect_status(response, StatusCode::BAD_REQUEST).await;
        assert_eq!(json["error"], message);
    }

    let response = post_json(
        app(pool),
        "/api/v1/auth/register",
        json!({ "name": "A", "email": "a@b.co", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_checks_password(pool: PgPool) {
    register(&pool, "Ada", "ada@example.com").await;

    let response = post_json(
        app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "ada@example.com", "password": "wrong password" }),
    )
    .await;
    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["error"], "Invalid email or password");

    let response = post_json(
        app(pool.clone()),
        "/api/v1/auth/login",
        json!({ "email": "nobody@example.com", "password": "correct horse" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app(pool),
        "/api/v1/auth/login",
        json!({ "email": "ADA@example.com", "password": "correct horse" }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["user"]["email"], "ada@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn refresh_rotates_the_token(pool: PgPool) {
    let data = register(&pool, "Ada", "ada@example.com").await;
    let refresh_token = data["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app(pool.clone()),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_ne!(json["data"]["refresh_token"], refresh_token.as_str());

    // The old token was revoked by the rotation.
    let response = post_json(
        app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn logout_revokes_refresh_tokens(pool: PgPool) {
    let data = register(&pool, "Ada", "ada@example.com").await;
    let access = data["access_token"].as_str().unwrap();
    let refresh_token = data["refresh_token"].as_str().unwrap();

    let response = post_json_auth(app(pool.clone()), "/api/v1/auth/logout", json!({}), access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn me_returns_the_current_user(pool: PgPool) {
    let data = register(&pool, "Ada", "ada@example.com").await;
    let access = data["access_token"].as_str().unwrap();

    let response = get_auth(app(pool), "/api/v1/auth/me", access).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["id"], data["user"]["id"]);
    assert_eq!(json["data"]["name"], "Ada");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn premium_flag_reaches_the_next_token(pool: PgPool) {
    let data = register(&pool, "Ada", "ada@example.com").await;
    let user_id = data["user"]["id"].as_i64().unwrap();
    let refresh_token = data["refresh_token"].as_str().unwrap();

    let admin = token_for(999, ROLE_ADMIN, false);
    let response = put_json_auth(
        app(pool.clone()),
        &format!("/api/v1/admin/users/{user_id}/premium"),
        json!({ "premium": true }),
        &admin,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["premium"], true);

    let response = post_json(
        app(pool),
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    let json = body_json(response).await;
    let access = json["data"]["access_token"].as_str().unwrap();
    let claims = validate_token(access, &common::test_config().jwt).unwrap();
    assert!(claims.premium);
    assert_eq!(claims.sub, user_id);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn premium_toggle_for_unknown_user_is_404(pool: PgPool) {
    let admin = token_for(1, ROLE_ADMIN, false);
    let response = put_json_auth(
        app(pool),
        "/api/v1/admin/users/424242/premium",
        json!({ "premium": true }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
