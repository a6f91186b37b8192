//! HTTP-level tests for authoring rooms and playing through them.

mod common;

use axum::http::StatusCode;
use common::{
    delete_auth, expect_status, get, get_auth, post_json, post_json_auth, put_json_auth,
    token_for,
};
use escaperoom_api::auth::password::hash_password;
use escaperoom_api::state::Integrations;
use escaperoom_core::roles::ROLE_USER;
use escaperoom_db::models::user::CreateUser;
use escaperoom_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

fn app(pool: &PgPool) -> axum::Router {
    common::build_test_app(pool.clone(), Integrations::default())
}

/// Insert a user and return an access token for them.
async fn author(pool: &PgPool, name: &str) -> (i64, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: hash_password("irrelevant-pass").unwrap(),
            role: ROLE_USER.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    let token = token_for(user.id, ROLE_USER, user.premium);
    (user.id, token)
}

fn vault_draft() -> serde_json::Value {
    json!({
        "title": "  The Vault ",
        "description": "Crack the safe before the guards return.",
        "theme": "hacker",
        "chapters": [
            {
                "title": "Lobby",
                "content": "The receptionist hums a tune.",
                "answer": "  Moonlight Sonata ",
                "hints": [{ "content": "Beethoven" }, { "content": "  " }]
            },
            { "title": "Elevator", "content": "Which floor?", "answer": "13", "hints": [] },
            { "title": "Safe", "content": "The code is the year.", "answer": "1969", "hints": [] }
        ]
    })
}

async fn create_vault(pool: &PgPool, token: &str) -> serde_json::Value {
    let response = post_json_auth(app(pool), "/api/v1/rooms", vault_draft(), token).await;
    expect_status(response, StatusCode::CREATED).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Authoring
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn create_normalizes_and_numbers(pool: PgPool) {
    let (user_id, token) = author(&pool, "Ada").await;
    let room = create_vault(&pool, &token).await;

    assert_eq!(room["user_id"], user_id);
    assert_eq!(room["title"], "The Vault");
    assert_eq!(room["theme"], "hacker");
    let chapters = room["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0]["chapter_number"], 1);
    assert_eq!(chapters[0]["answer"], "moonlight sonata");
    assert_eq!(chapters[2]["chapter_number"], 3);

    let hints = chapters[0]["hints"].as_array().unwrap();
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0]["hint_number"], 1);
    assert_eq!(hints[0]["content"], "Beethoven");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_theme_is_rejected(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let mut draft = vault_draft();
    draft["theme"] = json!("neon");

    let response = post_json_auth(app(&pool), "/api/v1/rooms", draft, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn overview_hides_answers(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let room = create_vault(&pool, &token).await;
    let id = room["id"].as_i64().unwrap();

    let response = get(app(&pool), &format!("/api/v1/rooms/{id}")).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["room"]["author"], "Ada");
    let chapters = json["data"]["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 3);
    assert!(chapters.iter().all(|c| c.get("answer").is_none()));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn listings(pool: PgPool) {
    let (_, ada) = author(&pool, "Ada").await;
    let (_, bob) = author(&pool, "Bob").await;
    let first = create_vault(&pool, &ada).await["id"].as_i64().unwrap();
    let second = create_vault(&pool, &ada).await["id"].as_i64().unwrap();
    let others = create_vault(&pool, &bob).await["id"].as_i64().unwrap();

    let response = get_auth(app(&pool), "/api/v1/rooms/mine", &ada).await;
    let json = expect_status(response, StatusCode::OK).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second, first]);

    let uri = format!("/api/v1/rooms?ids={others},abc,{first},999999");
    let json = expect_status(get(app(&pool), &uri).await, StatusCode::OK).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first) && ids.contains(&others));

    let json = expect_status(get(app(&pool), "/api/v1/rooms").await, StatusCode::OK).await;
    assert_eq!(json["data"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_the_owner_can_edit(pool: PgPool) {
    let (_, ada) = author(&pool, "Ada").await;
    let (_, bob) = author(&pool, "Bob").await;
    let id = create_vault(&pool, &ada).await["id"].as_i64().unwrap();

    let response = get_auth(app(&pool), &format!("/api/v1/rooms/{id}/edit"), &bob).await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["error"], "You do not have permission to modify this escape room");

    let response = put_json_auth(app(&pool), &format!("/api/v1/rooms/{id}"), vault_draft(), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app(&pool), &format!("/api/v1/rooms/{id}"), &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app(&pool), &format!("/api/v1/rooms/{id}/edit"), &ada).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["chapters"][1]["answer"], "13");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_reconciles_chapters(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let room = create_vault(&pool, &token).await;
    let id = room["id"].as_i64().unwrap();
    let lobby = room["chapters"][0]["id"].as_i64().unwrap();
    let safe = room["chapters"][2]["id"].as_i64().unwrap();
    let hint = room["chapters"][0]["hints"][0]["id"].as_i64().unwrap();

    // Drop the elevator, move the safe first, and add a new final chapter.
    let draft = json!({
        "title": "The Vault II",
        "theme": "dark",
        "chapters": [
            { "id": safe, "title": "Safe", "content": "The code is the year.", "answer": "1969" },
            {
                "id": lobby,
                "title": "Lobby",
                "content": "The receptionist hums.",
                "answer": "moonlight sonata",
                "hints": [{ "id": hint, "content": "Ludwig" }, { "content": "A piano piece" }]
            },
            { "title": "Exit", "content": "Which way out?", "answer": "left" }
        ]
    });
    let response = put_json_auth(app(&pool), &format!("/api/v1/rooms/{id}"), draft, &token).await;
    let json = expect_status(response, StatusCode::OK).await;

    let room = &json["data"];
    assert_eq!(room["title"], "The Vault II");
    assert_eq!(room["theme"], "dark");
    let chapters = room["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[0]["id"], safe);
    assert_eq!(chapters[0]["chapter_number"], 1);
    assert_eq!(chapters[1]["id"], lobby);
    assert_eq!(chapters[1]["hints"][0]["id"], hint);
    assert_eq!(chapters[1]["hints"][0]["content"], "Ludwig");
    assert_eq!(chapters[1]["hints"][1]["hint_number"], 2);
    assert_eq!(chapters[2]["title"], "Exit");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_removes_the_room(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let id = create_vault(&pool, &token).await["id"].as_i64().unwrap();

    let response = delete_auth(app(&pool), &format!("/api/v1/rooms/{id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app(&pool), &format!("/api/v1/rooms/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Play
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn chapter_page_omits_the_answer(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let id = create_vault(&pool, &token).await["id"].as_i64().unwrap();

    let response = get(app(&pool), &format!("/api/v1/rooms/{id}/chapters/1")).await;
    let json = expect_status(response, StatusCode::OK).await;

    let page = &json["data"];
    assert_eq!(page["room"]["title"], "The Vault");
    assert_eq!(page["chapter"]["title"], "Lobby");
    assert!(page["chapter"].get("answer").is_none());
    assert_eq!(page["hints"][0]["content"], "Beethoven");
    assert_eq!(page["total_chapters"], 3);

    let response = get(app(&pool), &format!("/api/v1/rooms/{id}/chapters/9")).await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["error"], "Chapter not found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn answers_are_checked_loosely(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let id = create_vault(&pool, &token).await["id"].as_i64().unwrap();
    let answer = |n: i32, answer: &str| {
        let app = app(&pool);
        let uri = format!("/api/v1/rooms/{id}/chapters/{n}/answer");
        let body = json!({ "answer": answer });
        async move { post_json(app, &uri, body).await }
    };

    let json = expect_status(answer(1, "beethoven").await, StatusCode::OK).await;
    assert_eq!(json["data"], json!({ "result": "incorrect" }));

    let json = expect_status(answer(1, " MOONLIGHT Sonata ").await, StatusCode::OK).await;
    assert_eq!(
        json["data"],
        json!({ "result": "correct", "completed": false, "next_chapter": 2 })
    );

    let json = expect_status(answer(3, "1969").await, StatusCode::OK).await;
    assert_eq!(
        json["data"],
        json!({ "result": "correct", "completed": true, "next_chapter": null })
    );

    let response = answer(4, "anything").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn access_requires_every_prior_answer(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let id = create_vault(&pool, &token).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/rooms/{id}/chapters/3/validate-access");

    let response = post_json(
        app(&pool),
        &uri,
        json!({ "progress": { "1": "moonlight sonata", "2": "14" } }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(
        json["data"],
        json!({
            "allowed": false,
            "reason": "You must correctly answer chapter 2 first",
            "redirect_to": 2
        })
    );

    let response = post_json(
        app(&pool),
        &uri,
        json!({ "progress": { "1": "Moonlight Sonata", "2": "13" } }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"], json!({ "allowed": true }));

    // A malformed body counts as no progress.
    let response = post_json(app(&pool), &uri, json!({ "progress": "oops" })).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["redirect_to"], 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn progress_lists_unlocked_chapters(pool: PgPool) {
    let (_, token) = author(&pool, "Ada").await;
    let id = create_vault(&pool, &token).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/rooms/{id}/validate-progress");

    let response = post_json(
        app(&pool),
        &uri,
        json!({ "progress": { "1": "moonlight sonata", "3": "1969" } }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["unlocked_chapters"], json!([1, 2]));
    assert_eq!(json["data"]["total_chapters"], 3);

    let response = post_json(app(&pool), "/api/v1/rooms/999999/validate-progress", json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
