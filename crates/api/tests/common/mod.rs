#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use escaperoom_api::auth::jwt::{generate_access_token, JwtConfig};
use escaperoom_api::auth::password::hash_password;
use escaperoom_api::config::{IntegrationsConfig, ServerConfig};
use escaperoom_api::router::build_app_router;
use escaperoom_api::state::{AppState, Integrations};
use escaperoom_cloud::{AudioStore, CloudError, RoomGenerator, SpeechSynthesizer};
use escaperoom_core::generation::GeneratedRoom;
use escaperoom_core::types::DbId;
use escaperoom_db::models::user::CreateUser;
use escaperoom_db::repositories::UserRepo;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults and no integrations.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        integrations: IntegrationsConfig::default(),
    }
}

/// Build the full application router over `pool` with the given clients.
pub fn build_test_app(pool: PgPool, integrations: Integrations) -> Router {
    build_test_app_with_config(pool, integrations, test_config())
}

/// Same as [`build_test_app`] with a caller-supplied configuration.
pub fn build_test_app_with_config(
    pool: PgPool,
    integrations: Integrations,
    config: ServerConfig,
) -> Router {
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        integrations,
    };
    build_app_router(state, &config)
}

/// A pool that never connects. Routes that reject a request before touching
/// the database can be exercised without Postgres.
pub fn lazy_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://localhost/unused")
        .expect("lazy pool should build")
}

/// App without a database or integrations.
pub fn offline_app() -> Router {
    build_test_app(lazy_pool(), Integrations::default())
}

/// Mint an access token signed with the test secret.
pub fn token_for(user_id: DbId, role: &str, premium: bool) -> String {
    generate_access_token(user_id, role, premium, &test_config().jwt)
        .expect("token generation should succeed")
}

// ---------------------------------------------------------------------------
// Fake integrations
// ---------------------------------------------------------------------------

/// Speech synthesizer that records every text it is asked to narrate.
#[derive(Default)]
pub struct FakeSpeech {
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CloudError> {
        self.calls.lock().unwrap().push(text.to_string());
        Ok(b"ID3fake-mp3".to_vec())
    }
}

/// Speech synthesizer that takes `delay` per call before succeeding.
pub struct SlowSpeech {
    pub delay: Duration,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl SpeechSynthesizer for SlowSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CloudError> {
        tokio::time::sleep(self.delay).await;
        self.calls.lock().unwrap().push(text.to_string());
        Ok(b"ID3slow-mp3".to_vec())
    }
}

/// Speech synthesizer whose provider always answers with an error.
pub struct FailingSpeech;

#[async_trait]
impl SpeechSynthesizer for FailingSpeech {
    async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, CloudError> {
        Err(CloudError::Api {
            provider: "ElevenLabs",
            status: 500,
            body: "voice unavailable".to_string(),
        })
    }
}

/// Audio store that keeps uploads in memory.
#[derive(Default)]
pub struct FakeStore {
    pub uploads: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AudioStore for FakeStore {
    async fn put_public(
        &self,
        key: &str,
        _body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(format!("https://audio.test/{key}"))
    }
}

/// Room generator returning a fixed room, or failing like a provider outage.
pub struct FakeGenerator {
    pub room: Option<GeneratedRoom>,
}

#[async_trait]
impl RoomGenerator for FakeGenerator {
    async fn generate_room(&self, _description: &str) -> Result<GeneratedRoom, CloudError> {
        self.room.clone().ok_or(CloudError::Api {
            provider: "gemini",
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

/// Integrations with the given synthesizer and an in-memory store.
pub fn integrations_with_speech(speech: Arc<dyn SpeechSynthesizer>) -> (Integrations, Arc<FakeStore>) {
    let store = Arc::new(FakeStore::default());
    let integrations = Integrations {
        speech: Some(speech),
        audio_store: Some(store.clone() as Arc<dyn AudioStore>),
        room_generator: None,
    };
    (integrations, store)
}

pub fn fake_integrations() -> (Integrations, Arc<FakeSpeech>, Arc<FakeStore>) {
    let speech = Arc::new(FakeSpeech::default());
    let store = Arc::new(FakeStore::default());
    let integrations = Integrations {
        speech: Some(speech.clone() as Arc<dyn SpeechSynthesizer>),
        audio_store: Some(store.clone() as Arc<dyn AudioStore>),
        room_generator: None,
    };
    (integrations, speech, store)
}

/// Insert a user with the given premium flag and return its id and an
/// access token.
pub async fn create_user(pool: &PgPool, name: &str, role: &str, premium: bool) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: hash_password("irrelevant-pass").expect("hashing should succeed"),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed");
    if premium {
        UserRepo::set_premium(pool, user.id, true)
            .await
            .expect("premium update should succeed");
    }
    (user.id, token_for(user.id, role, premium))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.expect("router should respond")
}

fn json_request(
    method: &str,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request("POST", uri, body, None)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("POST", uri, body, Some(token))).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, json_request("PUT", uri, body, Some(token))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Assert the status and return the parsed body.
pub async fn expect_status(response: Response, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
