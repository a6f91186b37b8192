//! AI room generation through the Gemini `generateContent` endpoint with
//! structured JSON output.

use std::time::Duration;

use async_trait::async_trait;
use escaperoom_core::generation::{
    build_room_prompt, parse_generated_room, room_response_schema, GeneratedRoom,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ensure_success, CloudError};

const PROVIDER: &str = "Gemini";

/// Upper bound on one generation call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Produces a complete room from a free-text description.
#[async_trait]
pub trait RoomGenerator: Send + Sync {
    async fn generate_room(&self, description: &str) -> Result<GeneratedRoom, CloudError>;
}

/// Connection settings for Gemini.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl GeminiConfig {
    /// Load from environment variables.
    ///
    /// Returns `None` when `GEMINI_API_KEY` is unset or blank.
    pub fn from_env() -> Option<Self> {
        let api_key = crate::env_opt("GEMINI_API_KEY")?;
        Some(Self {
            api_key,
            model: crate::env_opt("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: crate::env_opt("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn first_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// HTTP client for the Gemini REST API.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to build reqwest HTTP client"),
            config,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl RoomGenerator for GeminiClient {
    async fn generate_room(&self, description: &str) -> Result<GeneratedRoom, CloudError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": build_room_prompt(description) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": room_response_schema(),
            },
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;
        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed.first_text().ok_or_else(|| CloudError::InvalidResponse {
            provider: PROVIDER,
            message: "no text in first candidate".to_string(),
        })?;

        let room = parse_generated_room(&text).map_err(|e| CloudError::InvalidResponse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

        tracing::info!(model = %self.config.model, chapters = room.chapters.len(), "Room generated");
        Ok(room)
    }
}
