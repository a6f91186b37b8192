//! Text-to-speech through the ElevenLabs REST API.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{ensure_success, CloudError};

const PROVIDER: &str = "ElevenLabs";

/// Upper bound on one synthesis call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Voice used when `ELEVENLABS_VOICE_ID` is unset.
pub const DEFAULT_VOICE_ID: &str = "vY7jMt4Cbubxeq9O5Qsj";

/// Synthesis model.
pub const MODEL_ID: &str = "eleven_monolingual_v1";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Converts narration text into MP3 audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CloudError>;
}

/// Connection settings for ElevenLabs.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub base_url: String,
}

impl ElevenLabsConfig {
    /// Load from environment variables.
    ///
    /// Returns `None` when `ELEVENLABS_API_KEY` is unset or blank.
    ///
    /// | Env Var               | Default                     |
    /// |-----------------------|-----------------------------|
    /// | `ELEVENLABS_API_KEY`  | (required)                  |
    /// | `ELEVENLABS_VOICE_ID` | `vY7jMt4Cbubxeq9O5Qsj`      |
    /// | `ELEVENLABS_BASE_URL` | `https://api.elevenlabs.io` |
    pub fn from_env() -> Option<Self> {
        let api_key = crate::env_opt("ELEVENLABS_API_KEY")?;
        Some(Self {
            api_key,
            voice_id: crate::env_opt("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            base_url: crate::env_opt("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

/// HTTP client for the ElevenLabs text-to-speech endpoint.
pub struct ElevenLabsClient {
    client: reqwest::Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> Self {
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
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        )
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CloudError> {
        let body = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let response = ensure_success(PROVIDER, response).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(CloudError::InvalidResponse {
                provider: PROVIDER,
                message: "empty audio body".to_string(),
            });
        }

        tracing::debug!(voice_id = %self.config.voice_id, bytes = bytes.len(), "Speech synthesized");
        Ok(bytes.to_vec())
    }
}
