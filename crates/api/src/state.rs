use std::sync::Arc;

use escaperoom_cloud::{
    AudioStore, CloudError, ElevenLabsClient, GeminiClient, R2Store, RoomGenerator,
    SpeechSynthesizer,
};

use crate::config::{IntegrationsConfig, ServerConfig};
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: escaperoom_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Clients for the premium integrations.
    pub integrations: Integrations,
}

/// Third-party clients. A `None` slot means the integration is not
/// configured; requests that need it fail with a 500.
#[derive(Clone, Default)]
pub struct Integrations {
    pub speech: Option<Arc<dyn SpeechSynthesizer>>,
    pub audio_store: Option<Arc<dyn AudioStore>>,
    pub room_generator: Option<Arc<dyn RoomGenerator>>,
}

impl Integrations {
    /// Build real clients for every configured integration, warning about the
    /// ones left unconfigured.
    pub fn from_config(config: &IntegrationsConfig) -> Self {
        let speech = match &config.elevenlabs {
            Some(c) => {
                Some(Arc::new(ElevenLabsClient::new(c.clone())) as Arc<dyn SpeechSynthesizer>)
            }
            None => {
                tracing::warn!("ELEVENLABS_API_KEY not set; audio generation disabled");
                None
            }
        };

        let audio_store = match &config.r2 {
            Some(c) => Some(Arc::new(R2Store::new(c)) as Arc<dyn AudioStore>),
            None => {
                tracing::warn!("R2 storage not fully configured; audio generation disabled");
                None
            }
        };

        let room_generator = match &config.gemini {
            Some(c) => Some(Arc::new(GeminiClient::new(c.clone())) as Arc<dyn RoomGenerator>),
            None => {
                tracing::warn!("GEMINI_API_KEY not set; AI room generation disabled");
                None
            }
        };

        Self {
            speech,
            audio_store,
            room_generator,
        }
    }

    pub fn speech(&self) -> AppResult<&Arc<dyn SpeechSynthesizer>> {
        self.speech
            .as_ref()
            .ok_or_else(|| CloudError::NotConfigured("Text-to-speech").into())
    }

    pub fn audio_store(&self) -> AppResult<&Arc<dyn AudioStore>> {
        self.audio_store
            .as_ref()
            .ok_or_else(|| CloudError::NotConfigured("Audio storage").into())
    }

    pub fn room_generator(&self) -> AppResult<&Arc<dyn RoomGenerator>> {
        self.room_generator
            .as_ref()
            .ok_or_else(|| CloudError::NotConfigured("AI room generation").into())
    }
}
