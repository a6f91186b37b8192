//! Clients for the third-party services behind premium features.
//!
//! Each integration is exposed as an object-safe trait so the API layer can
//! hold it as `Arc<dyn Trait>` and tests can substitute fakes.

pub mod error;
pub mod gemini;
pub mod storage;
pub mod tts;

pub use error::CloudError;
pub use gemini::{GeminiClient, GeminiConfig, RoomGenerator};
pub use storage::{AudioStore, R2Config, R2Store};
pub use tts::{ElevenLabsClient, ElevenLabsConfig, SpeechSynthesizer};

/// Read an environment variable, treating blank values as unset.
pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
