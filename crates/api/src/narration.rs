//! Chapter narration: synthesize speech for a chapter's text, upload it, and
//! record the URL together with the hash of the text it was made from.
//!
//! Requests for text whose hash matches the stored one reuse the stored URL
//! without calling any provider.

use std::time::Duration;

use chrono::Utc;
use escaperoom_core::authoring::NormalizedRoom;
use escaperoom_core::narration::{audio_object_key, plan_audio, AudioPlan, AUDIO_CONTENT_TYPE};
use escaperoom_db::models::chapter::Chapter;
use escaperoom_db::repositories::ChapterRepo;
use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Result of a narration request.
#[derive(Debug, Clone, Serialize)]
pub struct Narration {
    pub audio_url: String,
    /// True when existing audio was reused.
    pub cached: bool,
}

/// Ensure `chapter` has narration for `text`, generating it if needed.
pub async fn narrate(state: &AppState, chapter: &Chapter, text: &str) -> AppResult<Narration> {
    let hash = match plan_audio(
        chapter.audio_text_hash.as_deref(),
        chapter.audio_url.as_deref(),
        text,
    ) {
        AudioPlan::Reuse { url } => {
            tracing::debug!(chapter_id = chapter.id, "Reusing narration for unchanged text");
            return Ok(Narration {
                audio_url: url,
                cached: true,
            });
        }
        AudioPlan::Generate { hash } => hash,
    };

    let speech = state.integrations.speech()?;
    let store = state.integrations.audio_store()?;

    let audio = speech.synthesize(text.trim()).await?;
    let key = audio_object_key(
        chapter.escape_room_id,
        chapter.id,
        Utc::now().timestamp_millis(),
    );
    let audio_url = store.put_public(&key, audio, AUDIO_CONTENT_TYPE).await?;

    ChapterRepo::set_audio(&state.pool, chapter.id, &audio_url, &hash).await?;

    tracing::info!(
        room_id = chapter.escape_room_id,
        chapter_id = chapter.id,
        %audio_url,
        "Narration generated",
    );
    Ok(Narration {
        audio_url,
        cached: false,
    })
}

/// Narrate every saved chapter whose draft asked for it.
///
/// `saved` must be in the same order as `room.chapters`. The work runs in its
/// own task and the caller waits for at most half the request timeout; after
/// that the save is answered without the audio and narration carries on in
/// the background. Failures are logged and never fail the save. Authors
/// without premium get no narration.
pub async fn narrate_after_save(
    state: &AppState,
    user: &AuthUser,
    room: &NormalizedRoom,
    saved: &[Chapter],
) {
    let chapters: Vec<Chapter> = room
        .chapters
        .iter()
        .zip(saved)
        .filter(|(draft, _)| draft.generate_audio)
        .map(|(_, chapter)| chapter.clone())
        .collect();
    let Some(room_id) = chapters.first().map(|c| c.escape_room_id) else {
        return;
    };

    match user.has_premium(state).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::debug!(
                user_id = user.user_id,
                requested = chapters.len(),
                "Skipping narration for non-premium author",
            );
            return;
        }
        Err(e) => {
            tracing::warn!(user_id = user.user_id, error = %e, "Could not check premium; skipping narration");
            return;
        }
    }

    let task_state = state.clone();
    let mut task = tokio::spawn(async move { narrate_chapters(&task_state, &chapters).await });

    match tokio::time::timeout(narration_wait(&state.config), &mut task).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(room_id, error = %e, "Narration task panicked"),
        Err(_) => tracing::info!(room_id, "Narration still running; answering without it"),
    }
}

async fn narrate_chapters(state: &AppState, chapters: &[Chapter]) {
    for chapter in chapters {
        if let Err(e) = narrate(state, chapter, &chapter.content).await {
            tracing::warn!(
                chapter_id = chapter.id,
                error = %e,
                "Narration failed; continuing without audio",
            );
        }
    }
}

/// How long a save waits for its narration before answering.
fn narration_wait(config: &ServerConfig) -> Duration {
    Duration::from_secs(config.request_timeout_secs) / 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtConfig;
    use crate::config::IntegrationsConfig;

    #[test]
    fn narration_wait_stays_inside_the_request_timeout() {
        let config = ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            cors_origins: Vec::new(),
            request_timeout_secs: 5,
            jwt: JwtConfig {
                secret: "secret".into(),
                access_token_expiry_mins: 15,
                refresh_token_expiry_days: 7,
            },
            integrations: IntegrationsConfig::default(),
        };
        assert_eq!(narration_wait(&config), Duration::from_millis(2500));
    }
}
