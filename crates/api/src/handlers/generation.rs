//! Premium generation endpoints: chapter narration and AI-drafted rooms.

use axum::extract::State;
use axum::Json;
use escaperoom_core::authoring::RoomDraft;
use escaperoom_core::error::CoreError;
use escaperoom_core::generation::validate_prompt;
use escaperoom_core::types::DbId;
use escaperoom_db::repositories::{ChapterRepo, EscapeRoomRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::rbac::RequirePremium;
use crate::narration::{narrate, Narration};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /generate/audio`.
#[derive(Debug, Deserialize)]
pub struct GenerateAudioRequest {
    pub chapter_id: Option<DbId>,
    pub text: Option<String>,
}

/// Request body for `POST /generate/escape-room`.
#[derive(Debug, Deserialize)]
pub struct GenerateRoomRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/v1/generate/audio
///
/// Narrate `text` for a chapter the caller owns. Repeating a request with the
/// same text returns the stored URL with `cached: true`.
pub async fn generate_audio(
    RequirePremium(user): RequirePremium,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateAudioRequest>,
) -> AppResult<Json<DataResponse<Narration>>> {
    let chapter_id = input
        .chapter_id
        .ok_or_else(|| AppError::BadRequest("chapter_id is required".into()))?;
    let text = input
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("text is required and must not be empty".into()))?;

    let chapter = ChapterRepo::find_by_id(&state.pool, chapter_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Chapter",
            id: chapter_id,
        })?;
    let room = EscapeRoomRepo::find_by_id(&state.pool, chapter.escape_room_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Escape room",
            id: chapter.escape_room_id,
        })?;
    user.ensure_owner(room.user_id, "chapter")?;

    let narration = narrate(&state, &chapter, text).await?;
    Ok(Json(DataResponse { data: narration }))
}

/// POST /api/v1/generate/escape-room
///
/// Draft a complete room from a description. The result is not saved; it
/// has the shape `POST /rooms` accepts.
pub async fn generate_escape_room(
    RequirePremium(user): RequirePremium,
    State(state): State<AppState>,
    AppJson(input): AppJson<GenerateRoomRequest>,
) -> AppResult<Json<DataResponse<RoomDraft>>> {
    let prompt = validate_prompt(&input.prompt)?;
    let generator = state.integrations.room_generator()?;

    let room = generator.generate_room(prompt).await?;
    tracing::info!(
        user_id = user.user_id,
        chapters = room.chapters.len(),
        "Escape room drafted",
    );
    Ok(Json(DataResponse { data: room.into() }))
}
