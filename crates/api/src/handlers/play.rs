//! Player-facing endpoints: chapter pages, answer checks, and sequential
//! unlock validation.
//!
//! Progress is owned by the client and re-validated on every request.
//! Progress bodies are read leniently: a missing or malformed body counts as
//! no progress rather than an error.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use escaperoom_core::error::CoreError;
use escaperoom_core::progress::{
    check_access, evaluate_answer, parse_chapter_number, unlocked_chapters, AccessDecision,
    AnswerOutcome, RoomProgress, FIRST_CHAPTER,
};
use escaperoom_core::types::DbId;
use escaperoom_db::models::chapter::{Chapter, ChapterView};
use escaperoom_db::models::escape_room::EscapeRoom;
use escaperoom_db::models::hint::Hint;
use escaperoom_db::repositories::{ChapterRepo, EscapeRoomRepo, HintRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST .../answer`.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub answer: String,
}

/// Room header shown above a chapter.
#[derive(Debug, Serialize)]
pub struct ChapterRoom {
    pub id: DbId,
    pub title: String,
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct HintView {
    pub id: DbId,
    pub hint_number: i32,
    pub content: String,
}

impl From<Hint> for HintView {
    fn from(hint: Hint) -> Self {
        Self {
            id: hint.id,
            hint_number: hint.hint_number,
            content: hint.content,
        }
    }
}

/// Everything a player needs to render one chapter.
#[derive(Debug, Serialize)]
pub struct ChapterPage {
    pub room: ChapterRoom,
    pub chapter: ChapterView,
    pub hints: Vec<HintView>,
    pub total_chapters: usize,
}

/// Response of the access check.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccessResponse {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<i32>,
}

impl AccessResponse {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            redirect_to: None,
        }
    }
}

/// Response of the progress validation.
#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub unlocked_chapters: Vec<i32>,
    pub total_chapters: usize,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_room(state: &AppState, id: DbId) -> AppResult<EscapeRoom> {
    EscapeRoomRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Escape room",
                id,
            })
        })
}

async fn room_chapters(state: &AppState, room_id: DbId) -> AppResult<Vec<Chapter>> {
    find_room(state, room_id).await?;
    Ok(ChapterRepo::list_for_room(&state.pool, room_id).await?)
}

fn chapter_not_found() -> AppError {
    AppError::NotFound("Chapter not found".into())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/rooms/{id}/chapters/{n}
pub async fn chapter_page(
    State(state): State<AppState>,
    AppPath((room_id, raw_number)): AppPath<(DbId, String)>,
) -> AppResult<Json<DataResponse<ChapterPage>>> {
    let number = parse_chapter_number(&raw_number)?;
    let room = find_room(&state, room_id).await?;
    let chapters = ChapterRepo::list_for_room(&state.pool, room_id).await?;

    let chapter = chapters
        .iter()
        .find(|c| c.chapter_number == number)
        .ok_or_else(chapter_not_found)?;
    let hints = HintRepo::list_for_chapter(&state.pool, chapter.id).await?;

    Ok(Json(DataResponse {
        data: ChapterPage {
            room: ChapterRoom {
                id: room.id,
                title: room.title,
                theme: room.theme,
            },
            chapter: ChapterView::from(chapter),
            hints: hints.into_iter().map(HintView::from).collect(),
            total_chapters: chapters.len(),
        },
    }))
}

/// POST /api/v1/rooms/{id}/chapters/{n}/answer
///
/// A wrong answer is a normal outcome (`{"result": "incorrect"}`), not an
/// error. A blank answer is rejected with 400.
pub async fn check_answer(
    State(state): State<AppState>,
    AppPath((room_id, raw_number)): AppPath<(DbId, String)>,
    AppJson(input): AppJson<AnswerRequest>,
) -> AppResult<Json<DataResponse<AnswerOutcome>>> {
    let number = parse_chapter_number(&raw_number)?;
    if input.answer.trim().is_empty() {
        return Err(CoreError::Validation("Please enter an answer".into()).into());
    }

    let chapter = ChapterRepo::find_by_number(&state.pool, room_id, number)
        .await?
        .ok_or_else(chapter_not_found)?;
    let total = ChapterRepo::count_for_room(&state.pool, room_id).await?;
    let total = usize::try_from(total).unwrap_or_default();

    let outcome = evaluate_answer(&chapter, total, &input.answer)?;
    tracing::debug!(room_id, chapter_number = number, ?outcome, "Answer checked");
    Ok(Json(DataResponse { data: outcome }))
}

/// POST /api/v1/rooms/{id}/chapters/{n}/validate-access
///
/// Body: `{ "progress": { "1": "answer", ... } }`. Chapter 1 is always
/// allowed without touching the database.
pub async fn validate_access(
    State(state): State<AppState>,
    AppPath((room_id, raw_number)): AppPath<(DbId, String)>,
    body: Bytes,
) -> AppResult<Json<DataResponse<AccessResponse>>> {
    let number = parse_chapter_number(&raw_number)?;
    if number == FIRST_CHAPTER {
        return Ok(Json(DataResponse {
            data: AccessResponse::allowed(),
        }));
    }

    let chapters = room_chapters(&state, room_id).await?;
    let progress = RoomProgress::from_json_body(&body);

    let response = match check_access(&chapters, number, &progress) {
        AccessDecision::Allowed => AccessResponse::allowed(),
        AccessDecision::Denied {
            reason,
            redirect_to,
        } => AccessResponse {
            allowed: false,
            reason: Some(reason),
            redirect_to: Some(redirect_to),
        },
        AccessDecision::MissingChapter(missing) => {
            return Err(AppError::NotFound(format!("Chapter {missing} not found")));
        }
    };
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/v1/rooms/{id}/validate-progress
///
/// Body: `{ "progress": { "1": "answer", ... } }`. Returns the chapters the
/// submitted answers unlock.
pub async fn validate_progress(
    State(state): State<AppState>,
    AppPath(room_id): AppPath<DbId>,
    body: Bytes,
) -> AppResult<Json<DataResponse<ProgressResponse>>> {
    let chapters = room_chapters(&state, room_id).await?;
    let progress = RoomProgress::from_json_body(&body);

    Ok(Json(DataResponse {
        data: ProgressResponse {
            unlocked_chapters: unlocked_chapters(&chapters, &progress),
            total_chapters: chapters.len(),
        },
    }))
}
