//! Chapter entity model and read views.

use escaperoom_core::progress::SolvableChapter;
use escaperoom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::hint::Hint;

/// A row from the `chapters` table.
///
/// Carries the answer, so it is only serialized for the room owner.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub escape_room_id: DbId,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub answer: String,
    pub audio_url: Option<String>,
    pub audio_text_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SolvableChapter for Chapter {
    fn chapter_number(&self) -> i32 {
        self.chapter_number
    }

    fn answer(&self) -> &str {
        &self.answer
    }
}

/// Chapter entry in a room's public table of contents.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub id: DbId,
    pub chapter_number: i32,
    pub title: String,
}

impl From<&Chapter> for ChapterSummary {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            chapter_number: chapter.chapter_number,
            title: chapter.title.clone(),
        }
    }
}

/// What a player sees on a chapter page: everything except the answer.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterView {
    pub id: DbId,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub audio_url: Option<String>,
}

impl From<&Chapter> for ChapterView {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            chapter_number: chapter.chapter_number,
            title: chapter.title.clone(),
            content: chapter.content.clone(),
            audio_url: chapter.audio_url.clone(),
        }
    }
}

/// A chapter with its hints, ordered by `hint_number`.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterWithHints {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub hints: Vec<Hint>,
}
