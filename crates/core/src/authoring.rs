//! Room drafts submitted by the create and edit forms, and their
//! normalization into the shape that is persisted.
//!
//! Normalization enforces the stored-row invariants: trimmed text, lower-cased
//! answers, no blank hints, and contiguous 1-based numbering.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::answers::normalize_answer;
use crate::error::CoreError;
use crate::theme::RoomTheme;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Drafts (request payloads)
// ---------------------------------------------------------------------------

/// A room as submitted by an author.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RoomDraft {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub theme: Option<String>,
    #[serde(default)]
    pub chapters: Vec<ChapterDraft>,
}

/// A chapter as submitted. `id` is present when editing a loaded chapter.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChapterDraft {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub hints: Vec<HintDraft>,
    /// Request narration for this chapter once the room is saved.
    #[serde(default)]
    pub generate_audio: bool,
}

/// A hint as submitted. `id` is present when editing a loaded hint.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HintDraft {
    #[serde(default)]
    pub id: Option<DbId>,
    #[serde(default)]
    pub content: String,
}

// ---------------------------------------------------------------------------
// Normalized form
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRoom {
    pub title: String,
    pub description: Option<String>,
    pub theme: RoomTheme,
    pub chapters: Vec<NormalizedChapter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedChapter {
    pub id: Option<DbId>,
    pub chapter_number: i32,
    pub title: String,
    pub content: String,
    pub answer: String,
    pub hints: Vec<NormalizedHint>,
    pub generate_audio: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedHint {
    pub id: Option<DbId>,
    pub hint_number: i32,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

fn required(value: &str, message: impl FnOnce() -> String) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(message()));
    }
    Ok(trimmed.to_string())
}

fn ensure_unique_ids<I>(ids: I, what: &str) -> Result<(), CoreError>
where
    I: IntoIterator<Item = DbId>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!("Duplicate {what} id {id}")));
        }
    }
    Ok(())
}

/// Validate a draft and normalize it for persistence.
pub fn normalize_room(draft: &RoomDraft) -> Result<NormalizedRoom, CoreError> {
    let title = required(&draft.title, || "Title is required".to_string())?;

    if draft.chapters.is_empty() {
        return Err(CoreError::Validation(
            "At least one chapter is required".to_string(),
        ));
    }

    ensure_unique_ids(draft.chapters.iter().filter_map(|c| c.id), "chapter")?;

    let theme = RoomTheme::resolve(draft.theme.as_deref())?;
    let description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let chapters = draft
        .chapters
        .iter()
        .zip(1..)
        .map(|(chapter, number)| normalize_chapter(chapter, number))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedRoom {
        title,
        description,
        theme,
        chapters,
    })
}

fn normalize_chapter(draft: &ChapterDraft, number: i32) -> Result<NormalizedChapter, CoreError> {
    let title = required(&draft.title, || format!("Chapter {number} title is required"))?;
    let content = required(&draft.content, || format!("Chapter {number} content is required"))?;
    required(&draft.answer, || format!("Chapter {number} answer is required"))?;

    ensure_unique_ids(draft.hints.iter().filter_map(|h| h.id), "hint")?;

    let hints = draft
        .hints
        .iter()
        .filter(|h| !h.content.trim().is_empty())
        .zip(1..)
        .map(|(hint, hint_number)| NormalizedHint {
            id: hint.id,
            hint_number,
            content: hint.content.trim().to_string(),
        })
        .collect();

    Ok(NormalizedChapter {
        id: draft.id,
        chapter_number: number,
        title,
        content,
        answer: normalize_answer(&draft.answer),
        hints,
        generate_audio: draft.generate_audio,
    })
}
