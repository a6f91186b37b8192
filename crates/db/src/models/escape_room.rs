//! Escape room entity model and read views.

use escaperoom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::chapter::{ChapterSummary, ChapterWithHints};

/// A row from the `escape_rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EscapeRoom {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub theme: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Minimal room listing used by the "continue playing" view.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomSummary {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub theme: String,
}

/// A room joined with its author's display name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoomWithAuthor {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub theme: String,
    pub created_at: Timestamp,
    pub author: String,
}

/// Public room landing page: room details plus the chapter list.
#[derive(Debug, Clone, Serialize)]
pub struct RoomOverview {
    pub room: RoomWithAuthor,
    pub chapters: Vec<ChapterSummary>,
}

/// A room with every chapter and hint, as loaded by the edit form.
#[derive(Debug, Clone, Serialize)]
pub struct RoomDetail {
    #[serde(flatten)]
    pub room: EscapeRoom,
    pub chapters: Vec<ChapterWithHints>,
}
