//! Hint entity model.

use escaperoom_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `hints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hint {
    pub id: DbId,
    pub chapter_id: DbId,
    pub hint_number: i32,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
