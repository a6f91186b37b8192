//! Repository for the `chapters` table.

use escaperoom_core::authoring::NormalizedChapter;
use escaperoom_core::types::DbId;
use sqlx::PgPool;

use crate::models::chapter::Chapter;
use crate::repositories::PgTx;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, escape_room_id, chapter_number, title, content, answer, \
                       audio_url, audio_text_hash, created_at, updated_at";

/// Provides CRUD operations for chapters.
pub struct ChapterRepo;

impl ChapterRepo {
    /// List a room's chapters in chapter order.
    pub async fn list_for_room(pool: &PgPool, room_id: DbId) -> Result<Vec<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters WHERE escape_room_id = $1 ORDER BY chapter_number"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(room_id)
            .fetch_all(pool)
            .await
    }

    /// Find a chapter by room and 1-based chapter number.
    pub async fn find_by_number(
        pool: &PgPool,
        room_id: DbId,
        chapter_number: i32,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM chapters WHERE escape_room_id = $1 AND chapter_number = $2"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(room_id)
            .bind(chapter_number)
            .fetch_optional(pool)
            .await
    }

    /// Find a chapter by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chapters WHERE id = $1");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of chapters in a room.
    pub async fn count_for_room(pool: &PgPool, room_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM chapters WHERE escape_room_id = $1")
            .bind(room_id)
            .fetch_one(pool)
            .await
    }

    /// Record a chapter's narration URL and the hash of the text it was
    /// generated from.
    pub async fn set_audio(
        pool: &PgPool,
        id: DbId,
        audio_url: &str,
        audio_text_hash: &str,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "UPDATE chapters SET audio_url = $2, audio_text_hash = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .bind(audio_url)
            .bind(audio_text_hash)
            .fetch_optional(pool)
            .await
    }

    /// Insert a chapter inside a room transaction.
    pub(crate) async fn insert(
        tx: &mut PgTx<'_>,
        room_id: DbId,
        chapter: &NormalizedChapter,
    ) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "INSERT INTO chapters (escape_room_id, chapter_number, title, content, answer)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(room_id)
            .bind(chapter.chapter_number)
            .bind(&chapter.title)
            .bind(&chapter.content)
            .bind(&chapter.answer)
            .fetch_one(&mut **tx)
            .await
    }

    /// Update a chapter's text inside a room transaction.
    ///
    /// Narration columns are left untouched; a stale hash is detected when
    /// audio is next requested.
    pub(crate) async fn update(
        tx: &mut PgTx<'_>,
        id: DbId,
        chapter: &NormalizedChapter,
    ) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "UPDATE chapters
             SET chapter_number = $2, title = $3, content = $4, answer = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .bind(chapter.chapter_number)
            .bind(&chapter.title)
            .bind(&chapter.content)
            .bind(&chapter.answer)
            .fetch_one(&mut **tx)
            .await
    }

    /// Ids of a room's stored chapters in chapter order.
    pub(crate) async fn ids_for_room(
        tx: &mut PgTx<'_>,
        room_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT id FROM chapters WHERE escape_room_id = $1 ORDER BY chapter_number",
        )
        .bind(room_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Delete chapters (and, by cascade, their hints).
    pub(crate) async fn delete_many(tx: &mut PgTx<'_>, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM chapters WHERE id = ANY($1)")
            .bind(ids)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}
