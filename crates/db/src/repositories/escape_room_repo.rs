//! Repository for the `escape_rooms` table.
//!
//! Rooms own their chapters and hints; every write that touches more than one
//! table runs in a single transaction so a failed save leaves the stored room
//! unchanged.

use std::collections::HashMap;

use escaperoom_core::authoring::NormalizedRoom;
use escaperoom_core::reconcile::{plan_reconciliation, Upsert};
use escaperoom_core::types::DbId;
use sqlx::PgPool;

use crate::models::chapter::{Chapter, ChapterSummary, ChapterWithHints};
use crate::models::escape_room::{EscapeRoom, RoomDetail, RoomOverview, RoomSummary, RoomWithAuthor};
use crate::models::hint::Hint;
use crate::repositories::{ChapterRepo, HintRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, title, description, theme, created_at, updated_at";

/// Provides CRUD operations for escape rooms.
pub struct EscapeRoomRepo;

impl EscapeRoomRepo {
    /// Find a room by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EscapeRoom>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM escape_rooms WHERE id = $1");
        sqlx::query_as::<_, EscapeRoom>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List rooms created by a user, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<EscapeRoom>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM escape_rooms WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, EscapeRoom>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Summaries for the given ids. Unknown ids are skipped.
    pub async fn list_summaries(pool: &PgPool, ids: &[DbId]) -> Result<Vec<RoomSummary>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, RoomSummary>(
            "SELECT id, title, description, theme FROM escape_rooms
             WHERE id = ANY($1)
             ORDER BY created_at DESC, id DESC",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Public landing view: room, author name, and chapter list.
    pub async fn find_overview(pool: &PgPool, id: DbId) -> Result<Option<RoomOverview>, sqlx::Error> {
        let room = sqlx::query_as::<_, RoomWithAuthor>(
            "SELECT r.id, r.title, r.description, r.theme, r.created_at, u.name AS author
             FROM escape_rooms r
             JOIN users u ON u.id = r.user_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        let Some(room) = room else {
            return Ok(None);
        };

        let chapters = ChapterRepo::list_for_room(pool, id)
            .await?
            .iter()
            .map(ChapterSummary::from)
            .collect();

        Ok(Some(RoomOverview { room, chapters }))
    }

    /// Load a room with every chapter and its hints.
    pub async fn find_detail(pool: &PgPool, id: DbId) -> Result<Option<RoomDetail>, sqlx::Error> {
        let Some(room) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let chapters = ChapterRepo::list_for_room(pool, id).await?;
        let chapter_ids: Vec<DbId> = chapters.iter().map(|c| c.id).collect();
        let mut hints_by_chapter: HashMap<DbId, Vec<Hint>> = HashMap::new();
        for hint in HintRepo::list_for_chapters(pool, &chapter_ids).await? {
            hints_by_chapter.entry(hint.chapter_id).or_default().push(hint);
        }

        let chapters = chapters
            .into_iter()
            .map(|chapter| {
                let hints = hints_by_chapter.remove(&chapter.id).unwrap_or_default();
                ChapterWithHints { chapter, hints }
            })
            .collect();

        Ok(Some(RoomDetail { room, chapters }))
    }

    /// Create a room with its chapters and hints.
    ///
    /// Returns the room and its chapters in chapter order.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &NormalizedRoom,
    ) -> Result<(EscapeRoom, Vec<Chapter>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO escape_rooms (user_id, title, description, theme)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let room = sqlx::query_as::<_, EscapeRoom>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.theme.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let mut chapters = Vec::with_capacity(input.chapters.len());
        for chapter in &input.chapters {
            let row = ChapterRepo::insert(&mut tx, room.id, chapter).await?;
            HintRepo::insert_all(&mut tx, row.id, &chapter.hints).await?;
            chapters.push(row);
        }

        tx.commit().await?;

        tracing::info!(room_id = room.id, user_id, chapters = chapters.len(), "Escape room created");
        Ok((room, chapters))
    }

    /// Replace a room's fields and reconcile its chapters and hints with the
    /// submitted ones.
    ///
    /// Returns `None` if no row with the given `id` exists. Chapters are
    /// returned in chapter order.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &NormalizedRoom,
    ) -> Result<Option<(EscapeRoom, Vec<Chapter>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE escape_rooms SET title = $2, description = $3, theme = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let room = sqlx::query_as::<_, EscapeRoom>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.theme.as_str())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(room) = room else {
            return Ok(None);
        };

        let existing = ChapterRepo::ids_for_room(&mut tx, id).await?;
        let plan = plan_reconciliation(&existing, &input.chapters, |c| c.id);
        let deleted = ChapterRepo::delete_many(&mut tx, &plan.deletes).await?;

        let mut chapters = Vec::with_capacity(plan.upserts.len());
        for upsert in &plan.upserts {
            let chapter = upsert.item();
            let row = match upsert {
                Upsert::Update { id: chapter_id, .. } => {
                    let row = ChapterRepo::update(&mut tx, *chapter_id, chapter).await?;
                    HintRepo::reconcile(&mut tx, row.id, &chapter.hints).await?;
                    row
                }
                Upsert::Insert { .. } => {
                    let row = ChapterRepo::insert(&mut tx, id, chapter).await?;
                    HintRepo::insert_all(&mut tx, row.id, &chapter.hints).await?;
                    row
                }
            };
            chapters.push(row);
        }

        tx.commit().await?;

        tracing::info!(
            room_id = id,
            deleted,
            updated = plan.updates(),
            inserted = plan.inserts(),
            "Escape room updated",
        );
        Ok(Some((room, chapters)))
    }

    /// Delete a room. Chapters and hints cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM escape_rooms WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
