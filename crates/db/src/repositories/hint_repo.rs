//! Repository for the `hints` table.

use escaperoom_core::authoring::NormalizedHint;
use escaperoom_core::reconcile::{plan_reconciliation, Upsert};
use escaperoom_core::types::DbId;
use sqlx::PgPool;

use crate::models::hint::Hint;
use crate::repositories::PgTx;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, chapter_id, hint_number, content, created_at, updated_at";

/// Provides read operations for hints and the transactional writes used by
/// room creation and editing.
pub struct HintRepo;

impl HintRepo {
    /// List a chapter's hints in hint order.
    pub async fn list_for_chapter(pool: &PgPool, chapter_id: DbId) -> Result<Vec<Hint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hints WHERE chapter_id = $1 ORDER BY hint_number"
        );
        sqlx::query_as::<_, Hint>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    /// List the hints of several chapters, ordered by chapter then hint number.
    pub async fn list_for_chapters(
        pool: &PgPool,
        chapter_ids: &[DbId],
    ) -> Result<Vec<Hint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM hints
             WHERE chapter_id = ANY($1)
             ORDER BY chapter_id, hint_number"
        );
        sqlx::query_as::<_, Hint>(&query)
            .bind(chapter_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert every hint of a freshly created chapter.
    pub(crate) async fn insert_all(
        tx: &mut PgTx<'_>,
        chapter_id: DbId,
        hints: &[NormalizedHint],
    ) -> Result<(), sqlx::Error> {
        for hint in hints {
            Self::insert(tx, chapter_id, hint.hint_number, &hint.content).await?;
        }
        Ok(())
    }

    /// Bring a chapter's stored hints in line with the submitted list.
    ///
    /// Submitted hints carrying an id the chapter owns are updated in place,
    /// the rest are inserted, and stored hints missing from the submission
    /// are deleted.
    pub(crate) async fn reconcile(
        tx: &mut PgTx<'_>,
        chapter_id: DbId,
        hints: &[NormalizedHint],
    ) -> Result<(), sqlx::Error> {
        let existing: Vec<DbId> = sqlx::query_scalar(
            "SELECT id FROM hints WHERE chapter_id = $1 ORDER BY hint_number",
        )
        .bind(chapter_id)
        .fetch_all(&mut **tx)
        .await?;

        let plan = plan_reconciliation(&existing, hints, |h| h.id);

        if !plan.deletes.is_empty() {
            sqlx::query("DELETE FROM hints WHERE id = ANY($1)")
                .bind(&plan.deletes)
                .execute(&mut **tx)
                .await?;
        }

        for upsert in &plan.upserts {
            let hint = upsert.item();
            match upsert {
                Upsert::Update { id, .. } => {
                    sqlx::query(
                        "UPDATE hints SET hint_number = $2, content = $3 WHERE id = $1",
                    )
                    .bind(id)
                    .bind(hint.hint_number)
                    .bind(&hint.content)
                    .execute(&mut **tx)
                    .await?;
                }
                Upsert::Insert { .. } => {
                    Self::insert(tx, chapter_id, hint.hint_number, &hint.content).await?;
                }
            }
        }

        tracing::debug!(
            chapter_id,
            deleted = plan.deletes.len(),
            updated = plan.updates(),
            inserted = plan.inserts(),
            "Reconciled hints",
        );
        Ok(())
    }

    async fn insert(
        tx: &mut PgTx<'_>,
        chapter_id: DbId,
        hint_number: i32,
        content: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO hints (chapter_id, hint_number, content) VALUES ($1, $2, $3)")
            .bind(chapter_id)
            .bind(hint_number)
            .bind(content)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}
