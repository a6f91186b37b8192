//! Reconciliation of submitted child collections against stored rows.
//!
//! The edit form submits the full list of chapters (and, per chapter, the
//! full list of hints). Items that carry the id of an existing row update that
//! row; items without one, or with an id the parent does not own, become new
//! rows; stored rows absent from the submission are deleted.

use std::collections::HashSet;

use crate::types::DbId;

/// One submitted item and where it ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert<'a, T> {
    Update { id: DbId, position: i32, item: &'a T },
    Insert { position: i32, item: &'a T },
}

impl<'a, T> Upsert<'a, T> {
    /// 1-based position of the item in the submission.
    pub fn position(&self) -> i32 {
        match self {
            Self::Update { position, .. } | Self::Insert { position, .. } => *position,
        }
    }

    pub fn item(&self) -> &'a T {
        match self {
            Self::Update { item, .. } | Self::Insert { item, .. } => item,
        }
    }
}

/// The set of row operations that turns the stored collection into the
/// submitted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePlan<'a, T> {
    /// Stored ids to delete, in stored order.
    pub deletes: Vec<DbId>,
    /// Submitted items in submission order.
    pub upserts: Vec<Upsert<'a, T>>,
}

impl<T> ReconcilePlan<'_, T> {
    pub fn inserts(&self) -> usize {
        self.upserts
            .iter()
            .filter(|u| matches!(u, Upsert::Insert { .. }))
            .count()
    }

    pub fn updates(&self) -> usize {
        self.upserts.len() - self.inserts()
    }
}

/// Build the reconciliation plan for one parent.
///
/// `id_of` extracts the optional row id an item was loaded with.
pub fn plan_reconciliation<'a, T, F>(
    existing_ids: &[DbId],
    submitted: &'a [T],
    id_of: F,
) -> ReconcilePlan<'a, T>
where
    F: Fn(&T) -> Option<DbId>,
{
    let existing: HashSet<DbId> = existing_ids.iter().copied().collect();
    let kept: HashSet<DbId> = submitted
        .iter()
        .filter_map(&id_of)
        .filter(|id| existing.contains(id))
        .collect();

    let deletes = existing_ids
        .iter()
        .copied()
        .filter(|id| !kept.contains(id))
        .collect();

    let upserts = submitted
        .iter()
        .zip(1..)
        .map(|(item, position)| match id_of(item) {
            Some(id) if existing.contains(&id) => Upsert::Update { id, position, item },
            _ => Upsert::Insert { position, item },
        })
        .collect();

    ReconcilePlan { deletes, upserts }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        id: Option<DbId>,
        label: &'static str,
    }

    fn item(id: Option<DbId>, label: &'static str) -> Item {
        Item { id, label }
    }

    #[test]
    fn deletes_missing_updates_matching_inserts_new() {
        let submitted = vec![item(Some(3), "c"), item(None, "new"), item(Some(1), "a")];
        let plan = plan_reconciliation(&[1, 2, 3], &submitted, |i| i.id);

        assert_eq!(plan.deletes, vec![2]);
        assert_eq!(plan.upserts.len(), 3);
        assert_matches!(plan.upserts[0], Upsert::Update { id: 3, position: 1, .. });
        assert_matches!(plan.upserts[1], Upsert::Insert { position: 2, .. });
        assert_matches!(plan.upserts[2], Upsert::Update { id: 1, position: 3, .. });
        assert_eq!(plan.upserts[1].item().label, "new");
        assert_eq!(plan.inserts(), 1);
        assert_eq!(plan.updates(), 2);
    }

    #[test]
    fn foreign_ids_become_inserts() {
        let submitted = vec![item(Some(99), "stolen")];
        let plan = plan_reconciliation(&[1], &submitted, |i| i.id);

        assert_eq!(plan.deletes, vec![1]);
        assert_matches!(plan.upserts[0], Upsert::Insert { position: 1, .. });
    }

    #[test]
    fn empty_submission_deletes_everything() {
        let submitted: Vec<Item> = Vec::new();
        let plan = plan_reconciliation(&[4, 5], &submitted, |i| i.id);
        assert_eq!(plan.deletes, vec![4, 5]);
        assert!(plan.upserts.is_empty());
    }

    #[test]
    fn fresh_parent_inserts_in_order() {
        let submitted = vec![item(None, "a"), item(None, "b")];
        let plan = plan_reconciliation(&[], &submitted, |i| i.id);
        assert!(plan.deletes.is_empty());
        let positions: Vec<i32> = plan.upserts.iter().map(Upsert::position).collect();
        assert_eq!(positions, vec![1, 2]);
    }
}
