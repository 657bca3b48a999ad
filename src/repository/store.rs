//! Repository Layer - Local List Store
//!
//! Per entity kind, the ordered in-memory slot the UI observes. The
//! slot only ever reflects states the remote service has accepted: the
//! pipeline applies edits after the remote call succeeds, and a
//! revision counter discards refetches that complete after a newer
//! mutation, so a stale read can never resurrect a removed row.

use std::cmp::Ordering;

use tokio::sync::Mutex;

use crate::domain::Entity;

/// Ordering policy for one entity kind's slot
pub type SortPolicy<T> = fn(&T, &T) -> Ordering;

struct Slot<T> {
    rows: Vec<T>,
    revision: u64,
}

/// Subject-scoped ordered collection of one entity kind
pub struct ListStore<T: Entity> {
    slot: Mutex<Slot<T>>,
    sort: SortPolicy<T>,
}

impl<T: Entity> ListStore<T> {
    pub fn new(sort: SortPolicy<T>) -> Self {
        Self {
            slot: Mutex::new(Slot {
                rows: Vec::new(),
                revision: 0,
            }),
            sort,
        }
    }

    /// Marks the start of a refetch; pass the returned revision to
    /// `apply_refresh`.
    pub async fn begin_refresh(&self) -> u64 {
        self.slot.lock().await.revision
    }

    /// Installs refetched rows unless the slot moved on since
    /// `revision` was observed. Returns false when the fetch was stale
    /// and discarded.
    pub async fn apply_refresh(&self, revision: u64, mut rows: Vec<T>) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.revision != revision {
            log::debug!("discarding stale refresh (revision {} != {})", revision, slot.revision);
            return false;
        }
        // Identifier uniqueness holds even if the remote sent dupes.
        let mut seen = std::collections::HashSet::new();
        rows.retain(|row| seen.insert(row.id().to_string()));
        rows.sort_by(self.sort);
        slot.rows = rows;
        slot.revision += 1;
        true
    }

    /// Inserts a freshly created row at its sorted position. An
    /// existing row with the same id is replaced, never duplicated.
    pub async fn insert(&self, row: T) {
        let mut slot = self.slot.lock().await;
        let id = row.id().to_string();
        slot.rows.retain(|existing| existing.id() != id);
        slot.rows.push(row);
        let sort = self.sort;
        slot.rows.sort_by(sort);
        slot.revision += 1;
    }

    /// Replaces the matching row in place, preserving its position.
    /// Returns false when no row matches.
    pub async fn replace(&self, row: T) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.rows.iter_mut().find(|existing| existing.id() == row.id()) {
            Some(existing) => {
                *existing = row;
                slot.revision += 1;
                true
            }
            None => false,
        }
    }

    /// Removes the matching row; unrelated rows are untouched and a
    /// miss leaves the slot as it was.
    pub async fn remove(&self, id: &str) -> bool {
        let mut slot = self.slot.lock().await;
        let before = slot.rows.len();
        slot.rows.retain(|row| row.id() != id);
        let removed = slot.rows.len() != before;
        if removed {
            slot.revision += 1;
        }
        removed
    }

    /// Re-sorts the slot under its policy (used after a priority swap).
    pub async fn resort(&self) {
        let mut slot = self.slot.lock().await;
        let sort = self.sort;
        slot.rows.sort_by(sort);
        slot.revision += 1;
    }

    pub async fn rows(&self) -> Vec<T> {
        self.slot.lock().await.rows.clone()
    }

    pub async fn len(&self) -> usize {
        self.slot.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.slot.lock().await.rows.is_empty()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.slot.lock().await.rows.iter().any(|row| row.id() == id)
    }

    pub async fn find(&self, id: &str) -> Option<T> {
        self.slot
            .lock()
            .await
            .rows
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Entity;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        rank: i64,
    }

    impl Entity for Row {
        const TABLE: &'static str = "rows";

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn by_rank(a: &Row, b: &Row) -> std::cmp::Ordering {
        a.rank.cmp(&b.rank)
    }

    fn row(id: &str, rank: i64) -> Row {
        Row {
            id: id.to_string(),
            rank,
        }
    }

    #[tokio::test]
    async fn test_insert_keeps_sorted_order_and_unique_ids() {
        let store = ListStore::new(by_rank);
        store.insert(row("b", 2)).await;
        store.insert(row("a", 1)).await;
        store.insert(row("a", 3)).await;
        let rows = store.rows().await;
        assert_eq!(rows, vec![row("b", 2), row("a", 3)]);
    }

    #[tokio::test]
    async fn test_replace_preserves_position() {
        let store = ListStore::new(by_rank);
        store
            .apply_refresh(0, vec![row("a", 1), row("b", 2), row("c", 3)])
            .await;
        assert!(store.replace(row("b", 99)).await);
        let rows = store.rows().await;
        // Still in the middle until something re-sorts the slot.
        assert_eq!(rows[1], row("b", 99));
    }

    #[tokio::test]
    async fn test_replace_of_absent_row_is_noop() {
        let store = ListStore::new(by_rank);
        store.apply_refresh(0, vec![row("a", 1)]).await;
        assert!(!store.replace(row("ghost", 9)).await);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_touches_only_the_matching_row() {
        let store = ListStore::new(by_rank);
        store
            .apply_refresh(0, vec![row("a", 1), row("b", 2)])
            .await;
        assert!(store.remove("a").await);
        assert!(!store.remove("a").await);
        assert_eq!(store.rows().await, vec![row("b", 2)]);
    }

    #[tokio::test]
    async fn test_stale_refresh_discarded_after_mutation() {
        let store = ListStore::new(by_rank);
        store.apply_refresh(0, vec![row("a", 1), row("b", 2)]).await;

        // A refetch starts, then a delete lands before it completes.
        let revision = store.begin_refresh().await;
        store.remove("a").await;

        // The stale snapshot still contains the removed row; it must
        // not be reintroduced.
        let applied = store
            .apply_refresh(revision, vec![row("a", 1), row("b", 2)])
            .await;
        assert!(!applied);
        assert_eq!(store.rows().await, vec![row("b", 2)]);
    }

    #[tokio::test]
    async fn test_refresh_dedupes_remote_rows() {
        let store = ListStore::new(by_rank);
        let revision = store.begin_refresh().await;
        store
            .apply_refresh(revision, vec![row("a", 1), row("a", 2)])
            .await;
        assert_eq!(store.len().await, 1);
    }
}
