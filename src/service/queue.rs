//! Paint Queue Service
//!
//! Maintains the strict total order over a user's queue entries.
//! Append assigns max-priority-plus-one; reordering swaps priorities
//! with the adjacent entry through two independent remote updates.
//! The two updates are not transactional: both are attempted even if
//! the first fails, and the local slot is only reordered when both
//! succeed. A partial failure is surfaced to the caller, who should
//! refresh to resynchronize the persisted ranks.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::domain::{DomainError, DomainResult, Entity, Miniature, QueueEntry};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::validation::{QUEUE_CREATE, QUEUE_UPDATE};

use super::{decode, decode_rows, ServiceStatus};

enum Direction {
    Up,
    Down,
}

/// Hook-like surface over the user's paint queue
pub struct QueueService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<QueueEntry>,
    subject: String,
    status: ServiceStatus,
}

fn by_priority(a: &QueueEntry, b: &QueueEntry) -> std::cmp::Ordering {
    a.priority.cmp(&b.priority)
}

impl QueueService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(by_priority),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<QueueEntry> {
        self.store.rows().await
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<DomainError> {
        self.status.last_error()
    }

    pub async fn refresh(&self) -> DomainResult<()> {
        self.status.begin_loading();
        let revision = self.store.begin_refresh().await;
        let fetched = self
            .pipeline
            .fetch(
                QueueEntry::TABLE,
                SelectQuery::new()
                    .eq("user_id", self.subject.as_str())
                    .order_by("priority", true)
                    .embed("mini", Miniature::TABLE, "mini_id"),
            )
            .await
            .and_then(decode_rows::<QueueEntry>);
        let result = match fetched {
            Ok(rows) => {
                self.store.apply_refresh(revision, rows).await;
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.status.end_loading();
        self.status.note(result)
    }

    /// Appends a miniature at the end of the queue.
    ///
    /// The duplicate check runs against the local slot, which is the
    /// authoritative local view between refreshes.
    pub async fn append(&self, mini_id: &str, notes: Option<String>) -> DomainResult<QueueEntry> {
        let rows = self.store.rows().await;
        if rows.iter().any(|entry| entry.mini_id == mini_id) {
            return self.status.note(Err(DomainError::Conflict(format!(
                "miniature {} is already queued",
                mini_id
            ))));
        }
        // Slot is sorted ascending, so the last entry holds the max.
        let priority = rows.last().map_or(0, |entry| entry.priority + 1);
        let mut payload = Map::new();
        payload.insert("user_id".to_string(), json!(self.subject));
        payload.insert("mini_id".to_string(), json!(mini_id));
        payload.insert("priority".to_string(), json!(priority));
        if let Some(notes) = notes {
            payload.insert("notes".to_string(), json!(notes));
        }
        let result = self
            .pipeline
            .create(QueueEntry::TABLE, &QUEUE_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<QueueEntry>);
        if let Ok(row) = &result {
            self.store.insert(row.clone()).await;
        }
        self.status.note(result)
    }

    /// Swaps the entry with its predecessor; no-op when already first
    pub async fn move_up(&self, id: &str) -> DomainResult<()> {
        let result = self.swap_adjacent(id, Direction::Up).await;
        self.status.note(result)
    }

    /// Swaps the entry with its successor; no-op when already last
    pub async fn move_down(&self, id: &str) -> DomainResult<()> {
        let result = self.swap_adjacent(id, Direction::Down).await;
        self.status.note(result)
    }

    async fn swap_adjacent(&self, id: &str, direction: Direction) -> DomainResult<()> {
        let rows = self.store.rows().await;
        let index = rows
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("queue entry {}", id)))?;
        let neighbor_index = match direction {
            Direction::Up => {
                if index == 0 {
                    return Ok(());
                }
                index - 1
            }
            Direction::Down => {
                if index + 1 == rows.len() {
                    return Ok(());
                }
                index + 1
            }
        };
        let entry = &rows[index];
        let neighbor = &rows[neighbor_index];

        // Two independent updates; both attempted even if one fails,
        // so at most one row is left behind to reconcile on refresh.
        let first = self
            .update_priority(&entry.id, neighbor.priority)
            .await;
        let second = self
            .update_priority(&neighbor.id, entry.priority)
            .await;
        if first.is_ok() != second.is_ok() {
            log::warn!(
                "queue swap for {} partially applied; persisted ranks inconsistent until refresh",
                id
            );
        }
        first?;
        second?;

        // Both accepted: mirror the swap locally, keeping embeds.
        let mut moved = entry.clone();
        let mut displaced = neighbor.clone();
        std::mem::swap(&mut moved.priority, &mut displaced.priority);
        self.store.replace(moved).await;
        self.store.replace(displaced).await;
        self.store.resort().await;
        Ok(())
    }

    async fn update_priority(&self, id: &str, priority: i64) -> DomainResult<()> {
        let mut payload = Map::new();
        payload.insert("priority".to_string(), json!(priority));
        self.pipeline
            .update(QueueEntry::TABLE, &QUEUE_UPDATE, &self.subject, id, payload)
            .await
            .map(|_| ())
    }

    pub async fn remove(&self, id: &str) -> DomainResult<()> {
        let result = self
            .pipeline
            .delete(QueueEntry::TABLE, &self.subject, id)
            .await;
        if result.is_ok() {
            self.store.remove(id).await;
        }
        self.status.note(result)
    }
}
