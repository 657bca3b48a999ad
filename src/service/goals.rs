//! Goal Service
//!
//! CRUD plus progress recording. `completed` is a persisted cache of
//! `current_count >= target_count`; any update that touches either
//! side recomputes it from the merged values, and `record_progress`
//! clamps the new count into `0..=target`.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::domain::{DomainError, DomainResult, Entity, PaintingGoal};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::validation::{GOAL_CREATE, GOAL_UPDATE};

use super::{decode, decode_rows, ServiceStatus};

/// New-goal input
#[derive(Debug, Clone)]
pub struct GoalDraft {
    pub title: String,
    /// Wire value of a `GoalType` variant
    pub goal_type: String,
    pub target_count: u32,
    /// `YYYY-MM-DD`
    pub deadline: Option<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub goal_type: Option<String>,
    pub target_count: Option<u32>,
    pub current_count: Option<u32>,
    pub deadline: Option<String>,
}

/// Hook-like surface over the user's painting goals
pub struct GoalService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<PaintingGoal>,
    subject: String,
    status: ServiceStatus,
}

fn goal_order(a: &PaintingGoal, b: &PaintingGoal) -> std::cmp::Ordering {
    // Open goals first, soonest deadline first (no deadline last),
    // then newest first.
    a.completed
        .cmp(&b.completed)
        .then(match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
        .then(b.created_at.cmp(&a.created_at))
}

impl GoalService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(goal_order),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<PaintingGoal> {
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
                PaintingGoal::TABLE,
                SelectQuery::new()
                    .eq("user_id", self.subject.as_str())
                    .order_by("completed", true)
                    .order_by("deadline", true)
                    .order_by("created_at", false),
            )
            .await
            .and_then(decode_rows::<PaintingGoal>);
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

    pub async fn create(&self, draft: GoalDraft) -> DomainResult<PaintingGoal> {
        let mut payload = Map::new();
        payload.insert("user_id".to_string(), json!(self.subject));
        payload.insert("title".to_string(), json!(draft.title));
        payload.insert("goal_type".to_string(), json!(draft.goal_type));
        payload.insert("target_count".to_string(), json!(draft.target_count));
        payload.insert("current_count".to_string(), json!(0));
        payload.insert("completed".to_string(), json!(false));
        if let Some(deadline) = draft.deadline {
            payload.insert("deadline".to_string(), json!(deadline));
        }
        let result = self
            .pipeline
            .create(PaintingGoal::TABLE, &GOAL_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<PaintingGoal>);
        if let Ok(row) = &result {
            self.store.insert(row.clone()).await;
        }
        self.status.note(result)
    }

    pub async fn update(&self, id: &str, patch: GoalPatch) -> DomainResult<PaintingGoal> {
        let result = self.update_inner(id, patch).await;
        self.status.note(result)
    }

    async fn update_inner(&self, id: &str, patch: GoalPatch) -> DomainResult<PaintingGoal> {
        let mut payload = Map::new();
        if let Some(title) = &patch.title {
            payload.insert("title".to_string(), json!(title));
        }
        if let Some(goal_type) = &patch.goal_type {
            payload.insert("goal_type".to_string(), json!(goal_type));
        }
        if let Some(deadline) = &patch.deadline {
            payload.insert("deadline".to_string(), json!(deadline));
        }
        if patch.target_count.is_some() || patch.current_count.is_some() {
            let existing = self
                .store
                .find(id)
                .await
                .ok_or_else(|| DomainError::NotFound(format!("goal {}", id)))?;
            let target = patch.target_count.unwrap_or(existing.target_count);
            let current = patch.current_count.unwrap_or(existing.current_count).min(target);
            payload.insert("target_count".to_string(), json!(target));
            payload.insert("current_count".to_string(), json!(current));
            payload.insert("completed".to_string(), json!(current >= target));
        }
        let row = self
            .pipeline
            .update(PaintingGoal::TABLE, &GOAL_UPDATE, &self.subject, id, payload)
            .await
            .and_then(decode::<PaintingGoal>)?;
        self.store.replace(row.clone()).await;
        Ok(row)
    }

    /// Sets the current count, clamped into `0..=target`
    pub async fn record_progress(&self, id: &str, current_count: u32) -> DomainResult<PaintingGoal> {
        self.update(
            id,
            GoalPatch {
                current_count: Some(current_count),
                ..GoalPatch::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = self
            .pipeline
            .delete(PaintingGoal::TABLE, &self.subject, id)
            .await;
        if result.is_ok() {
            self.store.remove(id).await;
        }
        self.status.note(result)
    }
}
