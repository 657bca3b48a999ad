//! Miniature Service
//!
//! CRUD over the user's miniatures. When an update touches any stage
//! count, the coarse `status` tag is recomputed from the merged counts
//! and persisted alongside: the tag is a cache, the counts are the
//! source of truth.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::domain::{DomainError, DomainResult, Entity, Miniature};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::stats::effective_status;
use crate::validation::{MINI_CREATE, MINI_UPDATE};

use super::{decode, decode_rows, ServiceStatus};

/// New-miniature input
#[derive(Debug, Clone)]
pub struct MiniDraft {
    pub collection_id: String,
    pub name: String,
    /// Wire value of a `GameSystem` variant
    pub game_system: String,
    pub faction: Option<String>,
    pub quantity: u32,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct MiniPatch {
    pub collection_id: Option<String>,
    pub name: Option<String>,
    pub game_system: Option<String>,
    pub faction: Option<String>,
    pub quantity: Option<u32>,
    /// Explicit coarse status; ignored when any count below is set
    pub status: Option<String>,
    pub count_nib: Option<u32>,
    pub count_assembled: Option<u32>,
    pub count_primed: Option<u32>,
    pub count_painted: Option<u32>,
    pub count_based: Option<u32>,
}

impl MiniPatch {
    fn touches_counts(&self) -> bool {
        self.count_nib.is_some()
            || self.count_assembled.is_some()
            || self.count_primed.is_some()
            || self.count_painted.is_some()
            || self.count_based.is_some()
    }
}

/// Hook-like surface over the user's miniatures
pub struct MiniService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<Miniature>,
    subject: String,
    status: ServiceStatus,
}

fn newest_first(a: &Miniature, b: &Miniature) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

impl MiniService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(newest_first),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<Miniature> {
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
                Miniature::TABLE,
                SelectQuery::new()
                    .eq("user_id", self.subject.as_str())
                    .order_by("created_at", false),
            )
            .await
            .and_then(decode_rows::<Miniature>);
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

    pub async fn create(&self, draft: MiniDraft) -> DomainResult<Miniature> {
        let mut payload = Map::new();
        payload.insert("user_id".to_string(), json!(self.subject));
        payload.insert("collection_id".to_string(), json!(draft.collection_id));
        payload.insert("name".to_string(), json!(draft.name));
        payload.insert("game_system".to_string(), json!(draft.game_system));
        if let Some(faction) = draft.faction {
            payload.insert("faction".to_string(), json!(faction));
        }
        payload.insert("quantity".to_string(), json!(draft.quantity));
        let result = self
            .pipeline
            .create(Miniature::TABLE, &MINI_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<Miniature>);
        if let Ok(row) = &result {
            self.store.insert(row.clone()).await;
        }
        self.status.note(result)
    }

    pub async fn update(&self, id: &str, patch: MiniPatch) -> DomainResult<Miniature> {
        let result = self.update_inner(id, patch).await;
        self.status.note(result)
    }

    async fn update_inner(&self, id: &str, patch: MiniPatch) -> DomainResult<Miniature> {
        let mut payload = Map::new();
        if let Some(collection_id) = &patch.collection_id {
            payload.insert("collection_id".to_string(), json!(collection_id));
        }
        if let Some(name) = &patch.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(game_system) = &patch.game_system {
            payload.insert("game_system".to_string(), json!(game_system));
        }
        if let Some(faction) = &patch.faction {
            payload.insert("faction".to_string(), json!(faction));
        }
        if let Some(quantity) = patch.quantity {
            payload.insert("quantity".to_string(), json!(quantity));
        }

        if patch.touches_counts() {
            // Merging needs the current row; the slot is the
            // authoritative local view between refreshes.
            let mut merged = self
                .store
                .find(id)
                .await
                .ok_or_else(|| DomainError::NotFound(format!("miniature {}", id)))?;
            merged.count_nib = patch.count_nib.unwrap_or(merged.count_nib);
            merged.count_assembled = patch.count_assembled.unwrap_or(merged.count_assembled);
            merged.count_primed = patch.count_primed.unwrap_or(merged.count_primed);
            merged.count_painted = patch.count_painted.unwrap_or(merged.count_painted);
            merged.count_based = patch.count_based.unwrap_or(merged.count_based);
            for (field, count) in [
                ("count_nib", patch.count_nib),
                ("count_assembled", patch.count_assembled),
                ("count_primed", patch.count_primed),
                ("count_painted", patch.count_painted),
                ("count_based", patch.count_based),
            ] {
                if let Some(count) = count {
                    payload.insert(field.to_string(), json!(count));
                }
            }
            payload.insert(
                "status".to_string(),
                json!(effective_status(&merged).as_str()),
            );
        } else if let Some(status) = &patch.status {
            payload.insert("status".to_string(), json!(status));
        }

        let row = self
            .pipeline
            .update(Miniature::TABLE, &MINI_UPDATE, &self.subject, id, payload)
            .await
            .and_then(decode::<Miniature>)?;
        self.store.replace(row.clone()).await;
        Ok(row)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = self
            .pipeline
            .delete(Miniature::TABLE, &self.subject, id)
            .await;
        if result.is_ok() {
            self.store.remove(id).await;
        }
        self.status.note(result)
    }
}
