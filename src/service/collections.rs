//! Collection Service
//!
//! CRUD over the user's collections. Deleting a collection does not
//! cascade client-side; the server owns referential behavior.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::domain::{Collection, DomainResult, Entity};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::validation::{COLLECTION_CREATE, COLLECTION_UPDATE};

use super::{decode, decode_rows, ServiceStatus};

/// New-collection input
#[derive(Debug, Clone)]
pub struct CollectionDraft {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Hook-like surface over the user's collections
pub struct CollectionService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<Collection>,
    subject: String,
    status: ServiceStatus,
}

fn newest_first(a: &Collection, b: &Collection) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

impl CollectionService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(newest_first),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<Collection> {
        self.store.rows().await
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<crate::domain::DomainError> {
        self.status.last_error()
    }

    pub async fn refresh(&self) -> DomainResult<()> {
        self.status.begin_loading();
        let revision = self.store.begin_refresh().await;
        let fetched = self
            .pipeline
            .fetch(
                Collection::TABLE,
                SelectQuery::new()
                    .eq("user_id", self.subject.as_str())
                    .order_by("created_at", false),
            )
            .await
            .and_then(decode_rows::<Collection>);
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

    pub async fn create(&self, draft: CollectionDraft) -> DomainResult<Collection> {
        let mut payload = Map::new();
        payload.insert("user_id".to_string(), json!(self.subject));
        payload.insert("name".to_string(), json!(draft.name));
        if let Some(description) = draft.description {
            payload.insert("description".to_string(), json!(description));
        }
        let result = self
            .pipeline
            .create(Collection::TABLE, &COLLECTION_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<Collection>);
        if let Ok(row) = &result {
            self.store.insert(row.clone()).await;
        }
        self.status.note(result)
    }

    pub async fn update(&self, id: &str, patch: CollectionPatch) -> DomainResult<Collection> {
        let mut payload = Map::new();
        if let Some(name) = patch.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(description) = patch.description {
            payload.insert("description".to_string(), Value::String(description));
        }
        let result = self
            .pipeline
            .update(Collection::TABLE, &COLLECTION_UPDATE, &self.subject, id, payload)
            .await
            .and_then(decode::<Collection>);
        if let Ok(row) = &result {
            self.store.replace(row.clone()).await;
        }
        self.status.note(result)
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = self
            .pipeline
            .delete(Collection::TABLE, &self.subject, id)
            .await;
        if result.is_ok() {
            self.store.remove(id).await;
        }
        self.status.note(result)
    }
}
