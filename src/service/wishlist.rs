//! Wishlist Service
//!
//! CRUD plus a purchased toggle. The slot orders unpurchased entries
//! first, then by priority, then newest first.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::domain::{DomainError, DomainResult, Entity, WishlistItem};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::validation::{WISHLIST_CREATE, WISHLIST_UPDATE};

use super::{decode, decode_rows, ServiceStatus};

/// New-wishlist-entry input
#[derive(Debug, Clone)]
pub struct WishlistDraft {
    pub name: String,
    /// Wire value of a `GameSystem` variant
    pub game_system: Option<String>,
    pub notes: Option<String>,
    pub priority: u32,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct WishlistPatch {
    pub name: Option<String>,
    pub game_system: Option<String>,
    pub notes: Option<String>,
    pub priority: Option<u32>,
    pub purchased: Option<bool>,
}

/// Hook-like surface over the user's wishlist
pub struct WishlistService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<WishlistItem>,
    subject: String,
    status: ServiceStatus,
}

fn wishlist_order(a: &WishlistItem, b: &WishlistItem) -> std::cmp::Ordering {
    a.purchased
        .cmp(&b.purchased)
        .then(a.priority.cmp(&b.priority))
        .then(b.created_at.cmp(&a.created_at))
}

impl WishlistService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(wishlist_order),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<WishlistItem> {
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
                WishlistItem::TABLE,
                SelectQuery::new()
                    .eq("user_id", self.subject.as_str())
                    .order_by("purchased", true)
                    .order_by("priority", true)
                    .order_by("created_at", false),
            )
            .await
            .and_then(decode_rows::<WishlistItem>);
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

    pub async fn create(&self, draft: WishlistDraft) -> DomainResult<WishlistItem> {
        let mut payload = Map::new();
        payload.insert("user_id".to_string(), json!(self.subject));
        payload.insert("name".to_string(), json!(draft.name));
        if let Some(game_system) = draft.game_system {
            payload.insert("game_system".to_string(), json!(game_system));
        }
        if let Some(notes) = draft.notes {
            payload.insert("notes".to_string(), json!(notes));
        }
        payload.insert("priority".to_string(), json!(draft.priority));
        payload.insert("purchased".to_string(), json!(false));
        let result = self
            .pipeline
            .create(WishlistItem::TABLE, &WISHLIST_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<WishlistItem>);
        if let Ok(row) = &result {
            self.store.insert(row.clone()).await;
        }
        self.status.note(result)
    }

    pub async fn update(&self, id: &str, patch: WishlistPatch) -> DomainResult<WishlistItem> {
        let mut payload = Map::new();
        if let Some(name) = patch.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(game_system) = patch.game_system {
            payload.insert("game_system".to_string(), json!(game_system));
        }
        if let Some(notes) = patch.notes {
            payload.insert("notes".to_string(), json!(notes));
        }
        if let Some(priority) = patch.priority {
            payload.insert("priority".to_string(), json!(priority));
        }
        if let Some(purchased) = patch.purchased {
            payload.insert("purchased".to_string(), json!(purchased));
        }
        let result = self
            .pipeline
            .update(WishlistItem::TABLE, &WISHLIST_UPDATE, &self.subject, id, payload)
            .await
            .and_then(decode::<WishlistItem>);
        if let Ok(row) = &result {
            self.store.replace(row.clone()).await;
        }
        self.status.note(result)
    }

    /// Flips the purchased flag based on the local slot's view
    pub async fn toggle_purchased(&self, id: &str) -> DomainResult<WishlistItem> {
        let current = match self.store.find(id).await {
            Some(row) => row,
            None => {
                return self
                    .status
                    .note(Err(DomainError::NotFound(format!("wishlist entry {}", id))))
            }
        };
        self.update(
            id,
            WishlistPatch {
                purchased: Some(!current.purchased),
                ..WishlistPatch::default()
            },
        )
        .await
    }

    pub async fn delete(&self, id: &str) -> DomainResult<()> {
        let result = self
            .pipeline
            .delete(WishlistItem::TABLE, &self.subject, id)
            .await;
        if result.is_ok() {
            self.store.remove(id).await;
        }
        self.status.note(result)
    }
}
