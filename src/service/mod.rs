//! Service Layer
//!
//! One service per entity kind, mirroring the hook surface the UI
//! consumes: an ordered read-only list, a loading flag, an error slot,
//! a manual refresh, and typed mutation methods that never panic past
//! this boundary. Each service owns its local list store and funnels
//! every mutation through the shared pipeline.

mod collections;
mod follows;
mod goals;
mod minis;
mod queue;
mod wishlist;

pub use collections::{CollectionDraft, CollectionPatch, CollectionService};
pub use follows::FollowService;
pub use goals::{GoalDraft, GoalPatch, GoalService};
pub use minis::{MiniDraft, MiniPatch, MiniService};
pub use queue::QueueService;
pub use wishlist::{WishlistDraft, WishlistPatch, WishlistService};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};

/// Loading flag and last-error slot shared by every service
pub(crate) struct ServiceStatus {
    loading: AtomicBool,
    error: Mutex<Option<DomainError>>,
}

impl ServiceStatus {
    pub(crate) fn new() -> Self {
        Self {
            loading: AtomicBool::new(false),
            error: Mutex::new(None),
        }
    }

    pub(crate) fn begin_loading(&self) {
        self.loading.store(true, Ordering::SeqCst);
    }

    pub(crate) fn end_loading(&self) {
        self.loading.store(false, Ordering::SeqCst);
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub(crate) fn last_error(&self) -> Option<DomainError> {
        self.error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Records the outcome in the error slot: a failure overwrites it,
    /// a success clears it.
    pub(crate) fn note<T>(&self, result: DomainResult<T>) -> DomainResult<T> {
        let mut slot = self
            .error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = result.as_ref().err().cloned();
        result
    }
}

/// Decodes one remote row into a typed entity
pub(crate) fn decode<T: DeserializeOwned>(row: Value) -> DomainResult<T> {
    serde_json::from_value(row).map_err(|e| DomainError::Remote(format!("malformed remote row: {}", e)))
}

/// Decodes a page of remote rows
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> DomainResult<Vec<T>> {
    rows.into_iter().map(decode).collect()
}
