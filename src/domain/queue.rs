//! Paint Queue Entity
//!
//! One entry per miniature the user has queued for painting. The
//! integer `priority` defines a strict total order per user, ascending
//! = earlier in the queue. Priorities are opaque ranks: gaps and
//! non-contiguous values are fine, only relative order matters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::mini::Miniature;

/// A paint queue entry referencing exactly one miniature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    /// Owning subject
    pub user_id: String,
    /// The queued miniature
    pub mini_id: String,
    /// Rank within the user's queue; no two active entries share one at rest
    pub priority: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Joined miniature row when fetched with an embed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini: Option<Miniature>,
}

impl Entity for QueueEntry {
    const TABLE: &'static str = "paint_queue";

    fn id(&self) -> &str {
        &self.id
    }
}
