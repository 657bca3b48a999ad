//! Follow Edge Entity
//!
//! Relates a follower to a followed user. A user never follows
//! themselves and at most one edge exists per ordered pair; the follow
//! service enforces both against its local slot before the remote call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Minimal public profile, embedded in follow-edge lookups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A directed follow relationship between two users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowEdge {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    pub follower_id: String,
    pub followed_id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Joined profile of the followed user when fetched with an embed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl Entity for FollowEdge {
    const TABLE: &'static str = "follows";

    fn id(&self) -> &str {
        &self.id
    }
}
