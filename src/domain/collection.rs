//! Collection Entity
//!
//! A named group of miniatures (an army, a project, a display shelf).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// A collection of miniatures owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    /// Owning subject
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Collection {
    const TABLE: &'static str = "collections";

    fn id(&self) -> &str {
        &self.id
    }
}
