//! Wishlist Entity
//!
//! Kits the user wants to buy, ranked by an integer priority and
//! flagged once purchased.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::mini::GameSystem;

/// A wishlist entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    /// Owning subject
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub game_system: Option<GameSystem>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Lower comes first among unpurchased entries
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub purchased: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for WishlistItem {
    const TABLE: &'static str = "wishlist_items";

    fn id(&self) -> &str {
        &self.id
    }
}
