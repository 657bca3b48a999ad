//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO external dependencies beyond serde/chrono for
//! serialization; everything here is plain data plus the error taxonomy.

mod collection;
mod entity;
mod follow;
mod goal;
mod mini;
mod queue;
mod wishlist;

pub use collection::Collection;
pub use entity::{DomainError, DomainResult, Entity, ValidationFault};
pub use follow::{FollowEdge, Profile};
pub use goal::{GoalType, PaintingGoal};
pub use mini::{GameSystem, Miniature, PaintStatus};
pub use queue::QueueEntry;
pub use wishlist::WishlistItem;
