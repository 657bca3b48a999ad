//! Validation Engine
//!
//! Pure field validators plus the schema-level payload check. Every
//! mutation payload passes through `validate_payload` before it can
//! reach the rate limiter or the network; fields not on an entity's
//! allow-list are dropped (and logged), never forwarded.

mod field;
mod schema;

pub use field::{
    validate_bool, validate_bounded_integer, validate_bounded_string, validate_date,
    validate_enum, validate_uuid,
};
pub use schema::{
    validate_payload, EntitySchema, FieldRule, COLLECTION_CREATE, COLLECTION_UPDATE,
    FOLLOW_CREATE, GOAL_CREATE, GOAL_UPDATE, MINI_CREATE, MINI_UPDATE, QUEUE_CREATE,
    QUEUE_UPDATE, WISHLIST_CREATE, WISHLIST_UPDATE,
};
