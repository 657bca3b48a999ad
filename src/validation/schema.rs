//! Payload Schemas
//!
//! One declarative allow-list per entity kind and operation, consulted
//! by the shared `validate_payload`. This is the mass-assignment guard:
//! a key the schema does not name never reaches the sanitized payload,
//! no matter what the caller sends.

use serde_json::{Map, Value};

use crate::domain::{DomainError, DomainResult, GameSystem, GoalType, PaintStatus, ValidationFault};

use super::field;

const NAME_MAX: usize = 120;
const FACTION_MAX: usize = 80;
const NOTES_MAX: usize = 1000;
const COUNT_MAX: i64 = 10_000;
const PRIORITY_MAX: i64 = 1_000_000;

/// Rule for one allow-listed field
#[derive(Debug, Clone, Copy)]
pub enum FieldRule {
    Uuid,
    Text { max_len: usize },
    Tag { allowed: &'static [&'static str] },
    Int { min: i64, max: i64 },
    Bool,
    Date,
}

/// Allow-list and required set for one entity kind + operation
#[derive(Debug, Clone, Copy)]
pub struct EntitySchema {
    pub allowed: &'static [(&'static str, FieldRule)],
    pub required: &'static [&'static str],
}

impl EntitySchema {
    fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.allowed
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, rule)| rule)
    }
}

fn check_field(rule: &FieldRule, value: &Value) -> Result<Value, ValidationFault> {
    // Explicit null passes through so updates can clear optional
    // fields; required-ness is enforced after sanitization.
    if value.is_null() {
        return Ok(Value::Null);
    }
    match rule {
        FieldRule::Uuid => {
            let text = value.as_str().ok_or(ValidationFault::InvalidFormat)?;
            field::validate_uuid(text).map(Value::String)
        }
        FieldRule::Text { max_len } => {
            let text = value.as_str().ok_or(ValidationFault::InvalidFormat)?;
            Ok(match field::validate_bounded_string(text, *max_len, false)? {
                Some(normalized) => Value::String(normalized),
                None => Value::Null,
            })
        }
        FieldRule::Tag { allowed } => {
            let text = value.as_str().ok_or(ValidationFault::InvalidValue)?;
            field::validate_enum(text, allowed).map(Value::String)
        }
        FieldRule::Int { min, max } => {
            field::validate_bounded_integer(value, *min, *max).map(Value::from)
        }
        FieldRule::Bool => field::validate_bool(value).map(Value::from),
        FieldRule::Date => {
            let text = value.as_str().ok_or(ValidationFault::InvalidFormat)?;
            field::validate_date(text).map(Value::String)
        }
    }
}

/// Validates a whole mutation payload against an entity schema.
///
/// Unknown keys are dropped and logged. The first failing field rejects
/// the payload; nothing partially-sanitized is ever returned.
pub fn validate_payload(
    payload: &Map<String, Value>,
    schema: &EntitySchema,
) -> DomainResult<Map<String, Value>> {
    let mut sanitized = Map::new();
    for (key, value) in payload {
        let Some(rule) = schema.rule(key) else {
            log::warn!("dropping unknown field `{}` from mutation payload", key);
            continue;
        };
        match check_field(rule, value) {
            Ok(normalized) => {
                sanitized.insert(key.clone(), normalized);
            }
            Err(fault) => return Err(DomainError::validation(key, fault)),
        }
    }
    for required in schema.required {
        match sanitized.get(*required) {
            Some(value) if !value.is_null() => {}
            _ => return Err(DomainError::validation(*required, ValidationFault::Required)),
        }
    }
    Ok(sanitized)
}

pub const MINI_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("user_id", FieldRule::Uuid),
        ("collection_id", FieldRule::Uuid),
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("game_system", FieldRule::Tag { allowed: GameSystem::ALL }),
        ("faction", FieldRule::Text { max_len: FACTION_MAX }),
        ("quantity", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("status", FieldRule::Tag { allowed: PaintStatus::ALL }),
        ("count_nib", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_assembled", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_primed", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_painted", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_based", FieldRule::Int { min: 0, max: COUNT_MAX }),
    ],
    required: &["user_id", "collection_id", "name", "game_system"],
};

pub const MINI_UPDATE: EntitySchema = EntitySchema {
    allowed: &[
        ("collection_id", FieldRule::Uuid),
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("game_system", FieldRule::Tag { allowed: GameSystem::ALL }),
        ("faction", FieldRule::Text { max_len: FACTION_MAX }),
        ("quantity", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("status", FieldRule::Tag { allowed: PaintStatus::ALL }),
        ("count_nib", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_assembled", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_primed", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_painted", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("count_based", FieldRule::Int { min: 0, max: COUNT_MAX }),
    ],
    required: &[],
};

pub const COLLECTION_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("user_id", FieldRule::Uuid),
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("description", FieldRule::Text { max_len: NOTES_MAX }),
    ],
    required: &["user_id", "name"],
};

pub const COLLECTION_UPDATE: EntitySchema = EntitySchema {
    allowed: &[
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("description", FieldRule::Text { max_len: NOTES_MAX }),
    ],
    required: &[],
};

pub const WISHLIST_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("user_id", FieldRule::Uuid),
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("game_system", FieldRule::Tag { allowed: GameSystem::ALL }),
        ("notes", FieldRule::Text { max_len: NOTES_MAX }),
        ("priority", FieldRule::Int { min: 0, max: PRIORITY_MAX }),
        ("purchased", FieldRule::Bool),
    ],
    required: &["user_id", "name"],
};

pub const WISHLIST_UPDATE: EntitySchema = EntitySchema {
    allowed: &[
        ("name", FieldRule::Text { max_len: NAME_MAX }),
        ("game_system", FieldRule::Tag { allowed: GameSystem::ALL }),
        ("notes", FieldRule::Text { max_len: NOTES_MAX }),
        ("priority", FieldRule::Int { min: 0, max: PRIORITY_MAX }),
        ("purchased", FieldRule::Bool),
    ],
    required: &[],
};

pub const GOAL_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("user_id", FieldRule::Uuid),
        ("title", FieldRule::Text { max_len: NAME_MAX }),
        ("goal_type", FieldRule::Tag { allowed: GoalType::ALL }),
        ("target_count", FieldRule::Int { min: 1, max: COUNT_MAX }),
        ("current_count", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("deadline", FieldRule::Date),
        ("completed", FieldRule::Bool),
    ],
    required: &["user_id", "title", "goal_type", "target_count"],
};

pub const GOAL_UPDATE: EntitySchema = EntitySchema {
    allowed: &[
        ("title", FieldRule::Text { max_len: NAME_MAX }),
        ("goal_type", FieldRule::Tag { allowed: GoalType::ALL }),
        ("target_count", FieldRule::Int { min: 1, max: COUNT_MAX }),
        ("current_count", FieldRule::Int { min: 0, max: COUNT_MAX }),
        ("deadline", FieldRule::Date),
        ("completed", FieldRule::Bool),
    ],
    required: &[],
};

pub const QUEUE_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("user_id", FieldRule::Uuid),
        ("mini_id", FieldRule::Uuid),
        ("priority", FieldRule::Int { min: 0, max: PRIORITY_MAX }),
        ("notes", FieldRule::Text { max_len: NOTES_MAX }),
    ],
    required: &["user_id", "mini_id", "priority"],
};

pub const QUEUE_UPDATE: EntitySchema = EntitySchema {
    allowed: &[
        ("priority", FieldRule::Int { min: 0, max: PRIORITY_MAX }),
        ("notes", FieldRule::Text { max_len: NOTES_MAX }),
    ],
    required: &[],
};

pub const FOLLOW_CREATE: EntitySchema = EntitySchema {
    allowed: &[
        ("follower_id", FieldRule::Uuid),
        ("followed_id", FieldRule::Uuid),
    ],
    required: &["follower_id", "followed_id"],
};
