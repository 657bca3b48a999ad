//! Painting Goal Entity
//!
//! A target count with an optional deadline. `completed` is a persisted
//! cache of `current_count >= target_count`; the goal service keeps it
//! in step whenever progress is recorded.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// What kind of target a goal tracks (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    #[default]
    PaintMinis,
    AssembleMinis,
    CompleteCollection,
    Custom,
}

impl GoalType {
    pub const ALL: &'static [&'static str] = &[
        "paint_minis",
        "assemble_minis",
        "complete_collection",
        "custom",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::PaintMinis => "paint_minis",
            GoalType::AssembleMinis => "assemble_minis",
            GoalType::CompleteCollection => "complete_collection",
            GoalType::Custom => "custom",
        }
    }
}

/// A painting goal owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintingGoal {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    /// Owning subject
    pub user_id: String,
    pub title: String,
    pub goal_type: GoalType,
    pub target_count: u32,
    #[serde(default)]
    pub current_count: u32,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// Cache of `current_count >= target_count`
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for PaintingGoal {
    const TABLE: &'static str = "painting_goals";

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_type_wire_values_match_serde() {
        for name in GoalType::ALL {
            let parsed: GoalType =
                serde_json::from_value(serde_json::json!(name)).expect("known wire value");
            assert_eq!(parsed.as_str(), *name);
        }
    }
}
