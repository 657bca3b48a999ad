//! Miniature Entity
//!
//! A miniature (or unit of identical miniatures) inside a collection.
//! Progress is tracked with five stage counts; the coarse `status` tag
//! is a cache of those counts once any of them is nonzero (see
//! `stats::effective_status`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Game system a miniature belongs to (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameSystem {
    // snake_case alone would drop the underscore before "40k".
    #[serde(rename = "warhammer_40k")]
    Warhammer40k,
    AgeOfSigmar,
    KillTeam,
    Necromunda,
    Battletech,
    Infinity,
    #[default]
    Other,
}

impl GameSystem {
    /// Wire values accepted by the validation schema
    pub const ALL: &'static [&'static str] = &[
        "warhammer_40k",
        "age_of_sigmar",
        "kill_team",
        "necromunda",
        "battletech",
        "infinity",
        "other",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameSystem::Warhammer40k => "warhammer_40k",
            GameSystem::AgeOfSigmar => "age_of_sigmar",
            GameSystem::KillTeam => "kill_team",
            GameSystem::Necromunda => "necromunda",
            GameSystem::Battletech => "battletech",
            GameSystem::Infinity => "infinity",
            GameSystem::Other => "other",
        }
    }
}

/// Coarse painting status tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaintStatus {
    /// New in box
    #[default]
    Nib,
    Assembled,
    Primed,
    /// Work in progress (mixed stage counts)
    Wip,
    Painted,
    Based,
}

impl PaintStatus {
    pub const ALL: &'static [&'static str] =
        &["nib", "assembled", "primed", "wip", "painted", "based"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaintStatus::Nib => "nib",
            PaintStatus::Assembled => "assembled",
            PaintStatus::Primed => "primed",
            PaintStatus::Wip => "wip",
            PaintStatus::Painted => "painted",
            PaintStatus::Based => "based",
        }
    }
}

/// A miniature entry owned by one user inside one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Miniature {
    /// Unique identifier (assigned by the remote service)
    pub id: String,
    /// Owning subject
    pub user_id: String,
    /// Collection this miniature belongs to
    pub collection_id: String,
    pub name: String,
    pub game_system: GameSystem,
    #[serde(default)]
    pub faction: Option<String>,
    /// Number of physical models this entry represents
    pub quantity: u32,
    /// Coarse status; a cache once stage counts are present
    #[serde(default)]
    pub status: PaintStatus,
    // Stage counts: how many models sit at each stage.
    #[serde(default)]
    pub count_nib: u32,
    #[serde(default)]
    pub count_assembled: u32,
    #[serde(default)]
    pub count_primed: u32,
    #[serde(default)]
    pub count_painted: u32,
    #[serde(default)]
    pub count_based: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Miniature {
    const TABLE: &'static str = "minis";

    fn id(&self) -> &str {
        &self.id
    }
}
