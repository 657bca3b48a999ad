//! Derived Status & Aggregate Engine
//!
//! Pure reducers over locally-held rows. Two formulas coexist on
//! purpose: `effective_status` sums the stage counts WITHOUT `based`,
//! while the aggregate rollups include `based` on both sides. The
//! asymmetry is long-standing app behavior and both call sites keep it
//! as-is (see the open-questions section of DESIGN.md).

use crate::domain::{Collection, GameSystem, Miniature, PaintStatus};

/// Effective status from the stage counts, falling back to the stored
/// coarse tag for legacy rows whose counts were never split out.
pub fn effective_status(mini: &Miniature) -> PaintStatus {
    let total = mini.count_nib + mini.count_assembled + mini.count_primed + mini.count_painted;
    if total == 0 {
        return mini.status;
    }
    if mini.count_painted == total {
        PaintStatus::Painted
    } else if mini.count_nib == total {
        PaintStatus::Nib
    } else {
        PaintStatus::Wip
    }
}

/// Painted-vs-total rollup over some subset of miniatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub total_units: u64,
    pub painted_units: u64,
    /// `round(100 * painted / total)`, 0 when there is nothing to count
    pub percentage: u32,
}

/// Progress for one collection
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionProgress {
    pub collection_id: String,
    pub name: String,
    pub summary: ProgressSummary,
}

/// Progress for one game system
#[derive(Debug, Clone, PartialEq)]
pub struct GameSystemProgress {
    pub game_system: GameSystem,
    pub summary: ProgressSummary,
}

fn item_total(mini: &Miniature) -> u64 {
    let staged = mini.count_nib
        + mini.count_assembled
        + mini.count_primed
        + mini.count_painted
        + mini.count_based;
    if staged > 0 {
        u64::from(staged)
    } else {
        u64::from(mini.quantity.max(1))
    }
}

fn item_painted(mini: &Miniature) -> u64 {
    u64::from(mini.count_painted + mini.count_based)
}

fn summarize<'a>(minis: impl Iterator<Item = &'a Miniature>) -> ProgressSummary {
    let mut total = 0u64;
    let mut painted = 0u64;
    for mini in minis {
        total += item_total(mini);
        painted += item_painted(mini);
    }
    let percentage = if total > 0 {
        (100.0 * painted as f64 / total as f64).round() as u32
    } else {
        0
    };
    ProgressSummary {
        total_units: total,
        painted_units: painted,
        percentage,
    }
}

/// Rollup over everything the user owns
pub fn overall_progress(minis: &[Miniature]) -> ProgressSummary {
    summarize(minis.iter())
}

/// Per-collection rollups, most work needed first (ascending by
/// percentage; stable for ties).
pub fn collection_progress(
    minis: &[Miniature],
    collections: &[Collection],
) -> Vec<CollectionProgress> {
    let mut results: Vec<CollectionProgress> = collections
        .iter()
        .map(|collection| CollectionProgress {
            collection_id: collection.id.clone(),
            name: collection.name.clone(),
            summary: summarize(
                minis
                    .iter()
                    .filter(|mini| mini.collection_id == collection.id),
            ),
        })
        .collect();
    results.sort_by_key(|progress| progress.summary.percentage);
    results
}

/// Per-game-system rollups, same ordering policy as collections
pub fn game_system_progress(minis: &[Miniature]) -> Vec<GameSystemProgress> {
    let mut systems: Vec<GameSystem> = Vec::new();
    for mini in minis {
        if !systems.contains(&mini.game_system) {
            systems.push(mini.game_system);
        }
    }
    let mut results: Vec<GameSystemProgress> = systems
        .into_iter()
        .map(|game_system| GameSystemProgress {
            game_system,
            summary: summarize(minis.iter().filter(|mini| mini.game_system == game_system)),
        })
        .collect();
    results.sort_by_key(|progress| progress.summary.percentage);
    results
}
