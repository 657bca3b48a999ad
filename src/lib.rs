//! Brushlog Data Core
//!
//! Client-side data-access layer for a miniature-painting tracker.
//! Every mutation is schema-validated and sanitized before it leaves
//! the device, rate-limited per operation class and user, sent to the
//! remote persistence service, and only then reconciled into the
//! in-memory lists the UI observes.
//!
//! Layered architecture:
//! - domain: Core entities and the error taxonomy
//! - validation: Field rules and payload allow-lists
//! - ratelimit: Per-class sliding-window limiter
//! - repository: Remote contract, backends, mutation pipeline, list store
//! - service: Hook-like per-entity surfaces for the UI
//! - stats: Pure derived-status and progress reducers

use std::sync::Arc;

pub mod domain;
pub mod ratelimit;
pub mod repository;
pub mod service;
pub mod stats;
pub mod validation;

use ratelimit::RateLimiter;
use repository::{MutationPipeline, RemoteConfig, RemoteTable, RestTable};
use service::{
    CollectionService, FollowService, GoalService, MiniService, QueueService, WishlistService,
};
use stats::{CollectionProgress, GameSystemProgress, ProgressSummary};

/// All per-entity services for one signed-in user, sharing one
/// pipeline (and therefore one limiter and one remote backend).
pub struct DataLayer {
    pub minis: MiniService,
    pub collections: CollectionService,
    pub wishlist: WishlistService,
    pub goals: GoalService,
    pub queue: QueueService,
    pub follows: FollowService,
}

impl DataLayer {
    pub fn new(remote: Arc<dyn RemoteTable>, limiter: Arc<RateLimiter>, user_id: &str) -> Self {
        let pipeline = Arc::new(MutationPipeline::new(remote, limiter));
        Self {
            minis: MiniService::new(pipeline.clone(), user_id),
            collections: CollectionService::new(pipeline.clone(), user_id),
            wishlist: WishlistService::new(pipeline.clone(), user_id),
            goals: GoalService::new(pipeline.clone(), user_id),
            queue: QueueService::new(pipeline.clone(), user_id),
            follows: FollowService::new(pipeline, user_id),
        }
    }

    /// Production wiring: REST backend plus default rate policies
    pub fn connect(config: RemoteConfig, user_id: &str) -> Self {
        Self::new(
            Arc::new(RestTable::new(config)),
            Arc::new(RateLimiter::default()),
            user_id,
        )
    }

    /// Overall painting progress from the locally-held miniatures
    pub async fn overall_progress(&self) -> ProgressSummary {
        stats::overall_progress(&self.minis.rows().await)
    }

    /// Per-collection progress, most work needed first
    pub async fn collection_progress(&self) -> Vec<CollectionProgress> {
        stats::collection_progress(&self.minis.rows().await, &self.collections.rows().await)
    }

    /// Per-game-system progress, most work needed first
    pub async fn game_system_progress(&self) -> Vec<GameSystemProgress> {
        stats::game_system_progress(&self.minis.rows().await)
    }
}
