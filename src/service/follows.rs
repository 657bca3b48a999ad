//! Follow Service
//!
//! Directed follow edges from the signed-in user to other users. Self
//! follows and duplicate edges are rejected against the local slot
//! before any network call; the edge list loads with the followed
//! user's profile embedded.

use std::sync::Arc;

use serde_json::{json, Map};

use crate::domain::{DomainError, DomainResult, Entity, FollowEdge};
use crate::repository::{ListStore, MutationPipeline, SelectQuery};
use crate::validation::FOLLOW_CREATE;

use super::{decode, decode_rows, ServiceStatus};

/// Hook-like surface over who the user follows
pub struct FollowService {
    pipeline: Arc<MutationPipeline>,
    store: ListStore<FollowEdge>,
    subject: String,
    status: ServiceStatus,
}

fn newest_first(a: &FollowEdge, b: &FollowEdge) -> std::cmp::Ordering {
    b.created_at.cmp(&a.created_at)
}

impl FollowService {
    pub fn new(pipeline: Arc<MutationPipeline>, subject: &str) -> Self {
        Self {
            pipeline,
            store: ListStore::new(newest_first),
            subject: subject.to_string(),
            status: ServiceStatus::new(),
        }
    }

    pub async fn rows(&self) -> Vec<FollowEdge> {
        self.store.rows().await
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn last_error(&self) -> Option<DomainError> {
        self.status.last_error()
    }

    pub async fn refresh(&self) -> DomainResult<()> {
        self.status.begin_loading();
        let revision = self.store.begin_refresh().await;
        let fetched = self
            .pipeline
            .fetch(
                FollowEdge::TABLE,
                SelectQuery::new()
                    .eq("follower_id", self.subject.as_str())
                    .order_by("created_at", false)
                    .embed("profile", "profiles", "followed_id"),
            )
            .await
            .and_then(decode_rows::<FollowEdge>);
        let result = match fetched {
            Ok(rows) => {
                self.store.apply_refresh(revision, rows).await;
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.status.end_loading();
        self.status.note(result)
    }

    pub async fn follow(&self, target_id: &str) -> DomainResult<FollowEdge> {
        let result = self.follow_inner(target_id).await;
        self.status.note(result)
    }

    async fn follow_inner(&self, target_id: &str) -> DomainResult<FollowEdge> {
        if target_id == self.subject {
            return Err(DomainError::Conflict("cannot follow yourself".to_string()));
        }
        let rows = self.store.rows().await;
        if rows.iter().any(|edge| edge.followed_id == target_id) {
            return Err(DomainError::Conflict(format!(
                "already following {}",
                target_id
            )));
        }
        let mut payload = Map::new();
        payload.insert("follower_id".to_string(), json!(self.subject));
        payload.insert("followed_id".to_string(), json!(target_id));
        let row = self
            .pipeline
            .create(FollowEdge::TABLE, &FOLLOW_CREATE, &self.subject, payload)
            .await
            .and_then(decode::<FollowEdge>)?;
        self.store.insert(row.clone()).await;
        Ok(row)
    }

    /// Removes the edge to `target_id`, located through the local slot
    pub async fn unfollow(&self, target_id: &str) -> DomainResult<()> {
        let result = self.unfollow_inner(target_id).await;
        self.status.note(result)
    }

    async fn unfollow_inner(&self, target_id: &str) -> DomainResult<()> {
        let rows = self.store.rows().await;
        let edge = rows
            .iter()
            .find(|edge| edge.followed_id == target_id)
            .ok_or_else(|| DomainError::NotFound(format!("follow edge to {}", target_id)))?;
        self.pipeline
            .delete(FollowEdge::TABLE, &self.subject, &edge.id)
            .await?;
        self.store.remove(&edge.id).await;
        Ok(())
    }
}
