//! Repository Layer - Mutation Pipeline
//!
//! One template for every create/update/delete across entity kinds:
//! validate the target id (update/delete), validate and sanitize the
//! payload, check the rate limiter, then issue the remote mutation with
//! the sanitized payload only. The first failing stage stops the
//! pipeline; no network call happens after a local rejection.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::{DomainError, DomainResult, ValidationFault};
use crate::ratelimit::{OpClass, RateLimiter};
use crate::validation::{validate_payload, validate_uuid, EntitySchema};

use super::traits::{RemoteTable, SelectQuery};

/// Shared validate → rate-check → remote template
pub struct MutationPipeline {
    remote: Arc<dyn RemoteTable>,
    limiter: Arc<RateLimiter>,
}

fn rate_key(class: OpClass, subject: &str) -> String {
    format!("data:{}:{}", class.as_str(), subject)
}

fn check_target_id(id: &str) -> DomainResult<String> {
    validate_uuid(id).map_err(|_| DomainError::validation("id", ValidationFault::InvalidId))
}

impl MutationPipeline {
    pub fn new(remote: Arc<dyn RemoteTable>, limiter: Arc<RateLimiter>) -> Self {
        Self { remote, limiter }
    }

    /// Read passthrough so services funnel all remote access here
    pub async fn fetch(&self, table: &str, query: SelectQuery) -> DomainResult<Vec<Value>> {
        self.remote.select(table, query).await
    }

    pub async fn create(
        &self,
        table: &str,
        schema: &EntitySchema,
        subject: &str,
        payload: Map<String, Value>,
    ) -> DomainResult<Value> {
        let sanitized = validate_payload(&payload, schema)?;
        self.limiter
            .check(OpClass::Create, &rate_key(OpClass::Create, subject))?;
        self.remote.insert(table, Value::Object(sanitized)).await
    }

    pub async fn update(
        &self,
        table: &str,
        schema: &EntitySchema,
        subject: &str,
        id: &str,
        payload: Map<String, Value>,
    ) -> DomainResult<Value> {
        let id = check_target_id(id)?;
        let sanitized = validate_payload(&payload, schema)?;
        self.limiter
            .check(OpClass::Update, &rate_key(OpClass::Update, subject))?;
        self.remote.update(table, &id, Value::Object(sanitized)).await
    }

    pub async fn delete(&self, table: &str, subject: &str, id: &str) -> DomainResult<()> {
        let id = check_target_id(id)?;
        self.limiter
            .check(OpClass::Delete, &rate_key(OpClass::Delete, subject))?;
        self.remote.delete(table, &id).await
    }
}
