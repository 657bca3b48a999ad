//! Repository Layer - Remote Contract
//!
//! The minimal table contract the core assumes of the remote
//! persistence service: filtered/ordered/limited selects, row-level
//! insert/update/delete, and a single-level join (embed). Rows travel
//! as JSON objects; typed decoding happens in the service layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainResult;

/// Equality filter on one column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// Sort key, applied in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Joined select: fetch one related row per result row.
///
/// `fk_column` on the source row holds the id of a row in `table`; the
/// joined row appears under `alias` in the returned JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub alias: String,
    pub table: String,
    pub fk_column: String,
}

/// Query spec for `RemoteTable::select`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    pub filters: Vec<Filter>,
    pub order: Vec<OrderBy>,
    pub limit: Option<usize>,
    pub embed: Option<Embed>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn embed(mut self, alias: &str, table: &str, fk_column: &str) -> Self {
        self.embed = Some(Embed {
            alias: alias.to_string(),
            table: table.to_string(),
            fk_column: fk_column.to_string(),
        });
        self
    }
}

/// The remote persistence service, one table per entity kind.
///
/// The server owns identifiers and creation timestamps: `insert` must
/// return the stored row with both assigned. Errors surface verbatim
/// as `DomainError::Remote`.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    async fn select(&self, table: &str, query: SelectQuery) -> DomainResult<Vec<Value>>;

    async fn insert(&self, table: &str, row: Value) -> DomainResult<Value>;

    async fn update(&self, table: &str, id: &str, patch: Value) -> DomainResult<Value>;

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()>;
}
