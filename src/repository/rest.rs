//! Repository Layer - REST Backend
//!
//! `RemoteTable` over a PostgREST-style HTTP endpoint. Each table maps
//! to `{base_url}/{table}`; filters, ordering and embeds become query
//! parameters. Transport-level timeout policy belongs to the reqwest
//! client, not to this layer.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{DomainError, DomainResult};

use super::traits::{RemoteTable, SelectQuery};

/// Connection settings for the remote endpoint
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
}

/// PostgREST-style implementation of the remote contract
pub struct RestTable {
    config: RemoteConfig,
    http: reqwest::Client,
}

impl RestTable {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.endpoint(table))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn expect_rows(response: reqwest::Response) -> DomainResult<Vec<Value>> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        if !status.is_success() {
            // Remote error text passes through verbatim.
            let message = if body.is_empty() {
                status.to_string()
            } else {
                body
            };
            log::warn!("remote rejected request: {}", message);
            return Err(DomainError::Remote(message));
        }
        if body.is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&body) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(single) => Ok(vec![single]),
            Err(e) => Err(DomainError::Remote(format!("malformed remote response: {}", e))),
        }
    }

    async fn expect_row(response: reqwest::Response, context: &str) -> DomainResult<Value> {
        let mut rows = Self::expect_rows(response).await?;
        if rows.is_empty() {
            return Err(DomainError::Remote(format!("{} returned no row", context)));
        }
        Ok(rows.remove(0))
    }
}

/// Renders a filter value the way the endpoint expects it in `eq.`
fn filter_literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Builds the query-string parameters for a select.
///
/// Kept free of the HTTP client so the mapping is testable offline.
fn build_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let select = match &query.embed {
        Some(embed) => format!("*,{}:{}(*)", embed.alias, embed.table),
        None => "*".to_string(),
    };
    params.push(("select".to_string(), select));
    for filter in &query.filters {
        let value = match &filter.value {
            Value::Null => "is.null".to_string(),
            other => format!("eq.{}", filter_literal(other)),
        };
        params.push((filter.column.clone(), value));
    }
    if !query.order.is_empty() {
        let order = query
            .order
            .iter()
            .map(|key| {
                format!(
                    "{}.{}",
                    key.column,
                    if key.ascending { "asc" } else { "desc" }
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        params.push(("order".to_string(), order));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

#[async_trait]
impl RemoteTable for RestTable {
    async fn select(&self, table: &str, query: SelectQuery) -> DomainResult<Vec<Value>> {
        let response = self
            .request(reqwest::Method::GET, table)
            .query(&build_params(&query))
            .send()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        Self::expect_rows(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> DomainResult<Value> {
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        Self::expect_row(response, "insert").await
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> DomainResult<Value> {
        let response = self
            .request(reqwest::Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        Self::expect_row(response, "update").await
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, table)
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await
            .map_err(|e| DomainError::Remote(e.to_string()))?;
        // A delete with no matching row still succeeds.
        Self::expect_rows(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_for_plain_select() {
        let params = build_params(&SelectQuery::new());
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
    }

    #[test]
    fn test_params_with_filter_order_limit() {
        let query = SelectQuery::new()
            .eq("user_id", "abc")
            .eq("purchased", false)
            .order_by("priority", true)
            .order_by("created_at", false)
            .limit(50);
        let params = build_params(&query);
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("user_id".to_string(), "eq.abc".to_string()),
                ("purchased".to_string(), "eq.false".to_string()),
                ("order".to_string(), "priority.asc,created_at.desc".to_string()),
                ("limit".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn test_params_with_embed() {
        let query = SelectQuery::new().embed("mini", "minis", "mini_id");
        let params = build_params(&query);
        assert_eq!(params[0], ("select".to_string(), "*,mini:minis(*)".to_string()));
    }

    #[test]
    fn test_null_filter_uses_is() {
        let query = SelectQuery::new().eq("faction", json!(null));
        let params = build_params(&query);
        assert_eq!(params[1], ("faction".to_string(), "is.null".to_string()));
    }
}
