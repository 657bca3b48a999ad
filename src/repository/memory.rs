//! Repository Layer - In-Memory Backend
//!
//! `RemoteTable` over plain HashMaps. This is the test double for the
//! remote service: it assigns identifiers and creation timestamps the
//! way the server would, resolves embeds, and can be scripted to fail
//! so pipeline failure paths are exercisable offline.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::{DomainError, DomainResult};

use super::traits::{RemoteTable, SelectQuery};

/// In-memory stand-in for the remote persistence service
#[derive(Default)]
pub struct MemoryTable {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    // Scripted outcomes consumed by mutations in call order; empty
    // means every mutation succeeds.
    script: Mutex<VecDeque<Result<(), String>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next mutation succeeds (used to interleave with failures)
    pub fn script_ok(&self) {
        self.lock_script().push_back(Ok(()));
    }

    /// Next mutation fails with `message`
    pub fn script_failure(&self, message: &str) {
        self.lock_script().push_back(Err(message.to_string()));
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<(), String>>> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn consume_script(&self) -> DomainResult<()> {
        match self.lock_script().pop_front() {
            Some(Err(message)) => Err(DomainError::Remote(message)),
            _ => Ok(()),
        }
    }

    /// Number of rows currently stored in `table`
    pub fn row_count(&self, table: &str) -> usize {
        self.lock_tables().get(table).map_or(0, Vec::len)
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn matches(row: &Value, column: &str, expected: &Value) -> bool {
    match row.get(column) {
        Some(actual) => actual == expected,
        None => expected.is_null(),
    }
}

// Null sorts last so "deadline ascending, no deadline at the end"
// works without a dedicated null-ordering flag.
fn cmp_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (x, y) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl RemoteTable for MemoryTable {
    async fn select(&self, table: &str, query: SelectQuery) -> DomainResult<Vec<Value>> {
        let tables = self.lock_tables();
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|f| matches(row, &f.column, &f.value))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(embed) = &query.embed {
            let related = tables.get(&embed.table);
            for row in &mut rows {
                let fk = row.get(&embed.fk_column).cloned().unwrap_or(Value::Null);
                let joined = related
                    .and_then(|rows| rows.iter().find(|r| r.get("id") == Some(&fk)))
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Some(object) = row.as_object_mut() {
                    object.insert(embed.alias.clone(), joined);
                }
            }
        }
        drop(tables);

        if !query.order.is_empty() {
            rows.sort_by(|a, b| {
                for key in &query.order {
                    let left = a.get(&key.column).unwrap_or(&Value::Null);
                    let right = b.get(&key.column).unwrap_or(&Value::Null);
                    let ordering = if key.ascending {
                        cmp_values(left, right)
                    } else {
                        cmp_values(right, left)
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> DomainResult<Value> {
        self.consume_script()?;
        let mut object: Map<String, Value> = match row {
            Value::Object(object) => object,
            _ => return Err(DomainError::Remote("insert expects a JSON object".to_string())),
        };
        // The server is the identifier and timestamp authority.
        object
            .entry("id".to_string())
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        object
            .entry("created_at".to_string())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        let stored = Value::Object(object);
        self.lock_tables()
            .entry(table.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> DomainResult<Value> {
        self.consume_script()?;
        let patch = match patch {
            Value::Object(object) => object,
            _ => return Err(DomainError::Remote("update expects a JSON object".to_string())),
        };
        let mut tables = self.lock_tables();
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| DomainError::Remote(format!("no rows in {}", table)))?;
        let row = rows
            .iter_mut()
            .find(|row| row_id(row) == Some(id))
            .ok_or_else(|| DomainError::Remote(format!("{} row {} not found", table, id)))?;
        if let Some(object) = row.as_object_mut() {
            for (key, value) in patch {
                object.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    async fn delete(&self, table: &str, id: &str) -> DomainResult<()> {
        self.consume_script()?;
        if let Some(rows) = self.lock_tables().get_mut(table) {
            rows.retain(|row| row_id(row) != Some(id));
        }
        // Deleting an absent row is not an error, same as the endpoint.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamp() {
        let remote = MemoryTable::new();
        let row = remote
            .insert("minis", json!({ "name": "Terminators" }))
            .await
            .unwrap();
        assert!(row.get("id").and_then(Value::as_str).is_some());
        assert!(row.get("created_at").and_then(Value::as_str).is_some());
    }

    #[tokio::test]
    async fn test_select_filters_and_orders() {
        let remote = MemoryTable::new();
        for (name, priority) in [("b", 2), ("a", 1), ("c", 3)] {
            remote
                .insert("paint_queue", json!({ "name": name, "priority": priority, "user_id": "u1" }))
                .await
                .unwrap();
        }
        remote
            .insert("paint_queue", json!({ "name": "other", "priority": 0, "user_id": "u2" }))
            .await
            .unwrap();
        let rows = remote
            .select(
                "paint_queue",
                SelectQuery::new().eq("user_id", "u1").order_by("priority", true),
            )
            .await
            .unwrap();
        let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_embed_joins_related_row() {
        let remote = MemoryTable::new();
        let mini = remote
            .insert("minis", json!({ "name": "Dreadnought" }))
            .await
            .unwrap();
        remote
            .insert(
                "paint_queue",
                json!({ "mini_id": mini["id"], "priority": 0 }),
            )
            .await
            .unwrap();
        let rows = remote
            .select(
                "paint_queue",
                SelectQuery::new().embed("mini", "minis", "mini_id"),
            )
            .await
            .unwrap();
        assert_eq!(rows[0]["mini"]["name"], json!("Dreadnought"));
    }

    #[tokio::test]
    async fn test_scripted_failure_consumed_in_order() {
        let remote = MemoryTable::new();
        remote.script_ok();
        remote.script_failure("boom");
        assert!(remote.insert("minis", json!({})).await.is_ok());
        let err = remote.insert("minis", json!({})).await.unwrap_err();
        assert_eq!(err, DomainError::Remote("boom".to_string()));
        // Script exhausted: back to success.
        assert!(remote.insert("minis", json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_of_absent_row_is_ok() {
        let remote = MemoryTable::new();
        assert!(remote.delete("minis", "missing").await.is_ok());
    }
}
