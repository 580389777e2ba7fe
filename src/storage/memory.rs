//! In-memory history store.
//!
//! Used when persistence is disabled and in tests.

use super::{tail_exchanges, validate_table_name, HistoryStore, StoredMessage};
use crate::error::{AgentDeckError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory history store keyed by table name.
pub struct MemoryHistoryStore {
    tables: RwLock<HashMap<String, Vec<StoredMessage>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> AgentDeckError {
    AgentDeckError::History(format!("Failed to acquire lock: {}", e))
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, table: &str, message: &StoredMessage) -> Result<()> {
        validate_table_name(table)?;
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables
            .entry(table.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn recent(
        &self,
        table: &str,
        session_id: &str,
        responses: usize,
    ) -> Result<Vec<StoredMessage>> {
        validate_table_name(table)?;
        let tables = self.tables.read().map_err(poisoned)?;
        let messages = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|m| m.session_id == session_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(tail_exchanges(messages, responses))
    }

    async fn clear(&self, table: &str, session_id: &str) -> Result<usize> {
        validate_table_name(table)?;
        let mut tables = self.tables.write().map_err(poisoned)?;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|m| m.session_id != session_id);
        Ok(before - rows.len())
    }

    async fn count(&self, table: &str, session_id: &str) -> Result<usize> {
        validate_table_name(table)?;
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables
            .get(table)
            .map(|rows| rows.iter().filter(|m| m.session_id == session_id).count())
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = MemoryHistoryStore::new();
        store
            .append("web_agent", &StoredMessage::new("a", Role::User, "hello"))
            .await
            .unwrap();
        store
            .append("web_agent", &StoredMessage::new("b", Role::User, "other"))
            .await
            .unwrap();

        let a = store.recent("web_agent", "a", 5).await.unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content, "hello");

        assert_eq!(store.clear("web_agent", "a").await.unwrap(), 1);
        assert_eq!(store.count("web_agent", "a").await.unwrap(), 0);
        assert_eq!(store.count("web_agent", "b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_table() {
        let store = MemoryHistoryStore::new();
        let msg = StoredMessage::new("a", Role::User, "x");
        assert!(store.append("Bad Table", &msg).await.is_err());
    }
}
