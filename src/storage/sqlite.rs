//! SQLite-backed history store.
//!
//! One table per agent, created on first use.

use super::{tail_exchanges, validate_table_name, HistoryStore, StoredMessage};
use crate::error::{AgentDeckError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};

struct Inner {
    conn: Connection,
    known_tables: HashSet<String>,
}

/// SQLite history store.
pub struct SqliteHistoryStore {
    inner: Mutex<Inner>,
}

impl SqliteHistoryStore {
    /// Open (or create) a history database at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        info!("Opened history store at {:?}", path);

        Ok(Self::from_connection(conn))
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Mutex::new(Inner {
                conn,
                known_tables: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|e| AgentDeckError::History(format!("Failed to acquire lock: {}", e)))
    }
}

impl Inner {
    fn ensure_table(&mut self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        if self.known_tables.contains(table) {
            return Ok(());
        }

        self.conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_{table}_session ON {table}(session_id);
            "#
        ))?;

        debug!("Ensured history table {}", table);
        self.known_tables.insert(table.to_string());
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    #[instrument(skip(self, message))]
    async fn append(&self, table: &str, message: &StoredMessage) -> Result<()> {
        let mut inner = self.lock()?;
        inner.ensure_table(table)?;

        inner.conn.execute(
            &format!(
                "INSERT INTO {table} (id, session_id, role, content, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)"
            ),
            params![
                message.id.to_string(),
                message.session_id,
                message.role.as_str(),
                message.content,
                message.created_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent(
        &self,
        table: &str,
        session_id: &str,
        responses: usize,
    ) -> Result<Vec<StoredMessage>> {
        let mut inner = self.lock()?;
        inner.ensure_table(table)?;

        let limit = i64::try_from(responses.saturating_mul(2)).unwrap_or(i64::MAX);
        let mut stmt = inner.conn.prepare(&format!(
            "SELECT id, session_id, role, content, created_at FROM {table} \
             WHERE session_id = ?1 ORDER BY seq DESC LIMIT ?2"
        ))?;

        let rows = stmt.query_map(params![session_id, limit], |row| {
            let id: String = row.get(0)?;
            let role: String = row.get(2)?;
            let created_at: String = row.get(4)?;
            Ok((id, row.get::<_, String>(1)?, role, row.get::<_, String>(3)?, created_at))
        })?;

        let mut messages = Vec::new();
        for row in rows {
            let (id, session_id, role, content, created_at) = row?;
            let Ok(role) = role.parse() else {
                continue;
            };
            messages.push(StoredMessage {
                id: uuid::Uuid::parse_str(&id).unwrap_or_default(),
                session_id,
                role,
                content,
                created_at: DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            });
        }
        messages.reverse();

        Ok(tail_exchanges(messages, responses))
    }

    #[instrument(skip(self))]
    async fn clear(&self, table: &str, session_id: &str) -> Result<usize> {
        let mut inner = self.lock()?;
        inner.ensure_table(table)?;

        let deleted = inner.conn.execute(
            &format!("DELETE FROM {table} WHERE session_id = ?1"),
            params![session_id],
        )?;

        info!("Cleared {} messages from {} for session {}", deleted, table, session_id);
        Ok(deleted)
    }

    async fn count(&self, table: &str, session_id: &str) -> Result<usize> {
        let mut inner = self.lock()?;
        inner.ensure_table(table)?;

        let count: i64 = inner.conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE session_id = ?1"),
            params![session_id],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;

    async fn seed(store: &SqliteHistoryStore, table: &str, session: &str, turns: usize) {
        for i in 0..turns {
            store
                .append(table, &StoredMessage::new(session, Role::User, &format!("q{}", i)))
                .await
                .unwrap();
            store
                .append(
                    table,
                    &StoredMessage::new(session, Role::Assistant, &format!("a{}", i)),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_recent_returns_last_exchanges_in_order() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        seed(&store, "finance_agent", "s1", 4).await;

        let recent = store.recent("finance_agent", "s1", 2).await.unwrap();
        let contents: Vec<_> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q2", "a2", "q3", "a3"]);
        assert_eq!(recent[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_tables_are_independent() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        seed(&store, "web_agent", "s1", 1).await;
        seed(&store, "youtube_agent", "s1", 3).await;

        assert_eq!(store.count("web_agent", "s1").await.unwrap(), 2);
        assert_eq!(store.count("youtube_agent", "s1").await.unwrap(), 6);

        assert_eq!(store.clear("youtube_agent", "s1").await.unwrap(), 6);
        assert_eq!(store.count("web_agent", "s1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history").join("agents.db");

        {
            let store = SqliteHistoryStore::new(&path).unwrap();
            seed(&store, "web_agent", "s1", 1).await;
        }

        let store = SqliteHistoryStore::new(&path).unwrap();
        let recent = store.recent("web_agent", "s1", 5).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].content, "a0");
    }

    #[tokio::test]
    async fn test_zero_depth_returns_nothing() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        seed(&store, "web_agent", "s1", 2).await;
        assert!(store.recent("web_agent", "s1", 0).await.unwrap().is_empty());
    }
}
