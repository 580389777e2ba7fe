//! Agent conversation history storage.
//!
//! Every agent that keeps history owns one table, named in its descriptor.
//! Rows are grouped by session so independent chats never see each other's
//! turns.

mod memory;
mod sqlite;

pub use memory::MemoryHistoryStore;
pub use sqlite::SqliteHistoryStore;

use crate::conversation::Role;
use crate::error::{AgentDeckError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message persisted in an agent's history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: Uuid,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    pub fn new(session_id: &str, role: Role, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Trait for history store backends.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one message to an agent's table.
    async fn append(&self, table: &str, message: &StoredMessage) -> Result<()>;

    /// The last `responses` user/assistant exchanges for a session, oldest first.
    async fn recent(&self, table: &str, session_id: &str, responses: usize)
        -> Result<Vec<StoredMessage>>;

    /// Delete a session's history. Returns the number of removed messages.
    async fn clear(&self, table: &str, session_id: &str) -> Result<usize>;

    /// Count messages stored for a session.
    async fn count(&self, table: &str, session_id: &str) -> Result<usize>;
}

/// Table names come from configuration and are spliced into SQL, so only
/// lowercase identifiers are accepted.
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table.len() <= 64
        && table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase())
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(AgentDeckError::InvalidInput(format!(
            "Invalid history table name: {:?}",
            table
        )))
    }
}

/// Keep the tail of `messages` that covers the last `responses` exchanges.
fn tail_exchanges(mut messages: Vec<StoredMessage>, responses: usize) -> Vec<StoredMessage> {
    let keep = responses.saturating_mul(2);
    if messages.len() > keep {
        messages.drain(..messages.len() - keep);
    }
    // Never start a window on a dangling assistant reply.
    while messages.first().is_some_and(|m| m.role == Role::Assistant) {
        messages.remove(0);
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("web_agent").is_ok());
        assert!(validate_table_name("agent2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2agent").is_err());
        assert!(validate_table_name("web-agent").is_err());
        assert!(validate_table_name("x; DROP TABLE y").is_err());
    }

    #[test]
    fn test_tail_exchanges_keeps_last_pairs() {
        let messages: Vec<StoredMessage> = (0..6)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                StoredMessage::new("s", role, &format!("m{}", i))
            })
            .collect();

        let tail = tail_exchanges(messages, 2);
        let contents: Vec<_> = tail.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn test_tail_exchanges_drops_leading_assistant() {
        let messages = vec![
            StoredMessage::new("s", Role::User, "q1"),
            StoredMessage::new("s", Role::Assistant, "a1"),
            StoredMessage::new("s", Role::User, "q2"),
        ];
        let tail = tail_exchanges(messages, 1);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].content, "q2");
    }
}
