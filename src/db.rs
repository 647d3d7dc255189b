//! Database module for topic-dialog
//!
//! Persists conversation state trees in SQLite.

mod schema;

pub use schema::SCHEMA;
use schema::UPSERT_CONVERSATION;

use crate::runtime::{StateStore, StoreError, StoredConversation};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Stored state is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("Stored timestamp is invalid: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe SQLite conversation store
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    // ==================== Conversation Operations ====================

    pub fn get_conversation(&self, id: &str) -> DbResult<Option<StoredConversation>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT root_state, ambient, updated_at FROM conversations WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        let Some((root_json, ambient_json, updated_at)) = row else {
            return Ok(None);
        };
        let root = root_json
            .map(|json| serde_json::from_str::<Value>(&json))
            .transpose()?;
        let ambient: Map<String, Value> = serde_json::from_str(&ambient_json)?;

        Ok(Some(StoredConversation {
            conversation_id: id.to_string(),
            root,
            ambient,
            updated_at: parse_datetime(&updated_at)?,
        }))
    }

    pub fn put_conversation(&self, conversation: &StoredConversation) -> DbResult<()> {
        let root_json = conversation
            .root
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let ambient_json = serde_json::to_string(&conversation.ambient)?;

        self.conn()?.execute(
            UPSERT_CONVERSATION,
            params![
                conversation.conversation_id,
                root_json,
                ambient_json,
                conversation.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn delete_conversation(&self, id: &str) -> DbResult<()> {
        self.conn()?
            .execute("DELETE FROM conversations WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of turns persisted for a conversation
    pub fn turn_count(&self, id: &str) -> DbResult<u64> {
        let count: Option<i64> = self
            .conn()?
            .query_row(
                "SELECT turn_count FROM conversations WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(count.map_or(0, |n| n.unsigned_abs()))
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<StoredConversation>, StoreError> {
        Ok(self.get_conversation(conversation_id)?)
    }

    async fn save(&self, conversation: &StoredConversation) -> Result<(), StoreError> {
        Ok(self.put_conversation(conversation)?)
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        Ok(self.delete_conversation(conversation_id)?)
    }
}

fn parse_datetime(s: &str) -> DbResult<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}
