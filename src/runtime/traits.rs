//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the runtime with mock implementations.

use crate::db::DbError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Everything persisted for one conversation between turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredConversation {
    pub conversation_id: String,
    /// Root topic snapshot; absent when the next turn starts a fresh root
    pub root: Option<Value>,
    /// Host-owned conversation data, passed through to topics
    pub ambient: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("Conversation store unavailable: {0}")]
    Unavailable(String),
}

/// Storage for conversation state trees
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, conversation_id: &str) -> Result<Option<StoredConversation>, StoreError>;

    async fn save(&self, conversation: &StoredConversation) -> Result<(), StoreError>;

    /// Forget a conversation entirely
    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    async fn load(&self, conversation_id: &str) -> Result<Option<StoredConversation>, StoreError> {
        (**self).load(conversation_id).await
    }

    async fn save(&self, conversation: &StoredConversation) -> Result<(), StoreError> {
        (**self).save(conversation).await
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        (**self).delete(conversation_id).await
    }
}
