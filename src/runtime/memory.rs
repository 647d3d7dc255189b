//! In-process conversation store

use super::traits::{StateStore, StoreError, StoredConversation};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps state trees in memory. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    conversations: Arc<RwLock<HashMap<String, StoredConversation>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<StoredConversation>, StoreError> {
        Ok(self.conversations.read().await.get(conversation_id).cloned())
    }

    async fn save(&self, conversation: &StoredConversation) -> Result<(), StoreError> {
        self.conversations
            .write()
            .await
            .insert(conversation.conversation_id.clone(), conversation.clone());
        Ok(())
    }

    async fn delete(&self, conversation_id: &str) -> Result<(), StoreError> {
        self.conversations.write().await.remove(conversation_id);
        Ok(())
    }
}
