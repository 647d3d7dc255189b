//! Conversation runtime executor

use super::traits::{StateStore, StoreError, StoredConversation};
use super::RootFactory;
use crate::topic::{FailureReason, Topic, TopicError, Turn, TurnOutcome};
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors that abort a turn
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Topic fault: {0}")]
    Topic(#[from] TopicError),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// What became of the root topic this turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootOutcome {
    /// Root still running; its state was persisted
    Running,
    /// Root finished; the next turn starts a fresh one
    Completed,
    Failed(FailureReason),
}

/// Result of one turn, as seen by the host
#[derive(Debug, Clone)]
pub struct TurnReport {
    pub turn_id: String,
    /// Outgoing messages, in the order they were sent
    pub messages: Vec<String>,
    pub outcome: RootOutcome,
}

struct RootRun {
    root: Option<Value>,
    ambient: Map<String, Value>,
    messages: Vec<String>,
    outcome: RootOutcome,
}

/// Drives turns for any number of independent conversations
pub struct ConversationRuntime<S, F>
where
    S: StateStore,
    F: RootFactory,
{
    store: S,
    factory: F,
    /// One lock per conversation; turns for the same conversation never overlap
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<S, F> ConversationRuntime<S, F>
where
    S: StateStore,
    F: RootFactory,
{
    pub fn new(store: S, factory: F) -> Self {
        Self {
            store,
            factory,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Feed one incoming message to a conversation.
    ///
    /// On a topic fault nothing is persisted, so the previous state tree
    /// stays as it was.
    pub async fn handle_turn(
        &self,
        conversation_id: &str,
        input: &str,
    ) -> Result<TurnReport, RuntimeError> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.run_turn(conversation_id, input).await
        };
        self.release_lock(conversation_id, lock).await;
        result
    }

    /// Drop a conversation's state tree and ambient data
    pub async fn reset(&self, conversation_id: &str) -> Result<(), RuntimeError> {
        let lock = self.conversation_lock(conversation_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.store.delete(conversation_id).await
        };
        self.release_lock(conversation_id, lock).await;
        result?;
        tracing::info!(conversation_id, "Conversation reset");
        Ok(())
    }

    async fn run_turn(&self, conversation_id: &str, input: &str) -> Result<TurnReport, RuntimeError> {
        let turn_id = uuid::Uuid::new_v4().to_string();
        let (snapshot, ambient) = match self.store.load(conversation_id).await? {
            Some(stored) => (stored.root, stored.ambient),
            None => {
                tracing::info!(conversation_id, "Starting new conversation");
                (None, Map::new())
            }
        };

        let run = self.run_root(snapshot, ambient, input).inspect_err(|e| {
            tracing::error!(conversation_id, turn_id = %turn_id, error = %e, "Turn aborted");
        })?;

        self.store
            .save(&StoredConversation {
                conversation_id: conversation_id.to_string(),
                root: run.root,
                ambient: run.ambient,
                updated_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            conversation_id,
            turn_id = %turn_id,
            messages = run.messages.len(),
            outcome = ?run.outcome,
            "Turn complete"
        );

        Ok(TurnReport {
            turn_id,
            messages: run.messages,
            outcome: run.outcome,
        })
    }

    async fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(conversation_id.to_string()).or_default())
    }

    /// Forget the conversation's lock once nobody else holds or waits on it.
    /// Handles are only cloned under the map lock, so the count is exact here.
    async fn release_lock(&self, conversation_id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(conversation_id);
        }
    }

    #[cfg(test)]
    async fn tracked_conversations(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Rehydrate the root, hand it the turn and capture what to persist.
    /// Synchronous: the topic tree never lives across an await point.
    fn run_root(
        &self,
        snapshot: Option<Value>,
        ambient: Map<String, Value>,
        input: &str,
    ) -> Result<RootRun, TopicError> {
        let mut root = self.factory.build()?;
        if let Some(saved) = snapshot {
            root.restore(saved)?;
        }

        let mut turn = Turn::new(input).with_ambient(ambient);
        let (root_state, outcome) = match root.on_receive_turn(&mut turn)? {
            TurnOutcome::Continue => (Some(root.snapshot()?), RootOutcome::Running),
            TurnOutcome::Succeeded(_) => (None, RootOutcome::Completed),
            TurnOutcome::Failed(reason) => (None, RootOutcome::Failed(reason)),
        };

        let (messages, ambient) = turn.into_parts();
        Ok(RootRun {
            root: root_state,
            ambient,
            messages,
            outcome,
        })
    }
}
