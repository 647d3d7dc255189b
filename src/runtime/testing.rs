//! Mock implementations for testing
//!
//! These mocks enable runtime testing without a real database or dialog.

use super::traits::*;
use super::RootFactory;
use crate::parent::{Child, ChildTopics, Decision, ParentLogic, ParentTopic, Resume};
use crate::prompt::{Prompt, PromptConfig, Renderer};
use crate::topic::{TopicError, TurnContext};
use crate::validator::TextValidator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Mock Stores
// ============================================================================

/// Store that is never reachable
pub struct FailingStore;

#[async_trait]
impl StateStore for FailingStore {
    async fn load(&self, _: &str) -> Result<Option<StoredConversation>, StoreError> {
        Err(StoreError::Unavailable("mock store is down".to_string()))
    }

    async fn save(&self, _: &StoredConversation) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("mock store is down".to_string()))
    }

    async fn delete(&self, _: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("mock store is down".to_string()))
    }
}

// ============================================================================
// Mock Roots
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GreeterState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Asks for a name (two attempts), greets and completes. Counts greetings in
/// the ambient `greetings` entry.
pub struct Greeter;

impl ParentLogic for Greeter {
    type State = GreeterState;
    type Value = String;

    fn name(&self) -> &str {
        "greeter"
    }

    fn children(&self) -> Result<ChildTopics<GreeterState>, TopicError> {
        let mut children = ChildTopics::new();
        children.add(
            Child::new("name", |_: &GreeterState| {
                Ok(Prompt::new(PromptConfig {
                    max_turns: Some(2),
                    ..PromptConfig::new(Renderer::lines(["What is your name?"]), TextValidator)
                }))
            })
            .on_success(|state, _, name| {
                state.name = Some(name);
                Ok(Resume::Redispatch)
            }),
        )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut GreeterState,
        ctx: &mut dyn TurnContext,
    ) -> Result<Decision<String>, TopicError> {
        let Some(name) = state.name.clone() else {
            return Ok(Decision::activate("name"));
        };
        ctx.reply(format!("Hello {name}!"));
        let greetings = ctx
            .ambient()
            .get("greetings")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        ctx.ambient_mut()
            .insert("greetings".to_string(), Value::from(greetings + 1));
        Ok(Decision::Complete(name))
    }
}

pub struct GreeterFactory;

impl RootFactory for GreeterFactory {
    type Root = ParentTopic<Greeter>;

    fn build(&self) -> Result<Self::Root, TopicError> {
        ParentTopic::new(Greeter, GreeterState::default())
    }
}

/// Root that activates a child it never registered
pub struct Miswired;

impl ParentLogic for Miswired {
    type State = ();
    type Value = ();

    fn name(&self) -> &str {
        "miswired"
    }

    fn children(&self) -> Result<ChildTopics<()>, TopicError> {
        Ok(ChildTopics::new())
    }

    fn decide(&self, _: &mut (), _: &mut dyn TurnContext) -> Result<Decision<()>, TopicError> {
        Ok(Decision::activate("ghost"))
    }
}

pub struct MiswiredFactory;

impl RootFactory for MiswiredFactory {
    type Root = ParentTopic<Miswired>;

    fn build(&self) -> Result<Self::Root, TopicError> {
        ParentTopic::new(Miswired, ())
    }
}
