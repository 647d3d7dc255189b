//! Parent topics: delegation to named children
//!
//! A parent is either idle (it decides what to do next) or delegated to one
//! active child. Activation forwards the same turn to the new child, so a
//! prompt can ask its first question without another round-trip. When the
//! active child terminates the parent clears its own pointer and, depending
//! on the child's [`Resume`], runs its decision logic again on that turn.

mod children;

#[cfg(test)]
mod proptests;

pub use children::{Child, ChildTopics, Resume};

use crate::topic::{FailureReason, Topic, TopicError, TurnContext, TurnOutcome};
use children::ChildStep;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Upper bound on decision re-runs within one turn
pub const MAX_REDISPATCH: u32 = 64;

/// What the parent's decision logic wants to happen on an idle turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<V> {
    /// Make the named child active and hand it this turn
    Activate(String),
    /// The parent's own work is done
    Complete(V),
    Fail(FailureReason),
    /// No progress possible; the decision logic already sent whatever it wanted
    Wait,
}

impl<V> Decision<V> {
    pub fn activate(name: impl Into<String>) -> Self {
        Self::Activate(name.into())
    }
}

/// Domain-specific part of a parent topic
pub trait ParentLogic {
    /// Domain data the parent keeps between turns
    type State: Serialize + DeserializeOwned + 'static;
    type Value;

    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Build the child mapping. Called once per parent instance.
    fn children(&self) -> Result<ChildTopics<Self::State>, TopicError>;

    fn decide(
        &self,
        state: &mut Self::State,
        ctx: &mut dyn TurnContext,
    ) -> Result<Decision<Self::Value>, TopicError>;
}

/// Persisted parent state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentTopicState<S> {
    /// Child currently receiving turns. Always a registered child name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_topic_name: Option<String>,
    /// Snapshots of children that are running. A terminated child's entry is
    /// removed by the parent.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub child_states: BTreeMap<String, Value>,
    pub local: S,
}

impl<S> ParentTopicState<S> {
    pub fn new(local: S) -> Self {
        Self {
            active_topic_name: None,
            child_states: BTreeMap::new(),
            local,
        }
    }
}

/// A topic composed of named children with at most one active at a time
pub struct ParentTopic<L: ParentLogic> {
    logic: L,
    children: ChildTopics<L::State>,
    state: ParentTopicState<L::State>,
}

impl<L: ParentLogic> ParentTopic<L> {
    pub fn new(logic: L, initial: L::State) -> Result<Self, TopicError> {
        Self::with_state(logic, ParentTopicState::new(initial))
    }

    pub fn with_state(logic: L, state: ParentTopicState<L::State>) -> Result<Self, TopicError> {
        let children = logic.children()?;
        Ok(Self {
            logic,
            children,
            state,
        })
    }

    pub fn logic(&self) -> &L {
        &self.logic
    }

    pub fn children(&self) -> &ChildTopics<L::State> {
        &self.children
    }

    pub fn active_topic_name(&self) -> Option<&str> {
        self.state.active_topic_name.as_deref()
    }

    pub fn has_active_topic(&self) -> bool {
        self.state.active_topic_name.is_some()
    }

    pub fn local(&self) -> &L::State {
        &self.state.local
    }

    fn activate(&mut self, name: String) -> Result<(), TopicError> {
        if !self.children.contains(&name) {
            return Err(TopicError::UnknownChild {
                parent: self.logic.name().to_string(),
                name,
            });
        }
        tracing::debug!(parent = %self.logic.name(), child = %name, "Activating child topic");
        self.state.child_states.remove(&name);
        self.state.active_topic_name = Some(name);
        Ok(())
    }

    /// Run the active child. `None` means the child resolved and the parent
    /// should decide again.
    fn delegate(
        &mut self,
        name: String,
        ctx: &mut dyn TurnContext,
    ) -> Result<Option<TurnOutcome<L::Value>>, TopicError> {
        let slot = self
            .children
            .get(&name)
            .ok_or_else(|| TopicError::UnknownActiveTopic {
                parent: self.logic.name().to_string(),
                name: name.clone(),
            })?;
        let saved = self.state.child_states.get(&name).cloned();

        match slot.run(&mut self.state.local, saved, ctx)? {
            ChildStep::Pending(snapshot) => {
                self.state.child_states.insert(name, snapshot);
                Ok(Some(TurnOutcome::Continue))
            }
            ChildStep::Resolved(resume) => {
                self.state.child_states.remove(&name);
                self.state.active_topic_name = None;
                match resume {
                    Resume::Redispatch => Ok(None),
                    Resume::EndTurn => Ok(Some(TurnOutcome::Continue)),
                    Resume::Fail(reason) => Ok(Some(TurnOutcome::Failed(reason))),
                }
            }
        }
    }
}

impl<L: ParentLogic> Topic for ParentTopic<L> {
    type State = ParentTopicState<L::State>;
    type Value = L::Value;

    fn state(&self) -> &Self::State {
        &self.state
    }

    fn state_mut(&mut self) -> &mut Self::State {
        &mut self.state
    }

    fn on_receive_turn(
        &mut self,
        ctx: &mut dyn TurnContext,
    ) -> Result<TurnOutcome<L::Value>, TopicError> {
        let mut redispatches = 0u32;
        loop {
            if let Some(name) = self.state.active_topic_name.clone() {
                if let Some(outcome) = self.delegate(name, ctx)? {
                    return Ok(outcome);
                }
                redispatches += 1;
                if redispatches > MAX_REDISPATCH {
                    return Err(TopicError::RedispatchLimit {
                        parent: self.logic.name().to_string(),
                        limit: MAX_REDISPATCH,
                    });
                }
            }

            match self.logic.decide(&mut self.state.local, ctx)? {
                Decision::Activate(name) => self.activate(name)?,
                Decision::Complete(value) => {
                    tracing::debug!(parent = %self.logic.name(), "Parent topic completed");
                    return Ok(TurnOutcome::Succeeded(value));
                }
                Decision::Fail(reason) => {
                    tracing::debug!(parent = %self.logic.name(), %reason, "Parent topic failed");
                    return Ok(TurnOutcome::Failed(reason));
                }
                Decision::Wait => return Ok(TurnOutcome::Continue),
            }
        }
    }
}
