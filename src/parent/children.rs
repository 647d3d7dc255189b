//! Named child topics owned by a parent

use crate::topic::{FailureReason, Topic, TopicError, TurnContext, TurnOutcome};
use serde_json::Value;

/// What the parent does after an active child terminates.
///
/// The parent always clears its own active pointer first; this only decides
/// what happens next within the same turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume {
    /// Run the parent's decision logic again on the same turn
    Redispatch,
    /// The turn is done
    EndTurn,
    /// The parent fails too, handing the reason to its own owner
    Fail(FailureReason),
}

type Factory<S, T> = dyn Fn(&S) -> Result<T, TopicError>;
type SuccessHandler<S, V> = dyn Fn(&mut S, &mut dyn TurnContext, V) -> Result<Resume, TopicError>;
type FailureHandler<S> =
    dyn Fn(&mut S, &mut dyn TurnContext, FailureReason) -> Result<Resume, TopicError>;

/// A child registration: how to build the topic and how the parent reacts
/// when it terminates.
///
/// The factory runs every turn the child is active, with the parent's state
/// as it is at that moment, so anything the child derives from parent data
/// (such as a choice list) is never stale.
pub struct Child<S, T: Topic> {
    name: String,
    factory: Box<Factory<S, T>>,
    on_success: Box<SuccessHandler<S, T::Value>>,
    on_failure: Box<FailureHandler<S>>,
}

impl<S: 'static, T: Topic + 'static> Child<S, T> {
    /// By default success re-dispatches to the parent and failure
    /// propagates upward.
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn(&S) -> Result<T, TopicError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Box::new(factory),
            on_success: Box::new(|_: &mut S, _: &mut dyn TurnContext, _: T::Value| {
                Ok(Resume::Redispatch)
            }),
            on_failure: Box::new(|_: &mut S, _: &mut dyn TurnContext, reason: FailureReason| {
                Ok(Resume::Fail(reason))
            }),
        }
    }

    pub fn on_success(
        mut self,
        handler: impl Fn(&mut S, &mut dyn TurnContext, T::Value) -> Result<Resume, TopicError>
            + 'static,
    ) -> Self {
        self.on_success = Box::new(handler);
        self
    }

    pub fn on_failure(
        mut self,
        handler: impl Fn(&mut S, &mut dyn TurnContext, FailureReason) -> Result<Resume, TopicError>
            + 'static,
    ) -> Self {
        self.on_failure = Box::new(handler);
        self
    }
}

/// Result of running the active child for one turn
pub(crate) enum ChildStep {
    /// Still running; carries its state to keep until the next turn
    Pending(Value),
    Resolved(Resume),
}

/// Type-erased child so one parent can own children of different kinds
pub(crate) trait ChildSlot<S> {
    fn name(&self) -> &str;

    fn run(
        &self,
        local: &mut S,
        saved: Option<Value>,
        ctx: &mut dyn TurnContext,
    ) -> Result<ChildStep, TopicError>;
}

impl<S, T: Topic> ChildSlot<S> for Child<S, T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(
        &self,
        local: &mut S,
        saved: Option<Value>,
        ctx: &mut dyn TurnContext,
    ) -> Result<ChildStep, TopicError> {
        let mut topic = (self.factory)(&*local)?;
        if let Some(saved) = saved {
            topic.restore(saved)?;
        }
        match topic.on_receive_turn(ctx)? {
            TurnOutcome::Continue => Ok(ChildStep::Pending(topic.snapshot()?)),
            TurnOutcome::Succeeded(value) => {
                tracing::debug!(child = %self.name, "Child topic succeeded");
                Ok(ChildStep::Resolved((self.on_success)(local, ctx, value)?))
            }
            TurnOutcome::Failed(reason) => {
                tracing::debug!(child = %self.name, %reason, "Child topic failed");
                Ok(ChildStep::Resolved((self.on_failure)(local, ctx, reason)?))
            }
        }
    }
}

/// Ordered, fixed mapping from names to child registrations
pub struct ChildTopics<S> {
    slots: Vec<Box<dyn ChildSlot<S>>>,
}

impl<S: 'static> ChildTopics<S> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Register a child. Names must be unique within one parent.
    pub fn add<T: Topic + 'static>(&mut self, child: Child<S, T>) -> Result<&mut Self, TopicError> {
        if self.contains(&child.name) {
            return Err(TopicError::DuplicateChild { name: child.name });
        }
        self.slots.push(Box::new(child));
        Ok(self)
    }
}

impl<S> ChildTopics<S> {
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn ChildSlot<S>> {
        self.slots
            .iter()
            .find(|slot| slot.name() == name)
            .map(|slot| &**slot)
    }
}

impl<S: 'static> Default for ChildTopics<S> {
    fn default() -> Self {
        Self::new()
    }
}
