//! Topic abstraction
//!
//! A topic is a stateful, turn-driven unit of conversational logic. Its state
//! is plain serializable data so the host can persist the whole tree between
//! turns and rehydrate it on the next one.

mod context;
mod error;
mod outcome;

pub use context::{Turn, TurnContext};
pub use error::TopicError;
pub use outcome::{EmptyReason, FailureReason, TurnOutcome};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A unit of conversational state plus the behavior that drives it.
///
/// `on_receive_turn` is invoked once per incoming turn. A topic that reached
/// a terminal outcome must be detached by whoever owns it; topics that track
/// their own completion (such as [`crate::prompt::Prompt`]) reject further
/// turns with [`TopicError::AlreadyCompleted`].
pub trait Topic {
    /// Persisted state, surviving across turns
    type State: Serialize + DeserializeOwned;
    /// Value handed to the owner on success
    type Value;

    fn state(&self) -> &Self::State;

    fn state_mut(&mut self) -> &mut Self::State;

    /// Handle one incoming turn
    fn on_receive_turn(
        &mut self,
        ctx: &mut dyn TurnContext,
    ) -> Result<TurnOutcome<Self::Value>, TopicError>;

    /// Encode the current state for persistence
    fn snapshot(&self) -> Result<Value, TopicError> {
        Ok(serde_json::to_value(self.state())?)
    }

    /// Replace the current state with a previously taken snapshot
    fn restore(&mut self, snapshot: Value) -> Result<(), TopicError> {
        *self.state_mut() = serde_json::from_value(snapshot)?;
        Ok(())
    }
}
