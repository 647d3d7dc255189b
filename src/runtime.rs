//! Conversation driver
//!
//! Owns the per-turn lifecycle the topic core assumes: one turn in flight per
//! conversation, the state tree rehydrated at the start of a turn and
//! persisted at the end of it.

mod executor;
mod memory;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::{ConversationRuntime, RootOutcome, RuntimeError, TurnReport};
pub use memory::MemoryStore;
pub use traits::*;

use crate::topic::{Topic, TopicError};

/// Builds the root topic of a conversation, in its initial state
pub trait RootFactory: Send + Sync {
    type Root: Topic;

    fn build(&self) -> Result<Self::Root, TopicError>;
}
