//! Configuration faults raised by the topic tree

use thiserror::Error;

/// Wiring errors in a topic tree. Each one aborts the current turn.
///
/// These are not user-input conditions: validation failures never surface
/// here, they stay inside the prompt that owns the validator.
#[derive(Debug, Error)]
pub enum TopicError {
    #[error("topic '{parent}' points at active topic '{name}' which is not one of its children")]
    UnknownActiveTopic { parent: String, name: String },

    #[error("topic '{parent}' tried to activate unknown child '{name}'")]
    UnknownChild { parent: String, name: String },

    #[error("child topic '{name}' is registered more than once")]
    DuplicateChild { name: String },

    #[error("prompt has no validator configured")]
    MissingValidator,

    #[error("prompt has no renderer configured")]
    MissingRenderer,

    #[error("choice prompt has no choices, it can never succeed")]
    EmptyChoices,

    #[error("topic already {status}, it accepts no further turns")]
    AlreadyCompleted { status: &'static str },

    #[error("topic '{parent}' re-dispatched more than {limit} times in one turn")]
    RedispatchLimit { parent: String, limit: u32 },

    #[error("topic '{topic}' state is inconsistent: {detail}")]
    Inconsistent { topic: String, detail: String },

    #[error("topic state could not be encoded or restored: {0}")]
    State(#[from] serde_json::Error),
}
