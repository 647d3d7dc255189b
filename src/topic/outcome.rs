//! Turn outcomes and failure reason codes

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Result of handing one turn to a topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome<V> {
    /// Turn consumed, the topic is still running
    Continue,
    Succeeded(V),
    Failed(FailureReason),
}

impl<V> TurnOutcome<V> {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }

    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> TurnOutcome<U> {
        match self {
            Self::Continue => TurnOutcome::Continue,
            Self::Succeeded(value) => TurnOutcome::Succeeded(f(value)),
            Self::Failed(reason) => TurnOutcome::Failed(reason),
        }
    }
}

/// Opaque, non-empty failure code.
///
/// The core only looks at presence or absence. The text belongs to whoever
/// produced it, except for [`FailureReason::TOO_MANY_ATTEMPTS`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FailureReason(Cow<'static, str>);

impl FailureReason {
    /// Produced by a prompt whose retry budget is exhausted
    pub const TOO_MANY_ATTEMPTS: FailureReason = FailureReason::from_static("too-many-attempts");

    /// Build a reason from a literal. Use [`FailureReason::try_from`] for
    /// codes only known at runtime.
    ///
    /// # Panics
    ///
    /// Panics if `code` is empty. In const context this is a compile error.
    pub const fn from_static(code: &'static str) -> Self {
        assert!(!code.is_empty(), "failure reason must not be empty");
        Self(Cow::Borrowed(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_too_many_attempts(&self) -> bool {
        self.as_str() == Self::TOO_MANY_ATTEMPTS.as_str()
    }
}

/// Rejected attempt to build an empty [`FailureReason`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("failure reason must not be empty")]
pub struct EmptyReason;

impl TryFrom<String> for FailureReason {
    type Error = EmptyReason;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        if code.is_empty() {
            Err(EmptyReason)
        } else {
            Ok(Self(Cow::Owned(code)))
        }
    }
}

impl From<FailureReason> for String {
    fn from(reason: FailureReason) -> Self {
        reason.0.into_owned()
    }
}

impl PartialEq<str> for FailureReason {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FailureReason {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
