//! Validators: pure parsers from turn input to a value or a failure reason

mod builtin;

pub use builtin::{ChoiceValidator, ConfirmValidator, IntValidator, TextValidator};

use crate::topic::{FailureReason, TopicError};

/// Outcome of validating one turn's input. Exactly one side is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult<V> {
    Valid(V),
    Invalid(FailureReason),
}

impl<V> ValidationResult<V> {
    /// Failure with a literal reason code
    ///
    /// # Panics
    ///
    /// Panics if `code` is empty, like [`FailureReason::from_static`].
    pub const fn invalid(code: &'static str) -> Self {
        Self::Invalid(FailureReason::from_static(code))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn value(self) -> Option<V> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match self {
            Self::Valid(_) => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

/// Parses a turn's input into a value.
///
/// Implementations must not touch topic state and must give the same answer
/// for the same input under the same construction-time configuration.
pub trait Validator {
    type Value;

    fn validate(&self, input: &str) -> ValidationResult<Self::Value>;

    /// Reject configuration that could never produce a value
    fn check(&self) -> Result<(), TopicError> {
        Ok(())
    }
}

impl<V, F> Validator for F
where
    F: Fn(&str) -> ValidationResult<V>,
{
    type Value = V;

    fn validate(&self, input: &str) -> ValidationResult<V> {
        self(input)
    }
}
