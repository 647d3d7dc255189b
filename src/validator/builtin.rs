//! Stock validators for text, numbers, yes/no and choices

use super::{ValidationResult, Validator};
use crate::topic::TopicError;
use std::ops::RangeInclusive;

/// Accepts any input with non-whitespace content, trimmed
#[derive(Debug, Clone, Copy, Default)]
pub struct TextValidator;

impl TextValidator {
    pub const EMPTY: &'static str = "empty";
}

impl Validator for TextValidator {
    type Value = String;

    fn validate(&self, input: &str) -> ValidationResult<String> {
        let text = input.trim();
        if text.is_empty() {
            ValidationResult::invalid(Self::EMPTY)
        } else {
            ValidationResult::Valid(text.to_string())
        }
    }
}

/// Parses a signed integer, optionally bounded
#[derive(Debug, Clone, Default)]
pub struct IntValidator {
    range: Option<RangeInclusive<i64>>,
}

impl IntValidator {
    pub const NOT_A_NUMBER: &'static str = "notanumber";
    pub const OUT_OF_RANGE: &'static str = "outofrange";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn within(range: RangeInclusive<i64>) -> Self {
        Self { range: Some(range) }
    }
}

impl Validator for IntValidator {
    type Value = i64;

    fn validate(&self, input: &str) -> ValidationResult<i64> {
        let Ok(value) = input.trim().parse::<i64>() else {
            return ValidationResult::invalid(Self::NOT_A_NUMBER);
        };
        match &self.range {
            Some(range) if !range.contains(&value) => ValidationResult::invalid(Self::OUT_OF_RANGE),
            _ => ValidationResult::Valid(value),
        }
    }
}

/// Accepts exactly `yes` or `no`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmValidator;

impl ConfirmValidator {
    pub const NOT_YES_OR_NO: &'static str = "notyesorno";
}

impl Validator for ConfirmValidator {
    type Value = bool;

    fn validate(&self, input: &str) -> ValidationResult<bool> {
        match input {
            "yes" => ValidationResult::Valid(true),
            "no" => ValidationResult::Valid(false),
            _ => ValidationResult::invalid(Self::NOT_YES_OR_NO),
        }
    }
}

/// Case-insensitive match against a fixed list; yields the matching index.
///
/// Build it when the prompt is activated, from the data as it is then. A
/// validator built before the list is known can never succeed, which is why
/// an empty list fails [`Validator::check`].
#[derive(Debug, Clone, Default)]
pub struct ChoiceValidator {
    choices: Vec<String>,
}

impl ChoiceValidator {
    pub const INDEX_NOT_FOUND: &'static str = "indexnotfound";

    pub fn new<I, T>(choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }
}

impl Validator for ChoiceValidator {
    type Value = usize;

    fn validate(&self, input: &str) -> ValidationResult<usize> {
        let wanted = input.trim().to_lowercase();
        self.choices
            .iter()
            .position(|choice| choice.to_lowercase() == wanted)
            .map_or_else(
                || ValidationResult::invalid(Self::INDEX_NOT_FOUND),
                ValidationResult::Valid,
            )
    }

    fn check(&self) -> Result<(), TopicError> {
        if self.choices.is_empty() {
            Err(TopicError::EmptyChoices)
        } else {
            Ok(())
        }
    }
}
