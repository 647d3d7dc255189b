//! Persisted prompt state

use crate::topic::FailureReason;
use serde::{Deserialize, Serialize};

/// What a prompt keeps between turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptState {
    /// Absent until the initial prompt is sent, then one per rejected answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<PromptResolution>,
}

impl PromptState {
    pub fn status(&self) -> PromptStatus {
        match (&self.resolution, self.turn_count) {
            (Some(PromptResolution::Succeeded), _) => PromptStatus::Succeeded,
            (Some(PromptResolution::Failed { .. }), _) => PromptStatus::Failed,
            (None, None) => PromptStatus::NotStarted,
            (None, Some(_)) => PromptStatus::Prompting,
        }
    }
}

/// How a prompt ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptResolution {
    Succeeded,
    Failed { reason: FailureReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    NotStarted,
    Prompting,
    Succeeded,
    Failed,
}

impl PromptStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Prompting => "prompting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}
