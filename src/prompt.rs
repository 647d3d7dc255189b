//! Prompt: ask, validate, retry, then succeed or give up
//!
//! ```text
//! NotStarted --turn--> Prompting          initial prompt sent, turn_count = 0
//! Prompting  --valid--> Succeeded         on_success(value)
//! Prompting  --invalid, budget left--> Prompting   re-prompt with the reason
//! Prompting  --invalid, budget spent--> Failed     on_failure("too-many-attempts")
//! ```
//!
//! Rendering and validation are supplied by the caller; the retry policy
//! lives here and is independent of both.

mod state;

#[cfg(test)]
mod proptests;

pub use state::{PromptResolution, PromptState, PromptStatus};

use crate::topic::{FailureReason, Topic, TopicError, TurnContext, TurnOutcome};
use crate::validator::{ValidationResult, Validator};

type RenderFn = dyn Fn(&mut dyn TurnContext, Option<&FailureReason>);
type SuccessFn<V> = dyn FnMut(&mut dyn TurnContext, &V);
type FailureFn = dyn FnMut(&mut dyn TurnContext, &FailureReason);

/// Emits the prompt. Receives the reason the previous answer was rejected,
/// or `None` for the initial prompt.
pub struct Renderer(Box<RenderFn>);

impl Renderer {
    pub fn new(render: impl Fn(&mut dyn TurnContext, Option<&FailureReason>) + 'static) -> Self {
        Self(Box::new(render))
    }

    /// Sends the same fixed lines on every attempt
    pub fn lines<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        Self::new(move |ctx, _| {
            for line in &lines {
                ctx.send(line.clone());
            }
        })
    }

    fn render(&self, ctx: &mut dyn TurnContext, last_failure: Option<&FailureReason>) {
        (self.0)(ctx, last_failure);
    }
}

/// Everything a prompt needs, fixed at construction
pub struct PromptConfig<V> {
    pub renderer: Option<Renderer>,
    pub validator: Option<Box<dyn Validator<Value = V>>>,
    /// `None` retries forever. `Some(1)` gives up on the first bad answer.
    pub max_turns: Option<u32>,
    pub on_success: Option<Box<SuccessFn<V>>>,
    pub on_failure: Option<Box<FailureFn>>,
}

impl<V> PromptConfig<V> {
    pub fn new(renderer: Renderer, validator: impl Validator<Value = V> + 'static) -> Self {
        Self {
            renderer: Some(renderer),
            validator: Some(Box::new(validator)),
            ..Self::default()
        }
    }
}

impl<V> Default for PromptConfig<V> {
    fn default() -> Self {
        Self {
            renderer: None,
            validator: None,
            max_turns: None,
            on_success: None,
            on_failure: None,
        }
    }
}

/// A topic implementing the prompt-and-validate pattern
pub struct Prompt<V> {
    config: PromptConfig<V>,
    state: PromptState,
}

impl<V> Prompt<V> {
    pub fn new(config: PromptConfig<V>) -> Self {
        Self::with_state(config, PromptState::default())
    }

    pub fn with_state(config: PromptConfig<V>, state: PromptState) -> Self {
        Self { config, state }
    }

    pub fn status(&self) -> PromptStatus {
        self.state.status()
    }

    pub fn max_turns(&self) -> Option<u32> {
        self.config.max_turns
    }

    fn budget_spent(&self, turn_count: u32) -> bool {
        self.config.max_turns.is_some_and(|max| turn_count >= max)
    }
}

impl<V> Topic for Prompt<V> {
    type State = PromptState;
    type Value = V;

    fn state(&self) -> &PromptState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PromptState {
        &mut self.state
    }

    fn on_receive_turn(&mut self, ctx: &mut dyn TurnContext) -> Result<TurnOutcome<V>, TopicError> {
        let status = self.state.status();
        if status.is_terminal() {
            return Err(TopicError::AlreadyCompleted {
                status: status.as_str(),
            });
        }

        let renderer = self.config.renderer.as_ref().ok_or(TopicError::MissingRenderer)?;
        let validator = self.config.validator.as_deref().ok_or(TopicError::MissingValidator)?;

        let Some(turn_count) = self.state.turn_count else {
            validator.check()?;
            self.state.turn_count = Some(0);
            tracing::debug!("Sending initial prompt");
            renderer.render(ctx, None);
            return Ok(TurnOutcome::Continue);
        };

        match validator.validate(ctx.input()) {
            ValidationResult::Valid(value) => {
                tracing::debug!(turn_count, "Prompt succeeded");
                self.state.resolution = Some(PromptResolution::Succeeded);
                if let Some(on_success) = self.config.on_success.as_mut() {
                    on_success(ctx, &value);
                }
                Ok(TurnOutcome::Succeeded(value))
            }
            ValidationResult::Invalid(reason) => {
                let turn_count = turn_count.saturating_add(1);
                self.state.turn_count = Some(turn_count);

                if self.budget_spent(turn_count) {
                    let reason = FailureReason::TOO_MANY_ATTEMPTS;
                    tracing::debug!(turn_count, %reason, "Prompt gave up");
                    self.state.resolution = Some(PromptResolution::Failed {
                        reason: reason.clone(),
                    });
                    if let Some(on_failure) = self.config.on_failure.as_mut() {
                        on_failure(ctx, &reason);
                    }
                    return Ok(TurnOutcome::Failed(reason));
                }

                tracing::debug!(turn_count, %reason, "Re-prompting");
                renderer.render(ctx, Some(&reason));
                Ok(TurnOutcome::Continue)
            }
        }
    }
}
