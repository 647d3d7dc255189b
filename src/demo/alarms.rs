//! Alarm sub-dialogs

use super::{load_alarms, show_alarms, Alarm};
use crate::parent::{Child, ChildTopics, Decision, ParentLogic, Resume};
use crate::prompt::{Prompt, PromptConfig, Renderer};
use crate::topic::{FailureReason, TopicError, TurnContext};
use crate::validator::{ChoiceValidator, ConfirmValidator, TextValidator, ValidationResult};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

const TITLE: &str = "title";
const TIME: &str = "time";
const WHICH_ALARM: &str = "which_alarm";
const CONFIRM_DELETE: &str = "confirm_delete";

const NOT_A_TIME: &str = "notatime";
const NO_ALARMS: FailureReason = FailureReason::from_static("noalarms");

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts `H:MM` or `HH:MM` and normalizes to `HH:MM`
fn parse_time(input: &str) -> ValidationResult<String> {
    let parsed = input.trim().split_once(':').and_then(|(hours, minutes)| {
        let shaped = matches!(hours.len(), 1 | 2) && minutes.len() == 2;
        if !(shaped && all_digits(hours) && all_digits(minutes)) {
            return None;
        }
        let hours = hours.parse().ok()?;
        let minutes = minutes.parse().ok()?;
        NaiveTime::from_hms_opt(hours, minutes, 0)
    });
    match parsed {
        Some(time) => ValidationResult::Valid(time.format("%H:%M").to_string()),
        None => ValidationResult::invalid(NOT_A_TIME),
    }
}

// ============================================================================
// Add alarm
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAlarmState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Asks for a title and a time, completes with the new [`Alarm`]
pub struct AddAlarm;

impl ParentLogic for AddAlarm {
    type State = AddAlarmState;
    type Value = Alarm;

    fn name(&self) -> &str {
        "add_alarm"
    }

    fn children(&self) -> Result<ChildTopics<AddAlarmState>, TopicError> {
        let mut children = ChildTopics::new();
        children
            .add(
                Child::new(TITLE, |_: &AddAlarmState| {
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(3),
                        ..PromptConfig::new(
                            Renderer::lines(["What would you like to call your alarm?"]),
                            TextValidator,
                        )
                    }))
                })
                .on_success(|state, _, title| {
                    state.title = Some(title);
                    Ok(Resume::Redispatch)
                }),
            )?
            .add(
                Child::new(TIME, |_: &AddAlarmState| {
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(3),
                        ..PromptConfig::new(
                            Renderer::new(|ctx, last_failure| {
                                if last_failure.is_some() {
                                    ctx.reply("Sorry, I need a time like 07:30.");
                                }
                                ctx.reply("What time would you like to set the alarm for?");
                            }),
                            parse_time,
                        )
                    }))
                })
                .on_success(|state, _, time| {
                    state.time = Some(time);
                    Ok(Resume::Redispatch)
                }),
            )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut AddAlarmState,
        _ctx: &mut dyn TurnContext,
    ) -> Result<Decision<Alarm>, TopicError> {
        Ok(match (&state.title, &state.time) {
            (None, _) => Decision::activate(TITLE),
            (Some(_), None) => Decision::activate(TIME),
            (Some(title), Some(time)) => Decision::Complete(Alarm {
                title: title.clone(),
                time: time.clone(),
            }),
        })
    }
}

// ============================================================================
// Delete alarm
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAlarmState {
    /// Alarm list as of activation; loaded on the first turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarms: Option<Vec<Alarm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
}

impl DeleteAlarmState {
    fn selected_alarm(&self) -> Result<&Alarm, TopicError> {
        self.selected
            .and_then(|index| self.alarms.as_ref()?.get(index))
            .ok_or_else(|| TopicError::Inconsistent {
                topic: "delete_alarm".to_string(),
                detail: format!("no alarm at selection {:?}", self.selected),
            })
    }
}

/// Picks an alarm (asking only when there is more than one) and confirms.
/// Completes with the alarm to delete, or `None` when the user backed out.
pub struct DeleteAlarm;

impl ParentLogic for DeleteAlarm {
    type State = DeleteAlarmState;
    type Value = Option<Alarm>;

    fn name(&self) -> &str {
        "delete_alarm"
    }

    fn children(&self) -> Result<ChildTopics<DeleteAlarmState>, TopicError> {
        let mut children = ChildTopics::new();
        children
            .add(
                // Built from the alarms loaded for this dialog, at activation
                Child::new(WHICH_ALARM, |state: &DeleteAlarmState| {
                    let alarms = state.alarms.clone().unwrap_or_default();
                    let validator = ChoiceValidator::new(alarms.iter().map(|a| a.title.clone()));
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(2),
                        ..PromptConfig::new(
                            Renderer::new(move |ctx, last_failure| {
                                if last_failure.is_some_and(|r| r == ChoiceValidator::INDEX_NOT_FOUND) {
                                    let input = ctx.input().to_string();
                                    ctx.reply(format!("Sorry, I couldn't find an alarm named '{input}'."))
                                        .reply("Let's try again.");
                                }
                                show_alarms(ctx, &alarms);
                                ctx.reply("Which alarm would you like to delete?");
                            }),
                            validator,
                        )
                    }))
                })
                .on_success(|state, _, index| {
                    state.selected = Some(index);
                    Ok(Resume::Redispatch)
                }),
            )?
            .add(
                Child::new(CONFIRM_DELETE, |state: &DeleteAlarmState| {
                    let title = state.selected_alarm()?.title.clone();
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(2),
                        ..PromptConfig::new(
                            Renderer::new(move |ctx, last_failure| {
                                if last_failure.is_some_and(|r| r == ConfirmValidator::NOT_YES_OR_NO) {
                                    ctx.reply("Sorry, I was expecting 'yes' or 'no'.")
                                        .reply("Let's try again.");
                                }
                                ctx.reply(format!(
                                    "Are you sure you want to delete alarm '{title}' ('yes' or 'no')?"
                                ));
                            }),
                            ConfirmValidator,
                        )
                    }))
                })
                .on_success(|state, _, confirmed| {
                    state.confirmed = Some(confirmed);
                    Ok(Resume::Redispatch)
                }),
            )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut DeleteAlarmState,
        ctx: &mut dyn TurnContext,
    ) -> Result<Decision<Option<Alarm>>, TopicError> {
        let alarms = match state.alarms.take() {
            Some(alarms) => alarms,
            None => load_alarms(ctx.ambient())?,
        };
        let alarms = state.alarms.insert(alarms);

        if alarms.is_empty() {
            ctx.reply("There are no alarms to delete.");
            return Ok(Decision::Fail(NO_ALARMS));
        }

        if state.selected.is_none() {
            if alarms.len() > 1 {
                return Ok(Decision::activate(WHICH_ALARM));
            }
            show_alarms(ctx, alarms);
            state.selected = Some(0);
        }

        match state.confirmed {
            None => Ok(Decision::activate(CONFIRM_DELETE)),
            Some(true) => Ok(Decision::Complete(Some(state.selected_alarm()?.clone()))),
            Some(false) => Ok(Decision::Complete(None)),
        }
    }
}
