//! Root dialog: keywords, profile collection and greeting

use super::alarms::{AddAlarm, AddAlarmState, DeleteAlarm, DeleteAlarmState};
use super::{load_alarms, show_alarms, store_alarms, Alarm};
use crate::parent::{Child, ChildTopics, Decision, ParentLogic, ParentTopic, Resume};
use crate::prompt::{Prompt, PromptConfig, Renderer};
use crate::topic::{FailureReason, TopicError, TurnContext};
use crate::validator::{IntValidator, TextValidator};
use serde::{Deserialize, Serialize};

const NAME: &str = "name";
const AGE: &str = "age";
const ADD_ALARM: &str = "add_alarm";
const DELETE_ALARM: &str = "delete_alarm";

pub(super) const GIVE_UP: &str =
    "I'm sorry I'm having issues understanding you. Let's try something else. Say 'Help'.";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    /// Set when a prompt consumed this turn's input; its text is an answer,
    /// not a command. Never persisted.
    #[serde(skip)]
    answer_taken: bool,
}

/// Top of the demo tree. Never terminates.
pub struct RootDialog;

fn age_prompt() -> Prompt<i64> {
    Prompt::new(PromptConfig {
        max_turns: Some(3),
        ..PromptConfig::new(
            Renderer::new(|ctx, last_failure| {
                match last_failure.map(FailureReason::as_str) {
                    Some(IntValidator::NOT_A_NUMBER) => {
                        ctx.reply("Sorry, I need a number.");
                    }
                    Some(IntValidator::OUT_OF_RANGE) => {
                        ctx.reply("That doesn't look like a real age.");
                    }
                    _ => {}
                }
                ctx.reply("How old are you?");
            }),
            IntValidator::within(0..=130),
        )
    })
}

/// Shared failure handling for the alarm sub-dialogs
fn alarm_dialog_failed(ctx: &mut dyn TurnContext, reason: &FailureReason) -> Resume {
    if reason.is_too_many_attempts() {
        ctx.reply(GIVE_UP);
    }
    Resume::EndTurn
}

impl ParentLogic for RootDialog {
    type State = RootState;
    type Value = ();

    fn name(&self) -> &str {
        "root"
    }

    fn children(&self) -> Result<ChildTopics<RootState>, TopicError> {
        let mut children = ChildTopics::new();
        children
            .add(
                Child::new(NAME, |_: &RootState| {
                    Ok(Prompt::new(PromptConfig::new(
                        Renderer::lines(["What is your name?"]),
                        TextValidator,
                    )))
                })
                .on_success(|state, _, name| {
                    state.name = Some(name);
                    state.answer_taken = true;
                    Ok(Resume::Redispatch)
                }),
            )?
            .add(
                Child::new(AGE, |_: &RootState| Ok(age_prompt()))
                    .on_success(|state, _, age| {
                        state.age = Some(age);
                        state.answer_taken = true;
                        Ok(Resume::Redispatch)
                    })
                    .on_failure(|_, ctx, _| {
                        ctx.reply("Let's come back to that later.");
                        Ok(Resume::EndTurn)
                    }),
            )?
            .add(
                Child::new(ADD_ALARM, |_: &RootState| {
                    ParentTopic::new(AddAlarm, AddAlarmState::default())
                })
                .on_success(|_, ctx, alarm: Alarm| {
                    let mut alarms = load_alarms(ctx.ambient())?;
                    ctx.reply(format!("Added alarm '{}' at {}.", alarm.title, alarm.time));
                    alarms.push(alarm);
                    store_alarms(ctx.ambient_mut(), &alarms)?;
                    Ok(Resume::EndTurn)
                })
                .on_failure(|_, ctx, reason| Ok(alarm_dialog_failed(ctx, &reason))),
            )?
            .add(
                Child::new(DELETE_ALARM, |_: &RootState| {
                    ParentTopic::new(DeleteAlarm, DeleteAlarmState::default())
                })
                .on_success(|_, ctx, deleted: Option<Alarm>| {
                    let Some(alarm) = deleted else {
                        ctx.reply("OK, I won't delete it.");
                        return Ok(Resume::EndTurn);
                    };
                    let mut alarms = load_alarms(ctx.ambient())?;
                    if let Some(index) = alarms.iter().position(|a| *a == alarm) {
                        alarms.remove(index);
                    }
                    store_alarms(ctx.ambient_mut(), &alarms)?;
                    ctx.reply(format!("Deleted alarm '{}'.", alarm.title));
                    Ok(Resume::EndTurn)
                })
                .on_failure(|_, ctx, reason| Ok(alarm_dialog_failed(ctx, &reason))),
            )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut RootState,
        ctx: &mut dyn TurnContext,
    ) -> Result<Decision<()>, TopicError> {
        let command = if std::mem::take(&mut state.answer_taken) {
            String::new()
        } else {
            ctx.input().trim().to_lowercase()
        };
        match command.as_str() {
            "add alarm" => return Ok(Decision::activate(ADD_ALARM)),
            "delete alarm" => return Ok(Decision::activate(DELETE_ALARM)),
            "show alarms" => {
                let alarms = load_alarms(ctx.ambient())?;
                show_alarms(ctx, &alarms);
                return Ok(Decision::Wait);
            }
            "help" => {
                ctx.reply("Say 'Add Alarm', 'Delete Alarm' or 'Show Alarms'.");
                return Ok(Decision::Wait);
            }
            _ => {}
        }

        let (Some(name), Some(age)) = (&state.name, state.age) else {
            let next = if state.name.is_none() { NAME } else { AGE };
            return Ok(Decision::activate(next));
        };
        ctx.reply(format!("Hello {name}! You are {age} years old."));
        Ok(Decision::Wait)
    }
}
