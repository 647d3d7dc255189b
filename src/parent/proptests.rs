//! Property-based tests for parent delegation
//!
//! These tests drive a two-level topic tree with arbitrary input sequences
//! and check the active-pointer and child-state invariants after every turn.

use super::*;
use crate::prompt::{Prompt, PromptConfig, Renderer};
use crate::topic::Turn;
use crate::validator::{ConfirmValidator, IntValidator, TextValidator};
use proptest::prelude::*;

// ============================================================================
// Test Topics
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct SurveyState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    age: Option<i64>,
}

/// Inner parent: name then age, each with a small retry budget
struct Survey;

impl ParentLogic for Survey {
    type State = SurveyState;
    type Value = String;

    fn name(&self) -> &str {
        "survey"
    }

    fn children(&self) -> Result<ChildTopics<SurveyState>, TopicError> {
        let mut children = ChildTopics::new();
        children
            .add(
                Child::new("name", |_: &SurveyState| {
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(2),
                        ..PromptConfig::new(Renderer::lines(["name?"]), TextValidator)
                    }))
                })
                .on_success(|state, _, name| {
                    state.name = Some(name);
                    Ok(Resume::Redispatch)
                }),
            )?
            .add(
                Child::new("age", |_: &SurveyState| {
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(2),
                        ..PromptConfig::new(Renderer::lines(["age?"]), IntValidator::new())
                    }))
                })
                .on_success(|state, _, age| {
                    state.age = Some(age);
                    Ok(Resume::Redispatch)
                })
                .on_failure(|_, _, _| Ok(Resume::EndTurn)),
            )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut SurveyState,
        _ctx: &mut dyn TurnContext,
    ) -> Result<Decision<String>, TopicError> {
        Ok(match (&state.name, state.age) {
            (None, _) => Decision::activate("name"),
            (Some(_), None) => Decision::activate("age"),
            (Some(name), Some(age)) => Decision::Complete(format!("{name}/{age}")),
        })
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct OuterState {
    #[serde(default)]
    completed: Vec<String>,
    #[serde(default)]
    confirmations: u32,
}

/// Root: alternates between the survey and a yes/no prompt, forever
struct Outer;

impl ParentLogic for Outer {
    type State = OuterState;
    type Value = ();

    fn name(&self) -> &str {
        "outer"
    }

    fn children(&self) -> Result<ChildTopics<OuterState>, TopicError> {
        let mut children = ChildTopics::new();
        children
            .add(
                Child::new("survey", |_: &OuterState| {
                    ParentTopic::new(Survey, SurveyState::default())
                })
                .on_success(|state, _, summary| {
                    state.completed.push(summary);
                    Ok(Resume::Redispatch)
                })
                .on_failure(|_, _, _| Ok(Resume::EndTurn)),
            )?
            .add(
                Child::new("confirm", |_: &OuterState| {
                    Ok(Prompt::new(PromptConfig {
                        max_turns: Some(1),
                        ..PromptConfig::new(Renderer::lines(["sure?"]), ConfirmValidator)
                    }))
                })
                .on_success(|state, _, _| {
                    state.confirmations += 1;
                    Ok(Resume::EndTurn)
                })
                .on_failure(|_, _, _| Ok(Resume::EndTurn)),
            )?;
        Ok(children)
    }

    fn decide(
        &self,
        state: &mut OuterState,
        _ctx: &mut dyn TurnContext,
    ) -> Result<Decision<()>, TopicError> {
        let surveys = u32::try_from(state.completed.len()).unwrap_or(u32::MAX);
        if surveys > state.confirmations {
            Ok(Decision::activate("confirm"))
        } else {
            Ok(Decision::activate("survey"))
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Only the active child may have a snapshot, and the pointer always names a
/// registered child.
fn assert_parent_invariants<S>(
    state: &ParentTopicState<S>,
    registered: &[&str],
) -> Result<(), TestCaseError> {
    if let Some(active) = &state.active_topic_name {
        prop_assert!(registered.contains(&active.as_str()));
    }
    for key in state.child_states.keys() {
        prop_assert_eq!(Some(key), state.active_topic_name.as_ref());
    }
    Ok(())
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        2 => Just("yes".to_string()),
        1 => Just("no".to_string()),
        2 => (0i64..120).prop_map(|n| n.to_string()),
        2 => "[a-z]{1,6}",
        1 => Just(String::new()),
    ]
}

fn arb_inputs() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_input(), 1..25)
}

proptest! {
    /// Every turn leaves each parent with at most one child snapshot, owned
    /// by the active child.
    #[test]
    fn prop_only_active_child_has_state(inputs in arb_inputs()) {
        let mut root = ParentTopic::new(Outer, OuterState::default()).unwrap();

        for input in &inputs {
            let outcome = root.on_receive_turn(&mut Turn::new(input.as_str())).unwrap();
            prop_assert_eq!(outcome, TurnOutcome::Continue);

            assert_parent_invariants(root.state(), &["survey", "confirm"])?;

            if let Some(saved) = root.state().child_states.get("survey") {
                let survey: ParentTopicState<SurveyState> =
                    serde_json::from_value(saved.clone()).unwrap();
                assert_parent_invariants(&survey, &["name", "age"])?;
            }
        }
    }

    /// Rebuilding the whole tree from its snapshot every turn behaves exactly
    /// like keeping one tree alive.
    #[test]
    fn prop_snapshot_each_turn_matches_live_tree(inputs in arb_inputs()) {
        let mut live = ParentTopic::new(Outer, OuterState::default()).unwrap();
        let mut snapshot: Option<Value> = None;

        for input in &inputs {
            let mut live_turn = Turn::new(input.as_str());
            let live_outcome = live.on_receive_turn(&mut live_turn).unwrap();

            let mut rebuilt = ParentTopic::new(Outer, OuterState::default()).unwrap();
            if let Some(saved) = snapshot.take() {
                rebuilt.restore(saved).unwrap();
            }
            let mut rebuilt_turn = Turn::new(input.as_str());
            let rebuilt_outcome = rebuilt.on_receive_turn(&mut rebuilt_turn).unwrap();
            snapshot = Some(rebuilt.snapshot().unwrap());

            prop_assert_eq!(live_outcome, rebuilt_outcome);
            prop_assert_eq!(live_turn.messages(), rebuilt_turn.messages());
            prop_assert_eq!(live.state(), rebuilt.state());
        }
    }

    /// Handlers update parent state before the decision logic re-runs, so
    /// the root never starts a survey while one is still unconfirmed.
    #[test]
    fn prop_decisions_see_handler_updates(inputs in arb_inputs()) {
        let mut root = ParentTopic::new(Outer, OuterState::default()).unwrap();
        for input in &inputs {
            root.on_receive_turn(&mut Turn::new(input.as_str())).unwrap();
            let local = root.local();
            let surveys = u32::try_from(local.completed.len()).unwrap();
            prop_assert!(surveys <= local.confirmations + 1);
            prop_assert!(local.confirmations <= surveys);
        }
    }
}
