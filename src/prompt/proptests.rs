//! Property-based tests for the prompt retry engine
//!
//! These tests verify the retry budget and continuation invariants hold
//! across arbitrary answer sequences.

use super::*;
use crate::topic::Turn;
use crate::validator::ConfirmValidator;
use proptest::prelude::*;
use std::cell::Cell;
use std::rc::Rc;

// ============================================================================
// Test Helpers
// ============================================================================

#[derive(Default)]
struct Counters {
    successes: Cell<u32>,
    failures: Cell<u32>,
}

fn counted_prompt(max_turns: Option<u32>, counters: &Rc<Counters>) -> Prompt<bool> {
    let on_success = Rc::clone(counters);
    let on_failure = Rc::clone(counters);
    Prompt::new(PromptConfig {
        max_turns,
        on_success: Some(Box::new(move |_: &mut dyn TurnContext, _: &bool| {
            on_success.successes.set(on_success.successes.get() + 1);
        })),
        on_failure: Some(Box::new(
            move |_: &mut dyn TurnContext, _: &FailureReason| {
                on_failure.failures.set(on_failure.failures.get() + 1);
            },
        )),
        ..PromptConfig::new(
            Renderer::new(|ctx, last| {
                ctx.reply(format!("ask (last: {last:?})"));
            }),
            ConfirmValidator,
        )
    })
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_answer() -> impl Strategy<Value = String> {
    prop_oneof![
        1 => Just("yes".to_string()),
        1 => Just("no".to_string()),
        6 => "[a-z ]{0,8}",
    ]
}

fn arb_answers() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_answer(), 0..12)
}

proptest! {
    /// A prompt limited to N turns validates at most N answers, and its
    /// turn count at termination is either the successful attempt's index
    /// or exactly N.
    #[test]
    fn prop_budget_bounds_validations(max in 1u32..6, answers in arb_answers()) {
        let counters = Rc::new(Counters::default());
        let mut prompt = counted_prompt(Some(max), &counters);
        prompt.on_receive_turn(&mut Turn::new("start")).unwrap();

        let mut validations = 0u32;
        let mut last_outcome = TurnOutcome::Continue;
        for answer in &answers {
            if prompt.status().is_terminal() {
                break;
            }
            validations += 1;
            last_outcome = prompt.on_receive_turn(&mut Turn::new(answer.as_str())).unwrap();
        }

        prop_assert!(validations <= max);
        match last_outcome {
            TurnOutcome::Failed(reason) => {
                prop_assert!(reason.is_too_many_attempts());
                prop_assert_eq!(prompt.state().turn_count, Some(max));
                prop_assert_eq!(validations, max);
            }
            TurnOutcome::Succeeded(_) => {
                prop_assert_eq!(prompt.state().turn_count, Some(validations - 1));
            }
            TurnOutcome::Continue => {
                prop_assert!(!prompt.status().is_terminal());
                prop_assert!(prompt.state().turn_count.unwrap_or(0) < max);
            }
        }
    }

    /// Continuations fire at most once, never both, and a terminal prompt
    /// refuses every later turn.
    #[test]
    fn prop_continuations_fire_once(max in proptest::option::of(1u32..6), answers in arb_answers()) {
        let counters = Rc::new(Counters::default());
        let mut prompt = counted_prompt(max, &counters);
        prompt.on_receive_turn(&mut Turn::new("start")).unwrap();

        for answer in &answers {
            let _ = prompt.on_receive_turn(&mut Turn::new(answer.as_str()));
        }

        let fired = counters.successes.get() + counters.failures.get();
        prop_assert!(fired <= 1);
        prop_assert_eq!(fired == 1, prompt.status().is_terminal());

        if prompt.status().is_terminal() {
            let again = prompt.on_receive_turn(&mut Turn::new("yes"));
            let is_completed_error = matches!(again, Err(TopicError::AlreadyCompleted { .. }));
            prop_assert!(is_completed_error);
            prop_assert_eq!(counters.successes.get() + counters.failures.get(), 1);
        }
    }

    /// The turn count never goes down
    #[test]
    fn prop_turn_count_monotonic(max in proptest::option::of(1u32..8), answers in arb_answers()) {
        let counters = Rc::new(Counters::default());
        let mut prompt = counted_prompt(max, &counters);
        prompt.on_receive_turn(&mut Turn::new("start")).unwrap();

        let mut previous = prompt.state().turn_count;
        for answer in &answers {
            if prompt.on_receive_turn(&mut Turn::new(answer.as_str())).is_err() {
                break;
            }
            let current = prompt.state().turn_count;
            prop_assert!(current >= previous);
            previous = current;
        }
    }

    /// Rebuilding the prompt from its snapshot every turn behaves exactly
    /// like keeping one instance alive.
    #[test]
    fn prop_snapshot_each_turn_matches_live_prompt(max in proptest::option::of(1u32..5), answers in arb_answers()) {
        let live_counters = Rc::new(Counters::default());
        let mut live = counted_prompt(max, &live_counters);

        let rebuilt_counters = Rc::new(Counters::default());
        let mut snapshot: Option<serde_json::Value> = None;

        for input in std::iter::once("start").chain(answers.iter().map(String::as_str)) {
            let mut live_turn = Turn::new(input);
            let live_result = live.on_receive_turn(&mut live_turn);

            let mut rebuilt = counted_prompt(max, &rebuilt_counters);
            if let Some(saved) = snapshot.take() {
                rebuilt.restore(saved).unwrap();
            }
            let mut rebuilt_turn = Turn::new(input);
            let rebuilt_result = rebuilt.on_receive_turn(&mut rebuilt_turn);
            snapshot = Some(rebuilt.snapshot().unwrap());

            prop_assert_eq!(live_result.is_ok(), rebuilt_result.is_ok());
            if let (Ok(a), Ok(b)) = (live_result, rebuilt_result) {
                prop_assert_eq!(a, b);
            }
            prop_assert_eq!(live_turn.messages(), rebuilt_turn.messages());
            prop_assert_eq!(live.state(), rebuilt.state());
        }
    }
}
