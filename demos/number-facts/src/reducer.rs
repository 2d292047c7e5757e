//! Reducer for the number-facts feature
//!
//! Implements the business logic: counting, the delayed rebound of a
//! below-zero decrement, the fallible fact fetch, and the repeating timer.
//! All timing and I/O are expressed as effects; the reducer itself is pure.

use crate::environment::NumberFactsEnvironment;
use crate::types::{NumberFactsAction, NumberFactsState};
use reflow_core::effect::{Effect, EffectId};
use reflow_core::environment::Clock;
use reflow_core::reducer::Reducer;
use reflow_core::{SmallVec, smallvec};
use std::marker::PhantomData;
use std::time::Duration;

/// Token for the delayed rebound scheduled by a below-zero decrement
pub const DECREMENT_REBOUND: EffectId = EffectId::new("number-facts/decrement-rebound");

/// Token for the repeating timer
pub const TIMER_TICK: EffectId = EffectId::new("number-facts/timer");

/// How long a below-zero count stands before rebounding
const REBOUND_DELAY: Duration = Duration::from_secs(1);

/// Timer cadence
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Number-facts reducer
///
/// Generic over the Clock type C to work with any clock implementation.
#[derive(Debug, Clone, Copy)]
pub struct NumberFactsReducer<C> {
    _phantom: PhantomData<C>,
}

impl<C> NumberFactsReducer<C> {
    /// Create a new number-facts reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<C> Default for NumberFactsReducer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Reducer for NumberFactsReducer<C> {
    type State = NumberFactsState;
    type Action = NumberFactsAction;
    type Environment = NumberFactsEnvironment<C>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        environment: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            NumberFactsAction::IncrementTapped => {
                state.count += 1;
                // A pending rebound no longer applies once the count has
                // been raised again.
                smallvec![Effect::cancel(DECREMENT_REBOUND)]
            },
            NumberFactsAction::DecrementTapped => {
                state.count -= 1;
                if state.count < 0 {
                    smallvec![Effect::delay_cancellable(
                        REBOUND_DELAY,
                        NumberFactsAction::DecrementRebound,
                        DECREMENT_REBOUND,
                    )]
                } else {
                    smallvec![Effect::None]
                }
            },
            NumberFactsAction::DecrementRebound => {
                state.count += 1;
                smallvec![Effect::None]
            },
            NumberFactsAction::FactButtonTapped => {
                state.is_fact_request_in_flight = true;
                let request = environment.fact.fetch(state.count);
                smallvec![Effect::future(async move {
                    NumberFactsAction::FactResponse(request.await)
                })]
            },
            NumberFactsAction::FactResponse(Ok(fact)) => {
                state.is_fact_request_in_flight = false;
                state.fact = Some(fact);
                smallvec![Effect::None]
            },
            NumberFactsAction::FactResponse(Err(_)) => {
                state.is_fact_request_in_flight = false;
                smallvec![Effect::None]
            },
            NumberFactsAction::StartTimerTapped => {
                if state.is_timer_running {
                    // Already ticking under TIMER_TICK; a second stream
                    // would double-count.
                    return smallvec![Effect::None];
                }
                state.is_timer_running = true;
                smallvec![Effect::every(
                    TICK_INTERVAL,
                    NumberFactsAction::TimerTick,
                    TIMER_TICK,
                )]
            },
            NumberFactsAction::StopTimerTapped => {
                state.is_timer_running = false;
                smallvec![Effect::cancel(TIMER_TICK)]
            },
            NumberFactsAction::TimerTick => {
                state.count += 1;
                smallvec![Effect::None]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::mocks::CannedFactClient;
    use reflow_testing::reducer_test::assertions;
    use reflow_testing::{FixedClock, ReducerTest, test_clock};
    use std::sync::Arc;

    fn test_environment() -> NumberFactsEnvironment<FixedClock> {
        NumberFactsEnvironment::new(
            test_clock(),
            Arc::new(CannedFactClient::new("is a good number Brent")),
        )
    }

    #[test]
    fn test_increment_cancels_pending_rebound() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState::default())
            .when_action(NumberFactsAction::IncrementTapped)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_effects(|effects| {
                assertions::assert_cancels(effects, DECREMENT_REBOUND);
            })
            .run();
    }

    #[test]
    fn test_decrement_above_zero_schedules_nothing() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState {
                count: 3,
                ..NumberFactsState::default()
            })
            .when_action(NumberFactsAction::DecrementTapped)
            .then_state(|state| {
                assert_eq!(state.count, 2);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_decrement_below_zero_schedules_rebound() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState::default())
            .when_action(NumberFactsAction::DecrementTapped)
            .then_state(|state| {
                assert_eq!(state.count, -1);
            })
            .then_effects(|effects| {
                assertions::assert_schedules_delay(
                    effects,
                    Duration::from_secs(1),
                    Some(DECREMENT_REBOUND),
                );
            })
            .run();
    }

    #[test]
    fn test_fact_button_marks_in_flight_and_fetches() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState {
                count: 1,
                ..NumberFactsState::default()
            })
            .when_action(NumberFactsAction::FactButtonTapped)
            .then_state(|state| {
                assert!(state.is_fact_request_in_flight);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_fact_failure_leaves_fact_unchanged() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState {
                is_fact_request_in_flight: true,
                fact: Some("0 is a good number Brent".to_string()),
                ..NumberFactsState::default()
            })
            .when_action(NumberFactsAction::FactResponse(Err(crate::types::FactError::new(
                "unavailable",
            ))))
            .then_state(|state| {
                assert!(!state.is_fact_request_in_flight);
                assert_eq!(state.fact.as_deref(), Some("0 is a good number Brent"));
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_start_timer_schedules_ticks() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState::default())
            .when_action(NumberFactsAction::StartTimerTapped)
            .then_state(|state| {
                assert!(state.is_timer_running);
            })
            .then_effects(|effects| {
                assertions::assert_schedules_every(effects, Duration::from_secs(1), TIMER_TICK);
            })
            .run();
    }

    #[test]
    fn test_start_timer_when_running_is_noop() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState {
                is_timer_running: true,
                ..NumberFactsState::default()
            })
            .when_action(NumberFactsAction::StartTimerTapped)
            .then_state(|state| {
                assert!(state.is_timer_running);
            })
            .then_effects(|effects| {
                assertions::assert_no_effects(effects);
            })
            .run();
    }

    #[test]
    fn test_stop_timer_cancels_ticks() {
        ReducerTest::new(NumberFactsReducer::new())
            .with_env(test_environment())
            .given_state(NumberFactsState {
                is_timer_running: true,
                ..NumberFactsState::default()
            })
            .when_action(NumberFactsAction::StopTimerTapped)
            .then_state(|state| {
                assert!(!state.is_timer_running);
            })
            .then_effects(|effects| {
                assertions::assert_cancels(effects, TIMER_TICK);
            })
            .run();
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn pure_action() -> impl Strategy<Value = NumberFactsAction> {
            prop_oneof![
                Just(NumberFactsAction::IncrementTapped),
                Just(NumberFactsAction::DecrementTapped),
                Just(NumberFactsAction::DecrementRebound),
                Just(NumberFactsAction::StartTimerTapped),
                Just(NumberFactsAction::StopTimerTapped),
                Just(NumberFactsAction::TimerTick),
                Just(NumberFactsAction::FactResponse(Ok(
                    "7 is a good number Brent".to_string()
                ))),
            ]
        }

        proptest! {
            /// Replaying the same action sequence from the same initial
            /// state yields the same final state.
            #[test]
            fn replay_is_deterministic(
                actions in prop::collection::vec(pure_action(), 0..64),
            ) {
                let reducer = NumberFactsReducer::new();
                let environment = test_environment();

                let mut first = NumberFactsState::default();
                for action in &actions {
                    let _ = reducer.reduce(&mut first, action.clone(), &environment);
                }

                let mut second = NumberFactsState::default();
                for action in &actions {
                    let _ = reducer.reduce(&mut second, action.clone(), &environment);
                }

                prop_assert_eq!(first, second);
            }
        }
    }
}
