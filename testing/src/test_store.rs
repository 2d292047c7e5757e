//! Store assertion harness with send/receive semantics
//!
//! A [`TestStore`] wraps a store whose effect feedback is intercepted: every
//! action produced by an effect lands in a queue instead of re-entering the
//! reducer on its own. The test sends actions, asserts the exact state
//! mutation of each step, advances virtual time, and receives every
//! effect-produced action explicitly. Anything left unclaimed at teardown
//! fails the test.

use crate::test_scheduler::TestScheduler;
use reflow_core::reducer::Reducer;
use reflow_runtime::{ActionQueue, Store};
use std::fmt::Debug;
use std::time::Duration;

/// Assertion harness over a store with intercepted effect feedback
///
/// Each `send`/`receive` step takes a closure that mutates an expected-state
/// copy; the harness asserts the store's actual state equals it after the
/// dispatch, failing with a line-level diff when it does not.
///
/// # Harness lifecycle
///
/// Idle → (`send` issuing effects) → awaiting effects → (`advance` +
/// `receive` until everything settled, or `send` a cancelling action) →
/// Idle. Teardown must happen in the Idle state: on drop the harness fails
/// the test if effect actions were produced but never received, if
/// scheduler entries are still pending, or if async effects are still in
/// flight.
///
/// # Example
///
/// ```ignore
/// let mut store = TestStore::new(state, reducer, environment);
///
/// store.send(Action::StartTimerTapped, |state| {
///     state.is_timer_running = true;
/// }).await;
///
/// store.advance(Duration::from_secs(1));
/// store.receive(Action::TimerTick, |state| {
///     state.count = 1;
/// }).await;
///
/// store.send(Action::StopTimerTapped, |state| {
///     state.is_timer_running = false;
/// }).await;
/// ```
pub struct TestStore<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    store: Store<S, A, E, R>,
    queue: ActionQueue<A>,
    scheduler: TestScheduler,
    expected_state: S,
    receive_timeout: Duration,
}

#[allow(clippy::panic)] // Test assertions report through panics
impl<S, A, E, R> TestStore<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
    S: Clone + Debug + PartialEq + Send + Sync + 'static,
    A: Clone + Debug + PartialEq + Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a harness around a fresh store
    ///
    /// The store runs with a [`TestScheduler`] at virtual time zero and an
    /// interception queue for effect-produced actions.
    #[must_use]
    pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
        let scheduler = TestScheduler::new();
        let queue = ActionQueue::new();
        let store = Store::with_feedback_queue(
            initial_state.clone(),
            reducer,
            environment,
            scheduler.clone(),
            queue.clone(),
        );

        Self {
            store,
            queue,
            scheduler,
            expected_state: initial_state,
            receive_timeout: Duration::from_secs(1),
        }
    }

    /// Override the bounded wait used by [`receive`](Self::receive)
    ///
    /// The default is one second - enough for an async effect to complete,
    /// short enough that a missing action fails fast.
    #[must_use]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// The harness's virtual-time scheduler
    #[must_use]
    pub fn scheduler(&self) -> &TestScheduler {
        &self.scheduler
    }

    /// Advance virtual time, firing all scheduled work that comes due
    pub fn advance(&self, by: Duration) {
        self.scheduler.advance(by);
    }

    /// Read current state via a closure
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        self.store.state(f).await
    }

    /// Dispatch an action and assert the resulting state
    ///
    /// `update` mutates the expected-state copy to what the reducer should
    /// have produced; the actual state must equal it afterwards.
    ///
    /// # Panics
    ///
    /// Panics (failing the test) if the dispatch is rejected or if the
    /// store's state differs from the expected state.
    pub async fn send(&mut self, action: A, update: impl FnOnce(&mut S)) {
        let description = format!("{action:?}");
        if let Err(error) = self.store.send(action).await {
            panic!("send({description}) was rejected: {error}");
        }

        update(&mut self.expected_state);
        self.assert_state(&format!("send({description})")).await;
    }

    /// Claim the next effect-produced action and assert the resulting state
    ///
    /// Waits up to the receive timeout for an action to arrive in the
    /// interception queue. The arrived action must equal `expected`; it is
    /// then fed through the reducer, and the state is asserted exactly as
    /// in [`send`](Self::send).
    ///
    /// # Panics
    ///
    /// Panics (failing the test) with distinct messages when no action
    /// arrives within the timeout, when a different action arrives, or when
    /// the resulting state differs from the expected state.
    pub async fn receive(&mut self, expected: A, update: impl FnOnce(&mut S)) {
        let Some(action) = self.queue.next(self.receive_timeout).await else {
            panic!(
                "expected to receive {:?}, but no action arrived within {:?}",
                expected, self.receive_timeout
            );
        };

        assert!(
            action == expected,
            "received unexpected action:\n  expected: {expected:?}\n  received: {action:?}",
        );

        let description = format!("{action:?}");
        if let Err(error) = self.store.send(action).await {
            panic!("receive({description}) dispatch was rejected: {error}");
        }

        update(&mut self.expected_state);
        self.assert_state(&format!("receive({description})")).await;
    }

    /// Assert the store's actual state equals the expected-state copy
    async fn assert_state(&self, operation: &str) {
        let actual = self.store.state(Clone::clone).await;
        assert!(
            actual == self.expected_state,
            "state mismatch after {operation}:\n{}",
            state_diff(&self.expected_state, &actual),
        );
    }
}

impl<S, A, E, R> Drop for TestStore<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Teardown leak check
    ///
    /// Every effect that could still produce an action must have been
    /// received or cancelled by the end of the test. Skipped when the
    /// thread is already panicking so a failed assertion is not masked by
    /// a second panic.
    #[allow(clippy::panic)] // Test assertions report through panics
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }

        let unreceived = self.queue.len();
        assert!(
            unreceived == 0,
            "test ended with {unreceived} unreceived effect action(s); \
             receive them before the store goes out of scope"
        );

        let pending = self.scheduler.pending();
        if pending > 0 {
            let tokens = self
                .scheduler
                .pending_tokens()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            panic!(
                "test ended with {pending} scheduled effect(s) still pending \
                 (tokens: [{tokens}]); advance and receive them, or cancel their tokens"
            );
        }

        let in_flight = self.store.in_flight_effects();
        assert!(
            in_flight == 0,
            "test ended with {in_flight} async effect(s) still in flight; \
             receive their actions before the store goes out of scope"
        );
    }
}

/// Line-level diff of two pretty-printed `Debug` representations
///
/// Pretty debug output puts one field per line, so differing lines name the
/// differing fields.
fn state_diff<S: Debug>(expected: &S, actual: &S) -> String {
    let expected = format!("{expected:#?}");
    let actual = format!("{actual:#?}");

    let mut out = String::from("  (-) expected / (+) actual\n");
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();

    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => break,
            (Some(e), Some(a)) if e == a => {
                out.push_str("      ");
                out.push_str(e);
                out.push('\n');
            },
            (e, a) => {
                if let Some(e) = e {
                    out.push_str("    - ");
                    out.push_str(e);
                    out.push('\n');
                }
                if let Some(a) = a {
                    out.push_str("    + ");
                    out.push_str(a);
                    out.push('\n');
                }
            },
        }
    }

    out
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code can panic
mod tests {
    use super::*;
    use reflow_core::effect::{Effect, EffectId};
    use reflow_core::{SmallVec, smallvec};

    const PING_TOKEN: EffectId = EffectId::new("test-store/ping");

    #[derive(Debug, Clone, PartialEq, Default)]
    struct PingState {
        pings: u32,
        waiting: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum PingAction {
        Request,
        Response,
        CancelRequest,
    }

    #[derive(Debug, Clone)]
    struct PingEnv;

    #[derive(Debug, Clone)]
    struct PingReducer;

    impl Reducer for PingReducer {
        type State = PingState;
        type Action = PingAction;
        type Environment = PingEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                PingAction::Request => {
                    state.waiting = true;
                    smallvec![Effect::delay_cancellable(
                        Duration::from_secs(1),
                        PingAction::Response,
                        PING_TOKEN,
                    )]
                },
                PingAction::Response => {
                    state.waiting = false;
                    state.pings += 1;
                    smallvec![Effect::None]
                },
                PingAction::CancelRequest => {
                    state.waiting = false;
                    smallvec![Effect::cancel(PING_TOKEN)]
                },
            }
        }
    }

    fn ping_store() -> TestStore<PingState, PingAction, PingEnv, PingReducer> {
        TestStore::new(PingState::default(), PingReducer, PingEnv)
    }

    #[tokio::test]
    async fn test_send_asserts_state_mutation() {
        let mut store = ping_store();

        store
            .send(PingAction::Request, |state| {
                state.waiting = true;
            })
            .await;

        store.advance(Duration::from_secs(1));
        store
            .receive(PingAction::Response, |state| {
                state.waiting = false;
                state.pings = 1;
            })
            .await;
    }

    #[tokio::test]
    async fn test_cancelled_request_leaves_store_idle() {
        let mut store = ping_store();

        store
            .send(PingAction::Request, |state| {
                state.waiting = true;
            })
            .await;
        store
            .send(PingAction::CancelRequest, |state| {
                state.waiting = false;
            })
            .await;

        // The cancelled delay never fires, even across a generous window.
        store.advance(Duration::from_secs(60));
        assert_eq!(store.scheduler().pending(), 0);
    }

    #[tokio::test]
    #[should_panic(expected = "state mismatch after send")]
    async fn test_send_with_wrong_expectation_fails() {
        let mut store = ping_store();

        store
            .send(PingAction::Request, |state| {
                // Wrong on purpose: the reducer sets `waiting`, not `pings`.
                state.pings = 99;
            })
            .await;
    }

    #[tokio::test]
    #[should_panic(expected = "no action arrived")]
    async fn test_receive_without_pending_action_times_out() {
        let mut store = ping_store().with_receive_timeout(Duration::from_millis(50));

        store
            .receive(PingAction::Response, |state| {
                state.pings = 1;
            })
            .await;
    }

    #[tokio::test]
    #[should_panic(expected = "unreceived effect action")]
    async fn test_unreceived_action_fails_teardown() {
        let mut store = ping_store();

        store
            .send(PingAction::Request, |state| {
                state.waiting = true;
            })
            .await;

        // Fire the delayed response but never receive it.
        store.advance(Duration::from_secs(1));
    }

    #[tokio::test]
    #[should_panic(expected = "scheduled effect(s) still pending")]
    async fn test_pending_scheduler_entry_fails_teardown() {
        let mut store = ping_store();

        store
            .send(PingAction::Request, |state| {
                state.waiting = true;
            })
            .await;

        // Dropped while the delayed response is still scheduled.
    }

    #[test]
    fn test_state_diff_names_differing_fields() {
        let expected = PingState {
            pings: 1,
            waiting: false,
        };
        let actual = PingState {
            pings: 2,
            waiting: false,
        };

        let diff = state_diff(&expected, &actual);
        assert!(diff.contains("- "));
        assert!(diff.contains("pings: 1"));
        assert!(diff.contains("pings: 2"));
        assert!(diff.contains("waiting: false"));
    }
}
