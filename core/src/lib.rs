//! # Reflow Core
//!
//! Core traits and types for the Reflow unidirectional data flow
//! architecture.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature, owned exclusively by a store
//! - **Action**: All possible inputs to a reducer (user intents and effect
//!   outcomes)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Scheduler**: Capability for running work now or after a duration,
//!   with a live and a virtual-time implementation
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//! - Deterministic tests through virtual time
//!
//! ## Example
//!
//! ```ignore
//! use reflow_core::{Effect, Reducer, SmallVec, smallvec};
//!
//! impl Reducer for SearchReducer {
//!     type State = SearchState;
//!     type Action = SearchAction;
//!     type Environment = SearchEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut SearchState,
//!         action: SearchAction,
//!         env: &SearchEnvironment,
//!     ) -> SmallVec<[Effect<SearchAction>; 4]> {
//!         match action {
//!             SearchAction::QueryChanged(query) => {
//!                 state.query = query;
//!                 smallvec![Effect::None]
//!             }
//!             // ...
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};

pub use effect::{Effect, EffectId};
pub use reducer::Reducer;
pub use scheduler::{Scheduler, Work};

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// Actions are closed enums and reducers match on them exhaustively, so
    /// an unhandled variant is a compile error rather than a runtime
    /// surprise.
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for CounterReducer {
    ///     type State = CounterState;
    ///     type Action = CounterAction;
    ///     type Environment = CounterEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut CounterState,
    ///         action: CounterAction,
    ///         env: &CounterEnvironment,
    ///     ) -> SmallVec<[Effect<CounterAction>; 4]> {
    ///         match action {
    ///             CounterAction::Increment => {
    ///                 state.count += 1;
    ///                 smallvec![Effect::None]
    ///             }
    ///             // ...
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place
        /// 3. Returns effect descriptions to be executed
        ///
        /// # Arguments
        ///
        /// - `state`: Mutable reference to current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The effects to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects describe side effects to be performed by the runtime.
/// They are values (not execution), created by reducers and executed by the
/// Store through a [`Scheduler`](crate::scheduler::Scheduler).
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Identity correlating a scheduled effect with a later cancellation
    ///
    /// Tokens are explicit values passed at effect-creation time and matched
    /// at cancellation time. Two effects scheduled under the same token are
    /// both removed by a single [`Effect::Cancel`].
    ///
    /// # Example
    ///
    /// ```
    /// use reflow_core::effect::EffectId;
    ///
    /// const SEARCH_DEBOUNCE: EffectId = EffectId::new("search/debounce");
    /// assert_eq!(SEARCH_DEBOUNCE, EffectId::new("search/debounce"));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EffectId(&'static str);

    impl EffectId {
        /// Create a token from a static name
        ///
        /// Names are conventionally namespaced by feature, e.g.
        /// `"number-facts/timer"`.
        #[must_use]
        pub const fn new(name: &'static str) -> Self {
            Self(name)
        }

        /// The token's name
        #[must_use]
        pub const fn name(self) -> &'static str {
            self.0
        }
    }

    impl std::fmt::Display for EffectId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.0)
        }
    }

    /// Effect type - describes a side effect to be executed
    ///
    /// Effects are NOT executed immediately. They are descriptions of what
    /// should happen, returned from reducers and executed by the Store
    /// runtime.
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    ///
    /// # Cancellation
    ///
    /// `Delay` and `Every` carry an [`EffectId`]; a later `Cancel` with the
    /// same token removes all of the token's not-yet-fired work. Work that
    /// has not fired when the cancel is processed never produces an action.
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the store on the next scheduling turn
        ///
        /// Actions emitted by one dispatch are delivered in the order the
        /// effects were issued.
        Emit(Box<Action>),

        /// Deliver an action once `duration` has elapsed
        ///
        /// Registered with the store's scheduler at `now + duration`. When
        /// `id` is present the pending delivery can be removed by a
        /// matching [`Effect::Cancel`] before it fires.
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to deliver after the delay
            action: Box<Action>,
            /// Cancellation token, if the delay should be cancellable
            id: Option<EffectId>,
        },

        /// Deliver a clone of an action every `interval` until cancelled
        ///
        /// The first tick fires one `interval` after the effect is executed.
        /// The tick stream always carries a token; it only stops through a
        /// matching [`Effect::Cancel`].
        Every {
            /// Time between ticks
            interval: Duration,
            /// Action delivered on each tick
            action: Box<Action>,
            /// Cancellation token
            id: EffectId,
        },

        /// Arbitrary async computation producing exactly one action
        ///
        /// Fallible operations map their `Result` into the action inside
        /// the future, so every invocation yields exactly one action -
        /// never zero, never more than one.
        Future(Pin<Box<dyn Future<Output = Action> + Send>>),

        /// Remove a token's pending work from the scheduler
        Cancel(EffectId),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Emit(action) => f.debug_tuple("Effect::Emit").field(action).finish(),
                Effect::Delay {
                    duration,
                    action,
                    id,
                } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .field("id", id)
                    .finish(),
                Effect::Every {
                    interval,
                    action,
                    id,
                } => f
                    .debug_struct("Effect::Every")
                    .field("interval", interval)
                    .field("action", action)
                    .field("id", id)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
                Effect::Cancel(id) => f.debug_tuple("Effect::Cancel").field(id).finish(),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Feed `action` back into the store on the next scheduling turn
        #[must_use]
        pub fn emit(action: Action) -> Effect<Action> {
            Effect::Emit(Box::new(action))
        }

        /// Deliver `action` once `duration` has elapsed (not cancellable)
        #[must_use]
        pub fn delay(duration: Duration, action: Action) -> Effect<Action> {
            Effect::Delay {
                duration,
                action: Box::new(action),
                id: None,
            }
        }

        /// Deliver `action` once `duration` has elapsed, cancellable via `id`
        #[must_use]
        pub fn delay_cancellable(
            duration: Duration,
            action: Action,
            id: EffectId,
        ) -> Effect<Action> {
            Effect::Delay {
                duration,
                action: Box::new(action),
                id: Some(id),
            }
        }

        /// Deliver a clone of `action` every `interval` until `id` is cancelled
        #[must_use]
        pub fn every(interval: Duration, action: Action, id: EffectId) -> Effect<Action> {
            Effect::Every {
                interval,
                action: Box::new(action),
                id,
            }
        }

        /// Run an async computation and feed its one resulting action back
        #[must_use]
        pub fn future<F>(future: F) -> Effect<Action>
        where
            F: Future<Output = Action> + Send + 'static,
        {
            Effect::Future(Box::pin(future))
        }

        /// Remove the token's pending work from the scheduler
        #[must_use]
        pub const fn cancel(id: EffectId) -> Effect<Action> {
            Effect::Cancel(id)
        }
    }
}

/// Scheduler module - the "run work now / after a duration" capability
///
/// The store never sleeps on its own; all deferred and repeating work goes
/// through a [`Scheduler`]. Swapping the implementation swaps the notion of
/// time: the runtime crate provides a wall-clock scheduler, the testing
/// crate a virtual-time scheduler whose clock only moves when a test
/// advances it.
pub mod scheduler {
    use super::effect::EffectId;
    use std::time::Duration;

    /// Unit of work handed to a scheduler
    ///
    /// Work is a plain closure; anything it needs (a store handle, an
    /// action to deliver) is captured at creation time.
    pub type Work = Box<dyn FnOnce() + Send + 'static>;

    /// Capability for running work now or after a duration
    ///
    /// The pending-work registry is exclusively owned by the scheduler;
    /// callers only insert work and remove it by token.
    ///
    /// # Implementations
    ///
    /// - `LiveScheduler` (runtime crate): real elapsed time via tokio
    ///   timers; firings may interleave across tasks.
    /// - `TestScheduler` (testing crate): a virtual clock that only moves
    ///   when a test calls `advance`, executing due work in deadline order
    ///   with ties broken by insertion order.
    pub trait Scheduler: Send + Sync + 'static {
        /// Run work on the next scheduling turn
        fn schedule_now(&self, work: Work);

        /// Run work once `delay` has elapsed
        ///
        /// When `token` is present, a later [`cancel`](Scheduler::cancel)
        /// with the same token drops the work before it fires.
        fn schedule_after(&self, delay: Duration, token: Option<EffectId>, work: Work);

        /// Drop all pending work registered under `token`
        ///
        /// Work that already fired is unaffected; work that has not fired
        /// never runs. Cancelling a token with no pending work is a no-op.
        fn cancel(&self, token: EffectId);
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected via
/// the Environment parameter, so tests can substitute deterministic fakes.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Production - uses system clock
    /// struct SystemClock;
    /// impl Clock for SystemClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         Utc::now()
    ///     }
    /// }
    ///
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }
}

#[cfg(test)]
#[allow(clippy::panic)] // Test code can panic
mod tests {
    use super::effect::{Effect, EffectId};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Tick,
        Done(i32),
    }

    #[test]
    fn test_effect_id_equality() {
        const TIMER: EffectId = EffectId::new("test/timer");
        assert_eq!(TIMER, EffectId::new("test/timer"));
        assert_ne!(TIMER, EffectId::new("test/debounce"));
        assert_eq!(TIMER.name(), "test/timer");
        assert_eq!(TIMER.to_string(), "test/timer");
    }

    #[test]
    fn test_effect_debug_formatting() {
        let emit = Effect::emit(TestAction::Tick);
        assert_eq!(format!("{emit:?}"), "Effect::Emit(Tick)");

        let cancel: Effect<TestAction> = Effect::cancel(EffectId::new("test/timer"));
        assert!(format!("{cancel:?}").contains("test/timer"));

        let fut = Effect::future(async { TestAction::Done(1) });
        assert_eq!(format!("{fut:?}"), "Effect::Future(<future>)");
    }

    #[test]
    fn test_delay_constructors() {
        let plain = Effect::delay(Duration::from_secs(1), TestAction::Tick);
        match plain {
            Effect::Delay { duration, id, .. } => {
                assert_eq!(duration, Duration::from_secs(1));
                assert!(id.is_none());
            },
            other => panic!("expected Delay, got {other:?}"),
        }

        let cancellable = Effect::delay_cancellable(
            Duration::from_secs(1),
            TestAction::Tick,
            EffectId::new("test/delay"),
        );
        match cancellable {
            Effect::Delay { id, .. } => assert_eq!(id, Some(EffectId::new("test/delay"))),
            other => panic!("expected Delay, got {other:?}"),
        }
    }

    #[test]
    fn test_future_produces_exactly_one_action() {
        let effect = Effect::future(async { TestAction::Done(42) });
        let Effect::Future(fut) = effect else {
            panic!("expected Future effect");
        };
        let action = tokio_test::block_on(fut);
        assert_eq!(action, TestAction::Done(42));
    }
}
