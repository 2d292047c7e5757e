//! # Reflow Runtime
//!
//! Runtime implementation for the Reflow architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **`LiveScheduler`**: Wall-clock scheduler backed by tokio timers
//! - **`ActionQueue`**: Interception point for effect-produced actions,
//!   used by test harnesses instead of the automatic feedback loop
//! - **`EffectHandle`**: Completion tracking for the async effects spawned
//!   by one dispatch
//!
//! ## Example
//!
//! ```ignore
//! use reflow_runtime::{LiveScheduler, Store};
//!
//! let store = Store::new(
//!     initial_state,
//!     my_reducer,
//!     environment,
//!     LiveScheduler::new(),
//! );
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//! ```

use reflow_core::reducer::Reducer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, RwLock, watch};

/// Wall-clock scheduler implementation
pub mod scheduler;

pub use scheduler::LiveScheduler;
pub use store::Store;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Domain failures never appear here: a failing external operation is
    /// mapped into a failure action by its effect and handled by the
    /// reducer like any other input.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown
        /// initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for terminal action
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        ///
        /// The action broadcast channel was closed, typically because the
        /// store is shutting down.
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Queue of effect-produced actions awaiting manual processing
///
/// In production the store feeds effect-produced actions straight back into
/// `send`. A store built with [`Store::with_feedback_queue`] pushes them
/// here instead, so a test harness can observe them one at a time and decide
/// when each re-enters the reducer.
///
/// Cloning the queue is cheap; clones share the same underlying buffer.
pub struct ActionQueue<A> {
    inner: Arc<ActionQueueInner<A>>,
}

struct ActionQueueInner<A> {
    queue: Mutex<VecDeque<A>>,
    notify: Notify,
}

impl<A> ActionQueue<A> {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ActionQueueInner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
            }),
        }
    }

    /// Append an action and wake one waiting consumer
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub(crate) fn push(&self, action: A) {
        self.inner.queue.lock().unwrap().push_back(action);
        self.inner.notify.notify_one();
    }

    /// Remove and return the oldest queued action, if any
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub fn pop(&self) -> Option<A> {
        self.inner.queue.lock().unwrap().pop_front()
    }

    /// Number of queued actions
    #[must_use]
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    pub fn len(&self) -> usize {
        self.inner.queue.lock().unwrap().len()
    }

    /// Whether the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wait up to `timeout` for the next action
    ///
    /// Returns `None` if nothing arrived within the timeout. Actions are
    /// returned in the order they were pushed.
    pub async fn next(&self, timeout: Duration) -> Option<A> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(action) = self.pop() {
                return Some(action);
            }
            let notified = self.inner.notify.notified();
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                // One final check: a push may have raced the deadline.
                return self.pop();
            }
        }
    }
}

impl<A> Clone for ActionQueue<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> Default for ActionQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for ActionQueue<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionQueue")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the async effects
/// spawned by that dispatch. Scheduler-deferred work (`Delay`, `Every`) is
/// not tracked here - it is owned by the scheduler, cancellable by token,
/// and driven deterministically by the virtual scheduler in tests.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All async effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle plus its internal tracking side
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    ///
    /// Useful for initialization in loops where you need a `last_handle`.
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Wait for all tracked effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            // Sender gone means every tracking guard has already run.
            if self.completion.changed().await.is_err() {
                break;
            }
        }
    }

    /// Wait for all tracked effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns `Err(())` if the timeout expires before all effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), ()> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ())
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            let _ = self.notifier.send(());
        }
    }
}

impl Clone for EffectTracking {
    fn clone(&self) -> Self {
        Self {
            counter: Arc::clone(&self.counter),
            notifier: self.notifier.clone(),
        }
    }
}

/// Internal: Destination for actions produced by effects
///
/// Controls where actions go when effects produce them:
/// - Auto: re-enter `send` automatically (production)
/// - Queued: push to an [`ActionQueue`] for manual processing (testing)
enum FeedbackDestination<A> {
    /// Auto-feedback to store (production mode)
    Auto,

    /// Queue for manual processing (test mode)
    Queued(ActionQueue<A>),
}

impl<A> Clone for FeedbackDestination<A> {
    fn clone(&self) -> Self {
        match self {
            Self::Auto => Self::Auto,
            Self::Queued(queue) => Self::Queued(queue.clone()),
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Ensures the effect counter is always decremented, even if the effect
/// panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Store module - The runtime for reducers
///
/// Coordinates reducer execution (single-writer) and effect handling
/// through the injected scheduler.
pub mod store {
    use super::{
        ActionQueue, Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration,
        EffectHandle, EffectTracking, FeedbackDestination, Ordering, Reducer, RwLock, StoreError,
    };
    use reflow_core::effect::{Effect, EffectId};
    use reflow_core::scheduler::Scheduler;
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; mutated only under the dispatch write lock)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution through the injected [`Scheduler`]
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Single-writer discipline
    ///
    /// All state mutation happens inside `send`, under the state write
    /// lock, so at most one reducer application executes at a time.
    /// Effects run elsewhere (spawned tasks, scheduler timers) and funnel
    /// their resulting actions back through `send` rather than touching
    /// state directly.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new(
    ///     NumberFactsState::default(),
    ///     NumberFactsReducer::new(),
    ///     environment,
    ///     LiveScheduler::new(),
    /// );
    ///
    /// store.send(NumberFactsAction::IncrementTapped).await?;
    /// ```
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        scheduler: Arc<dyn Scheduler>,
        feedback: FeedbackDestination<A>,
        /// Action broadcast channel for observing actions produced by
        /// effects. Enables request-response patterns and event streaming.
        action_broadcast: broadcast::Sender<A>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
        E: Send + Sync + 'static,
    {
        /// Create a new store with automatic effect feedback
        ///
        /// Actions produced by effects re-enter `send` on their own. This
        /// is the production configuration.
        ///
        /// # Arguments
        ///
        /// - `initial_state`: The starting state for the store
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        /// - `scheduler`: Executes deferred and repeating effects
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E, scheduler: impl Scheduler) -> Self {
            Self::with_feedback(
                initial_state,
                reducer,
                environment,
                Arc::new(scheduler),
                FeedbackDestination::Auto,
            )
        }

        /// Create a store whose effect-produced actions are intercepted
        ///
        /// Instead of re-entering `send` automatically, actions produced by
        /// effects are pushed onto `queue`. The caller decides when each
        /// one is fed back through the reducer. Test harnesses use this to
        /// assert on every effect-produced action before it mutates state.
        #[must_use]
        pub fn with_feedback_queue(
            initial_state: S,
            reducer: R,
            environment: E,
            scheduler: impl Scheduler,
            queue: ActionQueue<A>,
        ) -> Self {
            Self::with_feedback(
                initial_state,
                reducer,
                environment,
                Arc::new(scheduler),
                FeedbackDestination::Queued(queue),
            )
        }

        fn with_feedback(
            initial_state: S,
            reducer: R,
            environment: E,
            scheduler: Arc<dyn Scheduler>,
            feedback: FeedbackDestination<A>,
        ) -> Self {
            let (action_broadcast, _) = broadcast::channel(16);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                scheduler,
                feedback,
                action_broadcast,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Send an action to the store
        ///
        /// This is the primary way to interact with the store:
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Executes returned effects through the scheduler
        /// 4. Effects may produce more actions (feedback loop)
        ///
        /// # Returns
        ///
        /// An [`EffectHandle`] that can be used to wait for the async
        /// effects spawned by this dispatch.
        ///
        /// # Concurrency
        ///
        /// - The reducer executes while holding the state write lock, so
        ///   concurrent `send` calls serialize at the reducer
        /// - `send()` returns after starting effect execution, not
        ///   completion
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is
        /// shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError>
        where
            R: Clone,
            E: Clone,
        {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!("store.shutdown.rejected_actions").increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!("store.actions.total").increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!("store.reducer.duration_seconds")
                    .record(start.elapsed().as_secs_f64());

                effects
            };

            tracing::trace!("Reducer completed, executing {} effects", effects.len());
            for effect in effects {
                self.execute_effect_internal(effect, tracking.clone());
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching result action
        ///
        /// Designed for request-response patterns: subscribes to the action
        /// broadcast, sends the initial action, then waits for an action
        /// matching the predicate.
        ///
        /// Subscription happens before the send, so a fast effect cannot
        /// race past the observer.
        ///
        /// # Arguments
        ///
        /// - `action`: The initial action to send
        /// - `predicate`: Function to test if an action is the terminal result
        /// - `timeout`: Maximum time to wait for a matching action
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before a matching
        ///   action was received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        ///
        /// # Example
        ///
        /// ```ignore
        /// let response = store
        ///     .send_and_wait_for(
        ///         NumberFactsAction::FactButtonTapped,
        ///         |a| matches!(a, NumberFactsAction::FactResponse(_)),
        ///         Duration::from_secs(5),
        ///     )
        ///     .await?;
        /// ```
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            R: Clone,
            E: Clone,
            F: Fn(&A) -> bool,
        {
            // Subscribe BEFORE sending to avoid a race with fast effects
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {}, // Not the action we want, keep waiting
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // Slow consumer; if the terminal action was
                            // among the dropped, the timeout catches it.
                            tracing::warn!(skipped, "Action observer lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to all actions produced by effects
        ///
        /// Returns a receiver that gets a clone of every effect-produced
        /// action. Actions passed to `send` directly are not broadcast.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// Access state through a closure to ensure the lock is released
        /// promptly:
        ///
        /// ```ignore
        /// let count = store.state(|s| s.count).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// Initiate graceful shutdown of the store
        ///
        /// Sets the shutdown flag (rejecting new actions), then waits for
        /// in-flight async effects to complete.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires
        /// before all pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!("store.shutdown.initiated").increment(1);

            self.shutdown.store(true, Ordering::Release);

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(100);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!("store.shutdown.completed").increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(pending_effects = pending, "Shutdown timeout");
                    metrics::counter!("store.shutdown.timeout").increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Execute an effect with tracking
        ///
        /// # Effect Types
        ///
        /// - `None`: No-op
        /// - `Emit`: Feeds the action straight into the feedback destination
        /// - `Future`: Spawns the computation; its one resulting action is
        ///   fed back on completion
        /// - `Delay`: Registers the delivery with the scheduler at
        ///   `now + duration`, removable by token until it fires
        /// - `Every`: Registers a self-rearming tick with the scheduler;
        ///   each firing delivers a clone of the action and schedules the
        ///   next tick, until the token is cancelled
        /// - `Cancel`: Removes the token's pending work from the scheduler
        ///
        /// The [`DecrementGuard`] ensures the tracking counter is updated
        /// even if a spawned effect panics.
        #[allow(clippy::needless_pass_by_value)] // tracking is cloned into spawned work
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect_internal(&self, effect: Effect<A>, tracking: EffectTracking)
        where
            R: Clone,
            E: Clone,
        {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!("store.effects.executed", "type" => "none").increment(1);
                },
                Effect::Emit(action) => {
                    tracing::trace!("Executing Effect::Emit");
                    metrics::counter!("store.effects.executed", "type" => "emit").increment(1);
                    self.feed_back(*action);
                },
                Effect::Future(fut) => {
                    tracing::trace!("Executing Effect::Future");
                    metrics::counter!("store.effects.executed", "type" => "future").increment(1);
                    tracking.increment();

                    // Track global pending effects for shutdown
                    self.pending_effects.fetch_add(1, Ordering::SeqCst);
                    let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

                    let tracking_clone = tracking.clone();
                    let store = self.clone();

                    tokio::spawn(async move {
                        let _guard = DecrementGuard(tracking_clone);
                        let _pending_guard = pending_guard; // Decrement on drop

                        let action = fut.await;
                        tracing::trace!("Effect::Future produced its action");
                        store.feed_back(action);
                    });
                },
                Effect::Delay {
                    duration,
                    action,
                    id,
                } => {
                    tracing::trace!(?duration, token = ?id, "Executing Effect::Delay");
                    metrics::counter!("store.effects.executed", "type" => "delay").increment(1);

                    let store = self.clone();
                    self.scheduler.schedule_after(
                        duration,
                        id,
                        Box::new(move || {
                            tracing::trace!("Effect::Delay fired, delivering action");
                            store.feed_back(*action);
                        }),
                    );
                },
                Effect::Every {
                    interval,
                    action,
                    id,
                } => {
                    tracing::trace!(?interval, token = %id, "Executing Effect::Every");
                    metrics::counter!("store.effects.executed", "type" => "every").increment(1);
                    self.arm_ticker(interval, *action, id);
                },
                Effect::Cancel(id) => {
                    tracing::debug!(token = %id, "Cancelling scheduled work");
                    metrics::counter!("store.effects.cancelled").increment(1);
                    self.scheduler.cancel(id);
                },
            }
        }

        /// Schedule the next tick of a repeating effect
        ///
        /// Each firing delivers a clone of the action and re-arms itself
        /// under the same token, so a single `cancel` stops the stream:
        /// the pending entry is removed and nothing re-arms.
        fn arm_ticker(&self, interval: Duration, action: A, id: EffectId)
        where
            R: Clone,
            E: Clone,
        {
            let store = self.clone();
            self.scheduler.schedule_after(
                interval,
                Some(id),
                Box::new(move || {
                    store.feed_back(action.clone());
                    store.arm_ticker(interval, action, id);
                }),
            );
        }

        /// Deliver an effect-produced action
        ///
        /// Broadcasts to observers, then either re-enters `send` (auto
        /// feedback) or pushes onto the interception queue.
        fn feed_back(&self, action: A)
        where
            R: Clone,
            E: Clone,
        {
            let _ = self.action_broadcast.send(action.clone());

            match &self.feedback {
                FeedbackDestination::Auto => {
                    let store = self.clone();
                    tokio::spawn(async move {
                        let _ = store.send(action).await;
                    });
                },
                FeedbackDestination::Queued(queue) => queue.push(action),
            }
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        /// Number of async effects currently in flight
        ///
        /// Counts spawned `Effect::Future` tasks that have not completed.
        /// Scheduler-deferred work is not included; query the scheduler for
        /// that.
        #[must_use]
        pub fn in_flight_effects(&self) -> usize {
            self.pending_effects.load(Ordering::SeqCst)
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                scheduler: Arc::clone(&self.scheduler),
                feedback: self.feedback.clone(),
                action_broadcast: self.action_broadcast.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}
