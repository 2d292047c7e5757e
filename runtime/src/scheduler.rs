//! Wall-clock scheduler backed by tokio timers
//!
//! `schedule_after` spawns a task that sleeps for the requested duration
//! and then runs the work, unless the work's token was cancelled while the
//! task slept. Firings from different entries may interleave across tasks;
//! the store serializes action application, so interleaving never threatens
//! state consistency.

use reflow_core::effect::EffectId;
use reflow_core::scheduler::{Scheduler, Work};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scheduler backed by real elapsed time
///
/// Cancellation is flag-based: each token maps to a shared flag that the
/// sleeping task checks on wakeup. Cancelling sets the flag and removes the
/// registry entry, so work that has not fired never runs and a later
/// registration under the same token starts fresh.
///
/// Tokens are a small closed set of static names per feature; registry
/// entries for tokens that are never cancelled persist for the scheduler's
/// lifetime.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(state, reducer, environment, LiveScheduler::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LiveScheduler {
    cancellations: Arc<Mutex<HashMap<EffectId, Arc<AtomicBool>>>>,
}

impl LiveScheduler {
    /// Create a new live scheduler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared cancellation flag for `token`, created on first use
    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    fn flag_for(&self, token: EffectId) -> Arc<AtomicBool> {
        let mut registry = self.cancellations.lock().unwrap();
        Arc::clone(registry.entry(token).or_default())
    }
}

impl Scheduler for LiveScheduler {
    fn schedule_now(&self, work: Work) {
        tokio::spawn(async move {
            work();
        });
    }

    fn schedule_after(&self, delay: Duration, token: Option<EffectId>, work: Work) {
        let cancelled = token.map(|t| self.flag_for(t));

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if cancelled.is_some_and(|flag| flag.load(Ordering::Acquire)) {
                tracing::trace!("Scheduled work was cancelled while sleeping");
                return;
            }

            work();
        });
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    fn cancel(&self, token: EffectId) {
        let flag = self.cancellations.lock().unwrap().remove(&token);

        if let Some(flag) = flag {
            flag.store(true, Ordering::Release);
            tracing::debug!(token = %token, "Cancelled scheduled work");
        }
    }
}
