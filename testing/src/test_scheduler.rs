//! Virtual-time scheduler for deterministic tests
//!
//! Holds an ordered collection of pending (deadline, work) entries and a
//! virtual clock that only moves when a test calls [`TestScheduler::advance`].
//! Timing-dependent behavior becomes deterministic: tests advance simulated
//! time instead of sleeping.

use reflow_core::effect::EffectId;
use reflow_core::scheduler::{Scheduler, Work};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scheduler driven by a virtual clock
///
/// Pending work is keyed by `(deadline, sequence)`: earliest deadline
/// first, ties broken by insertion order. [`advance`](TestScheduler::advance)
/// executes exactly the entries whose deadline falls within the advanced
/// window - never work scheduled beyond it - and `advance(d1)` followed by
/// `advance(d2)` fires the same entries as a single `advance(d1 + d2)`.
///
/// Clones share the same clock and pending entries.
///
/// # Example
///
/// ```
/// use reflow_testing::TestScheduler;
/// use reflow_core::scheduler::Scheduler;
/// use std::time::Duration;
///
/// let scheduler = TestScheduler::new();
/// scheduler.schedule_after(Duration::from_secs(1), None, Box::new(|| {}));
///
/// scheduler.advance(Duration::from_millis(999));
/// assert_eq!(scheduler.pending(), 1); // not due yet
///
/// scheduler.advance(Duration::from_millis(1));
/// assert_eq!(scheduler.pending(), 0); // fired
/// ```
#[derive(Clone, Default)]
pub struct TestScheduler {
    inner: Arc<Mutex<Pending>>,
}

#[derive(Default)]
struct Pending {
    /// Virtual time elapsed since the scheduler was created
    now: Duration,
    /// Insertion sequence, for deterministic same-deadline ordering
    next_seq: u64,
    entries: BTreeMap<(Duration, u64), Entry>,
}

struct Entry {
    token: Option<EffectId>,
    work: Work,
}

impl TestScheduler {
    /// Create a new virtual-time scheduler at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)] // Mutex poison is unrecoverable
    fn lock(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.inner.lock().unwrap()
    }

    /// Current virtual time, as elapsed duration since creation
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of pending entries
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().entries.len()
    }

    /// Cancellation tokens of all pending entries, in deadline order
    ///
    /// Entries scheduled without a token are omitted. Useful in teardown
    /// diagnostics to name what was left running.
    #[must_use]
    pub fn pending_tokens(&self) -> Vec<EffectId> {
        self.lock()
            .entries
            .values()
            .filter_map(|entry| entry.token)
            .collect()
    }

    /// Advance the virtual clock by `by`, executing all work that comes due
    ///
    /// Repeatedly pops the earliest-deadline entry whose deadline lies
    /// within the new window and executes it, in deadline order with ties
    /// broken by insertion order. The clock is moved to each entry's
    /// deadline before its work runs, so work that schedules follow-up
    /// entries relative to "now" makes them eligible within this same call.
    /// Entries beyond the window stay pending; the clock ends at
    /// `old now + by`.
    pub fn advance(&self, by: Duration) {
        let target = {
            let inner = self.lock();
            inner.now.saturating_add(by)
        };

        loop {
            // Pop outside of work(): executed work may re-enter the
            // scheduler to register follow-up entries.
            let due = {
                let mut inner = self.lock();
                match inner.entries.first_key_value() {
                    Some((&(deadline, seq), _)) if deadline <= target => {
                        inner.now = deadline;
                        inner.entries.remove(&(deadline, seq)).map(|e| e.work)
                    },
                    _ => None,
                }
            };

            match due {
                Some(work) => work(),
                None => break,
            }
        }

        self.lock().now = target;
    }
}

impl Scheduler for TestScheduler {
    fn schedule_now(&self, work: Work) {
        let mut inner = self.lock();
        let key = (inner.now, inner.next_seq);
        inner.next_seq += 1;
        inner.entries.insert(key, Entry { token: None, work });
    }

    fn schedule_after(&self, delay: Duration, token: Option<EffectId>, work: Work) {
        let mut inner = self.lock();
        let key = (inner.now.saturating_add(delay), inner.next_seq);
        inner.next_seq += 1;
        inner.entries.insert(key, Entry { token, work });
    }

    fn cancel(&self, token: EffectId) {
        self.lock()
            .entries
            .retain(|_, entry| entry.token != Some(token));
    }
}

impl std::fmt::Debug for TestScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("TestScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can unwrap
#[allow(clippy::cast_possible_truncation)] // Small test indices
mod tests {
    use super::*;

    /// Records fire order for assertions
    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) -> Work) {
        let log: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let make = {
            let log = Arc::clone(&log);
            move |label: u32| -> Work {
                let log = Arc::clone(&log);
                Box::new(move || log.lock().unwrap().push(label))
            }
        };
        (log, make)
    }

    fn fired(log: &Arc<Mutex<Vec<u32>>>) -> Vec<u32> {
        log.lock().unwrap().clone()
    }

    const TOKEN: EffectId = EffectId::new("test-scheduler/token");

    #[test]
    fn test_advance_executes_in_deadline_order() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(3), None, work(3));
        scheduler.schedule_after(Duration::from_secs(1), None, work(1));
        scheduler.schedule_after(Duration::from_secs(2), None, work(2));

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(fired(&log), vec![1, 2, 3]);
        assert_eq!(scheduler.now(), Duration::from_secs(3));
    }

    #[test]
    fn test_same_deadline_ties_break_by_insertion_order() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(1), None, work(10));
        scheduler.schedule_after(Duration::from_secs(1), None, work(20));
        scheduler.schedule_after(Duration::from_secs(1), None, work(30));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired(&log), vec![10, 20, 30]);
    }

    #[test]
    fn test_advance_never_runs_work_beyond_window() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(1), None, work(1));
        scheduler.schedule_after(Duration::from_secs(5), None, work(5));

        scheduler.advance(Duration::from_secs(2));
        assert_eq!(fired(&log), vec![1]);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.now(), Duration::from_secs(2));
    }

    #[test]
    fn test_rescheduled_work_fires_within_same_advance() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        // A chain: at t=1 schedule a follow-up at t=2, which fires in the
        // same advance(3) window; its own follow-up at t=4 does not.
        let chain = {
            let scheduler = scheduler.clone();
            let inner_work = work(2);
            let far_work = work(4);
            let log = Arc::clone(&log);
            Box::new(move || {
                log.lock().unwrap().push(1);
                let far_work = far_work;
                let inner_scheduler = scheduler.clone();
                scheduler.schedule_after(
                    Duration::from_secs(1),
                    None,
                    Box::new(move || {
                        inner_work();
                        inner_scheduler.schedule_after(Duration::from_secs(2), None, far_work);
                    }),
                );
            })
        };
        scheduler.schedule_after(Duration::from_secs(1), None, chain);

        scheduler.advance(Duration::from_secs(3));
        assert_eq!(fired(&log), vec![1, 2]);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired(&log), vec![1, 2, 4]);
    }

    #[test]
    fn test_split_advance_equals_single_advance() {
        let deadlines = [1u64, 2, 2, 3, 5, 8];

        let run = |splits: &[u64]| {
            let scheduler = TestScheduler::new();
            let (log, work) = recorder();
            for (i, &secs) in deadlines.iter().enumerate() {
                scheduler.schedule_after(Duration::from_secs(secs), None, work(i as u32));
            }
            for &secs in splits {
                scheduler.advance(Duration::from_secs(secs));
            }
            fired(&log)
        };

        assert_eq!(run(&[8]), run(&[3, 5]));
        assert_eq!(run(&[8]), run(&[1, 1, 1, 5]));
    }

    #[test]
    fn test_intermediate_advance_sees_only_due_entries() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(1), None, work(1));
        scheduler.schedule_after(Duration::from_secs(2), None, work(2));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired(&log), vec![1]);

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired(&log), vec![1, 2]);
    }

    #[test]
    fn test_cancel_removes_pending_entries() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(1), Some(TOKEN), work(1));
        scheduler.schedule_after(Duration::from_secs(2), Some(TOKEN), work(2));
        scheduler.schedule_after(Duration::from_secs(1), None, work(3));

        assert_eq!(scheduler.pending_tokens(), vec![TOKEN, TOKEN]);
        scheduler.cancel(TOKEN);
        assert_eq!(scheduler.pending(), 1);

        scheduler.advance(Duration::from_secs(5));
        assert_eq!(fired(&log), vec![3]);
    }

    #[test]
    fn test_cancel_unknown_token_is_noop() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_after(Duration::from_secs(1), Some(TOKEN), work(1));
        scheduler.cancel(EffectId::new("test-scheduler/other"));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(fired(&log), vec![1]);
    }

    #[test]
    fn test_schedule_now_runs_on_zero_advance() {
        let scheduler = TestScheduler::new();
        let (log, work) = recorder();

        scheduler.schedule_now(work(1));
        assert_eq!(fired(&log), Vec::<u32>::new());

        scheduler.advance(Duration::ZERO);
        assert_eq!(fired(&log), vec![1]);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// `advance(d1); advance(d2)` fires the same entries, in the
            /// same order, as a single `advance(d1 + d2)`.
            #[test]
            fn split_advance_is_equivalent(
                deadlines in prop::collection::vec(0u64..10_000, 0..32),
                split in 0u64..10_000,
                total in 0u64..10_000,
            ) {
                let run = |splits: Vec<u64>| {
                    let scheduler = TestScheduler::new();
                    let (log, work) = recorder();
                    for (i, &millis) in deadlines.iter().enumerate() {
                        scheduler.schedule_after(
                            Duration::from_millis(millis),
                            None,
                            work(i as u32),
                        );
                    }
                    for millis in splits {
                        scheduler.advance(Duration::from_millis(millis));
                    }
                    fired(&log)
                };

                let split = split.min(total);
                prop_assert_eq!(run(vec![total]), run(vec![split, total - split]));
            }
        }
    }
}
