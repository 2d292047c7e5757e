//! # Reflow Testing
//!
//! Testing utilities and helpers for the Reflow architecture.
//!
//! This crate provides:
//! - [`TestScheduler`]: virtual-time scheduler whose clock only moves when a
//!   test advances it
//! - [`TestStore`]: assertion harness over a store with intercepted effect
//!   feedback (`send`/`receive`, teardown leak detection)
//! - [`ReducerTest`]: fluent Given-When-Then builder for pure reducer tests
//! - Mock implementations of Environment traits
//!
//! ## Example
//!
//! ```ignore
//! use reflow_testing::TestStore;
//! use std::time::Duration;
//!
//! #[tokio::test]
//! async fn test_delayed_rebound() {
//!     let mut store = TestStore::new(
//!         NumberFactsState::default(),
//!         NumberFactsReducer::new(),
//!         test_environment(),
//!     );
//!
//!     store.send(NumberFactsAction::DecrementTapped, |state| {
//!         state.count = -1;
//!     }).await;
//!
//!     store.advance(Duration::from_secs(1));
//!
//!     store.receive(NumberFactsAction::DecrementRebound, |state| {
//!         state.count = 0;
//!     }).await;
//! }
//! ```

/// Virtual-time scheduler for deterministic tests
pub mod test_scheduler;

/// Store assertion harness with send/receive semantics
pub mod test_store;


use chrono::{DateTime, Utc};
use reflow_core::environment::Clock;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reflow_testing::mocks::FixedClock;
    /// use reflow_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::ReducerTest;
pub use test_scheduler::TestScheduler;
pub use test_store::TestStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }
}
