//! Environment and fact-fetching capability for the number-facts feature
//!
//! The environment injects a [`Clock`] and a [`FactClient`]. Tests swap in
//! the mock clients below; the demo binary uses [`LocalFactClient`], which
//! computes facts offline (a real networked client is an external
//! collaborator and lives outside this crate).

use crate::types::FactError;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use reflow_core::environment::Clock;
use std::sync::Arc;

/// Capability for fetching a fact about a number
///
/// Object-safe async: implementations return a boxed future so the
/// environment can hold `Arc<dyn FactClient>`.
pub trait FactClient: Send + Sync {
    /// Fetch a fact about `number`
    fn fetch(&self, number: i64) -> BoxFuture<'static, Result<String, FactError>>;
}

/// Environment for the number-facts reducer
///
/// Generic over the clock type so any [`Clock`] implementation works.
#[derive(Clone)]
pub struct NumberFactsEnvironment<C: Clock> {
    /// Clock for time-based operations
    pub clock: C,
    /// Fact-fetching capability
    pub fact: Arc<dyn FactClient>,
}

impl<C: Clock> NumberFactsEnvironment<C> {
    /// Create an environment from its capabilities
    #[must_use]
    pub fn new(clock: C, fact: Arc<dyn FactClient>) -> Self {
        Self { clock, fact }
    }
}

impl<C: Clock + std::fmt::Debug> std::fmt::Debug for NumberFactsEnvironment<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NumberFactsEnvironment")
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fact client that computes facts locally, without any network
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFactClient;

impl FactClient for LocalFactClient {
    fn fetch(&self, number: i64) -> BoxFuture<'static, Result<String, FactError>> {
        Box::pin(async move {
            let parity = if number % 2 == 0 { "even" } else { "odd" };
            Ok(format!("{number} is an {parity} number"))
        })
    }
}

/// Mock fact clients for tests
pub mod mocks {
    use super::{BoxFuture, FactClient, FactError};

    /// Fact client returning a predictable canned fact
    ///
    /// `fetch(n)` resolves to `"{n} {suffix}"`.
    #[derive(Debug, Clone)]
    pub struct CannedFactClient {
        suffix: String,
    }

    impl CannedFactClient {
        /// Create a client with the given fact suffix
        #[must_use]
        pub fn new(suffix: impl Into<String>) -> Self {
            Self {
                suffix: suffix.into(),
            }
        }
    }

    impl FactClient for CannedFactClient {
        fn fetch(&self, number: i64) -> BoxFuture<'static, Result<String, FactError>> {
            let fact = format!("{number} {}", self.suffix);
            Box::pin(async move { Ok(fact) })
        }
    }

    /// Fact client whose every request fails
    #[derive(Debug, Clone)]
    pub struct FailingFactClient {
        reason: String,
    }

    impl FailingFactClient {
        /// Create a client failing with the given cause
        #[must_use]
        pub fn new(reason: impl Into<String>) -> Self {
            Self {
                reason: reason.into(),
            }
        }
    }

    impl FactClient for FailingFactClient {
        fn fetch(&self, _number: i64) -> BoxFuture<'static, Result<String, FactError>> {
            let error = FactError::new(self.reason.clone());
            Box::pin(async move { Err(error) })
        }
    }
}
