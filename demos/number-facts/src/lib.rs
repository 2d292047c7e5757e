//! # Number Facts Example
//!
//! A small feature exercising the Reflow architecture end to end:
//!
//! - A counter (pure state transitions)
//! - A delayed "rebound" when the count is decremented below zero
//!   (cancellable deferred effect)
//! - A fallible asynchronous fact fetch (failable-async effect mapping its
//!   result into a success or failure action)
//! - A repeating one-second timer (long-running effect stopped by token)
//!
//! ## Example
//!
//! ```no_run
//! use number_facts::{
//!     LocalFactClient, NumberFactsAction, NumberFactsEnvironment, NumberFactsReducer,
//!     NumberFactsState, SystemClock,
//! };
//! use reflow_runtime::{LiveScheduler, Store};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), reflow_runtime::StoreError> {
//! let env = NumberFactsEnvironment::new(SystemClock, Arc::new(LocalFactClient));
//! let store = Store::new(
//!     NumberFactsState::default(),
//!     NumberFactsReducer::new(),
//!     env,
//!     LiveScheduler::new(),
//! );
//!
//! store.send(NumberFactsAction::IncrementTapped).await?;
//! let count = store.state(|s| s.count).await;
//! assert_eq!(count, 1);
//! # Ok(())
//! # }
//! ```

/// Environment and fact-fetching capability
pub mod environment;

/// Business logic
pub mod reducer;

/// State, actions, and errors
pub mod types;

pub use environment::{FactClient, LocalFactClient, NumberFactsEnvironment, SystemClock};
pub use reducer::{DECREMENT_REBOUND, NumberFactsReducer, TIMER_TICK};
pub use types::{FactError, NumberFactsAction, NumberFactsState};
