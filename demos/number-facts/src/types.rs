//! State, actions, and errors for the number-facts feature

use thiserror::Error;

/// Number-facts state
///
/// A counter, the in-flight flag and last result of a fact request, and
/// whether the repeating timer is running.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberFactsState {
    /// Current count value
    pub count: i64,
    /// Whether a fact request is awaiting its response
    pub is_fact_request_in_flight: bool,
    /// The most recently fetched fact
    pub fact: Option<String>,
    /// Whether the repeating timer is running
    pub is_timer_running: bool,
}

/// Number-facts actions
///
/// User intents (`*Tapped`) and effect outcomes, as one closed enum.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberFactsAction {
    /// Increment the counter by 1
    IncrementTapped,
    /// Decrement the counter by 1
    DecrementTapped,
    /// A below-zero decrement rebounds one second later
    DecrementRebound,
    /// Request a fact about the current count
    FactButtonTapped,
    /// Outcome of a fact request
    FactResponse(Result<String, FactError>),
    /// Start the repeating one-second timer
    StartTimerTapped,
    /// Stop the repeating timer
    StopTimerTapped,
    /// One timer tick elapsed
    TimerTick,
}

/// Failure produced by a fact client
///
/// Mapped into [`NumberFactsAction::FactResponse`] by the fetch effect and
/// handled by the reducer like any other input; it never crosses the store
/// boundary as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fact request failed: {reason}")]
pub struct FactError {
    /// Human-readable failure cause
    pub reason: String,
}

impl FactError {
    /// Create a failure with the given cause
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
