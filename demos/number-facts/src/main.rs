//! Number-facts example binary
//!
//! Demonstrates the Reflow architecture against the live scheduler: real
//! timers drive the repeating tick, and the fact fetch runs as a spawned
//! async effect.

use number_facts::{
    LocalFactClient, NumberFactsAction, NumberFactsEnvironment, NumberFactsReducer,
    NumberFactsState, SystemClock,
};
use reflow_core::environment::Clock;
use reflow_runtime::{LiveScheduler, Store};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "number_facts=debug,reflow_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Number Facts: Reflow architecture demo ===\n");

    let clock = SystemClock;
    println!("Started at {}", clock.now());

    let env = NumberFactsEnvironment::new(clock, Arc::new(LocalFactClient));
    let store = Store::new(
        NumberFactsState::default(),
        NumberFactsReducer::new(),
        env,
        LiveScheduler::new(),
    );
    tracing::info!("store ready");

    // Count up
    for _ in 0..2 {
        if store.send(NumberFactsAction::IncrementTapped).await.is_err() {
            return;
        }
    }
    let count = store.state(|s| s.count).await;
    println!("Count after two increments: {count}");

    // Fetch a fact about the current count
    println!("\n>>> Fetching a fact for {count}...");
    let response = store
        .send_and_wait_for(
            NumberFactsAction::FactButtonTapped,
            |a| matches!(a, NumberFactsAction::FactResponse(_)),
            Duration::from_secs(1),
        )
        .await;
    match response {
        Ok(NumberFactsAction::FactResponse(Ok(fact))) => println!("Fact: {fact}"),
        Ok(NumberFactsAction::FactResponse(Err(error))) => println!("Fact request failed: {error}"),
        Ok(_) => {}, // predicate admits only FactResponse
        Err(error) => println!("Fact request did not settle: {error}"),
    }

    // Run the timer for a few ticks
    let mut actions = store.subscribe_actions();
    if store.send(NumberFactsAction::StartTimerTapped).await.is_err() {
        return;
    }
    println!("\nTimer running; waiting for three ticks...");
    let mut ticks = 0;
    while ticks < 3 {
        match actions.recv().await {
            Ok(NumberFactsAction::TimerTick) => {
                ticks += 1;
                let count = store.state(|s| s.count).await;
                println!("  tick -> count {count}");
            },
            Ok(_) => {},
            Err(_) => break,
        }
    }
    let _ = store.send(NumberFactsAction::StopTimerTapped).await;

    // Drain in-flight work before exiting
    if let Err(error) = store.shutdown(Duration::from_secs(5)).await {
        println!("Shutdown incomplete: {error}");
    }

    println!("\n=== Demo complete ===");
}
