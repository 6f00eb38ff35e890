//! Traffic Light State Machine
//!
//! This example demonstrates a cyclic machine observed through the store
//! contract.
//!
//! Key concepts:
//! - Cyclic state transitions built with `builder::cycle`
//! - Enum states declared with `state_enum!`
//! - An enter hook that redirects (a pedestrian request skips green)
//! - Subscribers hearing only net changes
//!
//! Run with: RUST_LOG=debug cargo run --example traffic_light

use fsm_store::builder::cycle;
use fsm_store::{state_enum, ActionSet, MachineBuilder, MachineConfig, State, StateTable};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

state_enum! {
    enum TrafficLight {
        Red,
        Yellow,
        Green,
        Walk,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let pedestrian = Arc::new(AtomicBool::new(false));
    let waiting = Arc::clone(&pedestrian);

    // Red -> Green -> Yellow -> Red, with green yielding to a walk phase
    // whenever someone pressed the button.
    let table: StateTable<TrafficLight> = cycle(
        [TrafficLight::Red, TrafficLight::Green, TrafficLight::Yellow],
        "next",
    )
    .state(
        TrafficLight::Green,
        ActionSet::new()
            .on("next", TrafficLight::Yellow)
            .on_enter(move |_, _| {
                waiting
                    .swap(false, Ordering::SeqCst)
                    .then_some(TrafficLight::Walk)
            }),
    )
    .state(TrafficLight::Walk, ActionSet::new().on("next", TrafficLight::Red));

    let light = MachineBuilder::new(TrafficLight::Red)
        .table(table)
        .config(MachineConfig::default().with_history(32))
        .build()
        .await?;

    let subscription = light.subscribe(|state: &TrafficLight| println!("  light is {state:?}"));

    println!("Cycling three times:");
    for _ in 0..3 {
        light.send("next", vec![]).await?;
    }

    println!("\nPedestrian presses the button:");
    pedestrian.store(true, Ordering::SeqCst);
    light.send("next", vec![]).await?;
    light.send("next", vec![]).await?;

    subscription.unsubscribe();

    let history = light.history();
    let path: Vec<&str> = history.get_path().into_iter().map(State::name).collect();
    println!("\nPath: {}", path.join(" -> "));

    println!("\n=== Example Complete ===");
    Ok(())
}
