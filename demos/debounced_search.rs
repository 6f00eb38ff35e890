//! Debounced Search Box
//!
//! This example demonstrates debounced dispatch and asynchronous handlers.
//!
//! Key concepts:
//! - Keystrokes debounced per event name so only the last one searches
//! - An async action standing in for a network request
//! - An enter hook reading the transition metadata
//! - Cancelling a pending search with `cancel()`
//!
//! Run with: RUST_LOG=fsm_store=debug cargo run --example debounced_search

use fsm_store::{ActionSet, Fsm, MachineBuilder, MachineConfig, TransitionMetadata};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing_subscriber::EnvFilter;

type Set = ActionSet<String, Value>;

async fn lookup(query: String) -> Vec<String> {
    sleep(Duration::from_millis(30)).await;
    ["rust", "rustls", "rusqlite", "tokio", "tracing"]
        .iter()
        .filter(|word| word.starts_with(&query))
        .map(|word| word.to_string())
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Debounced Search ===\n");

    let search = Set::new().call_async("search", |_: Fsm<String>, args: Vec<Value>| async move {
        let query = args.first().and_then(Value::as_str).unwrap_or_default().to_string();
        let hits = lookup(query.clone()).await;
        println!("  searched {query:?}: {hits:?}");
        Some(if hits.is_empty() { "empty" } else { "results" }.to_string())
    });

    let fsm: Fsm<String> = MachineBuilder::new("idle")
        .state("idle", search.clone())
        .state(
            "results",
            search
                .clone()
                .on_enter(|_, meta: &TransitionMetadata<String, Value>| {
                    println!("  results for {:?}", meta.args);
                }),
        )
        .state("empty", search)
        .config(MachineConfig::default().with_debounce_wait(Duration::from_millis(150)))
        .build()
        .await?;

    let _subscription = fsm.subscribe(|state: &String| println!("  state: {state}"));
    let typed = fsm.event("search");

    println!("Typing \"r\", \"ru\", \"rus\" quickly:");
    let mut pending = Vec::new();
    for query in ["r", "ru", "rus"] {
        pending.push(typed.debounce_default(vec![json!(query)]));
        sleep(Duration::from_millis(50)).await;
    }
    for handle in pending {
        handle.await?;
    }

    println!("\nTyping \"x\" and then clearing the box:");
    let abandoned = typed.debounce_default(vec![json!("x")]);
    let state = typed.cancel().await?;
    println!("  cancelled while {state}");
    println!("  abandoned search settled as {}", abandoned.await?);

    println!("\nTyping \"zzz\":");
    let state = typed.debounce(Some(Duration::from_millis(20)), vec![json!("zzz")]).await?;
    println!("  settled in {state}");

    println!("\n=== Example Complete ===");
    Ok(())
}
