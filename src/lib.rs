//! fsm-store: a small finite state machine runtime that doubles as a
//! reactive store.
//!
//! A machine is described by a table mapping each state to the events it
//! handles. Handling an event yields the next state, either directly or from
//! a handler. Leaving a state runs its `_exit` hook and arriving runs its
//! `_enter` hook; either may redirect the transition, and the machine keeps
//! following redirects until the chain settles. Subscribers receive the
//! current state when they subscribe and every net change afterwards.
//!
//! # Core Concepts
//!
//! - **State**: any [`State`] type; `String` works out of the box
//! - **Action sets**: per-state event handlers plus lifecycle hooks, with an
//!   optional wildcard set consulted when a state has no handler
//! - **Store contract**: [`Fsm::subscribe`] replays and then reports changes
//! - **Debounce**: delayed, coalescing dispatch per event name
//!
//! # Example
//!
//! ```rust
//! use fsm_store::{ActionSet, Fsm, StateTable};
//! use std::sync::{Arc, Mutex};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let table = StateTable::new()
//!     .state("off", ActionSet::new().on("toggle", "on"))
//!     .state("on", ActionSet::new().on("toggle", "off"));
//! let fsm: Fsm<String> = Fsm::new("off", table).await.unwrap();
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let subscription = fsm.subscribe(move |state: &String| sink.lock().unwrap().push(state.clone()));
//!
//! fsm.send("toggle", vec![]).await.unwrap();
//! fsm.send("toggle", vec![]).await.unwrap();
//! subscription.unsubscribe();
//!
//! assert_eq!(*seen.lock().unwrap(), vec!["off", "on", "off"]);
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod error;
pub mod machine;

// Re-export commonly used types
pub use builder::{BuildError, MachineBuilder};
pub use config::{ConfigError, MachineConfig};
pub use core::{
    Action, ActionSet, EventArg, HandlerError, HookKind, IntoOutcome, State, StateHistory,
    StateTable, StateTransition, TransitionMetadata,
};
pub use error::{FsmError, FsmResult};
pub use machine::{Debounced, EventInvoker, Fsm, Unsubscribe};
