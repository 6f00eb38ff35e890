//! Core state machine types.
//!
//! This module holds the data model the runtime operates on:
//! - States and event arguments
//! - Actions, lifecycle hooks and the state table
//! - Transition metadata, chains and history
//!
//! Nothing in here performs dispatch; see [`crate::machine`].

mod action;
mod chain;
mod history;
mod metadata;
mod state;
mod table;

pub use action::{Action, ActionSet, HandlerError, Hook, HookKind, IntoOutcome, Outcome};
pub use chain::{Chain, Halt};
pub use history::{StateHistory, StateTransition};
pub use metadata::TransitionMetadata;
pub use state::{EventArg, State};
pub use table::StateTable;
