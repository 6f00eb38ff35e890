//! Builder API for ergonomic machine construction.
//!
//! This module provides a fluent builder, table helpers and the
//! `state_enum!` macro.

pub mod error;
pub mod machine;
pub mod macros;

pub use error::BuildError;
pub use machine::MachineBuilder;

use crate::core::{ActionSet, EventArg, State, StateTable};

/// Build a table in which `event` moves each state to the next one,
/// wrapping from the last back to the first.
///
/// # Example
///
/// ```
/// use fsm_store::builder::cycle;
/// use fsm_store::StateTable;
///
/// let table: StateTable<String> = cycle(["green", "yellow", "red"], "next");
/// assert!(table.contains(&"red".to_string()));
/// ```
pub fn cycle<S, A, I>(states: I, event: &str) -> StateTable<S, A>
where
    S: State,
    A: EventArg,
    I: IntoIterator,
    I::Item: Into<S>,
{
    let states: Vec<S> = states.into_iter().map(Into::into).collect();
    let successors = states.iter().cycle().skip(1);

    states
        .iter()
        .zip(successors)
        .fold(StateTable::new(), |table, (state, next)| {
            table.state(state.clone(), ActionSet::new().on(event, next.clone()))
        })
}

/// Build a table whose states all handle `event` by moving to `target`.
pub fn reset_to<S, A, I>(states: I, event: &str, target: impl Into<S>) -> StateTable<S, A>
where
    S: State,
    A: EventArg,
    I: IntoIterator,
    I::Item: Into<S>,
{
    let target = target.into();
    states.into_iter().fold(StateTable::new(), |table, state| {
        table.state(state, ActionSet::new().on(event, target.clone()))
    })
}
