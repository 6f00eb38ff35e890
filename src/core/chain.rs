//! The chain of states visited while a single event settles.

use super::state::State;

/// Why a chain refused a candidate state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Halt {
    /// The candidate is the state the chain is already in
    Unchanged,
    /// The candidate was already entered earlier in this chain
    Revisited,
    /// The chain hit its configured length cap
    TooLong,
}

/// Ordered states visited during one dispatch, starting with the state the
/// machine was in when the event arrived.
///
/// The origin may be re-entered once so a chain can round-trip; any other
/// state can be entered at most once, which bounds redirect loops.
#[derive(Clone, Debug)]
pub struct Chain<S: State> {
    states: Vec<S>,
    limit: usize,
}

impl<S: State> Chain<S> {
    pub fn new(origin: S, limit: usize) -> Self {
        Self {
            states: vec![origin],
            limit,
        }
    }

    pub fn origin(&self) -> &S {
        &self.states[0]
    }

    /// The most recently entered state.
    pub fn last(&self) -> &S {
        &self.states[self.states.len() - 1]
    }

    /// Decide whether `candidate` may be entered next.
    pub fn admit(&self, candidate: &S) -> Result<(), Halt> {
        if candidate == self.last() {
            return Err(Halt::Unchanged);
        }
        if self.states[1..].contains(candidate) {
            return Err(Halt::Revisited);
        }
        if self.states.len() >= self.limit {
            return Err(Halt::TooLong);
        }
        Ok(())
    }

    /// Record that `state` has been entered.
    pub fn push(&mut self, state: S) {
        self.states.push(state);
    }

    /// Whether the chain ended somewhere other than where it started.
    pub fn changed(&self) -> bool {
        self.origin() != self.last()
    }

    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// Number of hops committed so far.
    pub fn hops(&self) -> usize {
        self.states.len() - 1
    }
}
