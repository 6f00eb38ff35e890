//! Bounded log of committed transitions.
//!
//! Recording is opt-in (see `MachineConfig::history_capacity`). Each hop of a
//! chained transition is recorded separately.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single committed hop.
///
/// # Example
///
/// ```rust
/// use fsm_store::core::StateTransition;
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: "off".to_string(),
///     to: "on".to_string(),
///     event: "toggle".to_string(),
///     timestamp: Utc::now(),
/// };
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event whose chain produced this hop
    pub event: String,
    /// When the hop was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions. When full, the oldest record is
/// dropped to make room.
///
/// # Example
///
/// ```rust
/// use fsm_store::core::{StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_capacity(8);
///
/// for (from, to) in [("red", "green"), ("green", "yellow")] {
///     history.record(StateTransition {
///         from: from.to_string(),
///         to: to.to_string(),
///         event: "next".to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// let path = history.get_path();
/// assert_eq!(path.len(), 3); // red -> green -> yellow
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    capacity: usize,
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding at most `capacity` records.
    /// A capacity of zero records nothing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.capacity == 0 {
            return;
        }
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed: the first recorded `from`, then the
    /// `to` of each transition.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and last recorded transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(from: &str, to: &str) -> StateTransition<String> {
        StateTransition {
            from: from.to_string(),
            to: to.to_string(),
            event: "next".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<String> = StateHistory::with_capacity(4);
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
    }

    #[test]
    fn zero_capacity_records_nothing() {
        let mut history = StateHistory::default();
        history.record(hop("a", "b"));
        assert!(!history.is_enabled());
        assert!(history.is_empty());
    }

    #[test]
    fn get_path_returns_state_sequence() {
        let mut history = StateHistory::with_capacity(4);
        history.record(hop("off", "on"));
        history.record(hop("on", "off"));

        let path = history.get_path();
        assert_eq!(path, vec!["off", "on", "off"]);
    }

    #[test]
    fn oldest_record_is_evicted_when_full() {
        let mut history = StateHistory::with_capacity(2);
        history.record(hop("a", "b"));
        history.record(hop("b", "c"));
        history.record(hop("c", "d"));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get_path(), vec!["b", "c", "d"]);
    }

    #[test]
    fn duration_calculates_elapsed_time() {
        let mut history = StateHistory::with_capacity(4);
        history.record(hop("a", "b"));

        std::thread::sleep(std::time::Duration::from_millis(10));

        history.record(hop("b", "c"));

        let duration = history.duration().unwrap();
        assert!(duration >= std::time::Duration::from_millis(10));
    }

    #[test]
    fn history_serializes_correctly() {
        let mut history = StateHistory::with_capacity(4);
        history.record(hop("a", "b"));

        let json = serde_json::to_string(&history).unwrap();
        let deserialized: StateHistory<String> = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.len(), 1);
        assert_eq!(deserialized.capacity(), 4);
    }
}
