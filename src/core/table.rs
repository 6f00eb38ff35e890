//! The state table and wildcard-aware lookup.

use super::action::{Action, ActionSet, Hook, HookKind};
use super::state::{EventArg, State};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Maps each state to its [`ActionSet`], plus an optional wildcard set
/// consulted when the current state has no entry for an event or hook.
///
/// The table is immutable once a machine has been built from it.
pub struct StateTable<S: State, A: EventArg = Value> {
    states: HashMap<S, ActionSet<S, A>>,
    fallback: Option<ActionSet<S, A>>,
}

impl<S: State, A: EventArg> StateTable<S, A> {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            fallback: None,
        }
    }

    /// Register the action set for `state`, replacing any previous one.
    pub fn state(mut self, state: impl Into<S>, actions: ActionSet<S, A>) -> Self {
        self.states.insert(state.into(), actions);
        self
    }

    /// Register the wildcard action set.
    pub fn fallback(mut self, actions: ActionSet<S, A>) -> Self {
        self.fallback = Some(actions);
        self
    }

    /// Whether `state` has its own entry in the table.
    pub fn contains(&self, state: &S) -> bool {
        self.states.contains_key(state)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Whether a machine may start in `state`: it has an entry, or a wildcard
    /// set makes every state acceptable.
    pub fn accepts(&self, state: &S) -> bool {
        self.has_fallback() || self.contains(state)
    }

    /// Resolve the action for `event` in `state`, falling back to the
    /// wildcard set. The state's own handler always takes precedence.
    pub fn action(&self, state: &S, event: &str) -> Option<&Action<S, A>> {
        self.states
            .get(state)
            .and_then(|set| set.get(event))
            .or_else(|| self.fallback.as_ref().and_then(|set| set.get(event)))
    }

    /// Resolve a lifecycle hook for `state` with the same fallback rule.
    pub fn hook(&self, state: &S, kind: HookKind) -> Option<&Hook<S, A>> {
        self.states
            .get(state)
            .and_then(|set| set.hook(kind))
            .or_else(|| self.fallback.as_ref().and_then(|set| set.hook(kind)))
    }

    /// Every event name mentioned anywhere in the table, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .states
            .values()
            .chain(self.fallback.iter())
            .flat_map(|set| set.events().map(str::to_string))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl<S: State, A: EventArg> Default for StateTable<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, A: EventArg> fmt::Debug for StateTable<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateTable")
            .field("states", &self.states)
            .field("fallback", &self.fallback)
            .finish()
    }
}
