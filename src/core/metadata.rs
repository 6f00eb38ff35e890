//! Metadata handed to lifecycle hooks.

use super::state::{EventArg, State};
use serde::Serialize;

/// Describes one hop of a transition.
///
/// `from` and `event` are `None` only for the synthetic entry into the
/// initial state when a machine is created. For every hop of a chained
/// transition, `event` and `args` are those of the event that started the
/// chain, while `from`/`to` describe the hop itself.
///
/// # Example
///
/// ```rust
/// use fsm_store::core::TransitionMetadata;
/// use serde_json::json;
///
/// let meta = TransitionMetadata {
///     from: Some("off".to_string()),
///     to: "on".to_string(),
///     event: Some("toggle".to_string()),
///     args: vec![json!(1), json!("foo")],
/// };
///
/// assert!(!meta.is_initial());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionMetadata<S, A> {
    /// The state being left, `None` on initial entry
    pub from: Option<S>,
    /// The state being entered
    pub to: S,
    /// The event that triggered the chain, `None` on initial entry
    pub event: Option<String>,
    /// Arguments the event was invoked with
    pub args: Vec<A>,
}

impl<S: State, A: EventArg> TransitionMetadata<S, A> {
    /// Metadata for the synthetic entry into the initial state.
    pub fn initial(to: S) -> Self {
        Self {
            from: None,
            to,
            event: None,
            args: Vec::new(),
        }
    }

    /// Whether this describes the machine's initial entry.
    pub fn is_initial(&self) -> bool {
        self.from.is_none() && self.event.is_none()
    }
}
