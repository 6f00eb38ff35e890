//! Errors surfaced by dispatch and debounce.

use crate::core::HandlerError;
use thiserror::Error;

/// Errors that can occur while dispatching an event
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("Handler for '{event}' failed: {source}")]
    Handler {
        event: String,
        #[source]
        source: HandlerError,
    },

    #[error("Event '{event}' was dispatched from inside a transition of the same machine")]
    ReentrantDispatch { event: String },

    #[error("Cannot debounce '{event}' outside a Tokio runtime")]
    NoRuntime { event: String },
}

impl FsmError {
    /// Name of the event the error relates to.
    pub fn event(&self) -> &str {
        match self {
            Self::Handler { event, .. }
            | Self::ReentrantDispatch { event }
            | Self::NoRuntime { event } => event,
        }
    }
}

pub type FsmResult<T> = Result<T, FsmError>;
