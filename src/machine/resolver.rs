//! Resolves and runs the handler for an event or lifecycle hook.

use super::Fsm;
use crate::core::{Action, EventArg, Hook, HookKind, State, TransitionMetadata};
use crate::error::{FsmError, FsmResult};
use tracing::trace;

impl<S: State, A: EventArg> Fsm<S, A> {
    /// Find the handler for `event` in `state` (or the wildcard set), run it,
    /// and return the state it asks for.
    pub(crate) async fn resolve_event(
        &self,
        state: &S,
        event: &str,
        args: &[A],
    ) -> FsmResult<Option<S>> {
        let Some(action) = self.inner.table.action(state, event) else {
            trace!(machine = %self.inner.id, state = state.name(), event, "no handler");
            return Ok(None);
        };

        let outcome = match action {
            Action::Target(target) => Ok(Some(target.clone())),
            Action::Call(handler) => handler(self, args),
            Action::Async(handler) => handler(self.clone(), args.to_vec()).await,
        };

        outcome.map_err(|source| FsmError::Handler {
            event: event.to_string(),
            source,
        })
    }

    /// Run `state`'s lifecycle hook of the given kind, if any.
    pub(crate) async fn resolve_hook(
        &self,
        state: &S,
        kind: HookKind,
        metadata: &TransitionMetadata<S, A>,
    ) -> FsmResult<Option<S>> {
        let Some(hook) = self.inner.table.hook(state, kind) else {
            return Ok(None);
        };

        let outcome = match hook {
            Hook::Target(target) => Ok(Some(target.clone())),
            Hook::Call(hook) => hook(self, metadata),
            Hook::Async(hook) => hook(self.clone(), metadata.clone()).await,
        };

        outcome.map_err(|source| FsmError::Handler {
            event: kind.to_string(),
            source,
        })
    }
}
