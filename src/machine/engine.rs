//! The transition engine.
//!
//! A dispatch resolves the event to a candidate state and then follows the
//! chain of redirects produced by exit and enter hooks until it settles.
//! Subscribers hear about the chain once, after it settles, and only when
//! the final state differs from where the chain started.

use super::Fsm;
use crate::core::{
    Chain, EventArg, Halt, HookKind, State, StateTransition, TransitionMetadata,
};
use crate::error::{FsmError, FsmResult};
use chrono::Utc;
use std::future::Future;
use tracing::{debug, trace, warn};
use uuid::Uuid;

tokio::task_local! {
    /// Machines with a chain in flight on the current task.
    static DISPATCHING: Vec<Uuid>;
}

pub(super) fn dispatching(id: Uuid) -> bool {
    DISPATCHING
        .try_with(|ids| ids.contains(&id))
        .unwrap_or(false)
}

async fn within_dispatch<F: Future>(id: Uuid, chain: F) -> F::Output {
    let mut ids = DISPATCHING.try_with(Vec::clone).unwrap_or_default();
    ids.push(id);
    DISPATCHING.scope(ids, chain).await
}

impl<S: State, A: EventArg> Fsm<S, A> {
    /// Dispatch `event` with `args` and return the state the machine settles in.
    ///
    /// Unregistered events are accepted and leave the state unchanged.
    /// Dispatches on one machine are serialized: a second `send` waits until
    /// the chain in flight has fully settled. When every handler involved is
    /// synchronous the returned future completes on its first poll.
    ///
    /// # Errors
    ///
    /// - [`FsmError::Handler`] when a handler or hook fails. The chain is
    ///   abandoned with the state left at its last committed value and no
    ///   subscriber is notified.
    /// - [`FsmError::ReentrantDispatch`] when called from a handler running on
    ///   this same machine.
    pub async fn send(&self, event: &str, args: Vec<A>) -> FsmResult<S> {
        if dispatching(self.inner.id) {
            return Err(FsmError::ReentrantDispatch {
                event: event.to_string(),
            });
        }

        let _gate = self.inner.gate.lock().await;
        within_dispatch(self.inner.id, self.settle(event, args)).await
    }

    async fn settle(&self, event: &str, args: Vec<A>) -> FsmResult<S> {
        let origin = self.state();
        let mut chain = Chain::new(origin.clone(), self.inner.config.max_chain_length);
        let mut candidate = self.resolve_event(&origin, event, &args).await?;

        while let Some(next) = candidate.take() {
            if let Err(halt) = chain.admit(&next) {
                self.log_halt(&chain, &next, event, halt);
                break;
            }

            let from = chain.last().clone();
            let mut metadata = TransitionMetadata {
                from: Some(from.clone()),
                to: next,
                event: Some(event.to_string()),
                args: args.clone(),
            };

            match self.resolve_hook(&from, HookKind::Exit, &metadata).await {
                Ok(Some(redirect)) => {
                    debug!(
                        machine = %self.inner.id,
                        event,
                        requested = metadata.to.name(),
                        redirect = redirect.name(),
                        "exit hook redirected transition"
                    );
                    metadata.to = redirect;
                }
                Ok(None) => {}
                Err(error) => return self.abandon(&chain, error),
            }

            self.commit(from, &metadata.to, event);
            chain.push(metadata.to.clone());

            candidate = match self.resolve_hook(&metadata.to, HookKind::Enter, &metadata).await {
                Ok(redirect) => redirect,
                Err(error) => return self.abandon(&chain, error),
            };
        }

        if chain.changed() {
            self.inner.subscribers.notify(chain.last());
        }
        Ok(chain.last().clone())
    }

    /// Run the initial state's enter hook once, as if entering it from nowhere.
    /// A state it returns is ignored.
    pub(crate) async fn enter_initial(&self) -> FsmResult<()> {
        let initial = self.state();
        let metadata = TransitionMetadata::initial(initial.clone());
        let redirect = within_dispatch(
            self.inner.id,
            self.resolve_hook(&initial, HookKind::Enter, &metadata),
        )
        .await?;

        if let Some(ignored) = redirect {
            trace!(
                machine = %self.inner.id,
                state = initial.name(),
                ignored = ignored.name(),
                "initial enter hook result ignored"
            );
        }
        Ok(())
    }

    fn commit(&self, from: S, to: &S, event: &str) {
        *self.inner.state.write() = to.clone();
        debug!(
            machine = %self.inner.id,
            event,
            from = from.name(),
            to = to.name(),
            "transition committed"
        );

        let mut history = self.inner.history.lock();
        if history.is_enabled() {
            history.record(StateTransition {
                from,
                to: to.clone(),
                event: event.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    /// Give up on a chain after a handler failed. Hops already committed stay
    /// committed; subscribers are not notified for an abandoned chain.
    fn abandon(&self, chain: &Chain<S>, error: FsmError) -> FsmResult<S> {
        warn!(
            machine = %self.inner.id,
            event = error.event(),
            state = chain.last().name(),
            hops = chain.hops(),
            %error,
            "transition abandoned"
        );
        Err(error)
    }

    fn log_halt(&self, chain: &Chain<S>, candidate: &S, event: &str, halt: Halt) {
        match halt {
            Halt::Unchanged => trace!(
                machine = %self.inner.id,
                event,
                state = candidate.name(),
                "already in requested state"
            ),
            Halt::Revisited => warn!(
                machine = %self.inner.id,
                event,
                state = candidate.name(),
                hops = chain.hops(),
                "redirect loop halted"
            ),
            Halt::TooLong => warn!(
                machine = %self.inner.id,
                event,
                state = candidate.name(),
                limit = self.inner.config.max_chain_length,
                "chain length limit reached"
            ),
        }
    }
}
