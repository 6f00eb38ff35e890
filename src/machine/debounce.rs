//! Debounced dispatch and per-event invokers.

use super::engine::dispatching;
use super::Fsm;
use crate::core::{EventArg, State};
use crate::error::{FsmError, FsmResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

enum Pending<S> {
    Settled(Option<FsmResult<S>>),
    Scheduled(oneshot::Receiver<FsmResult<S>>),
}

/// The eventual result of a debounced event.
///
/// Resolves with the state the dispatch settled in. A handle whose timer was
/// superseded by a later call, or cancelled with a `None` wait, resolves with
/// the machine's current state instead and never dispatches.
///
/// The timer is scheduled when `debounce` is called; dropping this handle
/// does not cancel it.
#[must_use = "the debounced event fires regardless; await the handle to observe its result"]
pub struct Debounced<S: State, A: EventArg> {
    fsm: Fsm<S, A>,
    pending: Pending<S>,
}

impl<S: State, A: EventArg> Debounced<S, A> {
    fn settled(fsm: Fsm<S, A>, result: FsmResult<S>) -> Self {
        Self {
            fsm,
            pending: Pending::Settled(Some(result)),
        }
    }

    fn scheduled(fsm: Fsm<S, A>, receiver: oneshot::Receiver<FsmResult<S>>) -> Self {
        Self {
            fsm,
            pending: Pending::Scheduled(receiver),
        }
    }
}

// Nothing is structurally pinned, so this holds for any `S`.
impl<S: State, A: EventArg> Unpin for Debounced<S, A> {}

impl<S: State, A: EventArg> Future for Debounced<S, A> {
    type Output = FsmResult<S>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &mut this.pending {
            Pending::Settled(result) => {
                Poll::Ready(result.take().unwrap_or_else(|| Ok(this.fsm.state())))
            }
            Pending::Scheduled(receiver) => match ready!(Pin::new(receiver).poll(cx)) {
                Ok(result) => Poll::Ready(result),
                Err(_) => Poll::Ready(Ok(this.fsm.state())),
            },
        }
    }
}

impl<S: State, A: EventArg> Fsm<S, A> {
    /// Dispatch `event` after `wait`, unless called again for the same event
    /// first.
    ///
    /// Each call cancels the timer pending for `event` and starts a new one,
    /// so a burst of calls produces one dispatch with the last call's
    /// arguments, `wait` after that call. A `wait` of `None` only cancels and
    /// resolves immediately with the current state. Timers of different
    /// events are independent.
    ///
    /// Must be called from within a Tokio runtime; otherwise the handle
    /// resolves to [`FsmError::NoRuntime`]. Waits too large to represent
    /// are clamped to roughly thirty years.
    ///
    /// Called from a handler running on this same machine, the timer is
    /// still scheduled but the handle resolves immediately with the current
    /// state, since the dispatch it would wait for cannot start until the
    /// running chain settles.
    pub fn debounce(&self, event: &str, wait: Option<Duration>, args: Vec<A>) -> Debounced<S, A> {
        let Some(wait) = wait else {
            if self.inner.timers.cancel(event) {
                debug!(machine = %self.inner.id, event, "debounced event cancelled");
            }
            return Debounced::settled(self.clone(), Ok(self.state()));
        };

        let Ok(runtime) = Handle::try_current() else {
            return Debounced::settled(
                self.clone(),
                Err(FsmError::NoRuntime {
                    event: event.to_string(),
                }),
            );
        };

        let now = Instant::now();
        let deadline = now
            .checked_add(wait)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let (sender, receiver) = oneshot::channel();
        let fsm = self.clone();
        let key = event.to_string();

        let superseded = self.inner.timers.replace(event, &runtime, move |id| async move {
            sleep_until(deadline).await;
            if !fsm.inner.timers.claim(&key, id) {
                return;
            }
            let result = fsm.send(&key, args).await;
            let _ = sender.send(result);
        });

        debug!(
            machine = %self.inner.id,
            event,
            wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
            superseded,
            "debounced event scheduled"
        );

        if dispatching(self.inner.id) {
            return Debounced::settled(self.clone(), Ok(self.state()));
        }
        Debounced::scheduled(self.clone(), receiver)
    }

    /// Whether a debounced dispatch of `event` is waiting to fire.
    pub fn is_debouncing(&self, event: &str) -> bool {
        self.inner.timers.is_pending(event)
    }

    /// Handle for invoking a single event by name.
    ///
    /// Any name is accepted; names without handlers simply never transition.
    pub fn event(&self, name: impl Into<String>) -> EventInvoker<S, A> {
        EventInvoker {
            fsm: self.clone(),
            name: name.into(),
        }
    }
}

/// A named event bound to a machine, with direct and debounced invocation.
///
/// # Example
///
/// ```rust
/// use fsm_store::{ActionSet, Fsm, StateTable};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let table = StateTable::new().state("idle", ActionSet::new().on("search", "searching"));
/// let fsm: Fsm<String> = Fsm::new("idle", table).await.unwrap();
///
/// let search = fsm.event("search");
/// let pending = search.debounce(Some(Duration::from_millis(10)), vec![]);
/// assert_eq!(pending.await.unwrap(), "searching");
/// # }
/// ```
pub struct EventInvoker<S: State, A: EventArg> {
    fsm: Fsm<S, A>,
    name: String,
}

impl<S: State, A: EventArg> EventInvoker<S, A> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dispatch the event now.
    pub async fn call(&self, args: Vec<A>) -> FsmResult<S> {
        self.fsm.send(&self.name, args).await
    }

    /// Dispatch the event after `wait`; see [`Fsm::debounce`].
    pub fn debounce(&self, wait: Option<Duration>, args: Vec<A>) -> Debounced<S, A> {
        self.fsm.debounce(&self.name, wait, args)
    }

    /// Debounce with the machine's configured default wait.
    pub fn debounce_default(&self, args: Vec<A>) -> Debounced<S, A> {
        let wait = self.fsm.config().debounce_wait;
        self.debounce(Some(wait), args)
    }

    /// Cancel a pending debounced dispatch, resolving with the current state.
    pub fn cancel(&self) -> Debounced<S, A> {
        self.debounce(None, Vec::new())
    }
}

impl<S: State, A: EventArg> Clone for EventInvoker<S, A> {
    fn clone(&self) -> Self {
        Self {
            fsm: self.fsm.clone(),
            name: self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ActionSet, StateTable};
    use futures::FutureExt;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use std::sync::Arc;

    type Set = ActionSet<String, Value>;
    type Calls = Arc<Mutex<Vec<Vec<Value>>>>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    async fn kicker() -> (Fsm<String>, Calls) {
        let calls: Calls = Default::default();
        let sink = Arc::clone(&calls);
        let table = StateTable::new()
            .state(
                "off",
                Set::new().call("kick", move |_, args| {
                    sink.lock().push(args.to_vec());
                    (args.first() == Some(&json!("hard"))).then(|| "on".to_string())
                }),
            )
            .state("on", Set::new().on("toggle", "off"));
        (Fsm::new("off", table).await.unwrap(), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_wait_with_arguments() {
        let (fsm, calls) = kicker().await;
        let start = Instant::now();

        let state = fsm.debounce("kick", Some(ms(100)), vec![json!("hard")]).await;

        assert_eq!(state.unwrap(), "on");
        assert_eq!(start.elapsed(), ms(100));
        assert_eq!(*calls.lock(), vec![vec![json!("hard")]]);
        assert!(!fsm.is_debouncing("kick"));
    }

    #[tokio::test(start_paused = true)]
    async fn coalesces_calls_within_wait() {
        let (fsm, calls) = kicker().await;
        let start = Instant::now();

        let first = fsm.debounce("kick", Some(ms(100)), vec![json!(1)]);
        tokio::time::advance(ms(50)).await;
        let second = fsm.debounce("kick", Some(ms(100)), vec![json!(2)]);
        tokio::time::advance(ms(50)).await;
        assert!(calls.lock().is_empty());

        assert_eq!(second.await.unwrap(), "off");
        assert_eq!(start.elapsed(), ms(150));
        assert_eq!(*calls.lock(), vec![vec![json!(2)]]);

        // superseded handles settle with the current state
        assert_eq!(first.await.unwrap(), "off");
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn later_call_uses_its_own_wait() {
        let (fsm, calls) = kicker().await;
        let start = Instant::now();

        let _first = fsm.debounce("kick", Some(ms(100)), vec![json!(1)]);
        tokio::time::advance(ms(50)).await;
        let second = fsm.debounce("kick", Some(ms(10)), vec![json!(2)]);

        second.await.unwrap();
        assert_eq!(start.elapsed(), ms(60));
        assert_eq!(*calls.lock(), vec![vec![json!(2)]]);
    }

    #[tokio::test(start_paused = true)]
    async fn none_wait_cancels_pending_dispatch() {
        let (fsm, calls) = kicker().await;

        let kick = fsm.debounce("kick", Some(ms(100)), vec![json!("hard")]);
        let cancelled = fsm.debounce("kick", None, vec![]);
        assert_eq!(cancelled.await.unwrap(), "off");

        tokio::time::sleep(ms(500)).await;
        assert!(calls.lock().is_empty());
        assert_eq!(kick.await.unwrap(), "off");
        assert_eq!(fsm.state(), "off");
    }

    #[tokio::test(start_paused = true)]
    async fn events_debounce_independently() {
        let (fsm, calls) = kicker().await;

        let kick = fsm.debounce("kick", Some(ms(100)), vec![json!("hard")]);
        let _ = fsm.debounce("toggle", None, vec![]);
        assert!(fsm.is_debouncing("kick"));

        assert_eq!(kick.await.unwrap(), "on");
        assert_eq!(calls.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unawaited_handles_still_fire() {
        let (fsm, calls) = kicker().await;

        drop(fsm.debounce("kick", Some(ms(20)), vec![json!("hard")]));
        tokio::time::sleep(ms(30)).await;

        assert_eq!(calls.lock().len(), 1);
        assert_eq!(fsm.state(), "on");
    }

    #[tokio::test(start_paused = true)]
    async fn invoker_uses_configured_default_wait() {
        let (fsm, calls) = kicker().await;
        let kick = fsm.event("kick");
        let start = Instant::now();

        assert_eq!(kick.name(), "kick");
        kick.debounce_default(vec![]).await.unwrap();
        assert_eq!(start.elapsed(), fsm.config().debounce_wait);
        assert_eq!(calls.lock().len(), 1);

        assert_eq!(kick.call(vec![json!("hard")]).await.unwrap(), "on");
        assert_eq!(kick.cancel().await.unwrap(), "on");
    }

    #[tokio::test(start_paused = true)]
    async fn unrepresentable_wait_is_clamped() {
        let (fsm, calls) = kicker().await;

        let pending = fsm.debounce("kick", Some(Duration::MAX), vec![json!("hard")]);
        tokio::time::sleep(Duration::from_secs(86400)).await;

        assert!(fsm.is_debouncing("kick"));
        assert!(calls.lock().is_empty());
        assert_eq!(fsm.debounce("kick", None, vec![]).await.unwrap(), "off");
        assert_eq!(pending.await.unwrap(), "off");
    }

    #[test]
    fn debounce_outside_runtime_reports_error() {
        let (fsm, _) = kicker().now_or_never().unwrap();
        let result = fsm
            .debounce("kick", Some(ms(10)), vec![])
            .now_or_never()
            .unwrap();

        assert!(matches!(result, Err(FsmError::NoRuntime { .. })));
    }
}
