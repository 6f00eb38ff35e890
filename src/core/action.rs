//! Actions, lifecycle hooks and the per-state action set.

use super::metadata::TransitionMetadata;
use super::state::{EventArg, State};
use crate::machine::Fsm;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Error type returned by failing handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Normalized result of running a handler: the next state, or `None` for
/// "no transition".
pub type Outcome<S> = Result<Option<S>, HandlerError>;

/// Conversion of a handler's return value into an [`Outcome`].
///
/// `()` and `None` both mean "stay where you are". Fallible handlers return
/// `Result`, and their error surfaces from the dispatch call.
pub trait IntoOutcome<S> {
    fn into_outcome(self) -> Outcome<S>;
}

impl<S> IntoOutcome<S> for () {
    fn into_outcome(self) -> Outcome<S> {
        Ok(None)
    }
}

impl<S> IntoOutcome<S> for Option<S> {
    fn into_outcome(self) -> Outcome<S> {
        Ok(self)
    }
}

impl<S, E> IntoOutcome<S> for Result<Option<S>, E>
where
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Outcome<S> {
        self.map_err(Into::into)
    }
}

impl<S, E> IntoOutcome<S> for Result<(), E>
where
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> Outcome<S> {
        self.map(|_| None).map_err(Into::into)
    }
}

type SyncAction<S, A> = Arc<dyn Fn(&Fsm<S, A>, &[A]) -> Outcome<S> + Send + Sync>;
type AsyncAction<S, A> =
    Arc<dyn Fn(Fsm<S, A>, Vec<A>) -> BoxFuture<'static, Outcome<S>> + Send + Sync>;
type SyncHook<S, A> =
    Arc<dyn Fn(&Fsm<S, A>, &TransitionMetadata<S, A>) -> Outcome<S> + Send + Sync>;
type AsyncHook<S, A> = Arc<
    dyn Fn(Fsm<S, A>, TransitionMetadata<S, A>) -> BoxFuture<'static, Outcome<S>> + Send + Sync,
>;

/// How an event is handled in a given state.
///
/// Callables receive the machine handle as their first parameter so they can
/// read its state, subscribe, or schedule debounced events.
pub enum Action<S: State, A: EventArg> {
    /// Unconditional transition to a fixed state
    Target(S),
    /// Synchronous handler computing the next state
    Call(SyncAction<S, A>),
    /// Asynchronous handler; the chain suspends until it settles
    Async(AsyncAction<S, A>),
}

impl<S: State, A: EventArg> Action<S, A> {
    /// Transition to `target` whenever the event fires.
    pub fn target(target: impl Into<S>) -> Self {
        Action::Target(target.into())
    }

    /// Compute the next state synchronously.
    pub fn call<F, R>(handler: F) -> Self
    where
        F: Fn(&Fsm<S, A>, &[A]) -> R + Send + Sync + 'static,
        R: IntoOutcome<S>,
    {
        Action::Call(Arc::new(move |fsm, args| handler(fsm, args).into_outcome()))
    }

    /// Compute the next state asynchronously.
    pub fn call_async<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(Fsm<S, A>, Vec<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome<S>,
    {
        Action::Async(Arc::new(move |fsm, args| {
            let pending = handler(fsm, args);
            async move { pending.await.into_outcome() }.boxed()
        }))
    }
}

impl<S: State, A: EventArg> Clone for Action<S, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Target(target) => Self::Target(target.clone()),
            Self::Call(handler) => Self::Call(Arc::clone(handler)),
            Self::Async(handler) => Self::Async(Arc::clone(handler)),
        }
    }
}

impl<S: State, A: EventArg> fmt::Debug for Action<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(target) => f.debug_tuple("Target").field(target).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// Which lifecycle slot a hook occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    Enter,
    Exit,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enter => f.write_str("_enter"),
            Self::Exit => f.write_str("_exit"),
        }
    }
}

/// A lifecycle hook run around a transition.
///
/// An exit hook that yields a state redirects the transition in progress;
/// an enter hook that yields a state starts a further hop.
pub enum Hook<S: State, A: EventArg> {
    Target(S),
    Call(SyncHook<S, A>),
    Async(AsyncHook<S, A>),
}

impl<S: State, A: EventArg> Clone for Hook<S, A> {
    fn clone(&self) -> Self {
        match self {
            Self::Target(target) => Self::Target(target.clone()),
            Self::Call(hook) => Self::Call(Arc::clone(hook)),
            Self::Async(hook) => Self::Async(Arc::clone(hook)),
        }
    }
}

impl<S: State, A: EventArg> fmt::Debug for Hook<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target(target) => f.debug_tuple("Target").field(target).finish(),
            Self::Call(_) => f.write_str("Call(..)"),
            Self::Async(_) => f.write_str("Async(..)"),
        }
    }
}

/// Event handlers and lifecycle hooks for one state.
///
/// # Example
///
/// ```rust
/// use fsm_store::core::ActionSet;
/// use serde_json::Value;
///
/// let off: ActionSet<String, Value> = ActionSet::new()
///     .on("toggle", "on")
///     .call("kick", |_fsm, args| {
///         (args.first() == Some(&Value::from("hard"))).then(|| "on".to_string())
///     })
///     .on_exit(|_fsm, meta| {
///         println!("leaving for {}", meta.to);
///     });
///
/// assert!(off.get("toggle").is_some());
/// assert!(off.get("noop").is_none());
/// ```
pub struct ActionSet<S: State, A: EventArg = Value> {
    actions: HashMap<String, Action<S, A>>,
    on_enter: Option<Hook<S, A>>,
    on_exit: Option<Hook<S, A>>,
}

impl<S: State, A: EventArg> ActionSet<S, A> {
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
            on_enter: None,
            on_exit: None,
        }
    }

    /// Register an action for `event`, replacing any previous one.
    pub fn action(mut self, event: impl Into<String>, action: Action<S, A>) -> Self {
        self.actions.insert(event.into(), action);
        self
    }

    /// Transition unconditionally to `target` on `event`.
    pub fn on(self, event: impl Into<String>, target: impl Into<S>) -> Self {
        self.action(event, Action::target(target))
    }

    /// Handle `event` with a synchronous callable.
    pub fn call<F, R>(self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Fsm<S, A>, &[A]) -> R + Send + Sync + 'static,
        R: IntoOutcome<S>,
    {
        self.action(event, Action::call(handler))
    }

    /// Handle `event` with an asynchronous callable.
    pub fn call_async<F, Fut, R>(self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Fsm<S, A>, Vec<A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome<S>,
    {
        self.action(event, Action::call_async(handler))
    }

    pub fn on_enter<F, R>(mut self, hook: F) -> Self
    where
        F: Fn(&Fsm<S, A>, &TransitionMetadata<S, A>) -> R + Send + Sync + 'static,
        R: IntoOutcome<S>,
    {
        self.on_enter = Some(Hook::Call(Arc::new(move |fsm, meta| {
            hook(fsm, meta).into_outcome()
        })));
        self
    }

    pub fn on_enter_async<F, Fut, R>(mut self, hook: F) -> Self
    where
        F: Fn(Fsm<S, A>, TransitionMetadata<S, A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome<S>,
    {
        self.on_enter = Some(Hook::Async(Arc::new(move |fsm, meta| {
            let pending = hook(fsm, meta);
            async move { pending.await.into_outcome() }.boxed()
        })));
        self
    }

    /// Entering this state immediately moves on to `target`.
    pub fn enter_to(mut self, target: impl Into<S>) -> Self {
        self.on_enter = Some(Hook::Target(target.into()));
        self
    }

    pub fn on_exit<F, R>(mut self, hook: F) -> Self
    where
        F: Fn(&Fsm<S, A>, &TransitionMetadata<S, A>) -> R + Send + Sync + 'static,
        R: IntoOutcome<S>,
    {
        self.on_exit = Some(Hook::Call(Arc::new(move |fsm, meta| {
            hook(fsm, meta).into_outcome()
        })));
        self
    }

    pub fn on_exit_async<F, Fut, R>(mut self, hook: F) -> Self
    where
        F: Fn(Fsm<S, A>, TransitionMetadata<S, A>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoOutcome<S>,
    {
        self.on_exit = Some(Hook::Async(Arc::new(move |fsm, meta| {
            let pending = hook(fsm, meta);
            async move { pending.await.into_outcome() }.boxed()
        })));
        self
    }

    /// Leaving this state always lands in `target`, whatever the event asked for.
    pub fn exit_to(mut self, target: impl Into<S>) -> Self {
        self.on_exit = Some(Hook::Target(target.into()));
        self
    }

    /// Look up the handler registered for `event`.
    pub fn get(&self, event: &str) -> Option<&Action<S, A>> {
        self.actions.get(event)
    }

    /// Look up a lifecycle hook.
    pub fn hook(&self, kind: HookKind) -> Option<&Hook<S, A>> {
        match kind {
            HookKind::Enter => self.on_enter.as_ref(),
            HookKind::Exit => self.on_exit.as_ref(),
        }
    }

    /// Names of all events handled by this set.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.on_enter.is_none() && self.on_exit.is_none()
    }
}

impl<S: State, A: EventArg> Default for ActionSet<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, A: EventArg> Clone for ActionSet<S, A> {
    fn clone(&self) -> Self {
        Self {
            actions: self.actions.clone(),
            on_enter: self.on_enter.clone(),
            on_exit: self.on_exit.clone(),
        }
    }
}

impl<S: State, A: EventArg> fmt::Debug for ActionSet<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSet")
            .field("actions", &self.actions)
            .field("on_enter", &self.on_enter)
            .field("on_exit", &self.on_exit)
            .finish()
    }
}
