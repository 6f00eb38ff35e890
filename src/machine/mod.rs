//! The runtime: a machine handle that dispatches events and notifies
//! subscribers.
//!
//! # Key Concepts
//!
//! - **Dispatch**: [`Fsm::send`] resolves an event against the current state,
//!   runs exit/enter hooks and follows redirects until the chain settles
//! - **Store contract**: [`Fsm::subscribe`] replays the current state and
//!   then reports every net change
//! - **Debounce**: [`Fsm::debounce`] delays and coalesces repeated events

mod debounce;
mod engine;
mod resolver;
mod subscription;
mod timers;

pub use debounce::{Debounced, EventInvoker};
pub use subscription::Unsubscribe;

use crate::builder::BuildError;
use crate::config::MachineConfig;
use crate::core::{EventArg, State, StateHistory, StateTable};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use subscription::SubscriberRegistry;
use timers::TimerRegistry;
use uuid::Uuid;

/// Handle to a running state machine.
///
/// Handles are cheap to clone; every clone drives the same machine. Handlers
/// receive a handle as their first parameter.
///
/// # Example
///
/// ```rust
/// use fsm_store::{ActionSet, Fsm, StateTable};
/// use futures::FutureExt;
///
/// let table = StateTable::new()
///     .state("off", ActionSet::new().on("toggle", "on"))
///     .state("on", ActionSet::new().on("toggle", "off"));
///
/// // Chains made of synchronous handlers settle on first poll.
/// let fsm: Fsm<String> = Fsm::new("off", table).now_or_never().unwrap().unwrap();
/// let state = fsm.send("toggle", vec![]).now_or_never().unwrap().unwrap();
/// assert_eq!(state, "on");
/// ```
pub struct Fsm<S: State, A: EventArg = Value> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S: State, A: EventArg> {
    id: Uuid,
    state: RwLock<S>,
    table: StateTable<S, A>,
    subscribers: Arc<SubscriberRegistry<S>>,
    timers: TimerRegistry,
    gate: tokio::sync::Mutex<()>,
    history: Mutex<StateHistory<S>>,
    config: MachineConfig,
}

impl<S: State, A: EventArg> Fsm<S, A> {
    /// Build a machine with default configuration.
    ///
    /// Runs the initial state's enter hook before returning.
    pub async fn new(initial: impl Into<S>, table: StateTable<S, A>) -> Result<Self, BuildError> {
        Self::with_config(initial.into(), table, MachineConfig::default()).await
    }

    pub(crate) async fn with_config(
        initial: S,
        table: StateTable<S, A>,
        config: MachineConfig,
    ) -> Result<Self, BuildError> {
        let config = config.validate()?;
        if !table.accepts(&initial) {
            return Err(BuildError::UnknownInitialState {
                state: initial.name().to_string(),
            });
        }

        let fsm = Self {
            inner: Arc::new(Inner {
                id: Uuid::new_v4(),
                state: RwLock::new(initial),
                table,
                subscribers: Arc::new(SubscriberRegistry::new()),
                timers: TimerRegistry::new(),
                gate: tokio::sync::Mutex::new(()),
                history: Mutex::new(StateHistory::with_capacity(config.history_capacity)),
                config,
            }),
        };

        fsm.enter_initial().await.map_err(BuildError::InitialEnter)?;
        Ok(fsm)
    }

    /// The last committed state.
    ///
    /// While an asynchronous chain is suspended this is the most recent state
    /// the chain has committed to.
    pub fn state(&self) -> S {
        self.inner.state.read().clone()
    }

    /// Unique identifier of this machine, used in log output.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn config(&self) -> &MachineConfig {
        &self.inner.config
    }

    pub fn table(&self) -> &StateTable<S, A> {
        &self.inner.table
    }

    /// Snapshot of the recorded transition history.
    pub fn history(&self) -> StateHistory<S> {
        self.inner.history.lock().clone()
    }

    /// Event names known to the state table.
    pub fn events(&self) -> Vec<String> {
        self.inner.table.event_names()
    }
}

impl<S: State, A: EventArg> Clone for Fsm<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: State, A: EventArg> fmt::Debug for Fsm<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fsm")
            .field("id", &self.inner.id)
            .field("state", &self.state())
            .field("subscribers", &self.inner.subscribers.len())
            .field("pending_timers", &self.inner.timers.len())
            .finish()
    }
}
