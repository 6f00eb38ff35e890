//! Builder for constructing machines.

use crate::builder::error::BuildError;
use crate::config::MachineConfig;
use crate::core::{ActionSet, EventArg, State, StateTable};
use crate::machine::Fsm;
use serde_json::Value;

/// Builder for constructing machines with a fluent API.
///
/// # Example
///
/// ```rust
/// use fsm_store::{ActionSet, MachineBuilder, MachineConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fsm = MachineBuilder::<String>::new("off")
///     .state("off", ActionSet::new().on("toggle", "on"))
///     .state("on", ActionSet::new().on("toggle", "off"))
///     .config(MachineConfig::default().with_history(16))
///     .build()
///     .await
///     .unwrap();
///
/// assert_eq!(fsm.send("toggle", vec![]).await.unwrap(), "on");
/// # }
/// ```
pub struct MachineBuilder<S: State, A: EventArg = Value> {
    initial: S,
    table: StateTable<S, A>,
    config: MachineConfig,
}

impl<S: State, A: EventArg> MachineBuilder<S, A> {
    /// Start a builder for a machine beginning in `initial`.
    pub fn new(initial: impl Into<S>) -> Self {
        Self {
            initial: initial.into(),
            table: StateTable::new(),
            config: MachineConfig::default(),
        }
    }

    /// Add the action set for one state.
    pub fn state(mut self, state: impl Into<S>, actions: ActionSet<S, A>) -> Self {
        self.table = self.table.state(state, actions);
        self
    }

    /// Set the wildcard action set consulted when a state lacks a handler.
    pub fn fallback(mut self, actions: ActionSet<S, A>) -> Self {
        self.table = self.table.fallback(actions);
        self
    }

    /// Replace the whole table.
    pub fn table(mut self, table: StateTable<S, A>) -> Self {
        self.table = table;
        self
    }

    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate, construct the machine and run the initial enter hook.
    pub async fn build(self) -> Result<Fsm<S, A>, BuildError> {
        Fsm::with_config(self.initial, self.table, self.config).await
    }
}
