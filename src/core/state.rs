//! Core State trait for machine states.
//!
//! A state is an opaque, comparable identifier. Two states are the same
//! state exactly when they compare equal; the machine never inspects their
//! structure beyond that.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// Trait for state machine states.
///
/// # Required Traits
///
/// - `Clone`: states are copied into transition metadata and chains
/// - `Eq` + `Hash`: states key the state table
/// - `Debug`: states must be debuggable for diagnostics
/// - `Serialize` + `Deserialize`: states appear in serialized history
///
/// `String` implements `State` out of the box. Enums usually get it from the
/// [`state_enum!`](crate::state_enum) macro.
///
/// # Example
///
/// ```rust
/// use fsm_store::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
/// enum Door {
///     Open,
///     Closed,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Open => "Open",
///             Self::Closed => "Closed",
///         }
///     }
/// }
///
/// assert_eq!(Door::Open.name(), "Open");
/// assert_eq!("on".to_string().name(), "on");
/// ```
pub trait State:
    Clone + Eq + Hash + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

impl State for String {
    fn name(&self) -> &str {
        self.as_str()
    }
}

/// Marker for values that can be passed as event arguments.
///
/// Blanket-implemented; the machine defaults to [`serde_json::Value`] so
/// argument lists can mix numbers, strings and objects.
pub trait EventArg: Clone + Debug + Send + Sync + 'static {}

impl<T> EventArg for T where T: Clone + Debug + Send + Sync + 'static {}
