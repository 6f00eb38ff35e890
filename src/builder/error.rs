//! Errors raised while building a machine.

use crate::config::ConfigError;
use crate::error::FsmError;
use thiserror::Error;

/// Errors that can occur when building a machine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Initial state '{state}' has no action set and the table has no fallback")]
    UnknownInitialState { state: String },

    #[error("Invalid machine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("Enter hook of the initial state failed")]
    InitialEnter(#[source] FsmError),
}
