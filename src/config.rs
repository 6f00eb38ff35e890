//! Machine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Wait applied by `debounce_default` when no explicit wait is given.
pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(100);

/// Maximum number of states a single chain may visit, origin included.
pub const DEFAULT_MAX_CHAIN_LENGTH: usize = 64;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{name} is not a valid value: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Tunables for a machine.
///
/// # Example
///
/// ```rust
/// use fsm_store::MachineConfig;
/// use std::time::Duration;
///
/// let config = MachineConfig::from_json(r#"{ "debounce_wait": 250 }"#).unwrap();
/// assert_eq!(config.debounce_wait, Duration::from_millis(250));
/// assert_eq!(config.max_chain_length, 64);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Default debounce wait, in milliseconds when serialized
    #[serde(with = "millis")]
    pub debounce_wait: Duration,

    /// Cap on the number of states one event's chain may visit
    pub max_chain_length: usize,

    /// Number of committed transitions to keep; zero disables history
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            debounce_wait: DEFAULT_DEBOUNCE_WAIT,
            max_chain_length: DEFAULT_MAX_CHAIN_LENGTH,
            history_capacity: 0,
        }
    }
}

impl MachineConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// Environment variables:
    /// - FSM_DEBOUNCE_WAIT_MS: default debounce wait (default: 100)
    /// - FSM_MAX_CHAIN_LENGTH: chain length cap (default: 64)
    /// - FSM_HISTORY_CAPACITY: transitions to retain (default: 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(ms) = env_number("FSM_DEBOUNCE_WAIT_MS")? {
            config.debounce_wait = Duration::from_millis(ms as u64);
        }
        if let Some(length) = env_number("FSM_MAX_CHAIN_LENGTH")? {
            config.max_chain_length = length;
        }
        if let Some(capacity) = env_number("FSM_HISTORY_CAPACITY")? {
            config.history_capacity = capacity;
        }

        config.validate()
    }

    /// A chain needs room for its origin and at least one hop.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_chain_length < 2 {
            return Err(ConfigError::InvalidValue {
                name: "max_chain_length",
                value: self.max_chain_length.to_string(),
            });
        }
        Ok(self)
    }

    pub fn with_debounce_wait(mut self, wait: Duration) -> Self {
        self.debounce_wait = wait;
        self
    }

    pub fn with_max_chain_length(mut self, length: usize) -> Self {
        self.max_chain_length = length;
        self
    }

    pub fn with_history(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}

fn env_number(name: &'static str) -> Result<Option<usize>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value: raw }),
        Err(_) => Ok(None),
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
