//! Session configuration.
//!
//! Paths default to the conventional FIFO names used by the simulator
//! bench. A configuration can be read from JSON or from the environment:
//!
//! | variable          | field        |
//! |-------------------|--------------|
//! | `ZBUS_OUTPUT`     | `output`     |
//! | `ZBUS_INPUT`      | `input`      |
//! | `ZBUS_POLL_LIMIT` | `poll_limit` |
//!
//! # Example
//!
//! ```
//! use zbus_cosim::SessionConfig;
//!
//! let config = SessionConfig::from_json(r#"{ "poll_limit": 16 }"#).unwrap();
//! assert_eq!(config.poll_limit, Some(16));
//! assert_eq!(config.output, SessionConfig::default().output);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CosimError, Result};

/// Default path of the master-to-simulator FIFO.
pub const DEFAULT_OUTPUT_PATH: &str = "tmp/interface-o.fifo";

/// Default path of the simulator-to-master FIFO.
pub const DEFAULT_INPUT_PATH: &str = "tmp/interface-i.fifo";

/// Environment variable overriding [`SessionConfig::output`].
pub const ENV_OUTPUT: &str = "ZBUS_OUTPUT";
/// Environment variable overriding [`SessionConfig::input`].
pub const ENV_INPUT: &str = "ZBUS_INPUT";
/// Environment variable overriding [`SessionConfig::poll_limit`].
pub const ENV_POLL_LIMIT: &str = "ZBUS_POLL_LIMIT";

/// Where the session's FIFOs live and how long polling may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// FIFO the bus master writes frames to.
    pub output: PathBuf,
    /// FIFO the bus master reads frames from.
    pub input: PathBuf,
    /// Upper bound on polling cycles per wait; `None` waits forever.
    ///
    /// Meant for test harnesses only.
    pub poll_limit: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT_PATH),
            input: PathBuf::from(DEFAULT_INPUT_PATH),
            poll_limit: None,
        }
    }
}

impl SessionConfig {
    /// Create a configuration with explicit paths and no poll limit.
    pub fn new(output: impl Into<PathBuf>, input: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            input: input.into(),
            poll_limit: None,
        }
    }

    /// Set the polling bound.
    pub fn with_poll_limit(mut self, limit: u64) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Defaults overridden by `ZBUS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(output) = lookup(ENV_OUTPUT) {
            config.output = output.into();
        }
        if let Some(input) = lookup(ENV_INPUT) {
            config.input = input.into();
        }
        if let Some(limit) = lookup(ENV_POLL_LIMIT) {
            let parsed = limit.trim().parse::<u64>().map_err(|_| {
                CosimError::Protocol(format!("{ENV_POLL_LIMIT} is not a cycle count: {limit:?}"))
            })?;
            config.poll_limit = Some(parsed);
        }
        Ok(config)
    }
}
