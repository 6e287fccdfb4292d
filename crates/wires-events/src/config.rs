//! Emitter configuration.
//!
//! # Load Order
//!
//! 1. Default values
//! 2. TOML file ([`EmitterConfig::load`]) or string ([`EmitterConfig::from_toml_str`])
//! 3. Environment variables ([`EmitterConfig::apply_env`])
//!
//! Each layer overrides the previous.
//!
//! # Example TOML
//!
//! ```toml
//! max_listeners = 10
//! trace_dispatch = true
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field | Type |
//! |----------|-------|------|
//! | `WIRES_EVENTS_MAX_LISTENERS` | `max_listeners` | integer |
//! | `WIRES_EVENTS_TRACE_DISPATCH` | `trace_dispatch` | bool |

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Environment variable overriding [`EmitterConfig::max_listeners`].
pub const ENV_MAX_LISTENERS: &str = "WIRES_EVENTS_MAX_LISTENERS";

/// Environment variable overriding [`EmitterConfig::trace_dispatch`].
pub const ENV_TRACE_DISPATCH: &str = "WIRES_EVENTS_TRACE_DISPATCH";

/// Per-host emitter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Listener count per event above which a possible leak is logged.
    /// `0` disables the check.
    pub max_listeners: usize,

    /// Log every dispatch at `debug` instead of `trace`.
    pub trace_dispatch: bool,
}

impl EmitterConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseToml`] if the document is invalid.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::parse_toml("<inline>", e))
    }

    /// Loads a TOML file. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or
    /// parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "emitter config not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))?;
        debug!(path = %path.display(), "loaded emitter config");
        Ok(config)
    }

    /// Applies overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] on an unparsable value.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Applies overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnvVar`] on an unparsable value.
    pub fn apply_env_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(val) = lookup(ENV_MAX_LISTENERS) {
            self.max_listeners = val
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env_var(ENV_MAX_LISTENERS, "expected integer"))?;
        }
        if let Some(val) = lookup(ENV_TRACE_DISPATCH) {
            self.trace_dispatch = parse_bool(&val)
                .ok_or_else(|| ConfigError::invalid_env_var(ENV_TRACE_DISPATCH, "expected bool"))?;
        }
        Ok(self)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
