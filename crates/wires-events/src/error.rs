//! Error types for the event system.
//!
//! The engine itself has a single failure mode: a listener returning
//! `Err` while an event is being dispatched. That error is handed back
//! from `trigger` exactly as the listener produced it, so it is modelled
//! as an opaque boxed error rather than a crate-defined enum.
//!
//! Configuration loading has its own typed error, [`ConfigError`].

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by a listener.
///
/// `trigger` never wraps or translates it: callers can downcast it back
/// to the concrete type the listener returned.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by every listener invocation.
pub type ListenerResult = Result<(), ListenerError>;

/// Failure while building an [`EmitterConfig`](crate::EmitterConfig).
///
/// Each variant names the layer that failed: the TOML file (or inline
/// document) and the `WIRES_EVENTS_*` environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The emitter config file exists but could not be read.
    #[error("cannot read emitter config {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The emitter config is not valid TOML or has a mistyped field.
    /// `path` is `<inline>` for [`EmitterConfig::from_toml_str`](crate::EmitterConfig::from_toml_str).
    #[error("invalid emitter config {}: {source}", .path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment override could not be parsed.
    #[error("environment override {name} rejected: {message}")]
    InvalidEnvVar { name: String, message: String },
}

impl ConfigError {
    pub(crate) fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_env_var(name: &str, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Returns the config file involved, if the failure came from the
    /// file layer.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::ReadFile { path, .. } | Self::ParseToml { path, .. } => Some(path.as_path()),
            Self::InvalidEnvVar { .. } => None,
        }
    }
}
