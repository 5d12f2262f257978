//! Crate-level error type.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while configuring or running a metric server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Structurally invalid configuration, reported at construction time.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The listener could not be bound (address in use, permission denied,
    /// malformed address or TLS credential).
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// Address the bind was attempted on.
        addr: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Registering the default collectors failed for a reason other than
    /// the collectors already being present.
    #[error("registry error: {0}")]
    Registry(#[from] prometheus::Error),

    /// The configuration file could not be turned into options.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ServerError {
    pub(crate) fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }
}
