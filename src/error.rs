//! Error types for connection setup.
//!
//! Startup configuration problems are reported before any process is started
//! or socket opened; connection problems happen while establishing the
//! transport. [`BridgeError`] is what the top-level entry points return.

use std::fmt;

use thiserror::Error;

use crate::connector::ConnectionMode;

// ============================================================================
// Configuration Errors
// ============================================================================

/// The requested startup options cannot be turned into a connection request.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// More than one of `--embed`, `--server` and `--spawn` was given.
    #[error("connection modes {} are mutually exclusive", ModeList(.0))]
    AmbiguousConnectionMode(Vec<ConnectionMode>),

    /// Arguments were combined in a way the selected mode does not accept.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

struct ModeList<'a>(&'a [ConnectionMode]);

impl fmt::Display for ModeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mode) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{mode}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Connection Errors
// ============================================================================

/// The transport to the editor core could not be established.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The editor process could not be started.
    #[error("failed to start '{program}': {source}")]
    SpawnFailure {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Embedded mode was requested but standard input/output cannot carry RPC traffic.
    #[error("standard input/output unavailable for RPC: {0}")]
    TransportUnavailable(String),

    /// The server address was malformed, unreachable or refused the connection.
    #[error("cannot connect to '{address}': {reason}")]
    ConnectFailure { address: String, reason: String },
}

// ============================================================================
// Top-level
// ============================================================================

/// Any failure that prevents the bridge from reaching a connected state.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguous_mode_lists_every_mode() {
        let err = ConfigurationError::AmbiguousConnectionMode(vec![
            ConnectionMode::Embed,
            ConnectionMode::ServerAttach,
        ]);
        assert_eq!(
            err.to_string(),
            "connection modes --embed, --server are mutually exclusive"
        );
    }

    #[test]
    fn test_bridge_error_is_transparent() {
        let err: BridgeError = ConnectionError::TransportUnavailable("stdin is a terminal".into()).into();
        assert_eq!(
            err.to_string(),
            "standard input/output unavailable for RPC: stdin is a terminal"
        );
    }
}
