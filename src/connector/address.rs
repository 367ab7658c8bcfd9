//! Parsing `--server` addresses.

use std::fmt;
use std::path::PathBuf;

use crate::error::ConnectionError;

/// A parsed server address.
///
/// `host:port` with a valid non-zero port selects TCP. Anything else is a
/// local socket path (a named pipe on Windows), so `nvim.sock` and
/// `host:notaport` both name sockets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddress {
    Tcp { host: String, port: u16 },
    Local(PathBuf),
}

impl ServerAddress {
    /// Parse `address`. Only empty input is rejected.
    pub fn parse(address: &str) -> Result<Self, ConnectionError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(ConnectionError::ConnectFailure {
                address: address.to_string(),
                reason: "empty address".to_string(),
            });
        }

        Ok(tcp_endpoint(trimmed).unwrap_or_else(|| ServerAddress::Local(PathBuf::from(trimmed))))
    }
}

fn tcp_endpoint(address: &str) -> Option<ServerAddress> {
    let (host, port) = address.rsplit_once(':')?;
    let port = port.parse::<u16>().ok().filter(|p| *p != 0)?;
    // Bracketed IPv6 literal, e.g. [::1]:6666
    let host = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() || host.contains(['/', '\\']) {
        return None;
    }
    Some(ServerAddress::Tcp {
        host: host.to_string(),
        port,
    })
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddress::Tcp { host, port } if host.contains(':') => write!(f, "[{host}]:{port}"),
            ServerAddress::Tcp { host, port } => write!(f, "{host}:{port}"),
            ServerAddress::Local(path) => write!(f, "{}", path.display()),
        }
    }
}
