//! Connection parameter records
//!
//! `ConnectInfo` is set wholesale by the embedder before activation and
//! cleared wholesale on teardown; it is never partially mutated. The record
//! also carries the human-readable "pretty address" used in status and error
//! messages, recomputed whenever the parameters are set.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConnectError, ConnectResult};

/// How the viewer reaches the remote display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    /// Direct TCP connection made by the session backend itself
    DirectTcp,
    /// Direct connection to a local UNIX socket
    DirectUnix,
    /// Byte stream relayed through an ssh subprocess
    Ssh,
}

/// Relay (tunnel) endpoint parameters
///
/// The relay port is carried explicitly rather than being reset when
/// parameters are stored; `None` means "use the default ssh port (22)"
/// at command-build time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayInfo {
    /// Relay host running the ssh server
    pub host: String,
    /// Relay ssh port, defaulted to 22 when unset
    pub port: Option<u16>,
    /// Optional ssh username on the relay host
    pub user: Option<String>,
}

/// The endpoint the remote display actually listens on
///
/// Exactly one form exists per connection attempt; the two are mutually
/// exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetEndpoint {
    /// TCP endpoint; the port is kept as a string since it may be a
    /// service name resolved by the session backend
    Tcp {
        /// Target host
        host: String,
        /// Target port or service name
        port: String,
    },
    /// Local UNIX socket endpoint
    Unix {
        /// Path of the socket
        path: PathBuf,
    },
}

/// Immutable-until-reset connection parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectInfo {
    transport: TransportKind,
    relay: Option<RelayInfo>,
    target: TargetEndpoint,
    pretty_address: String,
}

impl ConnectInfo {
    /// Creates a validated parameter record
    ///
    /// # Errors
    /// Returns `ConnectError::InvalidInfo` if the transport kind and the
    /// endpoint forms are inconsistent: a TCP transport with a socket target,
    /// a socket transport with a TCP target, an ssh transport without relay
    /// parameters, or empty host/port strings.
    pub fn new(
        transport: TransportKind,
        relay: Option<RelayInfo>,
        target: TargetEndpoint,
    ) -> ConnectResult<Self> {
        match (&target, transport) {
            (TargetEndpoint::Tcp { host, port }, _) => {
                if host.is_empty() {
                    return Err(ConnectError::InvalidInfo(
                        "Target host cannot be empty".to_string(),
                    ));
                }
                if port.is_empty() {
                    return Err(ConnectError::InvalidInfo(
                        "Target port cannot be empty".to_string(),
                    ));
                }
                if transport == TransportKind::DirectUnix {
                    return Err(ConnectError::InvalidInfo(
                        "Socket transport requires a socket target".to_string(),
                    ));
                }
            }
            (TargetEndpoint::Unix { path }, kind) => {
                if path.as_os_str().is_empty() {
                    return Err(ConnectError::InvalidInfo(
                        "Socket path cannot be empty".to_string(),
                    ));
                }
                if kind == TransportKind::DirectTcp {
                    return Err(ConnectError::InvalidInfo(
                        "TCP transport requires a host/port target".to_string(),
                    ));
                }
            }
        }

        if transport == TransportKind::Ssh {
            match &relay {
                None => {
                    return Err(ConnectError::InvalidInfo(
                        "Relayed transport requires relay parameters".to_string(),
                    ));
                }
                Some(relay) if relay.host.is_empty() => {
                    return Err(ConnectError::InvalidInfo(
                        "Relay host cannot be empty".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }

        let pretty_address = pretty_address(&target, relay.as_ref());
        Ok(Self {
            transport,
            relay,
            target,
            pretty_address,
        })
    }

    /// Builds a record from loosely-typed parts, rejecting ambiguous input
    ///
    /// This is the entry point used by command-line parsing: a host/port pair
    /// and a socket path are both optional there, and supplying both (or
    /// neither) is refused rather than silently resolved.
    ///
    /// # Errors
    /// Returns `ConnectError::InvalidInfo` for an ambiguous or incomplete
    /// endpoint, or any inconsistency detected by [`ConnectInfo::new`].
    pub fn from_parts(
        transport: TransportKind,
        relay: Option<RelayInfo>,
        host: Option<String>,
        port: Option<String>,
        socket: Option<PathBuf>,
    ) -> ConnectResult<Self> {
        let target = match (host, port, socket) {
            (Some(host), Some(port), None) => TargetEndpoint::Tcp { host, port },
            (None, None, Some(path)) => TargetEndpoint::Unix { path },
            (_, _, Some(_)) => {
                return Err(ConnectError::InvalidInfo(
                    "Cannot combine a host/port target with a socket target".to_string(),
                ));
            }
            _ => {
                return Err(ConnectError::InvalidInfo(
                    "Either a host/port pair or a socket path is required".to_string(),
                ));
            }
        };
        Self::new(transport, relay, target)
    }

    /// Returns the transport kind
    #[must_use]
    pub const fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Returns the relay parameters, if any
    #[must_use]
    pub const fn relay(&self) -> Option<&RelayInfo> {
        self.relay.as_ref()
    }

    /// Returns the target endpoint
    #[must_use]
    pub const fn target(&self) -> &TargetEndpoint {
        &self.target
    }

    /// Returns the human-readable rendering of the target endpoint
    #[must_use]
    pub fn pretty_address(&self) -> &str {
        &self.pretty_address
    }
}

/// Renders `host:port` for TCP targets and `relay-host:socket-path` (or the
/// bare path when no relay is configured) for socket targets.
fn pretty_address(target: &TargetEndpoint, relay: Option<&RelayInfo>) -> String {
    match target {
        TargetEndpoint::Tcp { host, port } => format!("{host}:{port}"),
        TargetEndpoint::Unix { path } => relay.map_or_else(
            || path.display().to_string(),
            |relay| format!("{}:{}", relay.host, path.display()),
        ),
    }
}
