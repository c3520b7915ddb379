//! Transport selection
//!
//! Given validated connection parameters, produces either an already-open
//! byte stream or a host/port pair for the session backend to connect to
//! itself. The relayed transport is attempted first when configured; falling
//! back to a direct connection happens only by explicit configuration, never
//! automatically — a tunnel failure is a hard failure of the activation
//! attempt.

use std::os::unix::net::UnixStream;

use crate::connect::{ConnectInfo, TargetEndpoint, TransportKind};
use crate::error::{ConnectError, ConnectResult};
use crate::tunnel::{self, TunnelHandle};

/// The connectivity produced for one activation attempt
#[derive(Debug)]
pub enum Transport {
    /// Relayed stream; the tunnel subprocess handle owns the stream until
    /// it is taken and handed to the session
    Tunneled(TunnelHandle),
    /// Directly connected local socket
    Socket(UnixStream),
    /// Host/port pair; the session backend performs its own connect
    Address {
        /// Target host
        host: String,
        /// Target port or service name
        port: String,
    },
}

/// Chooses and establishes the transport for a connection attempt
#[derive(Debug, Default)]
pub struct ConnectionManager {
    direct: bool,
}

impl ConnectionManager {
    /// Creates a new connection manager
    #[must_use]
    pub const fn new() -> Self {
        Self { direct: false }
    }

    /// Forces direct connections, bypassing the relay even when relay
    /// parameters are present
    pub fn set_direct(&mut self, direct: bool) {
        self.direct = direct;
    }

    /// Returns whether the direct override is set
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.direct
    }

    /// Establishes connectivity for the given parameters
    ///
    /// # Errors
    /// Returns an error if the tunnel subprocess cannot be spawned or the
    /// direct socket connection fails. Errors are synchronous; the caller
    /// never observes a half-established transport.
    pub fn establish(&self, info: &ConnectInfo) -> ConnectResult<Transport> {
        if info.transport() == TransportKind::Ssh && !self.direct {
            let relay = info.relay().ok_or_else(|| {
                ConnectError::InvalidInfo("Relayed transport without relay parameters".to_string())
            })?;
            let handle = tunnel::spawn(relay, info.target())?;
            tracing::debug!(pid = handle.pid(), "ssh tunnel spawned");
            return Ok(Transport::Tunneled(handle));
        }

        match info.target() {
            TargetEndpoint::Unix { path } => {
                let stream =
                    UnixStream::connect(path).map_err(|source| ConnectError::SocketConnect {
                        path: path.clone(),
                        source,
                    })?;
                Ok(Transport::Socket(stream))
            }
            TargetEndpoint::Tcp { host, port } => Ok(Transport::Address {
                host: host.clone(),
                port: port.clone(),
            }),
        }
    }
}
