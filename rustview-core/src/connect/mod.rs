//! Connection parameters and transport selection
//!
//! This module decides how the viewer reaches the remote display: a direct
//! TCP connection, a direct local-socket connection, or a byte stream relayed
//! through a spawned ssh subprocess.

mod info;
mod manager;

pub use info::{ConnectInfo, RelayInfo, TargetEndpoint, TransportKind};
pub use manager::{ConnectionManager, Transport};
