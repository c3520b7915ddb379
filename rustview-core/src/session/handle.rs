//! Session ownership record
//!
//! Tracks the single live session per controller: the backend object, the
//! tunnel subprocess when the transport is relayed, and the lifetime
//! timestamps.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionBackend;
use crate::tunnel::TunnelHandle;

/// An owned session: backend plus the tunnel subprocesses backing it
///
/// Owned exclusively by the controller once created; released on deactivation
/// or replacement. Besides the primary transport tunnel, secondary channels
/// may add their own tunnels. All children are killed and reaped when the
/// session closes so no subprocess outlives its session.
pub struct SessionHandle {
    /// Unique identifier for this session, used in diagnostics
    pub id: Uuid,
    /// Display type id ("vnc", "spice", ...)
    pub kind: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    backend: Box<dyn SessionBackend>,
    tunnels: Vec<TunnelHandle>,
}

impl SessionHandle {
    /// Creates a session record around a freshly constructed backend
    #[must_use]
    pub fn new(kind: String, backend: Box<dyn SessionBackend>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            started_at: Utc::now(),
            ended_at: None,
            backend,
            tunnels: Vec::new(),
        }
    }

    /// Returns a mutable reference to the backend
    pub fn backend_mut(&mut self) -> &mut dyn SessionBackend {
        self.backend.as_mut()
    }

    /// Adds a tunnel subprocess backing this session's transport or one of
    /// its secondary channels
    pub fn add_tunnel(&mut self, tunnel: TunnelHandle) {
        self.tunnels.push(tunnel);
    }

    /// Returns when the session was created
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the session was closed, if it has been
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Closes the backend and tears down all tunnel subprocesses
    pub fn close(&mut self) {
        self.backend.close();
        for mut tunnel in self.tunnels.drain(..) {
            if let Err(e) = tunnel.terminate() {
                tracing::warn!(session = %self.id, "failed to terminate tunnel: {e}");
            }
        }
        self.ended_at = Some(Utc::now());
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("started_at", &self.started_at)
            .field("ended_at", &self.ended_at)
            .field(
                "tunnel_pids",
                &self.tunnels.iter().map(TunnelHandle::pid).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}
