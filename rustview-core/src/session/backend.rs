//! The contract implemented by concrete remote-display protocol backends

use std::os::unix::net::UnixStream;
use tokio::sync::mpsc;

use super::{ChannelId, SessionEvent};
use crate::error::SessionResult;

/// Sender half of the ordered session event stream
///
/// Handed to the backend at construction; every lifecycle event is emitted
/// through it and consumed serially by the controller's run loop.
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiver half of the ordered session event stream, owned by the controller
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Abstract remote-display protocol endpoint
///
/// The controller never asks a backend to begin its handshake before the
/// transport is fully prepared: `open_host` and `open_stream` are only called
/// with a valid address or an already-open stream, and both report failures
/// synchronously. Everything after a successful open arrives as
/// [`SessionEvent`]s.
pub trait SessionBackend {
    /// Opens the session against a host/port pair; the backend performs its
    /// own network connect
    ///
    /// # Errors
    /// Returns an error if the connection attempt cannot be started.
    fn open_host(&mut self, host: &str, port: &str) -> SessionResult<()>;

    /// Opens the session over an already-established byte stream
    ///
    /// # Errors
    /// Returns an error if the backend cannot adopt the stream.
    fn open_stream(&mut self, stream: UnixStream) -> SessionResult<()>;

    /// Hands a transport to a secondary channel previously announced via
    /// [`SessionEvent::ChannelOpen`]
    ///
    /// # Errors
    /// Returns an error if the channel is unknown or cannot adopt the stream.
    fn open_channel_stream(&mut self, channel: ChannelId, stream: UnixStream) -> SessionResult<()>;

    /// Closes the session and stops emitting events
    fn close(&mut self);
}
