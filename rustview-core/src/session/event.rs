//! Session lifecycle events and states

use std::fmt;

use crate::ui::Display;

/// Opaque identifier for a secondary session channel
///
/// Backends assign the id when announcing the channel and resolve it back to
/// their internal channel object when the controller hands over a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u64);

/// Lifecycle state of the session, layered under the `active` / `connected`
/// flags tracked by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No connection attempt in progress
    #[default]
    Idle,
    /// Transport handed to the backend, handshake pending
    Connecting,
    /// Transport-level handshake done
    Connected,
    /// First frame/channel ready, display view live
    Initialized,
    /// Session ended, deactivation pending or done
    Disconnected,
}

/// Events emitted by a session backend over the ordered event stream
pub enum SessionEvent {
    /// Transport-level handshake completed
    Connected,
    /// First frame/channel ready
    Initialized,
    /// Session ended (clean or dirty)
    Disconnected,
    /// Authentication refused; recoverable by user choice
    AuthRefused(String),
    /// Authentication failed; never retried automatically
    AuthFailed(String),
    /// A display surface was announced
    DisplayAdded(Box<dyn Display>),
    /// A display surface was removed
    DisplayRemoved(Box<dyn Display>),
    /// Remote clipboard changed; raw bytes in the legacy charset
    CutText(Vec<u8>),
    /// Remote bell
    Bell,
    /// A secondary channel wants a transport
    ChannelOpen(ChannelId),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "Connected"),
            Self::Initialized => write!(f, "Initialized"),
            Self::Disconnected => write!(f, "Disconnected"),
            Self::AuthRefused(msg) => write!(f, "AuthRefused({msg:?})"),
            Self::AuthFailed(msg) => write!(f, "AuthFailed({msg:?})"),
            Self::DisplayAdded(display) => write!(f, "DisplayAdded({})", display.index()),
            Self::DisplayRemoved(display) => write!(f, "DisplayRemoved({})", display.index()),
            Self::CutText(bytes) => write!(f, "CutText({} bytes)", bytes.len()),
            Self::Bell => write!(f, "Bell"),
            Self::ChannelOpen(id) => write!(f, "ChannelOpen({})", id.0),
        }
    }
}
