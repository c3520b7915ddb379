//! Session backend contract and lifecycle types
//!
//! A session is the abstract remote-display protocol endpoint once a
//! transport is established. Concrete backends implement [`SessionBackend`]
//! and emit [`SessionEvent`]s over a single ordered channel; the controller
//! consumes that channel and drives the state machine.

mod backend;
mod event;
mod handle;
mod registry;

pub use backend::{EventReceiver, EventSender, SessionBackend};
pub use event::{ChannelId, SessionEvent, SessionState};
pub use handle::SessionHandle;
pub use registry::BackendRegistry;
