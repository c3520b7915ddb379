//! `RustView` Core Library
//!
//! This crate provides the core functionality for the `RustView` remote
//! display viewer: connection parameter handling, transport establishment
//! (direct or through an ssh relay), the session lifecycle state machine,
//! display-to-window mapping, and the clipboard bridge.

pub mod clipboard;
pub mod config;
pub mod connect;
pub mod controller;
pub mod display;
pub mod error;
pub mod reconnect;
pub mod session;
pub mod tunnel;
pub mod ui;

pub use clipboard::ClipboardBridge;
pub use config::{ConfigManager, ViewerSettings};
pub use connect::{
    ConnectInfo, ConnectionManager, RelayInfo, TargetEndpoint, Transport, TransportKind,
};
pub use controller::{DefaultHooks, RunAction, SessionController, ViewerHooks};
pub use display::WindowRegistry;
pub use error::{
    ConfigError, ConfigResult, ConnectError, ConnectResult, Result, SessionError, SessionResult,
    TunnelError, TunnelResult, ViewerError,
};
pub use reconnect::{ReconnectPoll, RECONNECT_PERIOD};
pub use session::{
    BackendRegistry, ChannelId, EventReceiver, EventSender, SessionBackend, SessionEvent,
    SessionHandle, SessionState,
};
pub use tunnel::TunnelHandle;
pub use ui::{Display, Frontend, Window, WindowFactory};
