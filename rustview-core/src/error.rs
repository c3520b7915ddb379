//! Error types for `RustView`
//!
//! This module defines all error types used throughout the `RustView` viewer,
//! providing descriptive error messages for connection setup, tunnel
//! management, configuration, and session lifecycle operations.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for `RustView` operations
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Connection parameter or transport selection errors
    #[error("Connection error: {0}")]
    Connect(#[from] ConnectError),

    /// SSH tunnel errors
    #[error("Tunnel error: {0}")]
    Tunnel(#[from] TunnelError),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to connection parameters and transport establishment
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Connection parameters are inconsistent or incomplete
    #[error("Invalid connection info: {0}")]
    InvalidInfo(String),

    /// No connection parameters have been set on the controller
    #[error("No connection info configured")]
    MissingInfo,

    /// Direct UNIX socket connection failed
    #[error("Failed to connect to socket {path}: {source}")]
    SocketConnect {
        /// Path of the local socket
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Tunnel establishment failed while selecting the relayed transport
    #[error(transparent)]
    Tunnel(#[from] TunnelError),

    /// The session backend rejected the open request
    #[error("Session open failed: {0}")]
    Open(String),
}

/// Errors related to the SSH tunnel subprocess
#[derive(Debug, Error)]
pub enum TunnelError {
    /// Creating the local socket pair failed
    #[error("Failed to create socket pair: {0}")]
    SocketPair(std::io::Error),

    /// Duplicating the child-side descriptor failed
    #[error("Failed to duplicate tunnel descriptor: {0}")]
    DupFailed(std::io::Error),

    /// Spawning the ssh client failed
    #[error("Failed to spawn ssh: {0}")]
    Spawn(std::io::Error),
}

/// Errors related to session lifecycle management
#[derive(Debug, Error)]
pub enum SessionError {
    /// A session already exists on this controller
    #[error("Session already exists")]
    AlreadyExists,

    /// No session has been created yet
    #[error("No session created")]
    NotCreated,

    /// The requested display type has no registered backend
    #[error("Unknown graphic type: {0}")]
    UnknownType(String),

    /// The backend failed to open the connection
    #[error("Failed to open session: {0}")]
    OpenFailed(String),

    /// The backend failed to open a secondary channel
    #[error("Failed to open channel: {0}")]
    ChannelFailed(String),
}

/// Errors related to configuration file operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Failed to write configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// No usable configuration directory on this system
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Result type alias for `RustView` operations
pub type Result<T> = std::result::Result<T, ViewerError>;

/// Result type alias for connection operations
pub type ConnectResult<T> = std::result::Result<T, ConnectError>;

/// Result type alias for tunnel operations
pub type TunnelResult<T> = std::result::Result<T, TunnelError>;

/// Result type alias for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
