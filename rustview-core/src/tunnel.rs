//! SSH tunnel subprocess management
//!
//! Establishes a duplex byte stream to a target reachable only through an
//! intermediate relay host. A connected socket pair is created locally; the
//! spawned ssh client gets one half as both its stdin and stdout, and the
//! other half is retained by the caller as the usable stream.
//!
//! Spawn errors are synchronous and fatal to the attempt. An exec failure in
//! the child or a failure on the relay side is not observable at spawn time;
//! it surfaces later as an ordinary I/O error on the returned stream and is
//! handled uniformly with other transport failures.

use std::os::fd::OwnedFd;
use std::os::unix::net::UnixStream;
use std::process::{Child, Command, Stdio};

use crate::connect::{RelayInfo, TargetEndpoint};
use crate::error::{TunnelError, TunnelResult};

/// Default ssh port used when the relay port is unset
const DEFAULT_SSH_PORT: u16 = 22;

/// A running tunnel subprocess and its duplex stream
///
/// The child's copies of the socket pair are closed at spawn; the stream half
/// held here is exclusively owned by the viewer. Dropping the handle kills
/// and reaps the subprocess.
#[derive(Debug)]
pub struct TunnelHandle {
    stream: Option<UnixStream>,
    child: Child,
}

impl TunnelHandle {
    /// Takes ownership of the duplex stream, leaving the child handle behind
    pub fn take_stream(&mut self) -> Option<UnixStream> {
        self.stream.take()
    }

    /// Returns the subprocess id
    #[must_use]
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kills and reaps the tunnel subprocess
    ///
    /// # Errors
    /// Returns an error if the process cannot be killed
    pub fn terminate(&mut self) -> std::io::Result<()> {
        self.child.kill()?;
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for TunnelHandle {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Builds the ssh command line for a relayed connection
///
/// The relay port defaults to 22 when unset; the `-l` option is inserted only
/// when a relay user is configured. Exactly one of the two `nc` target forms
/// is appended: `host port` for TCP targets, `-U path` for socket targets.
#[must_use]
pub fn build_command(relay: &RelayInfo, target: &TargetEndpoint) -> Vec<String> {
    let mut cmd = vec![
        "ssh".to_string(),
        "-p".to_string(),
        relay.port.unwrap_or(DEFAULT_SSH_PORT).to_string(),
    ];
    if let Some(user) = &relay.user {
        cmd.push("-l".to_string());
        cmd.push(user.clone());
    }
    cmd.push(relay.host.clone());
    cmd.push("nc".to_string());
    match target {
        TargetEndpoint::Tcp { host, port } => {
            cmd.push(host.clone());
            cmd.push(port.clone());
        }
        TargetEndpoint::Unix { path } => {
            cmd.push("-U".to_string());
            cmd.push(path.display().to_string());
        }
    }
    cmd
}

/// Spawns the ssh tunnel subprocess for the given relay and target
///
/// # Errors
/// Returns an error if the socket pair cannot be created, the child-side
/// descriptor cannot be duplicated, or the subprocess cannot be spawned. All
/// descriptors are closed before returning on any failure path.
pub fn spawn(relay: &RelayInfo, target: &TargetEndpoint) -> TunnelResult<TunnelHandle> {
    let argv = build_command(relay, target);
    tracing::debug!(command = %argv.join(" "), "spawning ssh tunnel");
    spawn_argv(&argv)
}

/// Spawns `argv` with its stdin and stdout wired to one half of a local
/// socket pair, returning the other half as the duplex stream.
fn spawn_argv(argv: &[String]) -> TunnelResult<TunnelHandle> {
    let (ours, theirs) = UnixStream::pair().map_err(TunnelError::SocketPair)?;
    let child_stdin = theirs.try_clone().map_err(TunnelError::DupFailed)?;

    let child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::from(OwnedFd::from(child_stdin)))
        .stdout(Stdio::from(OwnedFd::from(theirs)))
        .spawn()
        .map_err(TunnelError::Spawn)?;

    Ok(TunnelHandle {
        stream: Some(ours),
        child,
    })
}
