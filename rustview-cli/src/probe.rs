//! Probe session backend
//!
//! A minimal display protocol stand-in used by the terminal frontend: it
//! adopts whatever transport the controller establishes, reports the session
//! as connected and initialized with a single primary display, and signals
//! disconnection when the peer closes the stream. Useful for exercising
//! tunnels and transports without a graphical protocol implementation.

use rustview_core::{
    ChannelId, Display, EventSender, SessionBackend, SessionError, SessionEvent, SessionResult,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;

/// The single display a probe session announces
struct ProbeDisplay;

impl Display for ProbeDisplay {
    fn index(&self) -> u32 {
        0
    }

    fn hide(&self) {}
}

/// Backend that validates connectivity rather than rendering anything
pub struct ProbeBackend {
    events: EventSender,
    reader: Option<JoinHandle<()>>,
}

impl ProbeBackend {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            reader: None,
        }
    }

    fn adopt<R>(&mut self, stream: R)
    where
        R: AsyncRead + Unpin + 'static,
    {
        let events = self.events.clone();
        // The stream type is not Send; the whole viewer runs on a LocalSet.
        self.reader = Some(tokio::task::spawn_local(pump(events, stream)));
    }
}

impl SessionBackend for ProbeBackend {
    fn open_host(&mut self, host: &str, port: &str) -> SessionResult<()> {
        let port: u16 = port
            .parse()
            .map_err(|_| SessionError::OpenFailed(format!("invalid port '{port}'")))?;
        let events = self.events.clone();
        let addr = format!("{host}:{port}");
        // The connect happens inside the task: a refused or unreachable
        // endpoint surfaces as a disconnect event, not as a synchronous
        // open failure.
        self.reader = Some(tokio::task::spawn_local(async move {
            match tokio::net::TcpStream::connect(&addr).await {
                Ok(stream) => pump(events, stream).await,
                Err(e) => {
                    tracing::debug!("probe connect to {addr} failed: {e}");
                    let _ = events.send(SessionEvent::Disconnected);
                }
            }
        }));
        Ok(())
    }

    fn open_stream(&mut self, stream: std::os::unix::net::UnixStream) -> SessionResult<()> {
        stream
            .set_nonblocking(true)
            .map_err(|e| SessionError::OpenFailed(e.to_string()))?;
        let stream = tokio::net::UnixStream::from_std(stream)
            .map_err(|e| SessionError::OpenFailed(e.to_string()))?;
        self.adopt(stream);
        Ok(())
    }

    fn open_channel_stream(
        &mut self,
        channel: ChannelId,
        _stream: std::os::unix::net::UnixStream,
    ) -> SessionResult<()> {
        Err(SessionError::ChannelFailed(format!(
            "probe sessions have no secondary channels (channel {})",
            channel.0
        )))
    }

    fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Announces the session lifecycle, then drains the stream until the peer
/// hangs up.
async fn pump<R>(events: EventSender, mut stream: R)
where
    R: AsyncRead + Unpin,
{
    let _ = events.send(SessionEvent::Connected);
    let _ = events.send(SessionEvent::DisplayAdded(Box::new(ProbeDisplay)));
    let _ = events.send(SessionEvent::Initialized);

    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => tracing::trace!(n, "probe discarded bytes"),
            Err(e) => {
                tracing::debug!("probe stream error: {e}");
                break;
            }
        }
    }
    let _ = events.send(SessionEvent::Disconnected);
}
