//! Session controller
//!
//! Owns the remote-display session, drives the connect/retry state machine,
//! and fans lifecycle events out to the window registry and the clipboard
//! bridge. All events, timer ticks, and prompts are serialized on one control
//! loop; no locking is needed for any state held here.

use crate::clipboard::ClipboardBridge;
use crate::connect::{ConnectInfo, ConnectionManager, TargetEndpoint, Transport, TransportKind};
use crate::display::WindowRegistry;
use crate::error::{ConnectError, ConnectResult, Result, SessionError, SessionResult};
use crate::reconnect::ReconnectPoll;
use crate::session::{
    BackendRegistry, ChannelId, EventReceiver, EventSender, SessionEvent, SessionHandle,
    SessionState,
};
use crate::tunnel;
use crate::ui::{Frontend, Window, WindowFactory};

use tokio::sync::mpsc;

/// What the run loop should do after an event has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    /// Keep processing events
    Continue,
    /// Re-run the initial-connect strategy on the next loop turn
    Retry,
    /// Leave the run loop
    Quit,
}

/// Strategy hooks for the connect and teardown paths
///
/// The controller invokes `initial_connect` at startup, from the reconnect
/// poll, and after an armed authentication retry; `deactivated` runs when a
/// session ends without a retry armed. Override by composition to layer
/// additional discovery before activating or to keep the process alive after
/// the guest shuts down.
pub trait ViewerHooks {
    /// Performs the initial connection sequence; the default activates once
    ///
    /// # Errors
    /// Returns an error if activation fails; the reconnect poll treats this
    /// as fatal.
    fn initial_connect(&mut self, controller: &mut SessionController) -> ConnectResult<()> {
        controller.activate()
    }

    /// Invoked after a deactivation without a retry armed; the default
    /// reports the guest shutdown and quits the run loop
    ///
    /// `connected` tells whether the ended session ever completed its
    /// transport-level handshake, distinguishing a lost session from an
    /// attempt that never got through.
    fn deactivated(&mut self, controller: &mut SessionController, _connected: bool) -> RunAction {
        controller.frontend().set_status("Guest domain has shutdown");
        controller.trace(&format!(
            "Guest {} display has disconnected, shutting down",
            controller.guest_name()
        ));
        RunAction::Quit
    }
}

/// Default strategy: activate once, quit on guest shutdown
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl ViewerHooks for DefaultHooks {}

/// Controller for one logical connection to a remote display server
pub struct SessionController {
    state: SessionState,
    active: bool,
    connected: bool,
    grabbed: bool,
    started: bool,
    auth_retry: bool,
    verbose: bool,
    guest_name: String,

    connect_info: Option<ConnectInfo>,
    connection: ConnectionManager,
    backends: BackendRegistry,
    session: Option<SessionHandle>,

    windows: WindowRegistry,
    window_factory: Box<dyn WindowFactory>,
    clipboard: ClipboardBridge,
    reconnect: ReconnectPoll,
    frontend: Box<dyn Frontend>,
    hooks: Option<Box<dyn ViewerHooks>>,

    events_tx: EventSender,
    events_rx: Option<EventReceiver>,
}

impl SessionController {
    /// Creates a controller around the main window and frontend collaborators
    ///
    /// `embedded` marks container-constrained mode; secondary display heads
    /// are refused while it is set.
    #[must_use]
    pub fn new(
        frontend: Box<dyn Frontend>,
        main_window: Box<dyn Window>,
        window_factory: Box<dyn WindowFactory>,
        embedded: bool,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::Idle,
            active: false,
            connected: false,
            grabbed: false,
            started: false,
            auth_retry: false,
            verbose: false,
            guest_name: String::new(),
            connect_info: None,
            connection: ConnectionManager::new(),
            backends: BackendRegistry::new(),
            session: None,
            windows: WindowRegistry::new(main_window, embedded),
            window_factory,
            clipboard: ClipboardBridge::new(),
            reconnect: ReconnectPoll::new(),
            frontend,
            hooks: Some(Box::new(DefaultHooks)),
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Replaces the connect/teardown strategy hooks
    pub fn set_hooks(&mut self, hooks: Box<dyn ViewerHooks>) {
        self.hooks = Some(hooks);
    }

    /// Returns the backend registry for registering display protocols
    pub fn backends_mut(&mut self) -> &mut BackendRegistry {
        &mut self.backends
    }

    /// Returns a sender for the session event stream
    ///
    /// Backends constructed outside [`SessionController::create_session`]
    /// can use this to emit events into the controller's loop.
    #[must_use]
    pub fn event_sender(&self) -> EventSender {
        self.events_tx.clone()
    }

    /// Returns the frontend collaborator
    #[must_use]
    pub fn frontend(&self) -> &dyn Frontend {
        self.frontend.as_ref()
    }

    /// Returns the clipboard bridge (consumers pull offered text from here)
    #[must_use]
    pub const fn clipboard(&self) -> &ClipboardBridge {
        &self.clipboard
    }

    /// Returns the current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns whether a connection attempt is in progress or established
    ///
    /// `active` persists through transient disconnects pending retry;
    /// `connected` does not.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns whether the transport-level handshake has completed
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    /// Returns whether a session has been created
    #[must_use]
    pub const fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Sets the guest name used in titles and messages
    pub fn set_guest_name(&mut self, name: impl Into<String>) {
        self.guest_name = name.into();
    }

    /// Returns the guest name
    #[must_use]
    pub fn guest_name(&self) -> &str {
        &self.guest_name
    }

    /// Enables verbose tracing to stdout
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Forces direct connections, bypassing the relay configuration
    pub fn set_direct(&mut self, direct: bool) {
        self.connection.set_direct(direct);
    }

    /// Marks pointer-grab state and refreshes window titles
    pub fn set_grabbed(&mut self, grabbed: bool) {
        self.grabbed = grabbed;
        self.update_titles();
    }

    /// Stores connection parameters wholesale
    pub fn set_connect_info(&mut self, info: ConnectInfo) {
        tracing::debug!(?info, "set connect info");
        self.connect_info = Some(info);
    }

    /// Clears connection parameters wholesale
    pub fn clear_connect_info(&mut self) {
        self.connect_info = None;
    }

    /// Returns the pretty address of the current target, or an empty string
    /// when no parameters are set
    #[must_use]
    pub fn pretty_address(&self) -> &str {
        self.connect_info
            .as_ref()
            .map_or("", ConnectInfo::pretty_address)
    }

    /// Emits a diagnostic trace line
    ///
    /// Always logged at debug level; echoed to stdout when verbose mode is
    /// enabled.
    pub fn trace(&self, message: &str) {
        tracing::debug!("{message}");
        if self.verbose {
            println!("{message}");
        }
    }

    /// Shows the main window; a no-op after the first call
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        if let Some(window) = self.windows.main_window() {
            window.show();
        }
        self.started = true;
    }

    /// Creates the session for the display type announced by the guest
    ///
    /// # Errors
    /// Returns an error if a session already exists or the display type has
    /// no registered backend; the latter is also reported to the user.
    pub fn create_session(&mut self, kind: &str) -> SessionResult<()> {
        if self.session.is_some() {
            return Err(SessionError::AlreadyExists);
        }
        if !self.backends.contains(kind) {
            self.trace(&format!(
                "Guest {} has unsupported {kind} display type",
                self.guest_name
            ));
            self.frontend.report_error(&format!(
                "Unknown graphic type for the guest {}",
                self.guest_name
            ));
            return Err(SessionError::UnknownType(kind.to_string()));
        }

        self.trace(&format!(
            "Guest {} has a {kind} display",
            self.guest_name
        ));
        let backend = self.backends.create(kind, self.events_tx.clone())?;
        self.session = Some(SessionHandle::new(kind.to_string(), backend));
        Ok(())
    }

    /// Establishes the transport and hands it to the session
    ///
    /// Idempotent while active: returns success immediately without any
    /// transport work. On success the controller enters `Connecting`; the
    /// state machine never enters it without a valid transport in flight.
    ///
    /// # Errors
    /// Returns an error if no parameters or session exist, or if the tunnel
    /// spawn / direct connection / backend open fails. All failures here are
    /// synchronous; nothing is retried implicitly.
    pub fn activate(&mut self) -> ConnectResult<()> {
        if self.active {
            return Ok(());
        }

        let info = self
            .connect_info
            .clone()
            .ok_or(ConnectError::MissingInfo)?;
        if self.session.is_none() {
            return Err(ConnectError::Open("no session created".to_string()));
        }

        self.trace_transport_choice(&info);
        let transport = self.connection.establish(&info)?;

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| ConnectError::Open("no session created".to_string()))?;
        match transport {
            Transport::Tunneled(mut handle) => {
                let stream = handle
                    .take_stream()
                    .ok_or_else(|| ConnectError::Open("tunnel stream unavailable".to_string()))?;
                session
                    .backend_mut()
                    .open_stream(stream)
                    .map_err(|e| ConnectError::Open(e.to_string()))?;
                session.add_tunnel(handle);
            }
            Transport::Socket(stream) => {
                session
                    .backend_mut()
                    .open_stream(stream)
                    .map_err(|e| ConnectError::Open(e.to_string()))?;
            }
            Transport::Address { host, port } => {
                session
                    .backend_mut()
                    .open_host(&host, &port)
                    .map_err(|e| ConnectError::Open(e.to_string()))?;
            }
        }

        self.frontend.set_status("Connecting to graphic server");
        self.connected = false;
        self.active = true;
        self.grabbed = false;
        self.state = SessionState::Connecting;
        self.update_titles();
        Ok(())
    }

    /// Runs the initial-connect strategy (default: activate once)
    ///
    /// # Errors
    /// Propagates the strategy's activation error.
    pub fn initial_connect(&mut self) -> ConnectResult<()> {
        let mut hooks = self.take_hooks();
        let result = hooks.initial_connect(self);
        self.hooks = Some(hooks);
        result
    }

    /// Arms the reconnect poll; a no-op while already running
    pub fn start_reconnect_poll(&mut self) {
        self.reconnect.start();
    }

    /// Dispatches one session event through the state machine
    pub async fn dispatch(&mut self, event: SessionEvent) -> RunAction {
        tracing::debug!(?event, "session event");
        match event {
            SessionEvent::Connected => {
                self.connected = true;
                self.state = SessionState::Connected;
                self.frontend.set_status("Connected to graphic server");
                RunAction::Continue
            }
            SessionEvent::Initialized => {
                self.state = SessionState::Initialized;
                self.frontend.show_display_view();
                self.update_titles();
                RunAction::Continue
            }
            SessionEvent::Disconnected => {
                if !self.connected {
                    self.frontend.report_error(&format!(
                        "Unable to connect to the graphic server {}",
                        self.pretty_address()
                    ));
                }
                self.state = SessionState::Disconnected;
                self.deactivate()
            }
            SessionEvent::AuthRefused(msg) => {
                // Modal prompt: the control loop is re-entered while this
                // frame is suspended.
                let prompt = format!(
                    "Unable to authenticate with remote desktop server at {}: {}\nRetry connection again?",
                    self.pretty_address(),
                    msg
                );
                self.auth_retry = self.frontend.ask_retry(&prompt).await;
                RunAction::Continue
            }
            SessionEvent::AuthFailed(msg) => {
                self.frontend.report_error(&format!(
                    "Unable to authenticate with remote desktop server at {}: {}",
                    self.pretty_address(),
                    msg
                ));
                RunAction::Continue
            }
            SessionEvent::DisplayAdded(display) => {
                self.windows
                    .display_added(display, self.window_factory.as_mut());
                RunAction::Continue
            }
            SessionEvent::DisplayRemoved(display) => {
                self.windows.display_removed(display.as_ref());
                RunAction::Continue
            }
            SessionEvent::CutText(raw) => {
                if self.clipboard.update_from_remote(&raw) {
                    self.frontend.offer_clipboard();
                }
                RunAction::Continue
            }
            SessionEvent::Bell => {
                self.frontend.bell();
                RunAction::Continue
            }
            SessionEvent::ChannelOpen(channel) => {
                self.open_channel(channel);
                RunAction::Continue
            }
        }
    }

    /// Tears the session down
    ///
    /// A no-op unless active. With an armed authentication retry the
    /// controller returns to `Idle` and asks the run loop to re-run the
    /// initial-connect sequence; otherwise the deactivated hook decides what
    /// happens next (default: quit). The state rests at `Disconnected` only
    /// when the outcome is terminal; any continuing outcome returns to
    /// `Idle`.
    pub fn deactivate(&mut self) -> RunAction {
        if !self.active {
            return RunAction::Continue;
        }

        let was_connected = self.connected;
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
        self.connected = false;
        self.active = false;
        self.grabbed = false;
        self.state = SessionState::Disconnected;
        self.update_titles();

        if self.auth_retry {
            self.auth_retry = false;
            self.state = SessionState::Idle;
            RunAction::Retry
        } else {
            let mut hooks = self.take_hooks();
            let action = hooks.deactivated(self, was_connected);
            self.hooks = Some(hooks);
            // Any non-terminal outcome leaves the controller ready for the
            // next activation; `Connecting` is entered only from `Idle`.
            if action != RunAction::Quit {
                self.state = SessionState::Idle;
            }
            action
        }
    }

    /// Closes the session in preparation for process exit
    pub fn quit(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
    }

    /// Drives the control loop until the session ends or a fatal error
    /// occurs
    ///
    /// Serializes session events and reconnect ticks. A closed event channel
    /// (all backends and senders dropped) ends the loop cleanly.
    ///
    /// # Errors
    /// Returns the activation error when a reconnect tick fails fatally.
    pub async fn run(&mut self) -> Result<()> {
        let Some(mut events) = self.events_rx.take() else {
            tracing::warn!("controller run loop invoked twice");
            return Ok(());
        };

        loop {
            let wake = {
                let tick = self.reconnect.tick();
                tokio::pin!(tick);
                tokio::select! {
                    event = events.recv() => Wake::Event(event),
                    () = &mut tick => Wake::Tick,
                }
            };

            match wake {
                Wake::Event(Some(event)) => match self.dispatch(event).await {
                    RunAction::Continue => {}
                    RunAction::Retry => {
                        if let Err(e) = self.initial_connect() {
                            tracing::warn!("retry connect failed: {e}");
                        }
                    }
                    RunAction::Quit => return Ok(()),
                },
                Wake::Event(None) => {
                    self.quit();
                    return Ok(());
                }
                Wake::Tick => {
                    tracing::debug!("connect timer fired");
                    if !self.active {
                        if let Err(e) = self.initial_connect() {
                            return Err(e.into());
                        }
                    }
                    if self.active {
                        self.reconnect.stop();
                    }
                }
            }
        }
    }

    fn take_hooks(&mut self) -> Box<dyn ViewerHooks> {
        self.hooks
            .take()
            .unwrap_or_else(|| Box::new(DefaultHooks))
    }

    fn trace_transport_choice(&self, info: &ConnectInfo) {
        if info.transport() == TransportKind::Ssh && !self.connection.is_direct() {
            match info.target() {
                TargetEndpoint::Tcp { host, port } => self.trace(&format!(
                    "Opening indirect TCP connection to display at {host}:{port}"
                )),
                TargetEndpoint::Unix { path } => self.trace(&format!(
                    "Opening indirect UNIX connection to display at {}",
                    path.display()
                )),
            }
            if let Some(relay) = info.relay() {
                let user = relay
                    .user
                    .as_ref()
                    .map_or_else(String::new, |u| format!("{u}@"));
                self.trace(&format!(
                    "Setting up SSH tunnel via {user}{}:{}",
                    relay.host,
                    relay.port.unwrap_or(22)
                ));
            }
        } else {
            match info.target() {
                TargetEndpoint::Tcp { host, port } => self.trace(&format!(
                    "Opening direct TCP connection to display at {host}:{port}"
                )),
                TargetEndpoint::Unix { path } => self.trace(&format!(
                    "Opening direct UNIX connection to display at {}",
                    path.display()
                )),
            }
        }
    }

    /// Spawns a dedicated tunnel for a secondary channel and hands it over
    ///
    /// Channels are only reachable through the relay; a non-relayed
    /// transport cannot serve them.
    fn open_channel(&mut self, channel: ChannelId) {
        let Some(info) = self.connect_info.clone() else {
            self.frontend
                .report_error("Can't connect to channel, SSH only supported.");
            return;
        };

        if info.transport() != TransportKind::Ssh || self.connection.is_direct() {
            self.frontend
                .report_error("Can't connect to channel, SSH only supported.");
            return;
        }
        let Some(relay) = info.relay() else {
            self.frontend
                .report_error("Can't connect to channel, SSH only supported.");
            return;
        };

        match tunnel::spawn(relay, info.target()) {
            Ok(mut handle) => {
                let Some(stream) = handle.take_stream() else {
                    return;
                };
                if let Some(session) = self.session.as_mut() {
                    match session.backend_mut().open_channel_stream(channel, stream) {
                        Ok(()) => session.add_tunnel(handle),
                        Err(e) => tracing::warn!("channel open failed: {e}"),
                    }
                }
            }
            Err(e) => {
                tracing::warn!("channel tunnel spawn failed: {e}");
                self.frontend.report_error("Connect to ssh failed.");
            }
        }
    }

    fn update_titles(&self) {
        let base = if self.guest_name.is_empty() {
            "RustView".to_string()
        } else {
            self.guest_name.clone()
        };
        let title = if self.grabbed {
            format!("{base} (Press Ctrl+Alt to release pointer)")
        } else {
            base
        };
        self.windows.update_titles(&title);
    }
}

/// What woke the run loop
enum Wake {
    Event(Option<SessionEvent>),
    Tick,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("active", &self.active)
            .field("connected", &self.connected)
            .field("guest_name", &self.guest_name)
            .field("session", &self.session)
            .field("windows", &self.windows)
            .finish_non_exhaustive()
    }
}
