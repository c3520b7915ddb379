//! `RustView` CLI - terminal frontend for the `RustView` remote display viewer
//!
//! Connects to a remote display server directly or through an ssh relay,
//! drives the session lifecycle from the command line, and reports status
//! and errors on the terminal. Windowing is represented by log-only stand-ins;
//! a graphical frontend supplies its own implementations of the same traits.

use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;

use async_trait::async_trait;
use clap::Parser;
use tokio::task::LocalSet;

use rustview_core::{
    ConfigManager, ConnectInfo, ConnectResult, Display, Frontend, RelayInfo, RunAction,
    SessionController, TransportKind, ViewerHooks, ViewerSettings, Window, WindowFactory,
};

mod probe;

/// `RustView` command-line interface for viewing remote displays
#[derive(Parser)]
#[command(name = "rustview")]
#[command(author, version, about = "RustView remote display viewer")]
pub struct Cli {
    /// Display server address as HOST:PORT
    #[arg(value_name = "HOST:PORT", conflicts_with = "unix_socket")]
    pub address: Option<String>,

    /// Connect to a local UNIX socket instead of a TCP endpoint
    #[arg(short = 'U', long, value_name = "PATH")]
    pub unix_socket: Option<PathBuf>,

    /// Relay the connection through an ssh host
    #[arg(long, value_name = "HOST")]
    pub ssh_host: Option<String>,

    /// Port of the ssh relay (defaults to 22)
    #[arg(long, value_name = "PORT", requires = "ssh_host")]
    pub ssh_port: Option<u16>,

    /// Username on the ssh relay
    #[arg(long, value_name = "USER", requires = "ssh_host")]
    pub ssh_user: Option<String>,

    /// Connect directly even when a relay is configured
    #[arg(short, long)]
    pub direct: bool,

    /// Display verbose information
    #[arg(short, long)]
    pub verbose: bool,

    /// Display debugging information
    #[arg(long)]
    pub debug: bool,

    /// Name of the guest shown in window titles
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Display type to open the session with
    #[arg(short = 't', long = "type", default_value = "probe")]
    pub display_type: String,

    /// Keep retrying the connection every half second until it succeeds
    #[arg(short, long)]
    pub wait: bool,
}

impl Cli {
    /// Builds validated connection parameters from the parsed arguments
    fn connect_info(&self) -> Result<ConnectInfo, String> {
        let (host, port) = match &self.address {
            Some(address) => {
                let (host, port) = address
                    .rsplit_once(':')
                    .ok_or_else(|| format!("expected HOST:PORT, got '{address}'"))?;
                (Some(host.to_string()), Some(port.to_string()))
            }
            None => (None, None),
        };

        let relay = self.ssh_host.as_ref().map(|ssh_host| RelayInfo {
            host: ssh_host.clone(),
            port: self.ssh_port,
            user: self.ssh_user.clone(),
        });
        let transport = if relay.is_some() {
            TransportKind::Ssh
        } else if self.unix_socket.is_some() {
            TransportKind::DirectUnix
        } else {
            TransportKind::DirectTcp
        };

        ConnectInfo::from_parts(transport, relay, host, port, self.unix_socket.clone())
            .map_err(|e| e.to_string())
    }
}

/// Terminal implementation of the frontend reporting surface
struct TerminalFrontend;

#[async_trait(?Send)]
impl Frontend for TerminalFrontend {
    fn report_error(&self, message: &str) {
        eprintln!("error: {message}");
    }

    async fn ask_retry(&self, message: &str) -> bool {
        println!("{message} [y/N]");
        // Line reads block, so they run on the blocking pool while the
        // control loop keeps processing events.
        tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).is_ok()
                && matches!(line.trim(), "y" | "Y" | "yes")
        })
        .await
        .unwrap_or(false)
    }

    fn set_status(&self, text: &str) {
        println!("{text}");
    }

    fn show_display_view(&self) {
        println!("Display is ready");
    }

    fn bell(&self) {
        print!("\x07");
        let _ = std::io::Write::flush(&mut std::io::stdout());
    }

    fn offer_clipboard(&self) {
        tracing::info!("remote clipboard updated");
    }
}

/// Strategy for `--wait`: keep polling until a connection is established
///
/// Activation failures are absorbed so the reconnect poll keeps firing, and
/// a session that ends before ever completing its handshake re-arms the poll
/// instead of quitting. A session that was established and then lost falls
/// back to the normal shutdown behavior.
struct WaitHooks;

impl ViewerHooks for WaitHooks {
    fn initial_connect(&mut self, controller: &mut SessionController) -> ConnectResult<()> {
        if let Err(e) = controller.activate() {
            controller.trace(&format!("Connection attempt failed, retrying: {e}"));
        }
        Ok(())
    }

    fn deactivated(&mut self, controller: &mut SessionController, connected: bool) -> RunAction {
        if connected {
            controller.frontend().set_status("Guest domain has shutdown");
            return RunAction::Quit;
        }
        controller.trace("Connection did not come up, retrying");
        controller.start_reconnect_poll();
        RunAction::Continue
    }
}

/// Log-only window stand-in
struct TerminalWindow {
    label: String,
    display: Option<Box<dyn Display>>,
}

impl TerminalWindow {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            display: None,
        }
    }
}

impl Window for TerminalWindow {
    fn update_title(&self, title: &str) {
        tracing::debug!(window = %self.label, "title: {title}");
    }

    fn show(&self) {
        tracing::debug!(window = %self.label, "shown");
    }

    fn hide(&self) {
        tracing::debug!(window = %self.label, "hidden");
    }

    fn attach_display(&mut self, display: Box<dyn Display>) {
        let nth = display.index();
        tracing::info!(window = %self.label, nth, "display attached");
        self.display = Some(display);
    }

    fn detach_display(&mut self) {
        if let Some(display) = self.display.take() {
            let nth = display.index();
            tracing::info!(window = %self.label, nth, "display detached");
        }
    }
}

/// Creates numbered log-only windows for secondary displays
#[derive(Default)]
struct TerminalWindowFactory {
    next: u32,
}

impl WindowFactory for TerminalWindowFactory {
    fn create_window(&mut self) -> Box<dyn Window> {
        self.next += 1;
        Box::new(TerminalWindow::new(format!("window-{}", self.next)))
    }
}

fn load_settings() -> ViewerSettings {
    match ConfigManager::new().and_then(|m| m.load_settings()) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("falling back to default settings: {e}");
            ViewerSettings::default()
        }
    }
}

async fn run(cli: Cli, settings: ViewerSettings) -> ExitCode {
    let info = match cli.connect_info() {
        Ok(info) => info,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let mut controller = SessionController::new(
        Box::new(TerminalFrontend),
        Box::new(TerminalWindow::new("main")),
        Box::new(TerminalWindowFactory::default()),
        false,
    );
    controller.set_verbose(cli.verbose || settings.verbose);
    controller.set_direct(cli.direct || settings.direct);
    let guest_name = if cli.name.is_empty() {
        settings.window.title.clone().unwrap_or_default()
    } else {
        cli.name.clone()
    };
    controller.set_guest_name(guest_name);
    controller.set_connect_info(info);
    if settings.window.fullscreen {
        tracing::debug!("fullscreen is not supported by the terminal frontend");
    }

    controller
        .backends_mut()
        .register("probe", |events| Box::new(probe::ProbeBackend::new(events)));
    if controller.create_session(&cli.display_type).is_err() {
        // The unknown-type case was already reported through the frontend.
        return ExitCode::FAILURE;
    }

    controller.start();
    if cli.wait {
        controller.set_hooks(Box::new(WaitHooks));
        controller.start_reconnect_poll();
    }
    if let Err(e) = controller.initial_connect() {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match controller.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = load_settings();

    // Initialize logging with environment filter (RUST_LOG); the debug flag
    // forces debug-level output regardless of the environment.
    let filter = if cli.debug || settings.debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Backends spawn non-Send tasks, so the whole viewer runs on a LocalSet.
    let local = LocalSet::new();
    local.block_on(&runtime, run(cli, settings))
}
