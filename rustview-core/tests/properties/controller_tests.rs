//! Lifecycle tests for the session controller state machine

use async_trait::async_trait;
use rustview_core::{
    ConnectError, ConnectInfo, Display, Frontend, RelayInfo, RunAction, SessionBackend,
    SessionController, SessionEvent, SessionState, TargetEndpoint, TransportKind, ViewerHooks,
    Window, WindowFactory,
};
use std::cell::RefCell;
use std::os::unix::net::UnixStream;
use std::rc::Rc;
use std::time::Duration;

#[derive(Default)]
struct FrontendLog {
    errors: Vec<String>,
    statuses: Vec<String>,
    display_view_shown: bool,
    clipboard_offers: u32,
    bells: u32,
    retry_answer: bool,
}

struct TestFrontend {
    log: Rc<RefCell<FrontendLog>>,
}

#[async_trait(?Send)]
impl Frontend for TestFrontend {
    fn report_error(&self, message: &str) {
        self.log.borrow_mut().errors.push(message.to_string());
    }

    async fn ask_retry(&self, _message: &str) -> bool {
        self.log.borrow().retry_answer
    }

    fn set_status(&self, text: &str) {
        self.log.borrow_mut().statuses.push(text.to_string());
    }

    fn show_display_view(&self) {
        self.log.borrow_mut().display_view_shown = true;
    }

    fn bell(&self) {
        self.log.borrow_mut().bells += 1;
    }

    fn offer_clipboard(&self) {
        self.log.borrow_mut().clipboard_offers += 1;
    }
}

struct NullWindow;

impl Window for NullWindow {
    fn update_title(&self, _title: &str) {}
    fn show(&self) {}
    fn hide(&self) {}
    fn attach_display(&mut self, _display: Box<dyn Display>) {}
    fn detach_display(&mut self) {}
}

struct NullFactory;

impl WindowFactory for NullFactory {
    fn create_window(&mut self) -> Box<dyn Window> {
        Box::new(NullWindow)
    }
}

#[derive(Default)]
struct BackendLog {
    host_opens: Vec<(String, String)>,
    stream_opens: u32,
    closed: bool,
}

struct TestBackend {
    log: Rc<RefCell<BackendLog>>,
}

impl SessionBackend for TestBackend {
    fn open_host(&mut self, host: &str, port: &str) -> rustview_core::SessionResult<()> {
        self.log
            .borrow_mut()
            .host_opens
            .push((host.to_string(), port.to_string()));
        Ok(())
    }

    fn open_stream(&mut self, _stream: UnixStream) -> rustview_core::SessionResult<()> {
        self.log.borrow_mut().stream_opens += 1;
        Ok(())
    }

    fn open_channel_stream(
        &mut self,
        _channel: rustview_core::ChannelId,
        _stream: UnixStream,
    ) -> rustview_core::SessionResult<()> {
        Ok(())
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed = true;
    }
}

fn controller() -> (SessionController, Rc<RefCell<FrontendLog>>, Rc<RefCell<BackendLog>>) {
    let frontend_log = Rc::new(RefCell::new(FrontendLog::default()));
    let backend_log = Rc::new(RefCell::new(BackendLog::default()));

    let mut controller = SessionController::new(
        Box::new(TestFrontend {
            log: frontend_log.clone(),
        }),
        Box::new(NullWindow),
        Box::new(NullFactory),
        false,
    );

    let log = backend_log.clone();
    controller
        .backends_mut()
        .register("vnc", move |_events| Box::new(TestBackend { log: log.clone() }));

    (controller, frontend_log, backend_log)
}

fn tcp_info() -> ConnectInfo {
    ConnectInfo::new(
        TransportKind::DirectTcp,
        None,
        TargetEndpoint::Tcp {
            host: "guest".to_string(),
            port: "5900".to_string(),
        },
    )
    .unwrap()
}

#[test]
fn test_activate_without_info_fails() {
    let (mut controller, _frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();
    assert!(matches!(
        controller.activate(),
        Err(ConnectError::MissingInfo)
    ));
    assert!(!controller.is_active());
}

#[test]
fn test_activate_without_session_fails() {
    let (mut controller, _frontend, _backend) = controller();
    controller.set_connect_info(tcp_info());
    assert!(controller.activate().is_err());
    assert_eq!(controller.state(), SessionState::Idle);
}

#[test]
fn test_activate_hands_address_to_backend() {
    let (mut controller, frontend, backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());

    controller.activate().unwrap();
    assert!(controller.is_active());
    assert!(!controller.is_connected());
    assert_eq!(controller.state(), SessionState::Connecting);
    assert_eq!(
        backend.borrow().host_opens,
        [("guest".to_string(), "5900".to_string())]
    );
    assert_eq!(
        frontend.borrow().statuses.last().map(String::as_str),
        Some("Connecting to graphic server")
    );
}

#[test]
fn test_activate_is_idempotent_while_active() {
    let (mut controller, _frontend, backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());

    controller.activate().unwrap();
    controller.activate().unwrap();
    assert_eq!(backend.borrow().host_opens.len(), 1);
}

#[test]
fn test_unknown_display_type_reported() {
    let (mut controller, frontend, _backend) = controller();
    controller.set_guest_name("lab7");

    assert!(controller.create_session("rdp").is_err());
    assert!(!controller.has_session());
    assert_eq!(
        frontend.borrow().errors.last().map(String::as_str),
        Some("Unknown graphic type for the guest lab7")
    );
}

#[tokio::test]
async fn test_connected_then_initialized() {
    let (mut controller, frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    assert_eq!(
        controller.dispatch(SessionEvent::Connected).await,
        RunAction::Continue
    );
    assert!(controller.is_connected());
    assert_eq!(controller.state(), SessionState::Connected);

    assert_eq!(
        controller.dispatch(SessionEvent::Initialized).await,
        RunAction::Continue
    );
    assert_eq!(controller.state(), SessionState::Initialized);
    assert!(frontend.borrow().display_view_shown);
}

#[tokio::test]
async fn test_disconnect_before_connect_reports_address() {
    let (mut controller, frontend, backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    let action = controller.dispatch(SessionEvent::Disconnected).await;
    assert_eq!(action, RunAction::Quit);
    assert!(!controller.is_active());
    assert!(backend.borrow().closed);
    assert!(frontend
        .borrow()
        .errors
        .iter()
        .any(|e| e.contains("guest:5900")));
}

#[tokio::test]
async fn test_disconnect_after_connect_is_silent() {
    let (mut controller, frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    controller.dispatch(SessionEvent::Connected).await;
    controller.dispatch(SessionEvent::Disconnected).await;
    assert!(frontend.borrow().errors.is_empty());
}

#[tokio::test]
async fn test_auth_retry_requests_reconnect() {
    let (mut controller, frontend, _backend) = controller();
    frontend.borrow_mut().retry_answer = true;
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    controller
        .dispatch(SessionEvent::AuthRefused("wrong password".to_string()))
        .await;
    let action = controller.dispatch(SessionEvent::Disconnected).await;

    assert_eq!(action, RunAction::Retry);
    assert_eq!(controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_auth_retry_declined_quits() {
    let (mut controller, frontend, _backend) = controller();
    frontend.borrow_mut().retry_answer = false;
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    controller
        .dispatch(SessionEvent::AuthRefused("wrong password".to_string()))
        .await;
    let action = controller.dispatch(SessionEvent::Disconnected).await;

    assert_eq!(action, RunAction::Quit);
    assert_eq!(controller.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_cut_text_offers_clipboard() {
    let (mut controller, frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();

    controller
        .dispatch(SessionEvent::CutText(b"copied".to_vec()))
        .await;
    assert_eq!(frontend.borrow().clipboard_offers, 1);
    assert_eq!(controller.clipboard().current(), Some("copied"));

    // Untranscodable text neither offers nor replaces.
    controller
        .dispatch(SessionEvent::CutText(vec![0x80]))
        .await;
    assert_eq!(frontend.borrow().clipboard_offers, 1);
    assert_eq!(controller.clipboard().current(), Some("copied"));
}

#[tokio::test]
async fn test_channel_open_requires_relay() {
    let (mut controller, frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    controller
        .dispatch(SessionEvent::ChannelOpen(rustview_core::ChannelId(1)))
        .await;
    assert_eq!(
        frontend.borrow().errors.last().map(String::as_str),
        Some("Can't connect to channel, SSH only supported.")
    );
}

#[tokio::test]
async fn test_direct_override_skips_relay() {
    let (mut controller, _frontend, backend) = controller();
    controller.set_direct(true);
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(
        ConnectInfo::new(
            TransportKind::Ssh,
            Some(RelayInfo {
                host: "bastion".to_string(),
                port: None,
                user: None,
            }),
            TargetEndpoint::Tcp {
                host: "guest".to_string(),
                port: "5900".to_string(),
            },
        )
        .unwrap(),
    );

    controller.activate().unwrap();
    assert_eq!(backend.borrow().host_opens.len(), 1);
}

struct ResilientHooks;

impl ViewerHooks for ResilientHooks {
    fn deactivated(&mut self, _controller: &mut SessionController, _connected: bool) -> RunAction {
        RunAction::Continue
    }
}

#[tokio::test]
async fn test_non_terminal_deactivation_returns_to_idle() {
    let (mut controller, _frontend, backend) = controller();
    controller.set_hooks(Box::new(ResilientHooks));
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    let action = controller.dispatch(SessionEvent::Disconnected).await;
    assert_eq!(action, RunAction::Continue);
    assert_eq!(controller.state(), SessionState::Idle);

    // Connecting is entered again from Idle, never from Disconnected.
    controller.activate().unwrap();
    assert_eq!(controller.state(), SessionState::Connecting);
    assert_eq!(backend.borrow().host_opens.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_tick_activates_and_stops_polling() {
    let (mut controller, _frontend, backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.start_reconnect_poll();

    // The loop stays alive after the tick connects; only the timeout ends
    // the wait.
    let still_running =
        tokio::time::timeout(Duration::from_secs(5), controller.run()).await;
    assert!(still_running.is_err());
    assert!(controller.is_active());
    assert_eq!(backend.borrow().host_opens.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_tick_fatal_error_ends_run() {
    let (mut controller, _frontend, _backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(
        ConnectInfo::new(
            TransportKind::DirectUnix,
            None,
            TargetEndpoint::Unix {
                path: "/nonexistent/display.sock".into(),
            },
        )
        .unwrap(),
    );
    controller.start_reconnect_poll();

    assert!(controller.run().await.is_err());
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_run_loop_quits_on_guest_shutdown() {
    let (mut controller, frontend, backend) = controller();
    controller.create_session("vnc").unwrap();
    controller.set_connect_info(tcp_info());
    controller.activate().unwrap();

    let sender = controller.event_sender();
    sender.send(SessionEvent::Connected).unwrap();
    sender.send(SessionEvent::Initialized).unwrap();
    sender.send(SessionEvent::Disconnected).unwrap();

    controller.run().await.unwrap();
    assert!(backend.borrow().closed);
    assert_eq!(controller.state(), SessionState::Disconnected);
    assert_eq!(
        frontend.borrow().statuses.last().map(String::as_str),
        Some("Guest domain has shutdown")
    );
}
