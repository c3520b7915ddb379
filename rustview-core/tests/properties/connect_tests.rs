//! Property-based tests for connection parameter validation

use proptest::prelude::*;
use rustview_core::{ConnectInfo, RelayInfo, TargetEndpoint, TransportKind};
use std::path::PathBuf;

// ========== Generators ==========

// Strategy for generating valid hostnames (non-empty)
fn arb_host() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,15}[a-z0-9])?(\\.[a-z0-9]([a-z0-9-]{0,15}[a-z0-9])?)*".prop_map(|s| s)
}

// Strategy for generating valid ports as strings (may be a service name)
fn arb_port() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u16..=65535u16).prop_map(|p| p.to_string()),
        "[a-z]{2,10}".prop_map(|s| s),
    ]
}

// Strategy for generating non-empty socket paths
fn arb_socket_path() -> impl Strategy<Value = PathBuf> {
    "/[a-z]{1,10}(/[a-z]{1,10}){0,3}\\.sock".prop_map(PathBuf::from)
}

// Strategy for generating optional usernames
fn arb_username() -> impl Strategy<Value = Option<String>> {
    prop_oneof![Just(None), "[a-z][a-z0-9_]{0,15}".prop_map(Some)]
}

fn arb_relay() -> impl Strategy<Value = RelayInfo> {
    (arb_host(), proptest::option::of(1u16..=65535u16), arb_username()).prop_map(
        |(host, port, user)| RelayInfo { host, port, user },
    )
}

proptest! {
    // A validated record always renders host:port for TCP targets.
    #[test]
    fn prop_tcp_pretty_address(host in arb_host(), port in arb_port()) {
        let info = ConnectInfo::new(
            TransportKind::DirectTcp,
            None,
            TargetEndpoint::Tcp { host: host.clone(), port: port.clone() },
        )
        .unwrap();
        prop_assert_eq!(info.pretty_address(), format!("{host}:{port}"));
    }

    // Socket targets render the relay host as a prefix exactly when a relay
    // is configured.
    #[test]
    fn prop_socket_pretty_address(path in arb_socket_path(), relay in arb_relay()) {
        let bare = ConnectInfo::new(
            TransportKind::DirectUnix,
            None,
            TargetEndpoint::Unix { path: path.clone() },
        )
        .unwrap();
        prop_assert_eq!(bare.pretty_address(), path.display().to_string());

        let relayed = ConnectInfo::new(
            TransportKind::Ssh,
            Some(relay.clone()),
            TargetEndpoint::Unix { path: path.clone() },
        )
        .unwrap();
        prop_assert_eq!(
            relayed.pretty_address(),
            format!("{}:{}", relay.host, path.display())
        );
    }

    // The relay port survives construction untouched.
    #[test]
    fn prop_relay_port_preserved(
        relay in arb_relay(),
        host in arb_host(),
        port in arb_port(),
    ) {
        let expected = relay.port;
        let info = ConnectInfo::new(
            TransportKind::Ssh,
            Some(relay),
            TargetEndpoint::Tcp { host, port },
        )
        .unwrap();
        prop_assert_eq!(info.relay().unwrap().port, expected);
    }

    // Supplying both endpoint forms is always rejected, regardless of the
    // transport kind.
    #[test]
    fn prop_both_targets_rejected(
        host in arb_host(),
        port in arb_port(),
        path in arb_socket_path(),
    ) {
        let result = ConnectInfo::from_parts(
            TransportKind::DirectTcp,
            None,
            Some(host),
            Some(port),
            Some(path),
        );
        prop_assert!(result.is_err());
    }

    // A relayed transport without relay parameters never validates.
    #[test]
    fn prop_ssh_requires_relay(host in arb_host(), port in arb_port()) {
        let result = ConnectInfo::new(
            TransportKind::Ssh,
            None,
            TargetEndpoint::Tcp { host, port },
        );
        prop_assert!(result.is_err());
    }
}
