//! Property-based tests for ssh tunnel command construction

use proptest::prelude::*;
use rustview_core::{tunnel, RelayInfo, TargetEndpoint};
use std::path::PathBuf;

// Hosts and users must not collide with the literal "nc" the assertions
// anchor on.
fn arb_host() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,15}[a-z0-9])?"
        .prop_filter("host must not be the nc literal", |s| s != "nc")
}

fn arb_relay() -> impl Strategy<Value = RelayInfo> {
    (
        arb_host(),
        proptest::option::of(1u16..=65535u16),
        proptest::option::of(
            "[a-z][a-z0-9_]{0,15}"
                .prop_filter("user must not be the nc literal", |s| s != "nc"),
        ),
    )
        .prop_map(|(host, port, user)| RelayInfo { host, port, user })
}

fn arb_target() -> impl Strategy<Value = TargetEndpoint> {
    prop_oneof![
        (arb_host(), (1u16..=65535u16).prop_map(|p| p.to_string()))
            .prop_map(|(host, port)| TargetEndpoint::Tcp { host, port }),
        "/[a-z]{1,10}\\.sock".prop_map(|s| TargetEndpoint::Unix {
            path: PathBuf::from(s)
        }),
    ]
}

proptest! {
    // The command always starts with `ssh -p <port>` where the port is the
    // configured one or 22, and always names the relay host before `nc`.
    #[test]
    fn prop_command_shape(relay in arb_relay(), target in arb_target()) {
        let cmd = tunnel::build_command(&relay, &target);

        prop_assert_eq!(&cmd[0], "ssh");
        prop_assert_eq!(&cmd[1], "-p");
        prop_assert_eq!(cmd[2].clone(), relay.port.unwrap_or(22).to_string());

        let nc_pos = cmd.iter().position(|a| a == "nc").unwrap();
        prop_assert_eq!(&cmd[nc_pos - 1], &relay.host);
    }

    // The `-l` option appears exactly when a relay user is configured, and
    // is immediately followed by that user.
    #[test]
    fn prop_user_option(relay in arb_relay(), target in arb_target()) {
        let cmd = tunnel::build_command(&relay, &target);
        let l_pos = cmd.iter().position(|a| a == "-l");

        match &relay.user {
            Some(user) => {
                let pos = l_pos.unwrap();
                prop_assert_eq!(&cmd[pos + 1], user);
            }
            None => prop_assert!(l_pos.is_none()),
        }
    }

    // Exactly one of the two nc target forms is emitted.
    #[test]
    fn prop_target_forms_exclusive(relay in arb_relay(), target in arb_target()) {
        let cmd = tunnel::build_command(&relay, &target);
        let tail = &cmd[cmd.iter().position(|a| a == "nc").unwrap() + 1..];

        match &target {
            TargetEndpoint::Tcp { host, port } => {
                prop_assert_eq!(tail, [host.clone(), port.clone()]);
            }
            TargetEndpoint::Unix { path } => {
                prop_assert_eq!(tail, ["-U".to_string(), path.display().to_string()]);
            }
        }
    }
}
