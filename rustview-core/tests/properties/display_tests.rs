//! Property-based tests for the window registry

use proptest::prelude::*;
use rustview_core::{Display, Window, WindowFactory, WindowRegistry};

struct NullWindow;

impl Window for NullWindow {
    fn update_title(&self, _title: &str) {}
    fn show(&self) {}
    fn hide(&self) {}
    fn attach_display(&mut self, _display: Box<dyn Display>) {}
    fn detach_display(&mut self) {}
}

struct NullDisplay {
    nth: u32,
}

impl Display for NullDisplay {
    fn index(&self) -> u32 {
        self.nth
    }

    fn hide(&self) {}
}

struct NullFactory;

impl WindowFactory for NullFactory {
    fn create_window(&mut self) -> Box<dyn Window> {
        Box::new(NullWindow)
    }
}

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Remove(u32),
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![(0u32..6).prop_map(Op::Add), (0u32..6).prop_map(Op::Remove)],
        0..32,
    )
}

proptest! {
    // Index 0 always has a window, no matter what sequence of adds and
    // removes is applied, and every live index is unique by construction.
    #[test]
    fn prop_main_window_never_released(ops in arb_ops()) {
        let mut registry = WindowRegistry::new(Box::new(NullWindow), false);
        let mut factory = NullFactory;

        for op in ops {
            match op {
                Op::Add(nth) => {
                    registry.display_added(Box::new(NullDisplay { nth }), &mut factory);
                }
                Op::Remove(nth) => registry.display_removed(&NullDisplay { nth }),
            }
            prop_assert!(registry.has_window(0));
        }
    }

    // The window count tracks the set of announced-but-not-removed nonzero
    // indices, plus the permanent main window.
    #[test]
    fn prop_window_count_matches_live_set(ops in arb_ops()) {
        let mut registry = WindowRegistry::new(Box::new(NullWindow), false);
        let mut factory = NullFactory;
        let mut live: std::collections::HashSet<u32> = std::collections::HashSet::new();

        for op in ops {
            match op {
                Op::Add(nth) => {
                    registry.display_added(Box::new(NullDisplay { nth }), &mut factory);
                    if nth != 0 {
                        live.insert(nth);
                    }
                }
                Op::Remove(nth) => {
                    registry.display_removed(&NullDisplay { nth });
                    live.remove(&nth);
                }
            }
        }

        prop_assert_eq!(registry.window_count(), live.len() + 1);
    }

    // Embedded mode never grows beyond the main window.
    #[test]
    fn prop_embedded_stays_single_window(ops in arb_ops()) {
        let mut registry = WindowRegistry::new(Box::new(NullWindow), true);
        let mut factory = NullFactory;

        for op in ops {
            match op {
                Op::Add(nth) => {
                    registry.display_added(Box::new(NullDisplay { nth }), &mut factory);
                }
                Op::Remove(nth) => registry.display_removed(&NullDisplay { nth }),
            }
        }

        prop_assert_eq!(registry.window_count(), 1);
    }
}
