//! Window registry and display multiplexing
//!
//! Keeps exactly one window per announced display index. Index 0 is the
//! primary display and always maps to the pre-existing main window; nonzero
//! indices get lazily created top-level windows that are torn down when the
//! display is removed.

use std::collections::HashMap;

use crate::ui::{Display, Window, WindowFactory};

/// Integer-keyed map owning the viewer windows
///
/// Index 0 is a distinguished, non-removable entry seeded at construction.
pub struct WindowRegistry {
    windows: HashMap<u32, Box<dyn Window>>,
    embedded: bool,
}

impl WindowRegistry {
    /// Creates the registry, seeding index 0 with the main window
    ///
    /// `embedded` marks container-constrained mode, where secondary heads are
    /// unsupported.
    #[must_use]
    pub fn new(main_window: Box<dyn Window>, embedded: bool) -> Self {
        let mut windows: HashMap<u32, Box<dyn Window>> = HashMap::new();
        windows.insert(0, main_window);
        Self { windows, embedded }
    }

    /// Returns the main window
    #[must_use]
    pub fn main_window(&self) -> Option<&dyn Window> {
        self.windows.get(&0).map(AsRef::as_ref)
    }

    /// Applies the given title to every live window
    pub fn update_titles(&self, title: &str) {
        for window in self.windows.values() {
            window.update_title(title);
        }
    }

    /// Handles a display announcement
    ///
    /// Index 0 reuses the main window. Nonzero indices are refused with a
    /// warning in embedded mode or when the index is already registered;
    /// otherwise a new window is created, shown, and registered before the
    /// display is attached.
    pub fn display_added(&mut self, display: Box<dyn Display>, factory: &mut dyn WindowFactory) {
        let nth = display.index();
        if nth == 0 {
            if let Some(window) = self.windows.get_mut(&0) {
                window.attach_display(display);
            }
            return;
        }

        if self.embedded {
            tracing::warn!("multi-head not yet supported within container");
            return;
        }
        if self.windows.contains_key(&nth) {
            tracing::warn!(nth, "display index already registered");
            return;
        }

        let mut window = factory.create_window();
        window.show();
        window.attach_display(display);
        self.windows.insert(nth, window);
    }

    /// Handles a display removal
    ///
    /// The display is hidden first, then detached from its window. Nonzero
    /// indices are unregistered and their window released; index 0's window
    /// is only detached. Removing an unregistered index logs a warning.
    pub fn display_removed(&mut self, display: &dyn Display) {
        display.hide();
        let nth = display.index();

        let Some(window) = self.windows.get_mut(&nth) else {
            tracing::warn!(nth, "removal of unregistered display index");
            return;
        };
        window.detach_display();

        if nth != 0 {
            self.windows.remove(&nth);
        }
    }

    /// Returns whether a window is registered for the given index
    #[must_use]
    pub fn has_window(&self, nth: u32) -> bool {
        self.windows.contains_key(&nth)
    }

    /// Returns the number of live windows
    #[must_use]
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}

impl std::fmt::Debug for WindowRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut indices: Vec<u32> = self.windows.keys().copied().collect();
        indices.sort_unstable();
        f.debug_struct("WindowRegistry")
            .field("indices", &indices)
            .field("embedded", &self.embedded)
            .finish()
    }
}
