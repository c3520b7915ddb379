//! Frontend collaborator traits
//!
//! Widget construction, window chrome, and dialog assembly are out of scope
//! for this crate and appear only as interfaces. The controller talks to the
//! embedding toolkit exclusively through the traits below.

use async_trait::async_trait;

/// One renderable surface announced by a session
///
/// Index 0 is the primary display; nonzero indices are secondary heads. A
/// display is attached to at most one window at a time.
pub trait Display {
    /// Returns the display index assigned by the session
    fn index(&self) -> u32;

    /// Hides the display surface
    fn hide(&self);
}

/// A client-side window hosting at most one display
pub trait Window {
    /// Updates the window title
    fn update_title(&self, title: &str);

    /// Shows the window
    fn show(&self);

    /// Hides the window
    fn hide(&self);

    /// Attaches a display surface to this window
    fn attach_display(&mut self, display: Box<dyn Display>);

    /// Detaches the currently attached display, if any
    fn detach_display(&mut self);
}

/// Creates secondary top-level windows on demand
pub trait WindowFactory {
    /// Creates a new top-level window
    fn create_window(&mut self) -> Box<dyn Window>;
}

/// User-facing reporting and prompting surface
///
/// All user-visible errors funnel through [`Frontend::report_error`];
/// recoverable errors are logged and absorbed at the component boundary where
/// they are detected and never reach this trait.
#[async_trait(?Send)]
pub trait Frontend {
    /// Reports an error through the single modal-report primitive
    fn report_error(&self, message: &str);

    /// Asks the user whether to retry after an authentication refusal
    ///
    /// This is a modal prompt: the control loop is re-entered while waiting
    /// for the answer, so event handlers must tolerate being invoked while
    /// the dispatching frame that awaits this call is still live.
    async fn ask_retry(&self, message: &str) -> bool;

    /// Updates the status placeholder text
    fn set_status(&self, text: &str);

    /// Switches the main surface from the status placeholder to the live
    /// display view
    fn show_display_view(&self);

    /// Emits an audible bell
    fn bell(&self);

    /// Registers (or refreshes) the standing local clipboard offer; the text
    /// itself is pulled lazily from the clipboard bridge on request
    fn offer_clipboard(&self);
}
