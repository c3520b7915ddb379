//! Clipboard bridge
//!
//! Converts the one-shot "remote clipboard changed" push event into a
//! standing local clipboard offer. The remote side transmits cut-text in a
//! legacy single-byte charset (ISO-8859-1); the bridge transcodes it to
//! UTF-8 and stores it wholesale. The actual byte delivery is pull-based:
//! a consumer requests [`ClipboardBridge::current`] only when it wants the
//! data.

/// Selection targets the stored text is offered under
pub const TEXT_TARGETS: [&str; 4] = ["UTF8_STRING", "COMPOUND_TEXT", "TEXT", "STRING"];

/// Last-known remote clipboard text
///
/// Updates arrive serialized on the control loop, so the stored text is
/// never concurrently mutated.
#[derive(Debug, Default)]
pub struct ClipboardBridge {
    text: Option<String>,
}

impl ClipboardBridge {
    /// Creates an empty bridge
    #[must_use]
    pub const fn new() -> Self {
        Self { text: None }
    }

    /// Stores remote cut-text, transcoding it from the legacy charset
    ///
    /// Returns `true` when the text was stored and the local offer should be
    /// (re-)registered. An untranscodable byte sequence is dropped silently
    /// and the previously stored text is kept.
    pub fn update_from_remote(&mut self, raw: &[u8]) -> bool {
        match decode_legacy_text(raw) {
            Some(text) => {
                self.text = Some(text);
                true
            }
            None => {
                tracing::debug!(len = raw.len(), "dropping untranscodable cut-text");
                false
            }
        }
    }

    /// Serves the stored text verbatim to a requesting consumer
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Clears the stored text
    pub fn clear(&mut self) {
        self.text = None;
    }
}

/// Transcodes ISO-8859-1 bytes to UTF-8
///
/// Bytes in the C1 control range (0x80..=0x9F) carry no text in the legacy
/// charset as transmitted by the session protocols; their presence marks the
/// sequence untranscodable.
fn decode_legacy_text(raw: &[u8]) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    for &byte in raw {
        if (0x80..=0x9F).contains(&byte) {
            return None;
        }
        out.push(char::from(byte));
    }
    Some(out)
}
