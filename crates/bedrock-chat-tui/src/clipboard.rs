use bedrock_chat_core::{ChatError, ClipboardSink};

/// System clipboard, held open for the whole session.
///
/// On Wayland the copied text is dropped if the owning handle goes away too
/// quickly, so a single handle is created up front and reused.
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let inner = match arboard::Clipboard::new() {
            Ok(clipboard) => Some(clipboard),
            Err(err) => {
                tracing::warn!(error = %err, "clipboard unavailable");
                None
            }
        };
        Self { inner }
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> bedrock_chat_core::Result<()> {
        let clipboard = self
            .inner
            .as_mut()
            .ok_or_else(|| ChatError::Clipboard("no clipboard available".to_string()))?;
        clipboard
            .set_text(text.to_string())
            .map_err(|err| ChatError::Clipboard(err.to_string()))
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}
