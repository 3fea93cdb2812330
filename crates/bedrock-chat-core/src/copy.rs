//! Copy control state for code blocks
//!
//! After a successful copy the block's control reads "Copied!" for
//! [`COPY_CONFIRMATION`] and then reverts. Time is passed in explicitly so
//! the window can be checked without sleeping.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::markdown::CodeBlock;

pub const COPY_CONFIRMATION: Duration = Duration::from_secs(2);

/// Somewhere copied text can be written to
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// Address of a code block: conversation entry index and block index within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CodeBlockId {
    pub entry: usize,
    pub block: usize,
}

#[derive(Debug, Default)]
pub struct CopyFeedback {
    copied_at: HashMap<CodeBlockId, Instant>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the block's text to the clipboard and start its confirmation window.
    ///
    /// Nothing is recorded if the clipboard write fails.
    pub fn copy(
        &mut self,
        id: CodeBlockId,
        block: &CodeBlock,
        clipboard: &mut dyn ClipboardSink,
        now: Instant,
    ) -> Result<()> {
        clipboard.set_text(block.copy_text())?;
        self.copied_at.insert(id, now);
        Ok(())
    }

    pub fn is_confirming(&self, id: CodeBlockId, now: Instant) -> bool {
        self.copied_at
            .get(&id)
            .is_some_and(|at| now.saturating_duration_since(*at) < COPY_CONFIRMATION)
    }

    pub fn label(&self, id: CodeBlockId, now: Instant) -> &'static str {
        if self.is_confirming(id, now) {
            "Copied!"
        } else {
            "Copy"
        }
    }

    /// Forget confirmations whose window has passed
    pub fn prune(&mut self, now: Instant) {
        self.copied_at
            .retain(|_, at| now.saturating_duration_since(*at) < COPY_CONFIRMATION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::markdown::Document;

    #[derive(Default)]
    struct RecordingClipboard {
        contents: Vec<String>,
        fail: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                return Err(ChatError::Clipboard("no display".to_string()));
            }
            self.contents.push(text.to_string());
            Ok(())
        }
    }

    const ID: CodeBlockId = CodeBlockId { entry: 1, block: 0 };

    #[test]
    fn copies_block_without_trailing_newline() {
        let doc = Document::parse("```rust\nfn main() {\n    println!(\"hi\");\n}\n```");
        let block = doc.code_blocks().next().unwrap();
        let mut clipboard = RecordingClipboard::default();
        let mut feedback = CopyFeedback::new();

        feedback.copy(ID, block, &mut clipboard, Instant::now()).unwrap();

        assert_eq!(
            clipboard.contents,
            vec!["fn main() {\n    println!(\"hi\");\n}".to_string()]
        );
    }

    #[test]
    fn confirmation_reverts_after_two_seconds() {
        let block = CodeBlock {
            language: Some("sh".to_string()),
            code: "ls\n".to_string(),
        };
        let mut clipboard = RecordingClipboard::default();
        let mut feedback = CopyFeedback::new();
        let start = Instant::now();

        assert_eq!(feedback.label(ID, start), "Copy");
        feedback.copy(ID, &block, &mut clipboard, start).unwrap();

        assert_eq!(feedback.label(ID, start), "Copied!");
        assert_eq!(feedback.label(ID, start + Duration::from_millis(1999)), "Copied!");
        assert_eq!(feedback.label(ID, start + COPY_CONFIRMATION), "Copy");

        let other = CodeBlockId { entry: 1, block: 1 };
        assert_eq!(feedback.label(other, start), "Copy");
    }

    #[test]
    fn failed_write_shows_no_confirmation() {
        let block = CodeBlock {
            language: None,
            code: "x\n".to_string(),
        };
        let mut clipboard = RecordingClipboard {
            fail: true,
            ..Default::default()
        };
        let mut feedback = CopyFeedback::new();
        let now = Instant::now();

        assert!(feedback.copy(ID, &block, &mut clipboard, now).is_err());
        assert!(!feedback.is_confirming(ID, now));
    }

    #[test]
    fn prune_drops_expired_entries() {
        let block = CodeBlock {
            language: None,
            code: "x".to_string(),
        };
        let mut clipboard = RecordingClipboard::default();
        let mut feedback = CopyFeedback::new();
        let start = Instant::now();
        feedback.copy(ID, &block, &mut clipboard, start).unwrap();

        feedback.prune(start + Duration::from_secs(3));
        assert!(feedback.copied_at.is_empty());
    }
}
