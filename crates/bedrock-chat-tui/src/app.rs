use std::path::Path;
use std::time::Instant;

use bedrock_chat_core::{
    ChatClient, ChatController, ChatError, ChatRole, ClipboardSink, CodeBlock, CodeBlockId,
    CopyFeedback, DisplayMode, Document, Entry, Request, Submission, Upload,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    FilePath,
}

/// One-line message for the status bar, cleared on the next key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub is_error: bool,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: ChatController,
    pub client: ChatClient,
    pub display_mode: watch::Receiver<DisplayMode>,
    pub in_flight: Option<JoinHandle<bedrock_chat_core::Result<String>>>,

    // Input state
    pub cursor: usize, // cursor position in the draft, in chars
    pub file_path_input: String,
    pub notice: Option<Notice>,

    // Rendered replies, parallel to conversation entries (None for non-assistant rows)
    pub documents: Vec<Option<Document>>,

    // Code block selection and copy
    pub selected_block: Option<CodeBlockId>,
    pub scroll_to_selected: bool,
    pub copy_feedback: CopyFeedback,
    pub clipboard: Box<dyn ClipboardSink>,

    // Chat scrolling (updated during render)
    pub scroll: u16,
    pub follow: bool,
    pub chat_height: u16,
    pub max_scroll: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
}

impl App {
    pub fn new(
        client: ChatClient,
        controller: ChatController,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        let display_mode = controller.subscribe_theme();
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            controller,
            client,
            display_mode,
            in_flight: None,

            cursor: 0,
            file_path_input: String::new(),
            notice: None,

            documents: Vec::new(),

            selected_block: None,
            scroll_to_selected: false,
            copy_feedback: CopyFeedback::new(),
            clipboard,

            scroll: 0,
            follow: true,
            chat_height: 0,
            max_scroll: 0,

            animation_frame: 0,
        }
    }

    pub fn display_mode(&self) -> DisplayMode {
        *self.display_mode.borrow()
    }

    pub fn draft(&self) -> &str {
        &self.controller.input().text
    }

    pub fn is_waiting(&self) -> bool {
        self.in_flight.is_some()
    }

    // Round trips

    pub fn submit_draft(&mut self) {
        let submission = self.controller.submit_draft();
        self.cursor = 0;
        self.handle_submission(submission);
    }

    pub fn upload_file(&mut self) {
        match self.controller.send_file() {
            Ok(submission) => self.handle_submission(submission),
            Err(err @ ChatError::UnsupportedFileType(_)) => {
                self.notice = Some(Notice::error(err.to_string()));
            }
            Err(err) => {
                warn!(error = %err, "file upload rejected");
                self.notice = Some(Notice::error(err.to_string()));
            }
        }
    }

    pub async fn load_file(&mut self, path: &Path) {
        match Upload::from_path(path).await {
            Ok(upload) => {
                info!(file = %upload.name, mime = %upload.mime, bytes = upload.bytes.len(), "file selected");
                self.notice = Some(Notice::info(format!(
                    "Selected {} ({}). Press u to upload",
                    upload.name, upload.mime
                )));
                self.controller.select_file(upload);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read file");
                self.notice = Some(Notice::error(format!("Could not read {}: {err}", path.display())));
            }
        }
    }

    fn handle_submission(&mut self, submission: Submission) {
        match submission {
            Submission::Dispatched(request) => self.dispatch(request),
            Submission::Queued => {
                self.notice = Some(Notice::info(format!(
                    "Queued ({} waiting)",
                    self.controller.queued_len()
                )));
            }
            Submission::Ignored => {}
        }
        self.sync_documents();
        self.follow = true;
    }

    pub fn dispatch(&mut self, request: Request) {
        let client = self.client.clone();
        debug!(?request, "dispatching round trip");
        self.in_flight = Some(tokio::spawn(async move { client.execute(&request).await }));
    }

    /// Collect a finished round trip, if any, and start the next queued one
    pub async fn poll_round_trip(&mut self) {
        let finished = self
            .in_flight
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if !finished {
            return;
        }
        let Some(task) = self.in_flight.take() else {
            return;
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(err) => Err(ChatError::Aborted(err.to_string())),
        };
        if let Some(next) = self.controller.finish(outcome) {
            self.dispatch(next);
        }
        self.sync_documents();
        self.follow = true;
    }

    /// Parse any assistant replies appended since the last call
    pub fn sync_documents(&mut self) {
        let entries = self.controller.conversation().entries();
        for entry in &entries[self.documents.len()..] {
            let document = match entry {
                Entry::Message(message) if message.role == ChatRole::Assistant => {
                    Some(Document::parse(&message.content))
                }
                _ => None,
            };
            self.documents.push(document);
        }
    }

    // Code blocks

    pub fn code_block_ids(&self) -> Vec<CodeBlockId> {
        self.documents
            .iter()
            .enumerate()
            .filter_map(|(entry, doc)| doc.as_ref().map(|doc| (entry, doc)))
            .flat_map(|(entry, doc)| {
                (0..doc.code_blocks().count()).map(move |block| CodeBlockId { entry, block })
            })
            .collect()
    }

    pub fn code_block(&self, id: CodeBlockId) -> Option<&CodeBlock> {
        self.documents
            .get(id.entry)?
            .as_ref()?
            .code_blocks()
            .nth(id.block)
    }

    pub fn select_next_block(&mut self) {
        self.step_block_selection(true);
    }

    pub fn select_prev_block(&mut self) {
        self.step_block_selection(false);
    }

    fn step_block_selection(&mut self, forward: bool) {
        let ids = self.code_block_ids();
        if ids.is_empty() {
            self.selected_block = None;
            return;
        }
        let current = self
            .selected_block
            .and_then(|id| ids.iter().position(|candidate| *candidate == id));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
            (None, true) => 0,
            (None, false) => ids.len() - 1,
        };
        self.selected_block = Some(ids[next]);
        self.scroll_to_selected = true;
        self.follow = false;
    }

    pub fn copy_selected_block(&mut self) {
        let Some(id) = self.selected_block else {
            self.notice = Some(Notice::info("No code block selected. Press Tab to select one"));
            return;
        };
        let Some(block) = self.code_block(id).cloned() else {
            return;
        };
        if let Err(err) = self
            .copy_feedback
            .copy(id, &block, self.clipboard.as_mut(), Instant::now())
        {
            warn!(error = %err, "copy failed");
            self.notice = Some(Notice::error(err.to_string()));
        }
    }

    // Scrolling

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines).min(self.max_scroll);
        self.follow = self.scroll >= self.max_scroll;
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
        self.follow = false;
    }

    pub fn toggle_theme(&mut self) {
        self.controller.toggle_theme();
    }

    /// Tick animation frame and expire copy confirmations (called by Tick event)
    pub fn tick(&mut self) {
        if self.is_waiting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.copy_feedback.prune(Instant::now());
    }
}
