//! Conversation controller
//!
//! Owns the conversation, the pending input and the display mode. Network
//! work is not performed here: each accepted submission is turned into a
//! [`Request`] that the caller executes (usually on a spawned task) and
//! reports back through [`ChatController::finish`].
//!
//! At most one request is in flight. Submissions made while one is running
//! are queued and dispatched in order; a queued submission's user entry is
//! appended only when it is dispatched so replies stay next to the message
//! that asked for them.

use std::collections::VecDeque;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::client::Request;
use crate::error::Result;
use crate::state::{ChatMessage, Conversation};
use crate::theme::{DisplayMode, ThemeState};
use crate::upload::{AnalysisKind, Upload};

/// Text draft and selected file
#[derive(Debug, Clone, Default)]
pub struct PendingInput {
    pub text: String,
    pub file: Option<Upload>,
}

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Nothing to send
    Ignored,
    /// Waiting behind the request in flight
    Queued,
    /// Execute this request and hand the outcome to `finish`
    Dispatched(Request),
}

#[derive(Debug)]
enum Queued {
    Text(String),
    File(AnalysisKind, Upload),
}

#[derive(Debug, Default)]
pub struct ChatController {
    conversation: Conversation,
    input: PendingInput,
    queue: VecDeque<Queued>,
    in_flight: bool,
    theme: ThemeState,
}

impl ChatController {
    pub fn new(display_mode: DisplayMode) -> Self {
        Self {
            theme: ThemeState::new(display_mode),
            ..Self::default()
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn input(&self) -> &PendingInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut PendingInput {
        &mut self.input
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Send the current draft
    pub fn submit_draft(&mut self) -> Submission {
        let text = std::mem::take(&mut self.input.text);
        self.send_text(text)
    }

    pub fn send_text(&mut self, text: impl Into<String>) -> Submission {
        let text = text.into();
        if text.is_empty() {
            return Submission::Ignored;
        }
        self.input.text.clear();
        self.submit(Queued::Text(text))
    }

    pub fn select_file(&mut self, upload: Upload) {
        self.input.file = Some(upload);
    }

    pub fn clear_file(&mut self) {
        self.input.file = None;
    }

    /// Send the selected file for analysis.
    ///
    /// An unsupported type is rejected before anything is sent and the file
    /// stays selected. Once accepted the selection is cleared whatever the
    /// round trip's outcome.
    pub fn send_file(&mut self) -> Result<Submission> {
        let Some(upload) = self.input.file.as_ref() else {
            return Ok(Submission::Ignored);
        };
        let kind = upload.analysis_kind()?;
        let Some(upload) = self.input.file.take() else {
            return Ok(Submission::Ignored);
        };
        Ok(self.submit(Queued::File(kind, upload)))
    }

    /// Complete the in-flight round trip.
    ///
    /// Returns the next queued request, already dispatched, if there is one.
    pub fn finish(&mut self, outcome: Result<String>) -> Option<Request> {
        if !self.in_flight {
            warn!("round trip finished with none in flight");
            return None;
        }
        self.in_flight = false;

        match outcome {
            Ok(reply) => self.conversation.push(ChatMessage::assistant(reply)),
            Err(err) => {
                warn!(error = %err, "round trip failed");
                self.conversation.push_failure(err.to_string());
            }
        }

        let next = self.queue.pop_front()?;
        Some(self.dispatch(next))
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.theme.current()
    }

    pub fn toggle_theme(&mut self) -> DisplayMode {
        let mode = self.theme.toggle();
        debug!(mode = mode.as_str(), "display mode toggled");
        mode
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<DisplayMode> {
        self.theme.subscribe()
    }

    fn submit(&mut self, queued: Queued) -> Submission {
        if self.in_flight {
            self.queue.push_back(queued);
            debug!(queued = self.queue.len(), "request queued behind in-flight round trip");
            return Submission::Queued;
        }
        Submission::Dispatched(self.dispatch(queued))
    }

    fn dispatch(&mut self, queued: Queued) -> Request {
        self.in_flight = true;
        match queued {
            Queued::Text(message) => {
                let history = self.conversation.history();
                self.conversation.push(ChatMessage::user(message.clone()));
                Request::Chat { message, history }
            }
            Queued::File(kind, upload) => {
                self.conversation.push(ChatMessage::user(upload.describe()));
                Request::Analyze { kind, upload }
            }
        }
    }
}
