//! UI-agnostic conversation state
//!
//! These types are shared by every front end and don't depend on any UI
//! framework. Only the controller appends to a [`Conversation`].

use serde::{Deserialize, Serialize};

/// A chat message, in the shape the service expects inside `history`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// One row of the conversation as shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(ChatMessage),
    /// A round trip that produced no reply. Never sent back as history.
    Failed { error: String },
}

impl Entry {
    pub fn as_message(&self) -> Option<&ChatMessage> {
        match self {
            Entry::Message(message) => Some(message),
            Entry::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<Entry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter().filter_map(Entry::as_message)
    }

    /// Messages to send as `history`, in conversation order, without failure markers
    pub fn history(&self) -> Vec<ChatMessage> {
        self.messages().cloned().collect()
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.entries.push(Entry::Message(message));
    }

    pub(crate) fn push_failure(&mut self, error: String) {
        self.entries.push(Entry::Failed { error });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_lowercase() {
        let json = serde_json::to_string(&ChatMessage::assistant("hey")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hey"}"#);
    }

    #[test]
    fn history_skips_failures() {
        let mut conversation = Conversation::new();
        conversation.push(ChatMessage::user("hi"));
        conversation.push_failure("HTTP error: boom".to_string());
        conversation.push(ChatMessage::user("again"));

        assert_eq!(conversation.len(), 3);
        assert_eq!(
            conversation.history(),
            vec![ChatMessage::user("hi"), ChatMessage::user("again")]
        );
    }
}
