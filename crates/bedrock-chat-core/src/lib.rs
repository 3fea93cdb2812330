pub mod client;
pub mod config;
pub mod controller;
pub mod copy;
pub mod error;
pub mod markdown;
pub mod state;
pub mod theme;
pub mod upload;

// Re-export main types for convenience
pub use client::{ChatClient, Request};
pub use config::Config;
pub use controller::{ChatController, PendingInput, Submission};
pub use copy::{ClipboardSink, CodeBlockId, CopyFeedback, COPY_CONFIRMATION};
pub use error::{ChatError, Result};
pub use markdown::{Block, CodeBlock, Document, InlineStyle, Run};
pub use state::{ChatMessage, ChatRole, Conversation, Entry};
pub use theme::{DisplayMode, ThemeState};
pub use upload::{AnalysisKind, Upload};
