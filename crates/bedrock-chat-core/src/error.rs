//! Error type shared by every fallible operation in the core crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Clipboard error: {0}")]
    Clipboard(String),
    #[error("Request aborted: {0}")]
    Aborted(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;
