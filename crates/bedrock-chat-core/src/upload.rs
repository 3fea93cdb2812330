use std::path::Path;

use crate::error::{ChatError, Result};

/// A file picked by the user, held until it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Read a file from disk and declare its type from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();

        Ok(Self::new(name, mime.essence_str(), bytes))
    }

    pub fn analysis_kind(&self) -> Result<AnalysisKind> {
        AnalysisKind::classify(&self.mime)
            .ok_or_else(|| ChatError::UnsupportedFileType(self.mime.clone()))
    }

    /// Text of the user entry recorded when this upload is sent
    pub fn describe(&self) -> String {
        format!("File: {}", self.name)
    }
}

/// Which analysis endpoint an upload is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisKind {
    Image,
    Pdf,
}

impl AnalysisKind {
    pub fn classify(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(AnalysisKind::Image)
        } else if mime == "application/pdf" {
            Some(AnalysisKind::Pdf)
        } else {
            None
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            AnalysisKind::Image => "/api/analyze-image",
            AnalysisKind::Pdf => "/api/analyze-pdf",
        }
    }
}
