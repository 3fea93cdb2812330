use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::state::ChatMessage;
use crate::upload::{AnalysisKind, Upload};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
    history: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ServiceResponse {
    response: String,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    detail: String,
}

/// One round trip's worth of work for the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Chat {
        message: String,
        history: Vec<ChatMessage>,
    },
    Analyze {
        kind: AnalysisKind,
        upload: Upload,
    },
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn execute(&self, request: &Request) -> Result<String> {
        match request {
            Request::Chat { message, history } => self.chat(message, history).await,
            Request::Analyze { kind, upload } => self.analyze(*kind, upload).await,
        }
    }

    pub async fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        debug!(%url, history_len = history.len(), "sending chat request");

        let body = ChatRequestBody { message, history };
        let response = self.client.post(&url).json(&body).send().await?;

        read_reply(response).await
    }

    pub async fn analyze(&self, kind: AnalysisKind, upload: &Upload) -> Result<String> {
        let url = format!("{}{}", self.base_url, kind.endpoint());
        debug!(%url, file = %upload.name, mime = %upload.mime, "uploading file for analysis");

        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.name.clone())
            .mime_str(&upload.mime)?;
        let form = Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;

        read_reply(response).await
    }
}

async fn read_reply(response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServiceErrorBody>(&text)
            .map(|body| body.detail)
            .unwrap_or(text);
        return Err(ChatError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let reply: ServiceResponse = response.json().await?;
    Ok(reply.response)
}
