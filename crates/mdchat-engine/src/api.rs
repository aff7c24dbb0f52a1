//! Backend API surface.
//!
//! [`ChatApi`] is the seam between the conversation controller and the chat
//! service. [`HttpChatApi`](crate::client::HttpChatApi) talks to the real
//! backend; tests substitute a scripted implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::history::HistoryEntry;

/// Response of `GET /history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryList {
    /// Saved history filenames. Absent or null means none.
    #[serde(default)]
    pub histories: Option<Vec<HistoryEntry>>,
}

impl HistoryList {
    /// Build a listing from filenames.
    pub fn new<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<HistoryEntry>,
    {
        Self {
            histories: Some(filenames.into_iter().map(Into::into).collect()),
        }
    }

    /// The listed entries, empty when the field was missing.
    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.histories.unwrap_or_default()
    }
}

/// Response of `GET /history/{filename}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryContent {
    /// Raw Markdown of the stored conversation.
    #[serde(default)]
    pub content: Option<String>,
}

impl HistoryContent {
    /// Content that is present and non-empty.
    pub fn non_empty(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
}

/// Response of `POST /chat`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub reply: Option<String>,
}

impl ChatReply {
    /// A reply carrying text.
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

/// Operations offered by the chat backend.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `GET /history`
    async fn list_histories(&self) -> Result<HistoryList, ClientError>;

    /// `GET /history/{filename}`
    async fn fetch_history(&self, entry: &HistoryEntry) -> Result<HistoryContent, ClientError>;

    /// `POST /chat`
    async fn send_chat(&self, message: &str) -> Result<ChatReply, ClientError>;

    /// `POST /new_chat`. The body is opaque to the client.
    async fn new_chat(&self) -> Result<Value, ClientError>;

    /// `DELETE /history/{filename}`. The response is ignored.
    async fn delete_history(&self, entry: &HistoryEntry) -> Result<(), ClientError>;
}

/// Errors talking to the chat backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL cannot be used.
    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Connection, timeout or body transfer failure.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A non-success status with a body that is not JSON.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// A response body that does not have the expected shape.
    #[error("Invalid response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}
