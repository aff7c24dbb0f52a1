//! Saved chat histories.
//!
//! The backend stores each conversation as a Markdown file and identifies it
//! by filename. The client only ever holds the filename; content is fetched
//! on demand and split into blocks on `---` delimiter lines.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chat::ChatMessage;

/// A line consisting solely of `---`.
const BLOCK_DELIMITER: &str = r"(?m)^---\r?$";

/// A server-stored conversation, addressed by its filename.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryEntry(String);

impl HistoryEntry {
    /// Wrap a server-assigned filename.
    pub fn new(filename: impl Into<String>) -> Self {
        Self(filename.into())
    }

    /// The filename used in requests.
    pub fn filename(&self) -> &str {
        &self.0
    }

    /// Name shown in the sidebar: the filename with its `.md` removed.
    ///
    /// Only the first occurrence is removed; the request identifier is
    /// never altered.
    pub fn display_name(&self) -> String {
        self.0.replacen(".md", "", 1)
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HistoryEntry {
    fn from(filename: &str) -> Self {
        Self::new(filename)
    }
}

impl From<String> for HistoryEntry {
    fn from(filename: String) -> Self {
        Self(filename)
    }
}

/// Split stored history content into trimmed text blocks.
///
/// Blocks are separated by lines consisting solely of `---`. A delimiter
/// needs no newline on both sides: one on the first or last line opens or
/// closes an empty block, and consecutive delimiter lines enclose an empty
/// block. Empty blocks are kept.
pub fn split_blocks(content: &str) -> Vec<String> {
    let Ok(delimiter) = Regex::new(BLOCK_DELIMITER) else {
        return vec![content.trim().to_string()];
    };
    delimiter
        .split(content)
        .map(|block| block.trim().to_string())
        .collect()
}

/// Rebuild a thread from stored history content.
///
/// The stored format does not keep per-message roles, so every block is
/// labelled as an assistant message.
pub fn messages_from_content(content: &str) -> Vec<ChatMessage> {
    split_blocks(content)
        .into_iter()
        .map(ChatMessage::assistant)
        .collect()
}
