//! mdchat-engine: Headless core of the mdchat chat client
//!
//! This crate provides everything except rendering:
//! - Conversation state and its transitions
//! - The async controller that drives them against a backend
//! - The HTTP client for the chat service
//! - History splitting and configuration

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod controller;
pub mod conversation;
pub mod history;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export commonly used types
pub use api::{ChatApi, ChatReply, ClientError, HistoryContent, HistoryList};
pub use chat::{ChatMessage, Role, REPLY_FALLBACK};
pub use client::HttpChatApi;
pub use config::{Config, ConfigError, StaleResponsePolicy, BASE_URL_ENV};
pub use controller::{ConversationController, ConversationView, Resync};
pub use conversation::{Conversation, LoadOutcome, Outgoing, Ticket};
pub use history::{messages_from_content, split_blocks, HistoryEntry};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
