//! Message types for the conversation thread.
//!
//! A thread is an ordered list of [`ChatMessage`]s. Insertion order is display
//! order; nothing here is persisted client-side.

use serde::{Deserialize, Serialize};

/// Text shown in place of an assistant reply when the backend returns none.
pub const REPLY_FALLBACK: &str = "⚠️ Error";

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the local user.
    User,
    /// Produced by the backend, or reconstructed from a stored history.
    Assistant,
}

impl Role {
    /// Label used when a message is printed as plain text.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single message in the thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message author.
    pub role: Role,
    /// Markdown text of the message.
    pub text: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }

    /// Build the assistant message for a chat reply.
    ///
    /// A missing or empty reply becomes [`REPLY_FALLBACK`].
    pub fn from_reply(reply: Option<String>) -> Self {
        match reply {
            Some(text) if !text.is_empty() => Self::assistant(text),
            _ => Self::assistant(REPLY_FALLBACK),
        }
    }

    /// Whether this message was written by the local user.
    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let user_msg = ChatMessage::user("Hello");
        assert_eq!(user_msg.role, Role::User);
        assert_eq!(user_msg.text, "Hello");
        assert!(user_msg.is_user());

        let assistant_msg = ChatMessage::assistant("Hi there!");
        assert_eq!(assistant_msg.role, Role::Assistant);
        assert!(!assistant_msg.is_user());
    }

    #[test]
    fn test_from_reply_fallback() {
        assert_eq!(ChatMessage::from_reply(None).text, REPLY_FALLBACK);
        assert_eq!(ChatMessage::from_reply(Some(String::new())).text, REPLY_FALLBACK);
        assert_eq!(ChatMessage::from_reply(Some("ok".into())).text, "ok");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("x")).unwrap();
        assert_eq!(json, r#"{"role":"user","text":"x"}"#);
    }
}
